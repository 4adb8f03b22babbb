//! Booking deep-link construction.
//!
//! A validated stay becomes a URL into the property's booking engine with the
//! stay parameters appended as query string. Values are url-encoded; the base
//! URL may or may not already carry a query string.

use crate::models::StayQuery;

/// Build a booking deep link for a validated stay.
pub fn build_booking_link(booking_url: &str, query: &StayQuery) -> String {
    let mut pairs: Vec<(&str, String)> = vec![
        ("checkin", query.window.checkin.to_string()),
        ("checkout", query.window.checkout.to_string()),
        ("adults", query.occupancy.adults.to_string()),
        ("children", query.occupancy.children.to_string()),
        ("currency", query.currency.clone()),
    ];
    if let Some(room_type_id) = &query.room_type_id {
        pairs.push(("roomTypeID", room_type_id.clone()));
    }
    if let Some(rate_plan_id) = &query.rate_plan_id {
        pairs.push(("ratePlanID", rate_plan_id.clone()));
    }
    if let Some(promo_code) = &query.promo_code {
        pairs.push(("promoCode", promo_code.clone()));
    }

    let query_string = pairs
        .iter()
        .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&");

    let base = booking_url.trim_end_matches('?');
    let separator = if base.contains('?') { '&' } else { '?' };
    format!("{}{}{}", base, separator, query_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::StayWindow;
    use crate::models::Occupancy;

    fn query() -> StayQuery {
        StayQuery {
            property_id: "prop-100".to_string(),
            window: StayWindow::parse("2025-10-17", "2025-10-19").unwrap(),
            occupancy: Occupancy {
                adults: 2,
                children: 1,
            },
            room_type_id: None,
            rate_plan_id: None,
            currency: "USD".to_string(),
            promo_code: None,
        }
    }

    #[test]
    fn test_basic_link() {
        let link = build_booking_link("https://book.example.com/prop-100", &query());
        assert_eq!(
            link,
            "https://book.example.com/prop-100?checkin=2025-10-17&checkout=2025-10-19&adults=2&children=1&currency=USD"
        );
    }

    #[test]
    fn test_optional_parameters_are_encoded() {
        let mut q = query();
        q.promo_code = Some("FALL 25+".to_string());
        q.room_type_id = Some("rt-9".to_string());
        let link = build_booking_link("https://book.example.com/prop-100", &q);
        assert!(link.contains("promoCode=FALL%2025%2B"));
        assert!(link.contains("roomTypeID=rt-9"));
    }

    #[test]
    fn test_base_url_with_existing_query() {
        let link = build_booking_link("https://book.example.com/?pid=100", &query());
        assert!(link.starts_with("https://book.example.com/?pid=100&checkin="));
    }
}
