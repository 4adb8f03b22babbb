//! Shared request models.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::dates::StayWindow;
use crate::http::RequestParams;
use crate::{Error, Result};

/// Requested occupancy. Defaults to two adults, no children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occupancy {
    pub adults: u32,
    pub children: u32,
}

impl Default for Occupancy {
    fn default() -> Self {
        Self {
            adults: 2,
            children: 0,
        }
    }
}

/// Normalized stay parameters common to every handler: property, window,
/// occupancy, and the optional filters. Built once from the raw request, with
/// all input errors (missing fields, malformed dates, bad numbers) reported
/// before any network call.
#[derive(Debug, Clone)]
pub struct StayQuery {
    pub property_id: String,
    pub window: StayWindow,
    pub occupancy: Occupancy,
    pub room_type_id: Option<String>,
    pub rate_plan_id: Option<String>,
    pub currency: String,
    pub promo_code: Option<String>,
}

impl StayQuery {
    pub fn from_params(params: &RequestParams, default_currency: &str) -> Result<Self> {
        let property_id = params.get(&["propertyID", "propertyId", "property_id"]);
        let checkin = params.get(&["checkin", "startDate", "start_date"]);
        let checkout = params.get(&["checkout", "endDate", "end_date"]);

        let mut missing = Vec::new();
        if property_id.is_none() {
            missing.push("propertyID");
        }
        if checkin.is_none() {
            missing.push("checkin");
        }
        if checkout.is_none() {
            missing.push("checkout");
        }
        if !missing.is_empty() {
            return Err(Error::missing_fields(&missing));
        }

        // All three are present at this point.
        let window = StayWindow::parse(checkin.unwrap_or_default(), checkout.unwrap_or_default())?;

        let occupancy = Occupancy {
            adults: parse_count(params, &["adults"], Occupancy::default().adults)?,
            children: parse_count(params, &["children"], Occupancy::default().children)?,
        };

        Ok(Self {
            property_id: property_id.unwrap_or_default().to_string(),
            window,
            occupancy,
            room_type_id: params.get(&["roomTypeID", "roomTypeId"]).map(String::from),
            rate_plan_id: params.get(&["ratePlanId", "ratePlanID"]).map(String::from),
            currency: params
                .get(&["currency"])
                .unwrap_or(default_currency)
                .to_uppercase(),
            promo_code: params.get(&["promoCode", "promo_code"]).map(String::from),
        })
    }
}

fn parse_count(params: &RequestParams, names: &[&str], default: u32) -> Result<u32> {
    match params.get(names) {
        None => Ok(default),
        Some(value) => value.trim().parse::<u32>().map_err(|_| {
            Error::Input(format!(
                "{} must be a non-negative integer, got '{}'",
                names[0], value
            ))
        }),
    }
}

/// Guest details for reservation creation.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GuestDetails {
    #[validate(length(min = 1, message = "guestFirstName is required"))]
    #[serde(alias = "firstName")]
    pub guest_first_name: String,
    #[validate(length(min = 1, message = "guestLastName is required"))]
    #[serde(alias = "lastName")]
    pub guest_last_name: String,
    #[validate(email(message = "guestEmail must be a valid email address"))]
    #[serde(alias = "email")]
    pub guest_email: String,
}

impl GuestDetails {
    pub fn from_params(params: &RequestParams) -> Result<Self> {
        let guest = Self {
            guest_first_name: params
                .get(&["guestFirstName", "firstName"])
                .unwrap_or_default()
                .to_string(),
            guest_last_name: params
                .get(&["guestLastName", "lastName"])
                .unwrap_or_default()
                .to_string(),
            guest_email: params
                .get(&["guestEmail", "email"])
                .unwrap_or_default()
                .to_string(),
        };
        guest.validate().map_err(|e| Error::Input(e.to_string()))?;
        Ok(guest)
    }
}
