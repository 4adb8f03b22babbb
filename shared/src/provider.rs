//! HTTP client for the upstream hotel-management API.
//!
//! One network call per operation, no retries, no caching. A non-success
//! HTTP status or a `success: false` envelope both become
//! [`Error::Provider`] carrying the upstream message verbatim; timeouts are
//! whatever the underlying client defaults to.

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::dates::StayWindow;
use crate::models::Occupancy;
use crate::registry::{AuthStyle, ProviderEndpoint};
use crate::stay::NightlyRateRecord;
use crate::{Error, Result};

/// Upstream response envelope: every endpoint wraps its payload in
/// `{success, message?, data?}`.
#[derive(Debug, Deserialize)]
struct UpstreamEnvelope<T> {
    success: bool,
    message: Option<String>,
    data: Option<T>,
}

/// A rate plan with per-night detail, as returned by the rate-plans endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatePlan {
    #[serde(alias = "ratePlanID")]
    pub rate_plan_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(alias = "roomTypeID", default)]
    pub room_type_id: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(alias = "roomRateDetailed", default)]
    pub nightly: Vec<NightlyRateRecord>,
}

/// A bookable room type for the requested window.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomType {
    #[serde(alias = "roomTypeID")]
    pub room_type_id: String,
    #[serde(alias = "roomTypeName", default)]
    pub name: String,
    #[serde(default)]
    pub max_guests: Option<u32>,
    #[serde(default)]
    pub rooms_available: Option<u32>,
}

/// An existing reservation as reported upstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    #[serde(alias = "reservationID")]
    pub reservation_id: String,
    #[serde(default)]
    pub guest_name: String,
    #[serde(default)]
    pub guest_email: Option<String>,
    #[serde(alias = "checkin")]
    pub start_date: String,
    #[serde(alias = "checkout")]
    pub end_date: String,
    #[serde(default)]
    pub status: String,
    #[serde(alias = "grandTotal", default)]
    pub total: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
}

/// Filter for the list-reservations endpoint. At least one field must be set.
#[derive(Debug, Clone, Default)]
pub struct ReservationQuery {
    pub reservation_id: Option<String>,
    pub guest_email: Option<String>,
}

/// Payload for the create-reservation endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservationUpstream {
    #[serde(rename = "propertyID")]
    pub property_id: String,
    pub start_date: String,
    pub end_date: String,
    pub guest_first_name: String,
    pub guest_last_name: String,
    pub guest_email: String,
    pub adults: u32,
    pub children: u32,
    #[serde(rename = "roomTypeID", skip_serializing_if = "Option::is_none")]
    pub room_type_id: Option<String>,
    #[serde(rename = "ratePlanID", skip_serializing_if = "Option::is_none")]
    pub rate_plan_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promo_code: Option<String>,
}

/// Upstream confirmation of a created reservation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationConfirmation {
    #[serde(alias = "reservationID")]
    pub reservation_id: String,
    #[serde(default)]
    pub status: String,
    #[serde(alias = "grandTotal", default)]
    pub total: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
}

/// Client for the upstream hotel-management REST API.
#[derive(Debug, Clone)]
pub struct RateProviderClient {
    http: reqwest::Client,
}

impl Default for RateProviderClient {
    fn default() -> Self {
        Self::new()
    }
}

impl RateProviderClient {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }

    /// Fetch rate plans with per-night detail for a window.
    pub async fn fetch_rate_plans(
        &self,
        provider: &ProviderEndpoint,
        property_id: &str,
        window: StayWindow,
        occupancy: Occupancy,
    ) -> Result<Vec<RatePlan>> {
        let request = self
            .http
            .get(format!("{}/getRatePlans", provider.base_url))
            .query(&[
                ("propertyID", property_id),
                ("startDate", &window.checkin.to_string()),
                ("endDate", &window.checkout.to_string()),
                ("adults", &occupancy.adults.to_string()),
                ("children", &occupancy.children.to_string()),
                ("detailedRates", "true"),
            ]);

        let plans: Option<Vec<RatePlan>> = self.send(provider, request).await?;
        Ok(plans.unwrap_or_default())
    }

    /// Fetch the nightly rate records for a window, optionally restricted to
    /// one rate plan. An empty result is not an error here; the stay
    /// evaluator reports it as incomplete rate data.
    pub async fn fetch_nightly_rates(
        &self,
        provider: &ProviderEndpoint,
        property_id: &str,
        window: StayWindow,
        occupancy: Occupancy,
        rate_plan_id: Option<&str>,
    ) -> Result<Vec<NightlyRateRecord>> {
        let plans = self
            .fetch_rate_plans(provider, property_id, window, occupancy)
            .await?;
        Ok(select_plan(&plans, rate_plan_id)
            .map(|plan| plan.nightly.clone())
            .unwrap_or_default())
    }

    /// Try each provider in priority order, returning the first success.
    /// When every provider fails, the last provider's error is reported.
    pub async fn fetch_rate_plans_with_fallback(
        &self,
        providers: &[ProviderEndpoint],
        property_id: &str,
        window: StayWindow,
        occupancy: Occupancy,
    ) -> Result<Vec<RatePlan>> {
        let mut last_error = Error::Provider("no providers configured".to_string());
        for provider in providers {
            match self
                .fetch_rate_plans(provider, property_id, window, occupancy)
                .await
            {
                Ok(plans) => return Ok(plans),
                Err(e) => {
                    warn!(base_url = %provider.base_url, error = %e, "provider lookup failed");
                    last_error = e;
                }
            }
        }
        Err(last_error)
    }

    /// Nightly records from the first provider that answers, optionally
    /// restricted to one rate plan.
    pub async fn fetch_nightly_rates_with_fallback(
        &self,
        providers: &[ProviderEndpoint],
        property_id: &str,
        window: StayWindow,
        occupancy: Occupancy,
        rate_plan_id: Option<&str>,
    ) -> Result<Vec<NightlyRateRecord>> {
        let plans = self
            .fetch_rate_plans_with_fallback(providers, property_id, window, occupancy)
            .await?;
        Ok(select_plan(&plans, rate_plan_id)
            .map(|plan| plan.nightly.clone())
            .unwrap_or_default())
    }

    /// List room types available for the window.
    pub async fn list_room_types(
        &self,
        provider: &ProviderEndpoint,
        property_id: &str,
        window: StayWindow,
        occupancy: Occupancy,
    ) -> Result<Vec<RoomType>> {
        let request = self
            .http
            .get(format!("{}/getAvailableRoomTypes", provider.base_url))
            .query(&[
                ("propertyID", property_id),
                ("startDate", &window.checkin.to_string()),
                ("endDate", &window.checkout.to_string()),
                ("adults", &occupancy.adults.to_string()),
                ("children", &occupancy.children.to_string()),
            ]);

        let rooms: Option<Vec<RoomType>> = self.send(provider, request).await?;
        Ok(rooms.unwrap_or_default())
    }

    /// List reservations matching the query.
    pub async fn list_reservations(
        &self,
        provider: &ProviderEndpoint,
        property_id: &str,
        query: &ReservationQuery,
    ) -> Result<Vec<Reservation>> {
        let mut params: Vec<(&str, String)> = vec![("propertyID", property_id.to_string())];
        if let Some(id) = &query.reservation_id {
            params.push(("reservationID", id.clone()));
        }
        if let Some(email) = &query.guest_email {
            params.push(("guestEmail", email.clone()));
        }

        let request = self
            .http
            .get(format!("{}/getReservations", provider.base_url))
            .query(&params);

        let reservations: Option<Vec<Reservation>> = self.send(provider, request).await?;
        Ok(reservations.unwrap_or_default())
    }

    /// Create a reservation upstream.
    pub async fn create_reservation(
        &self,
        provider: &ProviderEndpoint,
        payload: &CreateReservationUpstream,
    ) -> Result<ReservationConfirmation> {
        info!(property_id = %payload.property_id, "creating reservation upstream");

        let request = self
            .http
            .post(format!("{}/postReservation", provider.base_url))
            .json(payload);

        let confirmation: Option<ReservationConfirmation> = self.send(provider, request).await?;
        confirmation
            .ok_or_else(|| Error::Provider("reservation created but no confirmation returned".to_string()))
    }

    async fn send<T: DeserializeOwned>(
        &self,
        provider: &ProviderEndpoint,
        request: RequestBuilder,
    ) -> Result<Option<T>> {
        let response = apply_auth(request, provider)
            .send()
            .await
            .map_err(|e| Error::Provider(format!("request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Provider(format!("failed to read response body: {}", e)))?;

        if !status.is_success() {
            return Err(Error::Provider(format!(
                "upstream returned HTTP {}: {}",
                status.as_u16(),
                upstream_message(&body)
            )));
        }

        decode_envelope(&body)
    }
}

fn apply_auth(request: RequestBuilder, provider: &ProviderEndpoint) -> RequestBuilder {
    match provider.auth_style {
        AuthStyle::Bearer => request.bearer_auth(&provider.credential),
        AuthStyle::ApiKey => request.header("x-api-key", &provider.credential),
    }
}

/// Decode the upstream envelope; a `success: false` flag is a provider error
/// carrying the upstream message verbatim.
fn decode_envelope<T: DeserializeOwned>(body: &str) -> Result<Option<T>> {
    let envelope: UpstreamEnvelope<T> = serde_json::from_str(body)
        .map_err(|e| Error::Provider(format!("unparseable upstream response: {}", e)))?;

    if !envelope.success {
        return Err(Error::Provider(
            envelope
                .message
                .unwrap_or_else(|| "upstream reported failure without a message".to_string()),
        ));
    }

    Ok(envelope.data)
}

/// Best-effort extraction of the upstream message from an error body.
fn upstream_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
        .unwrap_or_else(|| body.trim().to_string())
}

/// Pick the requested rate plan, or the first one when no plan is named.
pub fn select_plan<'a>(plans: &'a [RatePlan], rate_plan_id: Option<&str>) -> Option<&'a RatePlan> {
    match rate_plan_id {
        Some(id) => plans.iter().find(|p| p.rate_plan_id == id),
        None => plans.first(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_envelope_success() {
        let body = r#"{"success": true, "data": [{"ratePlanID": "rp-1", "name": "Flexible",
            "roomTypeID": "rt-9", "currency": "EUR",
            "roomRateDetailed": [
                {"date": "2025-10-17", "rate": 100.0, "roomsAvailable": 3, "minLos": 2,
                 "closedToArrival": false, "closedToDeparture": false}
            ]}]}"#;
        let plans: Option<Vec<RatePlan>> = decode_envelope(body).unwrap();
        let plans = plans.unwrap();
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].rate_plan_id, "rp-1");
        assert_eq!(plans[0].nightly.len(), 1);
        assert_eq!(plans[0].nightly[0].min_los, 2);
        assert_eq!(plans[0].nightly[0].rooms_available, 3);
    }

    #[test]
    fn test_decode_envelope_failure_flag_carries_message() {
        let body = r#"{"success": false, "message": "Invalid API credentials"}"#;
        let err = decode_envelope::<Vec<RatePlan>>(body).unwrap_err();
        assert_eq!(err.status_code(), 502);
        assert!(err.to_string().contains("Invalid API credentials"));
    }

    #[test]
    fn test_decode_envelope_unparseable_body() {
        let err = decode_envelope::<Vec<RatePlan>>("<html>gateway timeout</html>").unwrap_err();
        assert_eq!(err.status_code(), 502);
    }

    #[test]
    fn test_nightly_detail_defaults_optional_flags() {
        // Providers omit flags they consider false.
        let body = r#"{"success": true, "data": [{"ratePlanID": "rp-1",
            "roomRateDetailed": [{"date": "2025-10-17", "rate": 80.5, "roomsAvailable": 1}]}]}"#;
        let plans: Vec<RatePlan> = decode_envelope(body).unwrap().unwrap();
        let night = &plans[0].nightly[0];
        assert_eq!(night.min_los, 0);
        assert!(!night.closed_to_arrival);
        assert!(!night.closed_to_departure);
    }

    #[test]
    fn test_select_plan_by_id_and_default() {
        let plans = vec![
            RatePlan {
                rate_plan_id: "rp-1".into(),
                name: String::new(),
                room_type_id: None,
                currency: None,
                nightly: vec![],
            },
            RatePlan {
                rate_plan_id: "rp-2".into(),
                name: String::new(),
                room_type_id: None,
                currency: None,
                nightly: vec![],
            },
        ];
        assert_eq!(select_plan(&plans, Some("rp-2")).unwrap().rate_plan_id, "rp-2");
        assert_eq!(select_plan(&plans, None).unwrap().rate_plan_id, "rp-1");
        assert!(select_plan(&plans, Some("rp-9")).is_none());
    }

    #[test]
    fn test_upstream_message_extraction() {
        assert_eq!(
            upstream_message(r#"{"success": false, "message": "rate limit"}"#),
            "rate limit"
        );
        assert_eq!(upstream_message("plain text error"), "plain text error");
    }
}
