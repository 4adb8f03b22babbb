//! Reservation-lookup Lambda - finds existing reservations by reservation ID
//! or guest email.
//!
//! Reservations live at the property's primary provider; there is no
//! fallback iteration here. HTTP status reflects the outcome.

use lambda_http::{run, service_fn, Body, Error, Request, Response};
use shared::http::{error_response, error_to_response, json_response};
use shared::provider::ReservationQuery;
use shared::{ApiResponse, AppState, RequestParams};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

async fn handler(state: Arc<AppState>, event: Request) -> Result<Response<Body>, Error> {
    let params = RequestParams::from_request(&event);

    let property_id = match params.require(&["propertyID", "propertyId", "property_id"]) {
        Ok(id) => id.to_string(),
        Err(e) => return error_to_response(&e),
    };

    let query = ReservationQuery {
        reservation_id: params
            .get(&["reservationID", "reservationId"])
            .map(String::from),
        guest_email: params.get(&["guestEmail", "email"]).map(String::from),
    };

    if query.reservation_id.is_none() && query.guest_email.is_none() {
        return error_response(400, "Provide reservationID or guestEmail");
    }

    info!(
        property_id = %property_id,
        reservation_id = ?query.reservation_id,
        "reservation lookup"
    );

    let providers = match state.registry.providers_for(&property_id) {
        Ok(providers) => providers,
        Err(e) => return error_to_response(&e),
    };

    let reservations = match state
        .rates
        .list_reservations(&providers[0], &property_id, &query)
        .await
    {
        Ok(reservations) => reservations,
        Err(e) => return error_to_response(&e),
    };

    if reservations.is_empty() && query.reservation_id.is_some() {
        return error_response(404, "Reservation not found");
    }

    json_response(
        200,
        &ApiResponse::success(serde_json::json!({
            "reservations": reservations,
            "count": reservations.len(),
        })),
    )
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let state = Arc::new(AppState::init().await?);

    run(service_fn(move |event| {
        let state = Arc::clone(&state);
        async move { handler(state, event).await }
    }))
    .await
}
