//! Create-reservation Lambda - books a stay upstream.
//!
//! POST JSON body: stay parameters plus guest details. The stay is
//! re-evaluated against current nightly rates before anything is sent
//! upstream; an unbookable stay answers 200 with the negative verdict, since
//! that is a normal outcome rather than an error.

use lambda_http::{run, service_fn, Body, Error, Request, Response};
use shared::http::{error_to_response, json_response};
use shared::provider::CreateReservationUpstream;
use shared::{evaluate, ApiResponse, AppState, GuestDetails, RequestParams, StayQuery};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

async fn handler(state: Arc<AppState>, event: Request) -> Result<Response<Body>, Error> {
    let params = RequestParams::from_request(&event);

    let query = match StayQuery::from_params(&params, &state.config.default_currency) {
        Ok(query) => query,
        Err(e) => return error_to_response(&e),
    };
    let guest = match GuestDetails::from_params(&params) {
        Ok(guest) => guest,
        Err(e) => return error_to_response(&e),
    };

    info!(
        property_id = %query.property_id,
        checkin = %query.window.checkin,
        checkout = %query.window.checkout,
        "create reservation"
    );

    let providers = match state.registry.providers_for(&query.property_id) {
        Ok(providers) => providers,
        Err(e) => return error_to_response(&e),
    };

    let records = match state
        .rates
        .fetch_nightly_rates_with_fallback(
            providers,
            &query.property_id,
            query.window,
            query.occupancy,
            query.rate_plan_id.as_deref(),
        )
        .await
    {
        Ok(records) => records,
        Err(e) => return error_to_response(&e),
    };

    let verdict = evaluate(query.window.checkin, query.window.checkout, &records);
    if !verdict.valid {
        return json_response(
            200,
            &ApiResponse::success(serde_json::json!({
                "created": false,
                "reason": verdict.reason,
                "minimumNightsRequired": verdict.minimum_nights_required,
            })),
        );
    }

    let payload = CreateReservationUpstream {
        property_id: query.property_id.clone(),
        start_date: query.window.checkin.to_string(),
        end_date: query.window.checkout.to_string(),
        guest_first_name: guest.guest_first_name,
        guest_last_name: guest.guest_last_name,
        guest_email: guest.guest_email,
        adults: query.occupancy.adults,
        children: query.occupancy.children,
        room_type_id: query.room_type_id.clone(),
        rate_plan_id: query.rate_plan_id.clone(),
        promo_code: query.promo_code.clone(),
    };

    // Reservations are created at the primary provider only.
    let confirmation = match state
        .rates
        .create_reservation(&providers[0], &payload)
        .await
    {
        Ok(confirmation) => confirmation,
        Err(e) => return error_to_response(&e),
    };

    json_response(
        201,
        &ApiResponse::success(serde_json::json!({
            "created": true,
            "confirmation": confirmation,
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
