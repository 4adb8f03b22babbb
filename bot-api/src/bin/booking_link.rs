//! Booking-link Lambda - constructs a deep link into the property's booking
//! engine for a validated stay.
//!
//! The stay is evaluated first; only a bookable stay yields a link. Answers
//! with the chat-tool envelope (always HTTP 200).

use lambda_http::{run, service_fn, Body, Error, Request, Response};
use shared::links::build_booking_link;
use shared::{evaluate, AppState, BotEnvelope, RequestParams, StayQuery};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

async fn handler(state: Arc<AppState>, event: Request) -> Result<Response<Body>, Error> {
    let params = RequestParams::from_request(&event);

    let query = match StayQuery::from_params(&params, &state.config.default_currency) {
        Ok(query) => query,
        Err(e) => return BotEnvelope::failure(e.to_string()).into_response(),
    };

    info!(
        property_id = %query.property_id,
        checkin = %query.window.checkin,
        checkout = %query.window.checkout,
        "booking link request"
    );

    let property = match state.registry.property(&query.property_id) {
        Ok(property) => property,
        Err(e) => return BotEnvelope::failure(e.to_string()).into_response(),
    };

    let records = match state
        .rates
        .fetch_nightly_rates_with_fallback(
            &property.providers,
            &query.property_id,
            query.window,
            query.occupancy,
            query.rate_plan_id.as_deref(),
        )
        .await
    {
        Ok(records) => records,
        Err(e) => return BotEnvelope::failure(e.to_string()).into_response(),
    };

    let verdict = evaluate(query.window.checkin, query.window.checkout, &records);

    if !verdict.valid {
        return BotEnvelope::ok(
            format!("Cannot build a booking link: {}", verdict.reason),
            serde_json::json!({
                "valid": false,
                "reason": verdict.reason,
                "minimumNightsRequired": verdict.minimum_nights_required,
            }),
        )
        .into_response();
    }

    let link = build_booking_link(&property.booking_url, &query);

    BotEnvelope::ok(
        "Booking link ready.",
        serde_json::json!({
            "valid": true,
            "bookingLink": link,
            "minimumNightsRequired": verdict.minimum_nights_required,
        }),
    )
    .into_response()
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
