//! Availability Lambda - checks whether a stay is bookable.
//!
//! GET query string or POST JSON body: `propertyID`, `checkin`/`startDate`,
//! `checkout`/`endDate`, optional `adults`, `children`, `ratePlanId`.
//! Answers with the chat-tool envelope (always HTTP 200); a stay that fails
//! the booking rules is a normal negative verdict, not an error.

use lambda_http::{run, service_fn, Body, Error, Request, Response};
use shared::{evaluate, AppState, BotEnvelope, RequestParams, StayQuery};
use std::sync::Arc;
use tracing::{info, warn};
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
        "availability check"
    );

    let providers = match state.registry.providers_for(&query.property_id) {
        Ok(providers) => providers,
        Err(e) => return BotEnvelope::failure(e.to_string()).into_response(),
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
        Err(e) => return BotEnvelope::failure(e.to_string()).into_response(),
    };

    let verdict = evaluate(query.window.checkin, query.window.checkout, &records);

    if !verdict.valid {
        return BotEnvelope::ok(
            format!("Stay is not bookable: {}", verdict.reason),
            serde_json::json!({
                "valid": false,
                "reason": verdict.reason,
                "minimumNightsRequired": verdict.minimum_nights_required,
            }),
        )
        .into_response();
    }

    // Room types are display enrichment; a failure here does not invalidate
    // the verdict.
    let room_types = match state
        .rates
        .list_room_types(&providers[0], &query.property_id, query.window, query.occupancy)
        .await
    {
        Ok(room_types) => room_types,
        Err(e) => {
            warn!(error = %e, "room type lookup failed");
            Vec::new()
        }
    };

    BotEnvelope::ok(
        format!(
            "The property is available for {} night(s) from {} to {}.",
            query.window.nights(),
            query.window.checkin,
            query.window.checkout
        ),
        serde_json::json!({
            "valid": true,
            "minimumNightsRequired": verdict.minimum_nights_required,
            "nights": query.window.nights(),
            "roomTypes": room_types,
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
