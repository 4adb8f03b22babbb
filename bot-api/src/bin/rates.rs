//! Rates Lambda - nightly rate and total price lookup for a stay.
//!
//! Reflects the outcome in the HTTP status: 400 for input errors, 404 for
//! unknown properties, 502 for upstream failures. A stay that fails the
//! booking rules still answers 200, with the verdict and whatever nightly
//! breakdown the provider published.

use chrono::NaiveDate;
use lambda_http::{run, service_fn, Body, Error, Request, Response};
use serde::Serialize;
use shared::http::{error_to_response, json_response};
use shared::provider::select_plan;
use shared::{evaluate, ApiResponse, AppState, RequestParams, StayQuery, StayVerdict};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NightBreakdown {
    date: NaiveDate,
    rate: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RateQuote {
    property_id: String,
    rate_plan_id: Option<String>,
    currency: String,
    nights: u32,
    nightly: Vec<NightBreakdown>,
    total: f64,
    average_nightly: f64,
    verdict: StayVerdict,
}

async fn handler(state: Arc<AppState>, event: Request) -> Result<Response<Body>, Error> {
    let params = RequestParams::from_request(&event);

    let query = match StayQuery::from_params(&params, &state.config.default_currency) {
        Ok(query) => query,
        Err(e) => return error_to_response(&e),
    };

    info!(
        property_id = %query.property_id,
        checkin = %query.window.checkin,
        checkout = %query.window.checkout,
        "rate lookup"
    );

    let providers = match state.registry.providers_for(&query.property_id) {
        Ok(providers) => providers,
        Err(e) => return error_to_response(&e),
    };

    let plans = match state
        .rates
        .fetch_rate_plans_with_fallback(providers, &query.property_id, query.window, query.occupancy)
        .await
    {
        Ok(plans) => plans,
        Err(e) => return error_to_response(&e),
    };

    let plan = select_plan(&plans, query.rate_plan_id.as_deref());
    let records = plan.map(|p| p.nightly.clone()).unwrap_or_default();
    let verdict = evaluate(query.window.checkin, query.window.checkout, &records);

    // Breakdown covers the occupied nights the provider priced, whether or
    // not the stay is bookable.
    let nightly: Vec<NightBreakdown> = records
        .iter()
        .filter(|r| r.date >= query.window.checkin && r.date < query.window.checkout)
        .map(|r| NightBreakdown {
            date: r.date,
            rate: r.rate,
        })
        .collect();

    let total: f64 = nightly.iter().map(|n| n.rate).sum();
    let average_nightly = if nightly.is_empty() {
        0.0
    } else {
        total / nightly.len() as f64
    };

    let quote = RateQuote {
        property_id: query.property_id.clone(),
        rate_plan_id: plan.map(|p| p.rate_plan_id.clone()),
        currency: plan
            .and_then(|p| p.currency.clone())
            .unwrap_or_else(|| query.currency.clone()),
        nights: query.window.nights(),
        nightly,
        total,
        average_nightly,
        verdict,
    };

    json_response(200, &ApiResponse::success(quote))
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
