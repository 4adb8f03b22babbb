//! Stay evaluation: decides whether a date range is bookable from the
//! provider's per-night rate detail.
//!
//! This is the one piece of domain logic every handler shares. It is a pure
//! function of its inputs: it never touches the network, never mutates the
//! records, and never returns an error. Every input defect degrades to a
//! negative verdict with a human-readable reason, because the downstream
//! conversational agent cannot handle thrown errors.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dates::StayWindow;

/// Per-night rate detail for one calendar date, as reported by the provider.
///
/// The evaluator only reads these; they are built by the provider client and
/// discarded with the request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NightlyRateRecord {
    pub date: NaiveDate,
    pub rate: f64,
    pub rooms_available: u32,
    #[serde(default)]
    pub min_los: u32,
    #[serde(default)]
    pub closed_to_arrival: bool,
    #[serde(default)]
    pub closed_to_departure: bool,
}

/// The outcome of evaluating a stay. Request-scoped, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StayVerdict {
    pub valid: bool,
    pub minimum_nights_required: u32,
    pub reason: String,
}

impl StayVerdict {
    fn valid(minimum_nights: u32) -> Self {
        Self {
            valid: true,
            minimum_nights_required: minimum_nights.max(1),
            reason: String::new(),
        }
    }

    fn invalid(minimum_nights: u32, reason: impl Into<String>) -> Self {
        Self {
            valid: false,
            minimum_nights_required: minimum_nights.max(1),
            reason: reason.into(),
        }
    }
}

/// Evaluate whether the stay `[checkin, checkout)` is bookable.
///
/// Rules are applied in order and the first failure wins:
/// range sanity, completeness of nightly data, minimum length of stay,
/// closed-to-arrival, closed-to-departure, availability, rate presence.
///
/// The completeness window is the half-open `[checkin, checkout)`.
/// Closed-to-departure is taken from the checkout-date record, when the
/// provider returned one, OR from the last occupied night: providers
/// inconsistently attribute the flag to one or the other, so both count.
pub fn evaluate(
    checkin: NaiveDate,
    checkout: NaiveDate,
    records: &[NightlyRateRecord],
) -> StayVerdict {
    if checkout <= checkin {
        return StayVerdict::invalid(1, "invalid date range: checkout must be after checkin");
    }
    // Range already validated, cannot fail.
    let window = match StayWindow::new(checkin, checkout) {
        Ok(w) => w,
        Err(_) => return StayVerdict::invalid(1, "invalid date range"),
    };

    let by_date: HashMap<NaiveDate, &NightlyRateRecord> =
        records.iter().map(|r| (r.date, r)).collect();

    let nights = window.nights();
    let min_los = infer_min_los(&window, &by_date);

    let missing: Vec<NaiveDate> = window
        .night_dates()
        .filter(|date| !by_date.contains_key(date))
        .collect();
    if !missing.is_empty() {
        return StayVerdict::invalid(
            min_los,
            format!("incomplete rate data: no record for {} night(s)", missing.len()),
        );
    }

    if nights < min_los {
        return StayVerdict::invalid(
            min_los,
            format!("minimum stay is {} night(s), requested {}", min_los, nights),
        );
    }

    // Completeness passed, so the checkin record exists.
    if by_date.get(&window.checkin).is_some_and(|r| r.closed_to_arrival) {
        return StayVerdict::invalid(min_los, "property is closed to arrival on the checkin date");
    }

    let departure_closed = by_date
        .get(&window.checkout)
        .is_some_and(|r| r.closed_to_departure)
        || by_date
            .get(&window.last_night())
            .is_some_and(|r| r.closed_to_departure);
    if departure_closed {
        return StayVerdict::invalid(min_los, "property is closed to departure on the checkout date");
    }

    for date in window.night_dates() {
        if by_date[&date].rooms_available == 0 {
            return StayVerdict::invalid(min_los, "no availability on one or more nights");
        }
    }

    for date in window.night_dates() {
        if by_date[&date].rate <= 0.0 {
            return StayVerdict::invalid(min_los, "no published rate on one or more nights");
        }
    }

    StayVerdict::valid(min_los)
}

/// Minimum length of stay for the window: the checkin date's value when
/// positive, otherwise the largest positive value across the nights in range,
/// otherwise 1.
fn infer_min_los(window: &StayWindow, by_date: &HashMap<NaiveDate, &NightlyRateRecord>) -> u32 {
    if let Some(record) = by_date.get(&window.checkin) {
        if record.min_los > 0 {
            return record.min_los;
        }
    }
    window
        .night_dates()
        .filter_map(|date| by_date.get(&date).map(|r| r.min_los))
        .filter(|&los| los > 0)
        .max()
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn record(date: &str) -> NightlyRateRecord {
        NightlyRateRecord {
            date: d(date),
            rate: 100.0,
            rooms_available: 3,
            min_los: 0,
            closed_to_arrival: false,
            closed_to_departure: false,
        }
    }

    #[test]
    fn test_inverted_range_fails_before_record_checks() {
        // No records at all, but the reason is the range, not completeness.
        let verdict = evaluate(d("2025-10-19"), d("2025-10-17"), &[]);
        assert!(!verdict.valid);
        assert!(verdict.reason.contains("invalid date range"));

        let verdict = evaluate(d("2025-10-17"), d("2025-10-17"), &[]);
        assert!(!verdict.valid);
        assert!(verdict.reason.contains("invalid date range"));
    }

    #[test]
    fn test_missing_night_is_incomplete_data() {
        let records = vec![record("2025-10-17")]; // 2025-10-18 missing
        let verdict = evaluate(d("2025-10-17"), d("2025-10-19"), &records);
        assert!(!verdict.valid);
        assert!(verdict.reason.contains("incomplete rate data"));
    }

    #[test]
    fn test_completeness_window_is_half_open() {
        // Checkout-date record is not required.
        let records = vec![record("2025-10-17"), record("2025-10-18")];
        let verdict = evaluate(d("2025-10-17"), d("2025-10-19"), &records);
        assert!(verdict.valid, "unexpected reason: {}", verdict.reason);
    }

    #[test]
    fn test_min_los_from_checkin_date_blocks_short_stay() {
        let mut records = vec![record("2025-10-17"), record("2025-10-18"), record("2025-10-19")];
        records[0].min_los = 4;
        let verdict = evaluate(d("2025-10-17"), d("2025-10-20"), &records);
        assert!(!verdict.valid);
        assert!(verdict.reason.contains('4'));
        assert_eq!(verdict.minimum_nights_required, 4);
    }

    #[test]
    fn test_min_los_falls_back_to_max_across_nights() {
        let mut records = vec![record("2025-10-17"), record("2025-10-18")];
        records[1].min_los = 3;
        let verdict = evaluate(d("2025-10-17"), d("2025-10-19"), &records);
        assert!(!verdict.valid);
        assert_eq!(verdict.minimum_nights_required, 3);
        assert!(verdict.reason.contains('3'));
    }

    #[test]
    fn test_closed_to_arrival_on_checkin_date() {
        let mut records = vec![record("2025-10-17"), record("2025-10-18")];
        records[0].min_los = 2;
        records[0].closed_to_arrival = true;
        let verdict = evaluate(d("2025-10-17"), d("2025-10-19"), &records);
        assert!(!verdict.valid);
        assert!(verdict.reason.contains("arrival"));
    }

    #[test]
    fn test_closed_to_departure_on_last_night() {
        let mut records = vec![record("2025-10-17"), record("2025-10-18")];
        records[1].closed_to_departure = true;
        let verdict = evaluate(d("2025-10-17"), d("2025-10-19"), &records);
        assert!(!verdict.valid);
        assert!(verdict.reason.contains("departure"));
    }

    #[test]
    fn test_closed_to_departure_on_checkout_date_record() {
        // Some providers attribute the flag to the departure date itself.
        let mut records = vec![record("2025-10-17"), record("2025-10-18"), record("2025-10-19")];
        records[2].closed_to_departure = true;
        let verdict = evaluate(d("2025-10-17"), d("2025-10-19"), &records);
        assert!(!verdict.valid);
        assert!(verdict.reason.contains("departure"));
    }

    #[test]
    fn test_zero_availability_on_any_night() {
        let mut records = vec![record("2025-10-17"), record("2025-10-18")];
        records[1].rooms_available = 0;
        let verdict = evaluate(d("2025-10-17"), d("2025-10-19"), &records);
        assert!(!verdict.valid);
        assert!(verdict.reason.contains("availability"));
    }

    #[test]
    fn test_zero_rate_on_one_night_invalidates_stay() {
        let mut records = vec![record("2025-10-17"), record("2025-10-18"), record("2025-10-19")];
        records[1].rate = 0.0;
        let verdict = evaluate(d("2025-10-17"), d("2025-10-20"), &records);
        assert!(!verdict.valid);
        assert!(verdict.reason.contains("rate"));
    }

    #[test]
    fn test_negative_rate_treated_as_absent() {
        let mut records = vec![record("2025-10-17"), record("2025-10-18")];
        records[0].rate = -1.0;
        let verdict = evaluate(d("2025-10-17"), d("2025-10-19"), &records);
        assert!(!verdict.valid);
        assert!(verdict.reason.contains("rate"));
    }

    #[test]
    fn test_valid_two_night_stay() {
        let mut records = vec![record("2025-10-17"), record("2025-10-18")];
        records[0].min_los = 2;
        records[1].min_los = 2;
        let verdict = evaluate(d("2025-10-17"), d("2025-10-19"), &records);
        assert_eq!(
            verdict,
            StayVerdict {
                valid: true,
                minimum_nights_required: 2,
                reason: String::new(),
            }
        );
    }

    #[test]
    fn test_valid_stay_defaults_minimum_to_one() {
        let records = vec![record("2025-10-17"), record("2025-10-18")];
        let verdict = evaluate(d("2025-10-17"), d("2025-10-19"), &records);
        assert!(verdict.valid);
        assert_eq!(verdict.minimum_nights_required, 1);
    }

    #[test]
    fn test_evaluation_is_idempotent() {
        let mut records = vec![record("2025-10-17"), record("2025-10-18")];
        records[1].rooms_available = 0;
        let first = evaluate(d("2025-10-17"), d("2025-10-19"), &records);
        let second = evaluate(d("2025-10-17"), d("2025-10-19"), &records);
        assert_eq!(first, second);
    }

    #[test]
    fn test_rule_order_min_los_before_closure() {
        // Both defects present: the minimum-stay rule is reported first.
        let mut records = vec![record("2025-10-17"), record("2025-10-18")];
        records[0].min_los = 5;
        records[0].closed_to_arrival = true;
        let verdict = evaluate(d("2025-10-17"), d("2025-10-19"), &records);
        assert!(verdict.reason.contains("minimum stay"));
    }

    #[test]
    fn test_rule_order_availability_before_rate() {
        let mut records = vec![record("2025-10-17"), record("2025-10-18")];
        records[0].rooms_available = 0;
        records[1].rate = 0.0;
        let verdict = evaluate(d("2025-10-17"), d("2025-10-19"), &records);
        assert!(verdict.reason.contains("availability"));
    }
}
