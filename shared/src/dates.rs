//! Stay window parsing and date arithmetic.
//!
//! All dates are normalized to `YYYY-MM-DD` at the edge, so downstream
//! comparisons on `NaiveDate` (or on the re-serialized strings) agree with
//! calendar order.

use chrono::NaiveDate;

use crate::{Error, Result};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` date string.
pub fn parse_date(field: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| Error::Input(format!("{} must be a YYYY-MM-DD date, got '{}'", field, value)))
}

/// A half-open stay window `[checkin, checkout)`: the nights the guest occupies.
///
/// Construction guarantees `checkout > checkin`, so `nights() >= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StayWindow {
    pub checkin: NaiveDate,
    pub checkout: NaiveDate,
}

impl StayWindow {
    /// Build a window from already-parsed dates, rejecting inverted or
    /// zero-length ranges.
    pub fn new(checkin: NaiveDate, checkout: NaiveDate) -> Result<Self> {
        if checkout <= checkin {
            return Err(Error::Input(format!(
                "checkout ({}) must be after checkin ({})",
                checkout, checkin
            )));
        }
        Ok(Self { checkin, checkout })
    }

    /// Parse and validate a window from raw request strings.
    pub fn parse(checkin: &str, checkout: &str) -> Result<Self> {
        let checkin = parse_date("checkin", checkin)?;
        let checkout = parse_date("checkout", checkout)?;
        Self::new(checkin, checkout)
    }

    /// Number of occupied nights.
    pub fn nights(&self) -> u32 {
        (self.checkout - self.checkin).num_days() as u32
    }

    /// The final occupied night (the day before checkout).
    pub fn last_night(&self) -> NaiveDate {
        self.checkout.pred_opt().unwrap_or(self.checkin)
    }

    /// Iterate the occupied nights in calendar order.
    pub fn night_dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.checkin.iter_days().take(self.nights() as usize)
    }
}
