//! Configuration management for Lambda functions.
//!
//! Everything environment-sourced is read here, once, at cold start. Business
//! logic receives the resulting immutable values and never touches the
//! process environment itself.

use std::env;

use crate::{Error, Result};

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Inline provider registry JSON, if configured
    pub providers_json: Option<String>,
    /// ARN of the Secrets Manager secret holding the provider registry
    pub providers_secret_arn: Option<String>,
    /// Currency used when a request does not specify one
    pub default_currency: String,
    /// AWS region
    pub aws_region: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// At least one of `BOOKING_PROVIDERS_JSON` and
    /// `BOOKING_PROVIDERS_SECRET_ARN` must be set.
    pub fn from_env() -> Result<Self> {
        let providers_json = env::var("BOOKING_PROVIDERS_JSON").ok();
        let providers_secret_arn = env::var("BOOKING_PROVIDERS_SECRET_ARN").ok();

        if providers_json.is_none() && providers_secret_arn.is_none() {
            return Err(Error::Config(
                "one of BOOKING_PROVIDERS_JSON or BOOKING_PROVIDERS_SECRET_ARN must be set"
                    .to_string(),
            ));
        }

        Ok(Self {
            providers_json,
            providers_secret_arn,
            default_currency: env::var("DEFAULT_CURRENCY").unwrap_or_else(|_| "USD".to_string()),
            aws_region: env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
        })
    }
}
