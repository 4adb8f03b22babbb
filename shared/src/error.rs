//! Error types for booking-bot Lambda functions.
//!
//! A negative [`StayVerdict`](crate::stay::StayVerdict) is not an error: "the
//! stay is not bookable" and "we could not determine bookability" are kept as
//! separate outcomes so callers and tests can tell them apart.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in booking-bot Lambda functions.
#[derive(Error, Debug)]
pub enum Error {
    /// Request input error (missing or malformed parameters)
    #[error("Invalid input: {0}")]
    Input(String),

    /// Property is not present in the provider registry
    #[error("Unknown property: {0}")]
    UnknownProperty(String),

    /// Upstream provider error (non-success status, failure flag, or network failure)
    #[error("Provider error: {0}")]
    Provider(String),

    /// AWS SDK error
    #[error("AWS error: {0}")]
    Aws(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Input(_) => 400,
            Error::UnknownProperty(_) => 404,
            Error::Provider(_) => 502,
            _ => 500,
        }
    }

    /// Input error listing the missing request fields.
    pub fn missing_fields(fields: &[&str]) -> Self {
        Error::Input(format!("Missing required fields: {}", fields.join(", ")))
    }
}
