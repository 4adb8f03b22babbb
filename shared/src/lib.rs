//! Shared library for booking-bot Lambda functions.
//!
//! This crate provides the stay evaluator, provider client, registry, and
//! HTTP helpers used across all handler binaries.

pub mod config;
pub mod dates;
pub mod error;
pub mod http;
pub mod links;
pub mod models;
pub mod provider;
pub mod registry;
pub mod secrets;
pub mod state;
pub mod stay;

pub use config::Config;
pub use dates::StayWindow;
pub use error::{Error, Result};
pub use http::{ApiResponse, BotEnvelope, RequestParams};
pub use models::{GuestDetails, Occupancy, StayQuery};
pub use provider::RateProviderClient;
pub use registry::ProviderRegistry;
pub use state::AppState;
pub use stay::{evaluate, NightlyRateRecord, StayVerdict};
