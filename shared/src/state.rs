//! Shared cold-start state for handler binaries.

use crate::config::Config;
use crate::provider::RateProviderClient;
use crate::registry::ProviderRegistry;
use crate::Result;

/// Everything a handler needs, built once at cold start and cloned into the
/// service closure. Immutable after construction; nothing is shared mutably
/// between invocations.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Config,
    pub registry: ProviderRegistry,
    pub rates: RateProviderClient,
}

impl AppState {
    pub async fn init() -> Result<Self> {
        let config = Config::from_env()?;
        let registry = ProviderRegistry::load(&config).await?;
        Ok(Self {
            config,
            registry,
            rates: RateProviderClient::new(),
        })
    }
}
