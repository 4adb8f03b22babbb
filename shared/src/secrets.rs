//! AWS Secrets Manager integration.
//!
//! Provider credentials live in one secret per deployment; the value is
//! cached for the lifetime of the execution environment so warm invocations
//! skip the Secrets Manager round trip.

use aws_sdk_secretsmanager::Client as SecretsClient;
use std::collections::HashMap;
use std::sync::OnceLock;
use tokio::sync::RwLock;

use crate::{Error, Result};

/// Cached secrets with lazy initialization.
static SECRETS_CACHE: OnceLock<RwLock<HashMap<String, String>>> = OnceLock::new();

fn get_cache() -> &'static RwLock<HashMap<String, String>> {
    SECRETS_CACHE.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Get a secret value from Secrets Manager with caching.
pub async fn get_secret(client: &SecretsClient, secret_arn: &str) -> Result<String> {
    // Check cache first
    {
        let cache = get_cache().read().await;
        if let Some(value) = cache.get(secret_arn) {
            return Ok(value.clone());
        }
    }

    // Fetch from Secrets Manager
    let response = client
        .get_secret_value()
        .secret_id(secret_arn)
        .send()
        .await
        .map_err(|e| Error::Aws(format!("Failed to get secret: {}", e)))?;

    let secret_string = response
        .secret_string()
        .ok_or_else(|| Error::Aws("Secret has no string value".to_string()))?
        .to_string();

    // Cache the result
    {
        let mut cache = get_cache().write().await;
        cache.insert(secret_arn.to_string(), secret_string.clone());
    }

    Ok(secret_string)
}

/// Clear the secrets cache (useful for testing or credential rotation).
pub async fn clear_cache() {
    let mut cache = get_cache().write().await;
    cache.clear();
}
