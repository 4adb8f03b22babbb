//! Provider registry: property identifier → upstream API endpoints and
//! credentials.
//!
//! The registry is static for the lifetime of the execution environment. It
//! is loaded once at cold start, either from an inline JSON env var or from
//! Secrets Manager, and passed into handlers as an immutable value. There is
//! no dynamic discovery and no health checking; when a property lists more
//! than one provider they are tried in priority order.

use std::collections::HashMap;

use serde::Deserialize;

use crate::config::Config;
use crate::secrets;
use crate::{Error, Result};

/// How the upstream API expects its credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AuthStyle {
    /// `Authorization: Bearer <credential>`
    Bearer,
    /// `x-api-key: <credential>`
    ApiKey,
}

/// One upstream provider endpoint for a property.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderEndpoint {
    /// Base URL of the upstream REST API, without a trailing slash
    pub base_url: String,
    /// Bearer token or API key, per `auth_style`
    pub credential: String,
    pub auth_style: AuthStyle,
    /// Lower numbers are tried first
    #[serde(default)]
    pub priority: u32,
}

/// A bookable property and the provider(s) that serve it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyEntry {
    pub property_id: String,
    /// Base URL of the property's booking engine, used for deep links
    pub booking_url: String,
    pub providers: Vec<ProviderEndpoint>,
}

#[derive(Debug, Deserialize)]
struct RegistryDocument {
    properties: Vec<PropertyEntry>,
}

/// Immutable property → provider mapping.
#[derive(Debug, Clone)]
pub struct ProviderRegistry {
    properties: HashMap<String, PropertyEntry>,
}

impl ProviderRegistry {
    /// Parse a registry from its JSON document, sorting each property's
    /// providers by priority.
    pub fn from_json(json: &str) -> Result<Self> {
        let document: RegistryDocument = serde_json::from_str(json)
            .map_err(|e| Error::Config(format!("invalid provider registry JSON: {}", e)))?;

        let mut properties = HashMap::new();
        for mut entry in document.properties {
            if entry.providers.is_empty() {
                return Err(Error::Config(format!(
                    "property {} has no providers",
                    entry.property_id
                )));
            }
            entry.providers.sort_by_key(|p| p.priority);
            properties.insert(entry.property_id.clone(), entry);
        }

        Ok(Self { properties })
    }

    /// Load the registry per configuration: inline JSON wins, otherwise the
    /// Secrets Manager secret is fetched (and cached across warm starts).
    pub async fn load(config: &Config) -> Result<Self> {
        if let Some(json) = &config.providers_json {
            return Self::from_json(json);
        }

        let secret_arn = config.providers_secret_arn.as_ref().ok_or_else(|| {
            Error::Config("no provider registry source configured".to_string())
        })?;

        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let client = aws_sdk_secretsmanager::Client::new(&aws_config);
        let json = secrets::get_secret(&client, secret_arn).await?;
        Self::from_json(&json)
    }

    /// Look up a property's entry; unknown properties are a 404-class error.
    pub fn property(&self, property_id: &str) -> Result<&PropertyEntry> {
        self.properties
            .get(property_id)
            .ok_or_else(|| Error::UnknownProperty(property_id.to_string()))
    }

    /// A property's providers in priority order.
    pub fn providers_for(&self, property_id: &str) -> Result<&[ProviderEndpoint]> {
        Ok(&self.property(property_id)?.providers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REGISTRY_JSON: &str = r#"{
        "properties": [
            {
                "propertyId": "prop-100",
                "bookingUrl": "https://book.example.com/prop-100",
                "providers": [
                    {"baseUrl": "https://backup.example.com/v1", "credential": "key-2", "authStyle": "apiKey", "priority": 2},
                    {"baseUrl": "https://api.example.com/v1", "credential": "token-1", "authStyle": "bearer", "priority": 1}
                ]
            }
        ]
    }"#;

    #[test]
    fn test_parse_and_priority_order() {
        let registry = ProviderRegistry::from_json(REGISTRY_JSON).unwrap();
        let providers = registry.providers_for("prop-100").unwrap();
        assert_eq!(providers.len(), 2);
        assert_eq!(providers[0].base_url, "https://api.example.com/v1");
        assert_eq!(providers[0].auth_style, AuthStyle::Bearer);
        assert_eq!(providers[1].auth_style, AuthStyle::ApiKey);
    }

    #[test]
    fn test_unknown_property() {
        let registry = ProviderRegistry::from_json(REGISTRY_JSON).unwrap();
        let err = registry.providers_for("prop-999").unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[test]
    fn test_rejects_property_without_providers() {
        let json = r#"{"properties": [{"propertyId": "p", "bookingUrl": "https://b", "providers": []}]}"#;
        assert!(ProviderRegistry::from_json(json).is_err());
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = ProviderRegistry::from_json("not json").unwrap_err();
        assert_eq!(err.status_code(), 500);
    }
}
