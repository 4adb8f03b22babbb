//! HTTP helpers for Lambda functions: request parameter extraction and the
//! two response conventions the chat tool consumes.
//!
//! Conventions:
//! - [`ApiResponse`] reflects the outcome in the HTTP status code.
//! - [`BotEnvelope`] always answers 200 with an embedded status string, for
//!   the integration that treats any non-200 as a hard failure.

use std::collections::HashMap;

use lambda_http::{Body, Request, RequestExt, Response};
use serde::Serialize;

use crate::{Error, Result};

/// Standard API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Always-200 envelope for the chat tool.
#[derive(Debug, Serialize)]
pub struct BotEnvelope {
    pub status: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl BotEnvelope {
    pub fn ok(message: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            data: None,
        }
    }

    /// Render as HTTP 200 regardless of outcome.
    pub fn into_response(self) -> std::result::Result<Response<Body>, lambda_http::Error> {
        json_response(200, &self)
    }
}

/// Create a JSON response with the given status code and data.
pub fn json_response<T: Serialize>(
    status: u16,
    data: &T,
) -> std::result::Result<Response<Body>, lambda_http::Error> {
    Ok(Response::builder()
        .status(status)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(data)?))
        .expect("Failed to build response"))
}

/// Create an error response with the given status code and message.
pub fn error_response(
    status: u16,
    message: impl Into<String>,
) -> std::result::Result<Response<Body>, lambda_http::Error> {
    json_response(status, &ApiResponse::<()>::error(message))
}

/// Map a domain error to the status-reflecting convention.
pub fn error_to_response(err: &Error) -> std::result::Result<Response<Body>, lambda_http::Error> {
    error_response(err.status_code(), err.to_string())
}

/// Flattened request parameters: query string merged with a JSON or
/// form-encoded body. Body values override query values of the same name.
#[derive(Debug, Default)]
pub struct RequestParams {
    values: HashMap<String, String>,
}

impl RequestParams {
    pub fn from_request(event: &Request) -> Self {
        let mut values = HashMap::new();

        let query = event.query_string_parameters();
        for (key, value) in query.iter() {
            values.insert(key.to_string(), value.to_string());
        }

        let body = event.body().as_ref();
        if !body.is_empty() {
            if let Ok(serde_json::Value::Object(map)) = serde_json::from_slice(body) {
                for (key, value) in map {
                    let text = match value {
                        serde_json::Value::String(s) => s,
                        serde_json::Value::Number(n) => n.to_string(),
                        serde_json::Value::Bool(b) => b.to_string(),
                        _ => continue,
                    };
                    values.insert(key, text);
                }
            } else if let Ok(text) = std::str::from_utf8(body) {
                // Fall back to form encoding for the tool integrations that
                // still POST application/x-www-form-urlencoded.
                if !text.trim_start().starts_with('{') {
                    for pair in text.split('&') {
                        if let Some((key, value)) = pair.split_once('=') {
                            let key = urlencoding::decode(key)
                                .map(|k| k.into_owned())
                                .unwrap_or_default();
                            let value = urlencoding::decode(value)
                                .map(|v| v.into_owned())
                                .unwrap_or_default();
                            if !key.is_empty() {
                                values.insert(key, value);
                            }
                        }
                    }
                }
            }
        }

        Self { values }
    }

    #[cfg(test)]
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self {
            values: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// First non-empty value among the accepted aliases for a parameter.
    pub fn get(&self, names: &[&str]) -> Option<&str> {
        names
            .iter()
            .filter_map(|name| self.values.get(*name))
            .map(String::as_str)
            .find(|value| !value.trim().is_empty())
    }

    /// Require a parameter, naming it by its canonical alias on failure.
    pub fn require(&self, names: &[&str]) -> Result<&str> {
        self.get(names)
            .ok_or_else(|| Error::missing_fields(&[names[0]]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_honors_aliases_and_skips_empty() {
        let params = RequestParams::from_pairs(&[("startDate", "2025-10-17"), ("checkin", "")]);
        assert_eq!(params.get(&["checkin", "startDate"]), Some("2025-10-17"));
    }

    #[test]
    fn test_require_reports_canonical_name() {
        let params = RequestParams::from_pairs(&[]);
        let err = params.require(&["checkin", "startDate"]).unwrap_err();
        assert!(err.to_string().contains("checkin"));
    }

    #[test]
    fn test_json_body_overrides_query() {
        let event = lambda_http::http::Request::builder()
            .method("POST")
            .uri("https://example.com/check?propertyID=from-query")
            .body(Body::from(r#"{"propertyID": "from-body", "adults": 3}"#))
            .unwrap();
        let params = RequestParams::from_request(&event);
        assert_eq!(params.get(&["propertyID"]), Some("from-body"));
        assert_eq!(params.get(&["adults"]), Some("3"));
    }

    #[test]
    fn test_form_body_is_decoded() {
        let event = lambda_http::http::Request::builder()
            .method("POST")
            .uri("https://example.com/check")
            .body(Body::from("propertyID=prop%2D1&checkin=2025-10-17"))
            .unwrap();
        let params = RequestParams::from_request(&event);
        assert_eq!(params.get(&["propertyID"]), Some("prop-1"));
        assert_eq!(params.get(&["checkin"]), Some("2025-10-17"));
    }

    #[test]
    fn test_bot_envelope_is_always_200() {
        let response = BotEnvelope::failure("no availability").into_response().unwrap();
        assert_eq!(response.status(), 200);
        let body = String::from_utf8_lossy(response.body().as_ref()).to_string();
        assert!(body.contains("\"status\":\"error\""));
        assert!(body.contains("no availability"));
    }
}
