//! Parsed Admin API responses.

use std::collections::HashMap;
use std::time::Duration;

/// A response from the Admin API.
///
/// Header names are lowercased.
#[derive(Clone, Debug)]
pub struct HttpResponse {
    /// HTTP status code.
    pub code: u16,
    /// Response headers.
    pub headers: HashMap<String, Vec<String>>,
    /// JSON body; `{}` when empty or not JSON.
    pub body: serde_json::Value,
}

impl HttpResponse {
    /// Creates a response.
    #[must_use]
    pub const fn new(
        code: u16,
        headers: HashMap<String, Vec<String>>,
        body: serde_json::Value,
    ) -> Self {
        Self {
            code,
            headers,
            body,
        }
    }

    /// Returns `true` for 2xx statuses.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.code >= 200 && self.code <= 299
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// The `X-Request-Id` header.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        self.header("x-request-id")
    }

    /// The `Retry-After` header as a duration.
    #[must_use]
    pub fn retry_after(&self) -> Option<Duration> {
        self.header("retry-after")
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|secs| secs.is_finite() && *secs >= 0.0)
            .map(Duration::from_secs_f64)
    }

    /// The reason Shopify gives when a deprecated endpoint is called.
    #[must_use]
    pub fn deprecation_reason(&self) -> Option<&str> {
        self.header("x-shopify-api-deprecated-reason")
    }

    /// Human-readable error text taken from the body's `errors` or
    /// `error`/`error_description` fields.
    #[must_use]
    pub fn error_message(&self) -> String {
        if let Some(errors) = self.body.get("errors") {
            return errors
                .as_str()
                .map_or_else(|| errors.to_string(), str::to_string);
        }
        match (
            self.body.get("error").and_then(|v| v.as_str()),
            self.body.get("error_description").and_then(|v| v.as_str()),
        ) {
            (Some(error), Some(description)) => format!("{error}: {description}"),
            (Some(error), None) => error.to_string(),
            _ => format!("HTTP {}", self.code),
        }
    }
}
