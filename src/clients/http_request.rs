//! Admin API request description.

use std::fmt;

use crate::clients::errors::HttpError;

/// HTTP methods supported by the Admin API.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpMethod {
    /// GET
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// DELETE
    Delete,
}

impl HttpMethod {
    const fn requires_body(self) -> bool {
        matches!(self, Self::Post | Self::Put)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        })
    }
}

/// A request relative to `/admin/api/{version}/`.
///
/// ```rust
/// use shopify_auth::clients::{HttpMethod, HttpRequest};
///
/// let request = HttpRequest::builder(HttpMethod::Get, "shop.json")
///     .query_param("fields", "name")
///     .build()
///     .unwrap();
///
/// assert_eq!(request.tries, 1);
/// ```
#[derive(Clone, Debug)]
pub struct HttpRequest {
    /// Method to send.
    pub method: HttpMethod,
    /// Path below the versioned Admin API root, e.g. `products.json`.
    pub path: String,
    /// JSON body, required for POST and PUT.
    pub body: Option<serde_json::Value>,
    /// Query string parameters, in order.
    pub query: Vec<(String, String)>,
    /// Total attempts allowed for 429 and 500 responses. 1 means no retry.
    pub tries: u32,
}

impl HttpRequest {
    /// Starts building a request.
    #[must_use]
    pub fn builder(method: HttpMethod, path: impl Into<String>) -> HttpRequestBuilder {
        HttpRequestBuilder {
            request: Self {
                method,
                path: path.into(),
                body: None,
                query: Vec::new(),
                tries: 1,
            },
        }
    }

    /// Checks the request can be sent.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::InvalidRequest`] for a POST or PUT without body
    /// or a zero `tries`.
    pub fn verify(&self) -> Result<(), HttpError> {
        if self.method.requires_body() && self.body.is_none() {
            return Err(HttpError::InvalidRequest {
                reason: format!("{} requires a body", self.method),
            });
        }
        if self.tries == 0 {
            return Err(HttpError::InvalidRequest {
                reason: "tries must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Builder for [`HttpRequest`].
#[derive(Debug)]
pub struct HttpRequestBuilder {
    request: HttpRequest,
}

impl HttpRequestBuilder {
    /// Sets the JSON body.
    #[must_use]
    pub fn body(mut self, body: impl Into<serde_json::Value>) -> Self {
        self.request.body = Some(body.into());
        self
    }

    /// Appends a query string parameter.
    #[must_use]
    pub fn query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.request.query.push((key.into(), value.into()));
        self
    }

    /// Allows up to `tries` attempts when Shopify answers 429 or 500.
    #[must_use]
    pub const fn tries(mut self, tries: u32) -> Self {
        self.request.tries = tries;
        self
    }

    /// Finishes the request.
    ///
    /// # Errors
    ///
    /// See [`HttpRequest::verify`].
    pub fn build(self) -> Result<HttpRequest, HttpError> {
        self.request.verify()?;
        Ok(self.request)
    }
}
