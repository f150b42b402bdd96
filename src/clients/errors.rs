//! Errors returned by shop-scoped Admin API calls.

use thiserror::Error;

/// Errors from [`HttpClient`](crate::clients::HttpClient) and
/// [`request`](crate::clients::request).
///
/// ```rust
/// use shopify_auth::clients::HttpError;
///
/// let error = HttpError::Response {
///     code: 404,
///     message: "Not Found".to_string(),
///     request_id: Some("abc-123".to_string()),
/// };
/// assert_eq!(error.to_string(), "Admin API returned 404: Not Found");
/// ```
#[derive(Debug, Error)]
pub enum HttpError {
    /// An API call was made outside any [`ShopSession`](crate::clients::ShopSession) scope.
    #[error("No shop session is active; wrap the call in ShopSession::scope")]
    NoActiveSession,

    /// The request failed validation before anything was sent.
    #[error("Invalid request: {reason}")]
    InvalidRequest {
        /// What is wrong with the request.
        reason: String,
    },

    /// Shopify answered with a non-2xx status.
    #[error("Admin API returned {code}: {message}")]
    Response {
        /// HTTP status code.
        code: u16,
        /// Error text extracted from the body.
        message: String,
        /// `X-Request-Id` of the failed response, for support tickets.
        request_id: Option<String>,
    },

    /// Retryable failures persisted through every allowed attempt.
    #[error("Exceeded maximum retry count of {tries}. Last status {code}: {message}")]
    MaxRetries {
        /// Status of the last response.
        code: u16,
        /// Attempts made.
        tries: u32,
        /// Error text of the last response.
        message: String,
    },

    /// Network or connection error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HttpError>();
};
