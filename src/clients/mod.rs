//! Shop-scoped access to the Shopify Admin API.
//!
//! # Overview
//!
//! - [`ShopSession`]: API configuration for one shop, activated per task
//! - [`request`]: sends a request through the active session
//! - [`HttpClient`], [`HttpRequest`], [`HttpResponse`]: the client itself
//! - [`HttpError`]: everything that can go wrong
//!
//! # Example
//!
//! ```rust,ignore
//! use shopify_auth::clients::{self, HttpMethod, HttpRequest};
//!
//! let shop = user
//!     .session(&config)
//!     .scope(async {
//!         let request = HttpRequest::builder(HttpMethod::Get, "shop.json").build()?;
//!         clients::request(request).await
//!     })
//!     .await?;
//! ```
//!
//! # Retry Behavior
//!
//! The default `tries` is 1, meaning no automatic retries. With `.tries(n)`:
//!
//! - **429**: waits for `Retry-After`, or 1 second if absent
//! - **500**: waits 1 second
//! - **anything else**: fails immediately

mod errors;
mod http_client;
mod http_request;
mod http_response;
mod session;

pub use errors::HttpError;
pub use http_client::{HttpClient, RETRY_WAIT_TIME, SDK_VERSION};
pub use http_request::{HttpMethod, HttpRequest, HttpRequestBuilder};
pub use http_response::HttpResponse;
pub use session::ShopSession;

/// Sends `request` through the [`ShopSession`] active in the current task.
///
/// # Errors
///
/// Returns [`HttpError::NoActiveSession`] outside a session scope, otherwise
/// whatever [`HttpClient::request`] returns.
pub async fn request(request: HttpRequest) -> Result<HttpResponse, HttpError> {
    let session = ShopSession::current().ok_or(HttpError::NoActiveSession)?;
    session.client()?.request(request).await
}
