//! HTTP client bound to one [`ShopSession`].

use std::collections::HashMap;
use std::time::Duration;

use crate::clients::errors::HttpError;
use crate::clients::http_request::{HttpMethod, HttpRequest};
use crate::clients::http_response::HttpResponse;
use crate::clients::session::ShopSession;

/// Wait between retries when Shopify sends no `Retry-After`.
pub const RETRY_WAIT_TIME: Duration = Duration::from_secs(1);

/// Crate version, reported in the `User-Agent`.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Sends Admin API requests on behalf of one shop.
///
/// Requests go to `{base_uri}/admin/api/{version}/{path}` with the shop's
/// `X-Shopify-Access-Token`. 429 and 500 responses are retried only when a
/// request allows more than one try; 429 honours `Retry-After`.
#[derive(Debug)]
pub struct HttpClient {
    client: reqwest::Client,
    base_url: String,
    shop: String,
    default_headers: HashMap<String, String>,
}

const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HttpClient>();
};

impl HttpClient {
    /// Creates a client for `session`.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Network`] if the TLS backend cannot initialize.
    pub fn new(session: &ShopSession) -> Result<Self, HttpError> {
        let base_url = format!(
            "{}/admin/api/{}",
            session.base_uri(),
            session.api_version()
        );

        let prefix = session
            .user_agent_prefix()
            .map_or_else(String::new, |p| format!("{p} | "));
        let user_agent = format!(
            "{prefix}shopify-auth v{SDK_VERSION} | Rust {}",
            env!("CARGO_PKG_RUST_VERSION")
        );

        let default_headers = HashMap::from([
            ("User-Agent".to_string(), user_agent),
            ("Accept".to_string(), "application/json".to_string()),
            (
                "X-Shopify-Access-Token".to_string(),
                session.access_token().as_ref().to_string(),
            ),
        ]);

        let client = reqwest::Client::builder().use_rustls_tls().build()?;

        Ok(Self {
            client,
            base_url,
            shop: session.shop().to_string(),
            default_headers,
        })
    }

    /// Returns `{base_uri}/admin/api/{version}`.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the headers sent with every request.
    #[must_use]
    pub const fn default_headers(&self) -> &HashMap<String, String> {
        &self.default_headers
    }

    /// Sends a request.
    ///
    /// # Errors
    ///
    /// - [`HttpError::InvalidRequest`] if the request fails validation
    /// - [`HttpError::Network`] on connection failures
    /// - [`HttpError::Response`] on a non-2xx status
    /// - [`HttpError::MaxRetries`] when retryable failures outlast `tries`
    pub async fn request(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        request.verify()?;

        let url = format!("{}/{}", self.base_url, request.path.trim_start_matches('/'));

        let mut attempt: u32 = 0;
        loop {
            attempt += 1;

            let mut builder = match request.method {
                HttpMethod::Get => self.client.get(&url),
                HttpMethod::Post => self.client.post(&url),
                HttpMethod::Put => self.client.put(&url),
                HttpMethod::Delete => self.client.delete(&url),
            };
            for (name, value) in &self.default_headers {
                builder = builder.header(name, value);
            }
            if !request.query.is_empty() {
                builder = builder.query(&request.query);
            }
            if let Some(body) = &request.body {
                builder = builder.json(body);
            }

            let res = builder.send().await?;
            let response = Self::read_response(res).await;

            if let Some(reason) = response.deprecation_reason() {
                tracing::warn!(
                    shop = %self.shop,
                    path = %request.path,
                    reason,
                    "Deprecated Admin API call"
                );
            }

            if response.is_ok() {
                return Ok(response);
            }

            let code = response.code;
            let message = response.error_message();
            let retryable = code == 429 || code == 500;

            if !retryable || request.tries == 1 {
                return Err(HttpError::Response {
                    code,
                    message,
                    request_id: response.request_id().map(str::to_string),
                });
            }
            if attempt >= request.tries {
                return Err(HttpError::MaxRetries {
                    code,
                    tries: request.tries,
                    message,
                });
            }

            let delay = if code == 429 {
                response.retry_after().unwrap_or(RETRY_WAIT_TIME)
            } else {
                RETRY_WAIT_TIME
            };
            tracing::debug!(shop = %self.shop, code, attempt, ?delay, "Retrying Admin API call");
            tokio::time::sleep(delay).await;
        }
    }

    async fn read_response(res: reqwest::Response) -> HttpResponse {
        let code = res.status().as_u16();

        let mut headers: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in res.headers() {
            headers
                .entry(name.as_str().to_lowercase())
                .or_default()
                .push(value.to_str().unwrap_or_default().to_string());
        }

        let text = res.text().await.unwrap_or_default();
        let body = serde_json::from_str(&text).unwrap_or_else(|_| serde_json::json!({}));

        HttpResponse::new(code, headers, body)
    }
}
