//! Shop-scoped Admin API sessions.
//!
//! A [`ShopSession`] is the API configuration for one shop: domain, token,
//! API version and optional host override. It is never stored globally.
//! Instead it is activated for the duration of a future (or closure) through
//! tokio task-local storage:
//!
//! - on entry, [`ShopSession::current`] returns the session
//! - on exit the previous value is restored, whether the wrapped code
//!   returned `Ok`, returned `Err` or panicked
//! - concurrent requests run in different tasks and never see each other's
//!   session
//!
//! Spawned tasks do not inherit the scope; wrap their futures again.
//!
//! # Example
//!
//! ```rust
//! use shopify_auth::{AccessToken, ShopDomain};
//! use shopify_auth::clients::ShopSession;
//!
//! # tokio_test::block_on(async {
//! let session = ShopSession::new(
//!     ShopDomain::new("acme").unwrap(),
//!     AccessToken::new("shpat_123").unwrap(),
//! );
//!
//! assert!(ShopSession::current().is_none());
//! let shop = session
//!     .scope(async { ShopSession::current().map(|s| s.shop().to_string()) })
//!     .await;
//! assert_eq!(shop.as_deref(), Some("acme.myshopify.com"));
//! assert!(ShopSession::current().is_none());
//! # });
//! ```

use std::future::Future;

use crate::clients::errors::HttpError;
use crate::clients::http_client::HttpClient;
use crate::config::{ApiVersion, AppConfig, HostUrl, ShopDomain};
use crate::user::AccessToken;

tokio::task_local! {
    static ACTIVE_SESSION: ShopSession;
}

/// Admin API configuration for one shop.
#[derive(Clone, Debug)]
pub struct ShopSession {
    shop: ShopDomain,
    access_token: AccessToken,
    api_version: ApiVersion,
    api_host: Option<HostUrl>,
    user_agent_prefix: Option<String>,
}

impl ShopSession {
    /// Creates a session on the latest API version.
    #[must_use]
    pub fn new(shop: ShopDomain, access_token: AccessToken) -> Self {
        Self {
            shop,
            access_token,
            api_version: ApiVersion::latest(),
            api_host: None,
            user_agent_prefix: None,
        }
    }

    /// Applies the API version, host override and user agent prefix from
    /// the app configuration.
    #[must_use]
    pub fn with_config(mut self, config: &AppConfig) -> Self {
        self.api_version = config.api_version();
        self.api_host = config.api_host().cloned();
        self.user_agent_prefix = config.user_agent_prefix().map(str::to_string);
        self
    }

    /// Returns the shop.
    #[must_use]
    pub const fn shop(&self) -> &ShopDomain {
        &self.shop
    }

    /// Returns the access token.
    #[must_use]
    pub const fn access_token(&self) -> &AccessToken {
        &self.access_token
    }

    /// Returns the Admin API version.
    #[must_use]
    pub const fn api_version(&self) -> ApiVersion {
        self.api_version
    }

    /// Returns the user agent prefix, if any.
    #[must_use]
    pub fn user_agent_prefix(&self) -> Option<&str> {
        self.user_agent_prefix.as_deref()
    }

    /// Returns the origin API calls go to: the host override if configured,
    /// otherwise `https://{shop}`.
    #[must_use]
    pub fn base_uri(&self) -> String {
        self.api_host.as_ref().map_or_else(
            || format!("https://{}", self.shop.as_ref()),
            |host| host.as_ref().to_string(),
        )
    }

    /// Builds an HTTP client bound to this session.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Network`] if the TLS backend cannot initialize.
    pub fn client(&self) -> Result<HttpClient, HttpError> {
        HttpClient::new(self)
    }

    /// Returns the session active in the current task, if any.
    #[must_use]
    pub fn current() -> Option<Self> {
        ACTIVE_SESSION.try_with(Clone::clone).ok()
    }

    /// Runs `fut` with this session active.
    ///
    /// A nested scope shadows the outer one until it ends.
    pub async fn scope<F>(self, fut: F) -> F::Output
    where
        F: Future,
    {
        let shop = self.shop.clone();
        tracing::debug!(shop = %shop, "Activating shop session");
        let output = ACTIVE_SESSION.scope(self, fut).await;
        tracing::debug!(shop = %shop, "Deactivated shop session");
        output
    }

    /// Runs `f` with this session active.
    pub fn sync_scope<F, R>(self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let shop = self.shop.clone();
        tracing::debug!(shop = %shop, "Activating shop session");
        let output = ACTIVE_SESSION.sync_scope(self, f);
        tracing::debug!(shop = %shop, "Deactivated shop session");
        output
    }
}

const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ShopSession>();
};
