//! axum integration: login routes, the access gate and error pages.
//!
//! # Overview
//!
//! - [`AuthState`]: configuration, backend and HTTP client the routes share
//! - [`AuthState::router`]: `login`, `authenticate`, callback and `logout`
//! - [`login_required`] / [`CurrentShopUser`]: gate handlers behind login
//! - [`AppContext`]: app details for templates
//! - [`WebError`]: maps flow errors to responses
//!
//! The router needs a `tower-sessions` [`SessionManagerLayer`] around it.
//! Build it with [`session_layer`]: the session cookie holds the OAuth
//! nonce and must come back on Shopify's cross-site redirect to the
//! callback, which the default `SameSite=Strict` cookie does not.
//!
//! # Example
//!
//! ```rust,ignore
//! use axum::{middleware, routing::get, Router};
//! use shopify_auth::web::{login_required, session_layer, AuthState, CurrentShopUser};
//! use tower_sessions::MemoryStore;
//!
//! async fn home(CurrentShopUser(user): CurrentShopUser) -> String {
//!     format!("Hello {}", user.short_name())
//! }
//!
//! let sessions = session_layer(MemoryStore::default(), &config);
//! let auth = AuthState::new(config, backend);
//! let app = Router::new()
//!     .route("/", get(home))
//!     .route_layer(middleware::from_fn_with_state(auth.clone(), login_required))
//!     .merge(auth.router())
//!     .with_state(auth)
//!     .layer(sessions);
//! ```
//!
//! [`SessionManagerLayer`]: tower_sessions::SessionManagerLayer

mod context;
mod error;
mod extract;
mod routes;
mod templates;

pub use context::AppContext;
pub use error::WebError;
pub use extract::{login_redirect_url, login_required, CurrentShopUser};

use axum::extract::FromRef;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tower_sessions::cookie::SameSite;
use tower_sessions::{SessionManagerLayer, SessionStore};

use crate::auth::AuthBackend;
use crate::config::AppConfig;

/// Session key holding the pending OAuth nonce.
pub const SESSION_STATE_KEY: &str = "shopify_auth.oauth_state";

/// Session key holding where to go after login.
pub const SESSION_NEXT_KEY: &str = "shopify_auth.next";

/// Paths the login routes are mounted at.
///
/// The OAuth callback path comes from
/// [`AppConfig::callback_path`](crate::AppConfig::callback_path) since it is
/// also part of the `redirect_uri` sent to Shopify.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoutePaths {
    /// Login page; `?shop=` starts the flow directly.
    pub login: String,
    /// Starts the OAuth flow for `?shop=`.
    pub authenticate: String,
    /// Ends the browser session.
    pub logout: String,
}

impl Default for RoutePaths {
    fn default() -> Self {
        Self {
            login: "/login".to_string(),
            authenticate: "/authenticate".to_string(),
            logout: "/logout".to_string(),
        }
    }
}

/// Shared state of the login routes.
///
/// Cheap to clone. Host applications with their own state implement
/// [`FromRef`] for `AuthState` and keep one inside.
#[derive(Clone, Debug)]
pub struct AuthState {
    config: Arc<AppConfig>,
    backend: AuthBackend,
    http: reqwest::Client,
    paths: Arc<RoutePaths>,
}

impl AuthState {
    /// Creates the state with default [`RoutePaths`].
    #[must_use]
    pub fn new(config: AppConfig, backend: AuthBackend) -> Self {
        Self {
            config: Arc::new(config),
            backend,
            http: reqwest::Client::new(),
            paths: Arc::new(RoutePaths::default()),
        }
    }

    /// Mounts the routes at other paths.
    #[must_use]
    pub fn with_paths(mut self, paths: RoutePaths) -> Self {
        self.paths = Arc::new(paths);
        self
    }

    /// Uses `http` for the token exchange.
    #[must_use]
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Returns the authentication backend.
    #[must_use]
    pub const fn backend(&self) -> &AuthBackend {
        &self.backend
    }

    /// Returns the HTTP client used for the token exchange.
    #[must_use]
    pub const fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Returns the route paths.
    #[must_use]
    pub fn paths(&self) -> &RoutePaths {
        &self.paths
    }

    /// Builds the login routes.
    ///
    /// Merge the result into the app router; do not nest it, since redirects
    /// use the absolute paths configured here.
    ///
    /// The routes keep the OAuth nonce in the session, so the session cookie
    /// must not be `SameSite=Strict` or the callback arriving from Shopify
    /// finds no nonce and fails with `InvalidState`. Use [`session_layer`],
    /// or set at least `SameSite=Lax` on a hand-built layer.
    pub fn router<S>(&self) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
        Self: FromRef<S>,
    {
        Router::new()
            .route(&self.paths.login, get(routes::login))
            .route(&self.paths.authenticate, get(routes::authenticate))
            .route(self.config.callback_path(), get(routes::finalize))
            .route(&self.paths.logout, get(routes::logout))
    }
}

/// Wraps `store` in a session layer whose cookie survives the OAuth round
/// trip through Shopify.
///
/// Standalone apps get `SameSite=Lax`, sent on the top-level redirect back
/// to the callback. Embedded apps run inside the Shopify admin iframe, where
/// only `SameSite=None` cookies are sent, and browsers require `Secure` with
/// it. Otherwise the cookie is `Secure` when the app host is `https`.
///
/// ```rust
/// use shopify_auth::web::session_layer;
/// use shopify_auth::{ApiKey, ApiSecretKey, AppConfig};
/// use tower_sessions::MemoryStore;
///
/// let config = AppConfig::builder()
///     .api_key(ApiKey::new("key").unwrap())
///     .api_secret_key(ApiSecretKey::new("secret").unwrap())
///     .build()
///     .unwrap();
/// let _layer = session_layer(MemoryStore::default(), &config);
/// ```
#[must_use]
pub fn session_layer<Store: SessionStore>(
    store: Store,
    config: &AppConfig,
) -> SessionManagerLayer<Store> {
    let layer = SessionManagerLayer::new(store);
    if config.is_embedded() {
        return layer.with_same_site(SameSite::None).with_secure(true);
    }

    let https = config.host().is_some_and(|host| host.scheme() == "https");
    layer.with_same_site(SameSite::Lax).with_secure(https)
}

const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<AuthState>();
};
