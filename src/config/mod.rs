//! App configuration for the Shopify authentication flow.
//!
//! # Overview
//!
//! - [`AppConfig`]: every read-only input of the OAuth flow
//! - [`AppConfigBuilder`]: builder for [`AppConfig`]
//! - [`ApiKey`], [`ApiSecretKey`], [`ShopDomain`], [`HostUrl`]: validated newtypes
//! - [`ApiVersion`]: Admin API version used by shop sessions
//!
//! # Example
//!
//! ```rust
//! use shopify_auth::{AppConfig, ApiKey, ApiSecretKey, HostUrl};
//!
//! let config = AppConfig::builder()
//!     .app_name("Inventory Helper")
//!     .api_key(ApiKey::new("my-api-key").unwrap())
//!     .api_secret_key(ApiSecretKey::new("my-secret").unwrap())
//!     .host(HostUrl::new("https://app.example.com").unwrap())
//!     .scopes("read_products".parse().unwrap())
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.redirect_uri().unwrap(), "https://app.example.com/finalize");
//! assert!(!config.dev_mode());
//! ```

mod newtypes;
mod version;

pub use newtypes::{ApiKey, ApiSecretKey, HostUrl, ShopDomain};
pub use version::ApiVersion;

use crate::auth::AuthScopes;
use crate::error::ConfigError;

/// Path Shopify redirects back to after authorization, unless overridden.
pub const DEFAULT_CALLBACK_PATH: &str = "/finalize";

/// Where a freshly logged-in shop lands when no return address was stored.
pub const DEFAULT_LOGIN_REDIRECT_URL: &str = "/";

/// Configuration consumed by the OAuth flow, the authentication backend and
/// shop sessions.
///
/// # Dev mode
///
/// `dev_mode` replaces the whole OAuth handshake with a local login that
/// trusts any well-formed shop name. It is off unless explicitly enabled and
/// every use is logged at `warn` level. Never enable it in production.
///
/// # Key rotation
///
/// When `old_api_secret_key` is set, callback signatures made with the old
/// secret are still accepted so in-flight logins survive a secret rotation.
#[derive(Clone, Debug)]
pub struct AppConfig {
    app_name: String,
    api_key: ApiKey,
    api_secret_key: ApiSecretKey,
    old_api_secret_key: Option<ApiSecretKey>,
    scopes: AuthScopes,
    host: Option<HostUrl>,
    callback_path: String,
    login_redirect_url: String,
    api_version: ApiVersion,
    api_host: Option<HostUrl>,
    is_embedded: bool,
    dev_mode: bool,
    user_agent_prefix: Option<String>,
}

impl AppConfig {
    /// Creates a new builder.
    #[must_use]
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::new()
    }

    /// Loads the configuration from the environment, reading a `.env` file
    /// first if one exists.
    ///
    /// | Variable | Meaning |
    /// |---|---|
    /// | `SHOPIFY_APP_NAME` | display name |
    /// | `SHOPIFY_APP_API_KEY` | API key (required) |
    /// | `SHOPIFY_APP_API_SECRET` | API secret (required) |
    /// | `SHOPIFY_APP_OLD_API_SECRET` | previous secret during rotation |
    /// | `SHOPIFY_APP_API_SCOPE` | comma-separated scopes |
    /// | `SHOPIFY_APP_HOST` | public URL of the app |
    /// | `SHOPIFY_APP_CALLBACK_PATH` | OAuth callback path |
    /// | `SHOPIFY_APP_IS_EMBEDDED` | `true` for embedded admin apps |
    /// | `SHOPIFY_APP_DEV_MODE` | `true` to bypass OAuth (development only) |
    /// | `SHOPIFY_APP_API_VERSION` | Admin API version |
    /// | `SHOPIFY_APP_API_HOST` | override for outbound Shopify calls |
    /// | `LOGIN_REDIRECT_URL` | post-login destination |
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if a required variable is missing or a value
    /// does not validate.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    ///
    /// [`from_env`](Self::from_env) delegates here; tests pass a map.
    ///
    /// # Errors
    ///
    /// Same as [`from_env`](Self::from_env).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let mut builder = Self::builder()
            .api_key(ApiKey::new(get("SHOPIFY_APP_API_KEY").unwrap_or_default())?)
            .api_secret_key(ApiSecretKey::new(
                get("SHOPIFY_APP_API_SECRET").unwrap_or_default(),
            )?);

        if let Some(name) = get("SHOPIFY_APP_NAME") {
            builder = builder.app_name(name);
        }
        if let Some(old) = get("SHOPIFY_APP_OLD_API_SECRET") {
            builder = builder.old_api_secret_key(ApiSecretKey::new(old)?);
        }
        if let Some(scopes) = get("SHOPIFY_APP_API_SCOPE") {
            builder = builder.scopes(scopes.parse()?);
        }
        if let Some(host) = get("SHOPIFY_APP_HOST") {
            builder = builder.host(HostUrl::new(host)?);
        }
        if let Some(path) = get("SHOPIFY_APP_CALLBACK_PATH") {
            builder = builder.callback_path(path);
        }
        if let Some(embedded) = get("SHOPIFY_APP_IS_EMBEDDED") {
            builder = builder.is_embedded(parse_bool("SHOPIFY_APP_IS_EMBEDDED", &embedded)?);
        }
        if let Some(dev_mode) = get("SHOPIFY_APP_DEV_MODE") {
            builder = builder.dev_mode(parse_bool("SHOPIFY_APP_DEV_MODE", &dev_mode)?);
        }
        if let Some(version) = get("SHOPIFY_APP_API_VERSION") {
            builder = builder.api_version(version.parse()?);
        }
        if let Some(api_host) = get("SHOPIFY_APP_API_HOST") {
            builder = builder.api_host(HostUrl::new(api_host)?);
        }
        if let Some(url) = get("LOGIN_REDIRECT_URL") {
            builder = builder.login_redirect_url(url);
        }

        builder.build()
    }

    /// Returns the app's display name.
    #[must_use]
    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// Returns the API key.
    #[must_use]
    pub const fn api_key(&self) -> &ApiKey {
        &self.api_key
    }

    /// Returns the API secret key.
    #[must_use]
    pub const fn api_secret_key(&self) -> &ApiSecretKey {
        &self.api_secret_key
    }

    /// Returns the previous API secret key, if a rotation is in progress.
    #[must_use]
    pub const fn old_api_secret_key(&self) -> Option<&ApiSecretKey> {
        self.old_api_secret_key.as_ref()
    }

    /// Returns the requested OAuth scopes.
    #[must_use]
    pub const fn scopes(&self) -> &AuthScopes {
        &self.scopes
    }

    /// Returns the app's public URL, if configured.
    #[must_use]
    pub const fn host(&self) -> Option<&HostUrl> {
        self.host.as_ref()
    }

    /// Returns the OAuth callback path.
    #[must_use]
    pub fn callback_path(&self) -> &str {
        &self.callback_path
    }

    /// Returns the absolute OAuth callback URL, if a host is configured.
    #[must_use]
    pub fn redirect_uri(&self) -> Option<String> {
        self.host.as_ref().map(|host| host.join(&self.callback_path))
    }

    /// Returns the default post-login destination.
    #[must_use]
    pub fn login_redirect_url(&self) -> &str {
        &self.login_redirect_url
    }

    /// Returns the Admin API version.
    #[must_use]
    pub const fn api_version(&self) -> ApiVersion {
        self.api_version
    }

    /// Returns the override for outbound Shopify calls, if configured.
    ///
    /// When set, the token exchange and shop sessions talk to this host
    /// instead of `https://{shop}`. Used behind egress proxies and in tests.
    #[must_use]
    pub const fn api_host(&self) -> Option<&HostUrl> {
        self.api_host.as_ref()
    }

    /// Returns whether the app is embedded in the Shopify admin.
    #[must_use]
    pub const fn is_embedded(&self) -> bool {
        self.is_embedded
    }

    /// Returns whether the development login bypass is enabled.
    #[must_use]
    pub const fn dev_mode(&self) -> bool {
        self.dev_mode
    }

    /// Returns the user agent prefix, if configured.
    #[must_use]
    pub fn user_agent_prefix(&self) -> Option<&str> {
        self.user_agent_prefix.as_deref()
    }
}

const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<AppConfig>();
};

/// Builder for [`AppConfig`].
///
/// `api_key` and `api_secret_key` are required.
///
/// # Defaults
///
/// - `app_name`: `"Shopify App"`
/// - `scopes`: empty
/// - `callback_path`: [`DEFAULT_CALLBACK_PATH`]
/// - `login_redirect_url`: [`DEFAULT_LOGIN_REDIRECT_URL`]
/// - `api_version`: [`ApiVersion::latest()`]
/// - `is_embedded`: `false`
/// - `dev_mode`: `false`
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    app_name: Option<String>,
    api_key: Option<ApiKey>,
    api_secret_key: Option<ApiSecretKey>,
    old_api_secret_key: Option<ApiSecretKey>,
    scopes: Option<AuthScopes>,
    host: Option<HostUrl>,
    callback_path: Option<String>,
    login_redirect_url: Option<String>,
    api_version: Option<ApiVersion>,
    api_host: Option<HostUrl>,
    is_embedded: Option<bool>,
    dev_mode: Option<bool>,
    user_agent_prefix: Option<String>,
}

impl AppConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the app's display name.
    #[must_use]
    pub fn app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = Some(name.into());
        self
    }

    /// Sets the API key (required).
    #[must_use]
    pub fn api_key(mut self, key: ApiKey) -> Self {
        self.api_key = Some(key);
        self
    }

    /// Sets the API secret key (required).
    #[must_use]
    pub fn api_secret_key(mut self, key: ApiSecretKey) -> Self {
        self.api_secret_key = Some(key);
        self
    }

    /// Sets the previous API secret key, accepted for callback signatures
    /// while a rotation is in progress.
    #[must_use]
    pub fn old_api_secret_key(mut self, key: ApiSecretKey) -> Self {
        self.old_api_secret_key = Some(key);
        self
    }

    /// Sets the OAuth scopes requested from each shop.
    #[must_use]
    pub fn scopes(mut self, scopes: AuthScopes) -> Self {
        self.scopes = Some(scopes);
        self
    }

    /// Sets the app's public URL.
    #[must_use]
    pub fn host(mut self, host: HostUrl) -> Self {
        self.host = Some(host);
        self
    }

    /// Sets the OAuth callback path.
    #[must_use]
    pub fn callback_path(mut self, path: impl Into<String>) -> Self {
        self.callback_path = Some(path.into());
        self
    }

    /// Sets the default post-login destination.
    #[must_use]
    pub fn login_redirect_url(mut self, url: impl Into<String>) -> Self {
        self.login_redirect_url = Some(url.into());
        self
    }

    /// Sets the Admin API version.
    #[must_use]
    pub const fn api_version(mut self, version: ApiVersion) -> Self {
        self.api_version = Some(version);
        self
    }

    /// Routes outbound Shopify calls to another host.
    #[must_use]
    pub fn api_host(mut self, host: HostUrl) -> Self {
        self.api_host = Some(host);
        self
    }

    /// Sets whether the app is embedded in the Shopify admin.
    #[must_use]
    pub const fn is_embedded(mut self, embedded: bool) -> Self {
        self.is_embedded = Some(embedded);
        self
    }

    /// Enables the development login bypass. See [`AppConfig`].
    #[must_use]
    pub const fn dev_mode(mut self, enabled: bool) -> Self {
        self.dev_mode = Some(enabled);
        self
    }

    /// Sets the user agent prefix for Admin API requests.
    #[must_use]
    pub fn user_agent_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.user_agent_prefix = Some(prefix.into());
        self
    }

    /// Builds the [`AppConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredField`] if `api_key` or
    /// `api_secret_key` are not set, and [`ConfigError::InvalidPath`] if the
    /// callback path or login redirect is not a local absolute path.
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        let api_key = self
            .api_key
            .ok_or(ConfigError::MissingRequiredField { field: "api_key" })?;
        let api_secret_key = self
            .api_secret_key
            .ok_or(ConfigError::MissingRequiredField {
                field: "api_secret_key",
            })?;

        let callback_path = self
            .callback_path
            .unwrap_or_else(|| DEFAULT_CALLBACK_PATH.to_string());
        if !is_local_path(&callback_path) {
            return Err(ConfigError::InvalidPath {
                field: "callback_path",
                path: callback_path,
            });
        }

        let login_redirect_url = self
            .login_redirect_url
            .unwrap_or_else(|| DEFAULT_LOGIN_REDIRECT_URL.to_string());
        if !is_local_path(&login_redirect_url) {
            return Err(ConfigError::InvalidPath {
                field: "login_redirect_url",
                path: login_redirect_url,
            });
        }

        let dev_mode = self.dev_mode.unwrap_or(false);
        if dev_mode {
            tracing::warn!(
                "Shopify dev mode is enabled: any shop name logs in without OAuth. \
                 Never enable this outside local development."
            );
        }

        Ok(AppConfig {
            app_name: self.app_name.unwrap_or_else(|| "Shopify App".to_string()),
            api_key,
            api_secret_key,
            old_api_secret_key: self.old_api_secret_key,
            scopes: self.scopes.unwrap_or_default(),
            host: self.host,
            callback_path,
            login_redirect_url,
            api_version: self.api_version.unwrap_or_default(),
            api_host: self.api_host,
            is_embedded: self.is_embedded.unwrap_or(false),
            dev_mode,
            user_agent_prefix: self.user_agent_prefix,
        })
    }
}

/// Returns `true` for paths that stay on this site.
///
/// The path must parse as a URI with neither scheme nor authority and start
/// with a single `/`. Whitespace and control characters are refused, since
/// browsers drop tab and newline from a `Location` and `/\t/evil.example`
/// would become `//evil.example`. The percent-decoded form is held to the
/// same `//`, backslash and control character rules.
pub(crate) fn is_local_path(path: &str) -> bool {
    let escapes_site = |candidate: &str| {
        !candidate.starts_with('/')
            || candidate.starts_with("//")
            || candidate.contains('\\')
            || candidate.chars().any(char::is_control)
    };

    if escapes_site(path) || path.chars().any(char::is_whitespace) {
        return false;
    }
    match urlencoding::decode(path) {
        Ok(decoded) if !escapes_site(&decoded) => {}
        _ => return false,
    }
    path.parse::<axum::http::Uri>()
        .is_ok_and(|uri| uri.scheme().is_none() && uri.authority().is_none())
}

fn parse_bool(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar {
            name,
            reason: format!("expected a boolean, got '{other}'"),
        }),
    }
}
