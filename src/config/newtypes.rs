//! Validated wrappers for the values an app is configured with.
//!
//! Construction is the only validation point: once a value exists, the OAuth
//! flow and the user store can rely on its shape.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;

fn non_empty(value: impl Into<String>, error: ConfigError) -> Result<String, ConfigError> {
    let value = value.into();
    if value.trim().is_empty() {
        Err(error)
    } else {
        Ok(value)
    }
}

/// The app's public API key, sent to Shopify as the OAuth `client_id`.
///
/// ```rust
/// use shopify_auth::ApiKey;
///
/// let key = ApiKey::new("my-api-key").unwrap();
/// assert_eq!(key.as_ref(), "my-api-key");
/// assert!(ApiKey::new("  ").is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wraps a non-blank key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyApiKey`] for a blank key.
    pub fn new(key: impl Into<String>) -> Result<Self, ConfigError> {
        non_empty(key, ConfigError::EmptyApiKey).map(Self)
    }
}

impl AsRef<str> for ApiKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The app's API secret: signs callbacks and authenticates the code
/// exchange.
///
/// `Debug` never shows the value, so tracing a whole
/// [`AppConfig`](crate::AppConfig) is safe.
///
/// ```rust
/// use shopify_auth::ApiSecretKey;
///
/// let secret = ApiSecretKey::new("my-secret").unwrap();
/// assert_eq!(format!("{secret:?}"), "ApiSecretKey(*****)");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct ApiSecretKey(String);

impl ApiSecretKey {
    /// Wraps a non-blank secret.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyApiSecretKey`] for a blank secret.
    pub fn new(secret: impl Into<String>) -> Result<Self, ConfigError> {
        non_empty(secret, ConfigError::EmptyApiSecretKey).map(Self)
    }
}

impl AsRef<str> for ApiSecretKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiSecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiSecretKey(*****)")
    }
}

/// A shop's `*.myshopify.com` domain. Identifies the tenant and its user.
///
/// Both `acme` and `acme.myshopify.com` are accepted and normalised to the
/// full, lowercase form. The store name is made of ASCII letters, digits and
/// inner hyphens. Anything else, including other domains, is refused.
///
/// ```rust
/// use shopify_auth::ShopDomain;
///
/// let domain = ShopDomain::new("Acme-Outdoor").unwrap();
/// assert_eq!(domain.as_ref(), "acme-outdoor.myshopify.com");
/// assert_eq!(domain.shop_name(), "acme-outdoor");
///
/// assert!(ShopDomain::new("acme.example.com").is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ShopDomain(String);

impl ShopDomain {
    const SUFFIX: &'static str = ".myshopify.com";

    /// Validates and normalises a shop domain.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidShopDomain`] carrying the rejected input.
    pub fn new(domain: impl Into<String>) -> Result<Self, ConfigError> {
        let input = domain.into();
        let normalised = input.trim().to_ascii_lowercase();
        let name = normalised
            .strip_suffix(Self::SUFFIX)
            .unwrap_or(&normalised);

        if !Self::is_store_name(name) {
            return Err(ConfigError::InvalidShopDomain { domain: input });
        }
        Ok(Self(format!("{name}{}", Self::SUFFIX)))
    }

    /// Returns the store name, `acme` for `acme.myshopify.com`.
    #[must_use]
    pub fn shop_name(&self) -> &str {
        self.0.strip_suffix(Self::SUFFIX).unwrap_or(&self.0)
    }

    fn is_store_name(name: &str) -> bool {
        !name.is_empty()
            && !name.starts_with('-')
            && !name.ends_with('-')
            && name
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
    }
}

impl AsRef<str> for ShopDomain {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShopDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ShopDomain {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ShopDomain> for String {
    fn from(domain: ShopDomain) -> Self {
        domain.0
    }
}

/// An absolute `scheme://host[:port][/path]` URL without trailing slash.
///
/// Used for the app's public address, from which the OAuth `redirect_uri`
/// is built, and for the optional override of where Shopify calls go.
///
/// ```rust
/// use shopify_auth::HostUrl;
///
/// let url = HostUrl::new("https://myapp.example.com/").unwrap();
/// assert_eq!(url.as_ref(), "https://myapp.example.com");
/// assert_eq!(url.host_name(), "myapp.example.com");
/// assert_eq!(url.join("/finalize"), "https://myapp.example.com/finalize");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostUrl(String);

impl HostUrl {
    /// Validates an absolute URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidHostUrl`] when the scheme or host is
    /// missing.
    pub fn new(url: impl Into<String>) -> Result<Self, ConfigError> {
        let url = url.into().trim().trim_end_matches('/').to_string();
        let invalid = || ConfigError::InvalidHostUrl { url: url.clone() };

        let (scheme, rest) = url.split_once("://").ok_or_else(invalid)?;
        if scheme.is_empty() || !scheme.bytes().all(|b| b.is_ascii_alphabetic()) {
            return Err(invalid());
        }
        if Self::host_of(rest).is_empty() {
            return Err(invalid());
        }
        Ok(Self(url))
    }

    /// Returns the scheme, such as `https`.
    #[must_use]
    pub fn scheme(&self) -> &str {
        self.0.split_once("://").map_or("", |(scheme, _)| scheme)
    }

    /// Returns the host without port or path.
    #[must_use]
    pub fn host_name(&self) -> &str {
        self.0
            .split_once("://")
            .map_or("", |(_, rest)| Self::host_of(rest))
    }

    /// Appends an absolute path.
    #[must_use]
    pub fn join(&self, path: &str) -> String {
        format!("{}{path}", self.0)
    }

    fn host_of(authority_and_path: &str) -> &str {
        authority_and_path
            .split([':', '/', '?', '#'])
            .next()
            .unwrap_or_default()
    }
}

impl AsRef<str> for HostUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
