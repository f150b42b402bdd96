//! Configuration errors.
//!
//! Everything that builds an [`AppConfig`](crate::AppConfig), or one of the
//! values inside it, fails with [`ConfigError`]. A misconfigured app stops
//! at startup, not halfway through a merchant's login.
//!
//! ```rust
//! use shopify_auth::{ApiKey, ConfigError};
//!
//! assert!(matches!(ApiKey::new(""), Err(ConfigError::EmptyApiKey)));
//! ```

use thiserror::Error;

/// Why the app configuration could not be built.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The API key is blank.
    #[error("The Shopify API key is empty; copy it from the app's Partner Dashboard page.")]
    EmptyApiKey,

    /// The API secret is blank.
    #[error("The Shopify API secret is empty; copy it from the app's Partner Dashboard page.")]
    EmptyApiSecretKey,

    /// Not a `name` or `name.myshopify.com` shop domain.
    #[error("'{domain}' is not a shop domain; use 'acme' or 'acme.myshopify.com'.")]
    InvalidShopDomain {
        /// The rejected input.
        domain: String,
    },

    /// Not a `YYYY-MM` or `unstable` Admin API version.
    #[error("'{version}' is not an Admin API version; use 'YYYY-MM' or 'unstable'.")]
    InvalidApiVersion {
        /// The rejected input.
        version: String,
    },

    /// The scope list is malformed.
    #[error("Invalid OAuth scopes: {reason}")]
    InvalidScopes {
        /// What is wrong with the list.
        reason: String,
    },

    /// A required builder field was never set.
    #[error("AppConfig is missing '{field}'.")]
    MissingRequiredField {
        /// The builder field.
        field: &'static str,
    },

    /// Not an absolute `scheme://host` URL.
    #[error("'{url}' is not an absolute URL such as 'https://app.example.com'.")]
    InvalidHostUrl {
        /// The rejected input.
        url: String,
    },

    /// A path setting is not an absolute, same-site path.
    #[error("'{path}' is not a valid value for '{field}'; it must start with a single '/'.")]
    InvalidPath {
        /// The setting that holds the path.
        field: &'static str,
        /// The rejected value.
        path: String,
    },

    /// An environment variable holds a value that cannot be parsed.
    #[error("Environment variable '{name}' is invalid: {reason}")]
    InvalidEnvVar {
        /// The variable.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ConfigError>();
};
