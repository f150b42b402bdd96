//! The shop user: one application user per authenticated shop.
//!
//! # Overview
//!
//! - [`ShopUser`]: the persisted record for an authenticated shop
//! - [`AccessToken`]: the shop's secret Admin API token
//! - [`Principal`]: the capability interface session handling relies on
//! - [`ShopUserStore`]: persistence contract, unique on the shop domain
//! - [`MemoryShopUserStore`]: in-process store for tests and demos
//!
//! Tokens are only ever written by
//! [`AuthBackend::authenticate`](crate::auth::AuthBackend::authenticate)
//! after a verified OAuth callback.

mod store;

pub use store::{MemoryShopUserStore, ShopUserStore, StoreError};

use chrono::{DateTime, Utc};
use std::fmt;

use crate::auth::AuthScopes;
use crate::clients::ShopSession;
use crate::config::{AppConfig, ShopDomain};

/// A shop's Admin API access token.
///
/// Never empty. The value is masked in `Debug` output.
///
/// ```rust
/// use shopify_auth::AccessToken;
///
/// let token = AccessToken::new("shpat_123").unwrap();
/// assert_eq!(token.as_ref(), "shpat_123");
/// assert_eq!(format!("{token:?}"), "AccessToken(*****)");
/// assert!(AccessToken::new("").is_none());
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wraps a token, returning `None` if it is empty.
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        if token.is_empty() {
            None
        } else {
            Some(Self(token))
        }
    }
}

impl AsRef<str> for AccessToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(*****)")
    }
}

/// What the session layer needs to know about a logged-in user.
pub trait Principal {
    /// Stable identifier stored in the browser session.
    fn identifier(&self) -> &str;

    /// Whether the user may currently log in.
    fn is_active(&self) -> bool;

    /// Whether this principal represents an authenticated user.
    fn is_authenticated(&self) -> bool {
        true
    }
}

/// An authenticated shop.
///
/// # Example
///
/// ```rust
/// use shopify_auth::{AccessToken, AuthScopes, Principal, ShopDomain, ShopUser};
///
/// let user = ShopUser::new(
///     ShopDomain::new("acme").unwrap(),
///     AccessToken::new("shpat_123").unwrap(),
///     AuthScopes::new(),
/// );
///
/// assert_eq!(user.identifier(), "acme.myshopify.com");
/// assert_eq!(user.short_name(), "acme");
/// assert!(user.is_active());
/// ```
#[derive(Clone, Debug)]
pub struct ShopUser {
    /// The shop's `*.myshopify.com` domain, unique per user.
    pub shop_domain: ShopDomain,

    /// Token for Admin API calls on the shop's behalf.
    pub access_token: AccessToken,

    /// Scopes granted with the token.
    pub scopes: AuthScopes,

    /// Revocation flag. Inactive users cannot log in.
    pub is_active: bool,

    /// When the shop first authenticated.
    pub created_at: DateTime<Utc>,

    /// When the token was last written.
    pub updated_at: DateTime<Utc>,
}

impl ShopUser {
    /// Creates an active user stamped with the current time.
    #[must_use]
    pub fn new(shop_domain: ShopDomain, access_token: AccessToken, scopes: AuthScopes) -> Self {
        let now = Utc::now();
        Self {
            shop_domain,
            access_token,
            scopes,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// The full shop domain.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.shop_domain.as_ref()
    }

    /// The shop name without the `.myshopify.com` suffix.
    #[must_use]
    pub fn short_name(&self) -> &str {
        self.shop_domain.shop_name()
    }

    /// Builds the Admin API session for this shop.
    ///
    /// Use it to scope API calls:
    ///
    /// ```rust,ignore
    /// let products = user
    ///     .session(&config)
    ///     .scope(async { shopify_auth::clients::request(req).await })
    ///     .await?;
    /// ```
    #[must_use]
    pub fn session(&self, config: &AppConfig) -> ShopSession {
        ShopSession::new(self.shop_domain.clone(), self.access_token.clone())
            .with_config(config)
    }
}

impl Principal for ShopUser {
    fn identifier(&self) -> &str {
        self.shop_domain.as_ref()
    }

    fn is_active(&self) -> bool {
        self.is_active
    }
}

impl fmt::Display for ShopUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.shop_domain.as_ref())
    }
}

const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ShopUser>();
};
