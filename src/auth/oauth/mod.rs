//! OAuth 2.0 authorization code grant for Shopify shops.
//!
//! The flow has two legs:
//!
//! 1. **Begin** ([`begin_auth`]): validate the shop the merchant typed,
//!    generate a [`StateParam`] nonce and build Shopify's authorization URL.
//!    The nonce goes into the browser session, the merchant goes to the URL.
//!
//! 2. **Callback** ([`validate_auth_callback`]): when Shopify redirects back,
//!    check the nonce, the HMAC signature and the timestamp, then exchange the
//!    authorization code for a permanent access token.
//!
//! The HTTP handlers in [`crate::web`] drive both legs and hand the verified
//! token to [`AuthBackend`](crate::auth::AuthBackend).
//!
//! # Security
//!
//! - Signature and nonce comparisons are constant-time
//! - An old API secret is accepted while a rotation is in progress
//! - Each nonce is consumed by the first callback that presents it
//!
//! # Example
//!
//! ```rust
//! use shopify_auth::{AppConfig, ApiKey, ApiSecretKey, HostUrl};
//! use shopify_auth::auth::oauth::{begin_auth, OAuthError};
//!
//! let config = AppConfig::builder()
//!     .api_key(ApiKey::new("your-api-key").unwrap())
//!     .api_secret_key(ApiSecretKey::new("your-secret").unwrap())
//!     .host(HostUrl::new("https://your-app.com").unwrap())
//!     .scopes("read_products,write_orders".parse().unwrap())
//!     .build()
//!     .unwrap();
//!
//! let result = begin_auth(&config, "example-shop").unwrap();
//! assert_eq!(result.shop.as_ref(), "example-shop.myshopify.com");
//!
//! assert!(matches!(
//!     begin_auth(&config, "example.com"),
//!     Err(OAuthError::InvalidShopDomain { .. })
//! ));
//! ```

mod auth_query;
mod begin_auth;
mod error;
pub mod hmac;
mod state;
mod token_exchange;
mod validate_callback;

pub use auth_query::AuthQuery;
pub use begin_auth::{begin_auth, BeginAuthResult};
pub use error::OAuthError;
pub use state::StateParam;
pub use token_exchange::{exchange_code, token_url, AccessTokenResponse, GrantedToken};
pub use validate_callback::{validate_auth_callback, VerifiedCallback, MAX_CALLBACK_AGE_SECS};
