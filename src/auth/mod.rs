//! Shop authentication.
//!
//! # Overview
//!
//! - [`AuthScopes`]: ordered OAuth scopes with implied scope handling
//! - [`oauth`]: the authorization code handshake with Shopify
//! - [`AuthBackend`]: turns a verified handshake into a logged-in
//!   [`ShopUser`](crate::ShopUser)
//!
//! # Flow
//!
//! ```rust,ignore
//! use shopify_auth::auth::oauth::{begin_auth, validate_auth_callback};
//!
//! // 1. Send the merchant to Shopify, keeping the nonce in the session
//! let begin = begin_auth(&config, "acme")?;
//!
//! // 2. Verify the callback and exchange the code
//! let verified = validate_auth_callback(&http, &config, &query, Some(&begin.state)).await?;
//!
//! // 3. Record the shop and log it in
//! let user = backend
//!     .authenticate(&verified.shop, verified.token.access_token.as_ref(), verified.token.scopes)
//!     .await?;
//! backend.login(&session, &user).await?;
//! ```

mod backend;
pub mod oauth;
mod scopes;

pub use backend::{AuthBackend, DEV_MODE_ACCESS_TOKEN, SESSION_USER_KEY};
pub use scopes::AuthScopes;
