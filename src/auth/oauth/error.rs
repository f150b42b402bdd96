//! Error taxonomy for the OAuth flow and the authentication backend.
//!
//! Every variant ends the current authentication attempt; none is retried.
//! `Display` output carries full detail for operator logs. What the merchant
//! sees is decided by [`crate::web::WebError`], which keeps the detail of the
//! security-relevant variants out of response bodies.
//!
//! # Example
//!
//! ```rust
//! use shopify_auth::auth::oauth::OAuthError;
//!
//! let error = OAuthError::InvalidSignature {
//!     reason: "HMAC mismatch".to_string(),
//! };
//! assert!(error.is_suspicious());
//! assert!(!OAuthError::TokenExchangeFailed { status: 503, message: String::new() }.is_suspicious());
//! ```

use thiserror::Error;

use crate::user::StoreError;

/// Errors that can occur while authenticating a shop.
#[derive(Debug, Error)]
pub enum OAuthError {
    /// The shop domain does not match `name` or `name.myshopify.com`.
    #[error("Invalid shop domain '{domain}'")]
    InvalidShopDomain {
        /// The rejected input.
        domain: String,
    },

    /// The callback's `state` is missing or differs from the nonce issued by
    /// `begin`: a forged request or an expired flow.
    #[error("OAuth state mismatch (received {received:?})")]
    InvalidState {
        /// The state value carried by the callback, if any.
        received: Option<String>,
    },

    /// The callback's HMAC signature does not verify, or the signed
    /// timestamp is too old.
    #[error("Callback signature rejected: {reason}")]
    InvalidSignature {
        /// What failed.
        reason: String,
    },

    /// Exchanging the authorization code for an access token failed.
    ///
    /// `status` is 0 when no HTTP response was received.
    #[error("Token exchange failed with status {status}: {message}")]
    TokenExchangeFailed {
        /// The HTTP status returned by Shopify.
        status: u16,
        /// Response body or transport error.
        message: String,
    },

    /// The shop user exists but has been deactivated by an administrator.
    #[error("Shop user '{shop}' is deactivated")]
    UserDeactivated {
        /// The deactivated shop.
        shop: String,
    },

    /// Callback parameters are missing or malformed.
    #[error("Invalid callback: {reason}")]
    InvalidCallback {
        /// What is wrong with the callback.
        reason: String,
    },

    /// No app host is configured, so no `redirect_uri` can be built.
    #[error("Host URL must be configured in AppConfig for OAuth")]
    MissingHostConfig,

    /// Reading or writing the browser session failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// The shop user store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl OAuthError {
    /// Returns `true` for failures that suggest a forged, tampered or
    /// replayed request rather than a transient problem.
    #[must_use]
    pub const fn is_suspicious(&self) -> bool {
        matches!(
            self,
            Self::InvalidShopDomain { .. }
                | Self::InvalidState { .. }
                | Self::InvalidSignature { .. }
                | Self::InvalidCallback { .. }
        )
    }
}

const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<OAuthError>();
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_state_includes_received_value() {
        let error = OAuthError::InvalidState {
            received: Some("xyz789".to_string()),
        };
        assert!(error.to_string().contains("xyz789"));
    }

    #[test]
    fn test_token_exchange_failed_includes_status_and_message() {
        let error = OAuthError::TokenExchangeFailed {
            status: 401,
            message: "Invalid client credentials".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("401"));
        assert!(message.contains("Invalid client credentials"));
    }

    #[test]
    fn test_user_deactivated_names_shop() {
        let error = OAuthError::UserDeactivated {
            shop: "acme.myshopify.com".to_string(),
        };
        assert!(error.to_string().contains("acme.myshopify.com"));
        assert!(!error.is_suspicious());
    }

    #[test]
    fn test_store_error_converts() {
        let error: OAuthError = StoreError::Duplicate {
            shop: "acme.myshopify.com".to_string(),
        }
        .into();
        assert!(matches!(error, OAuthError::Store(_)));
    }

    #[test]
    fn test_suspicious_classification() {
        assert!(OAuthError::InvalidState { received: None }.is_suspicious());
        assert!(OAuthError::InvalidShopDomain {
            domain: "x".to_string()
        }
        .is_suspicious());
        assert!(!OAuthError::MissingHostConfig.is_suspicious());
    }
}
