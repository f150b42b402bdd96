//! HMAC validation for Shopify OAuth callbacks.
//!
//! Shopify signs the callback query string with the app's API secret. All
//! comparisons are constant-time, and an old secret is accepted during key
//! rotation.
//!
//! # Example
//!
//! ```rust
//! use shopify_auth::auth::oauth::hmac::compute_signature;
//!
//! let signature = compute_signature("code=abc123&shop=example.myshopify.com", "my-api-secret");
//! assert_eq!(signature.len(), 64);
//! assert!(signature.chars().all(|c| c.is_ascii_hexdigit()));
//! ```

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::auth::oauth::AuthQuery;
use crate::config::AppConfig;

type HmacSha256 = Hmac<Sha256>;

/// Computes a lowercase hex HMAC-SHA256 signature of `message`.
#[must_use]
#[allow(clippy::missing_panics_doc)] // HMAC accepts keys of any size
pub fn compute_signature(message: &str, secret: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(message.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Compares two strings in constant time.
#[must_use]
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Returns `true` if the callback's `hmac` parameter signs the rest of the
/// query with the API secret, or with the old secret during rotation.
///
/// A missing `hmac` never validates. The received value is lowercased before
/// comparison since hex case carries no meaning.
#[must_use]
pub fn validate_hmac(query: &AuthQuery, config: &AppConfig) -> bool {
    let Some(received) = query.hmac() else {
        return false;
    };
    let received = received.to_ascii_lowercase();
    let signable = query.to_signable_string();

    let computed = compute_signature(&signable, config.api_secret_key().as_ref());
    if constant_time_compare(&computed, &received) {
        return true;
    }

    config.old_api_secret_key().is_some_and(|old_secret| {
        let computed_old = compute_signature(&signable, old_secret.as_ref());
        constant_time_compare(&computed_old, &received)
    })
}
