//! Query parameters Shopify sends to the OAuth callback.

use serde::Deserialize;
use std::collections::BTreeMap;

/// The signed query string of an OAuth callback.
///
/// Every parameter is kept, not only the well-known ones, because Shopify
/// signs the full query string: dropping an unknown parameter would break
/// signature verification.
///
/// ```rust
/// use shopify_auth::auth::oauth::AuthQuery;
///
/// let query = AuthQuery::from_pairs([
///     ("shop", "acme.myshopify.com"),
///     ("code", "abc"),
///     ("timestamp", "1700000000"),
///     ("hmac", "deadbeef"),
/// ]);
///
/// assert_eq!(query.shop(), Some("acme.myshopify.com"));
/// assert_eq!(
///     query.to_signable_string(),
///     "code=abc&shop=acme.myshopify.com&timestamp=1700000000"
/// );
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct AuthQuery {
    params: BTreeMap<String, String>,
}

impl AuthQuery {
    /// Builds a query from key/value pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            params: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Returns a parameter by name.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Sets a parameter, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.params.insert(key.into(), value.into());
    }

    /// The authorization code to exchange.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.get("code")
    }

    /// The shop the merchant authorized.
    #[must_use]
    pub fn shop(&self) -> Option<&str> {
        self.get("shop")
    }

    /// The echoed state nonce.
    #[must_use]
    pub fn state(&self) -> Option<&str> {
        self.get("state")
    }

    /// The hex HMAC-SHA256 signature.
    #[must_use]
    pub fn hmac(&self) -> Option<&str> {
        self.get("hmac")
    }

    /// The signed Unix timestamp.
    #[must_use]
    pub fn timestamp(&self) -> Option<&str> {
        self.get("timestamp")
    }

    /// An error code, present when the merchant declined the install.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.get("error")
    }

    /// Returns the message Shopify signed: every parameter except `hmac` and
    /// `signature`, sorted by key and joined as `key=value` pairs with `&`.
    #[must_use]
    pub fn to_signable_string(&self) -> String {
        self.params
            .iter()
            .filter(|(k, _)| k.as_str() != "hmac" && k.as_str() != "signature")
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&")
    }
}
