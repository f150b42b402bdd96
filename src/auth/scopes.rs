//! OAuth scope handling.
//!
//! This module provides the [`AuthScopes`] type for the ordered scope list an
//! app requests, and for the scopes Shopify reports back with a token.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An ordered, de-duplicated set of OAuth scopes.
///
/// Scopes keep the order they were configured in, so the `scope` parameter
/// sent to Shopify matches the configuration exactly. Duplicates are dropped,
/// keeping the first occurrence.
///
/// # Implied scopes
///
/// [`covers`](Self::covers) honours Shopify's implied scopes:
/// - `write_products` implies `read_products`
/// - `unauthenticated_write_products` implies `unauthenticated_read_products`
///
/// # Example
///
/// ```rust
/// use shopify_auth::AuthScopes;
///
/// let scopes: AuthScopes = "write_orders, read_products, write_orders".parse().unwrap();
/// assert_eq!(scopes.to_string(), "write_orders,read_products");
///
/// let required: AuthScopes = "read_orders".parse().unwrap();
/// assert!(scopes.covers(&required));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AuthScopes {
    scopes: Vec<String>,
}

impl AuthScopes {
    /// Creates an empty scope set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the scope set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Returns the number of scopes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    /// Returns `true` if this set grants every scope in `other`, counting
    /// scopes implied by write scopes.
    #[must_use]
    pub fn covers(&self, other: &Self) -> bool {
        other.scopes.iter().all(|wanted| {
            self.scopes.iter().any(|granted| {
                granted == wanted || Self::implied_scope(granted).as_deref() == Some(wanted)
            })
        })
    }

    /// Returns an iterator over the scopes in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.scopes.iter().map(String::as_str)
    }

    fn push(&mut self, scope: &str) {
        if !self.scopes.iter().any(|s| s == scope) {
            self.scopes.push(scope.to_string());
        }
    }

    fn implied_scope(scope: &str) -> Option<String> {
        scope
            .strip_prefix("unauthenticated_write_")
            .map(|rest| format!("unauthenticated_read_{rest}"))
            .or_else(|| {
                scope
                    .strip_prefix("write_")
                    .map(|rest| format!("read_{rest}"))
            })
    }
}

impl FromStr for AuthScopes {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut scopes = Self::new();

        for scope in s.split(',') {
            let scope = scope.trim();
            if scope.is_empty() {
                continue;
            }

            if !scope.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(ConfigError::InvalidScopes {
                    reason: format!("Invalid characters in scope: '{scope}'"),
                });
            }

            scopes.push(scope);
        }

        Ok(scopes)
    }
}

impl TryFrom<Vec<String>> for AuthScopes {
    type Error = ConfigError;

    fn try_from(scopes: Vec<String>) -> Result<Self, Self::Error> {
        scopes.join(",").parse()
    }
}

impl fmt::Display for AuthScopes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.scopes.join(","))
    }
}

impl TryFrom<String> for AuthScopes {
    type Error = ConfigError;

    fn try_from(scopes: String) -> Result<Self, Self::Error> {
        scopes.parse()
    }
}

impl From<AuthScopes> for String {
    fn from(scopes: AuthScopes) -> Self {
        scopes.to_string()
    }
}
