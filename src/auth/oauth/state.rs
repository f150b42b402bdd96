//! Per-flow nonce carried in the OAuth `state` parameter.

use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::auth::oauth::hmac::constant_time_compare;

/// The nonce issued by `begin` and echoed back by Shopify in the callback.
///
/// A fresh 15-character alphanumeric value from the thread-local CSPRNG is
/// generated per login attempt and stored in the browser session; the
/// callback must present the same value.
///
/// ```rust
/// use shopify_auth::auth::oauth::StateParam;
///
/// let state = StateParam::new();
/// assert_eq!(state.as_ref().len(), 15);
/// assert!(state.matches(state.as_ref()));
/// assert!(!state.matches("something-else"));
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateParam(String);

impl StateParam {
    const NONCE_LENGTH: usize = 15;

    /// Generates a new random nonce.
    #[must_use]
    pub fn new() -> Self {
        let nonce: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(Self::NONCE_LENGTH)
            .map(char::from)
            .collect();
        Self(nonce)
    }

    /// Compares a received state value against this nonce in constant time.
    #[must_use]
    pub fn matches(&self, received: &str) -> bool {
        constant_time_compare(&self.0, received)
    }
}

impl Default for StateParam {
    fn default() -> Self {
        Self::new()
    }
}

impl AsRef<str> for StateParam {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StateParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Nonces are one-time secrets; keep them out of debug logs.
impl fmt::Debug for StateParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StateParam(*****)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_param_is_alphanumeric() {
        let state = StateParam::new();
        assert_eq!(state.as_ref().len(), 15);
        assert!(state.as_ref().chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_state_params_are_unique() {
        let first = StateParam::new();
        let second = StateParam::new();
        assert_ne!(first, second);
    }

    #[test]
    fn test_state_param_serializes_as_plain_string() {
        let state = StateParam::new();
        let json = serde_json::to_string(&state).unwrap();
        assert_eq!(json, format!("\"{state}\""));

        let restored: StateParam = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, state);
    }

    #[test]
    fn test_state_param_debug_is_masked() {
        let state = StateParam::new();
        assert!(!format!("{state:?}").contains(state.as_ref()));
    }
}
