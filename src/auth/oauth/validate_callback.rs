//! OAuth callback validation.
//!
//! When the merchant approves the install, Shopify redirects the browser to
//! the callback URL with `code`, `shop`, `state`, `timestamp` and `hmac`
//! query parameters. [`validate_auth_callback`] checks them in this order and
//! stops at the first failure:
//!
//! 1. the `state` nonce matches the one issued by `begin`
//! 2. the HMAC signature verifies (current secret, then the old one)
//! 3. the signed timestamp is less than a day old
//! 4. the shop domain is well formed
//! 5. the authorization code is exchanged for an access token
//!
//! Nothing is persisted here; the caller hands the verified result to
//! [`AuthBackend::authenticate`](crate::auth::AuthBackend::authenticate).

use chrono::{DateTime, TimeDelta, Utc};

use crate::auth::oauth::error::OAuthError;
use crate::auth::oauth::hmac::validate_hmac;
use crate::auth::oauth::state::StateParam;
use crate::auth::oauth::token_exchange::{exchange_code, GrantedToken};
use crate::auth::oauth::AuthQuery;
use crate::config::{AppConfig, ShopDomain};

/// Maximum age of a signed callback, in seconds.
pub const MAX_CALLBACK_AGE_SECS: i64 = 24 * 60 * 60;

/// A callback that passed every check, with the token Shopify issued.
#[derive(Clone, Debug)]
pub struct VerifiedCallback {
    /// The shop that authorized the app.
    pub shop: ShopDomain,
    /// The token and granted scopes.
    pub token: GrantedToken,
}

/// Validates an OAuth callback and exchanges its code for an access token.
///
/// `expected_state` is the nonce stored in the browser session by `begin`;
/// `None` means the session holds no pending flow, which always fails.
///
/// # Errors
///
/// - [`OAuthError::InvalidCallback`]: Shopify reported an error, or `code`
///   is missing
/// - [`OAuthError::InvalidState`]: state missing or mismatched
/// - [`OAuthError::InvalidSignature`]: HMAC mismatch or stale timestamp
/// - [`OAuthError::InvalidShopDomain`]: malformed `shop`
/// - [`OAuthError::TokenExchangeFailed`]: Shopify refused the code
#[tracing::instrument(skip_all, fields(shop = query.shop().unwrap_or_default()))]
pub async fn validate_auth_callback(
    http: &reqwest::Client,
    config: &AppConfig,
    query: &AuthQuery,
    expected_state: Option<&StateParam>,
) -> Result<VerifiedCallback, OAuthError> {
    if let Some(error) = query.error() {
        return Err(OAuthError::InvalidCallback {
            reason: format!("Shopify returned error '{error}'"),
        });
    }

    let received_state = query.state();
    let state_ok = match (expected_state, received_state) {
        (Some(expected), Some(received)) => expected.matches(received),
        _ => false,
    };
    if !state_ok {
        return Err(OAuthError::InvalidState {
            received: received_state.map(str::to_string),
        });
    }

    if !validate_hmac(query, config) {
        return Err(OAuthError::InvalidSignature {
            reason: "HMAC mismatch".to_string(),
        });
    }

    check_timestamp(query.timestamp(), Utc::now())?;

    let raw_shop = query.shop().unwrap_or_default();
    let shop = ShopDomain::new(raw_shop).map_err(|_| OAuthError::InvalidShopDomain {
        domain: raw_shop.to_string(),
    })?;

    let code = query
        .code()
        .filter(|c| !c.is_empty())
        .ok_or_else(|| OAuthError::InvalidCallback {
            reason: "Missing authorization code".to_string(),
        })?;

    let token = exchange_code(http, config, &shop, code).await?;
    tracing::debug!(shop = %shop, "Exchanged authorization code");

    Ok(VerifiedCallback { shop, token })
}

fn check_timestamp(raw: Option<&str>, now: DateTime<Utc>) -> Result<(), OAuthError> {
    let signed_at = raw
        .and_then(|ts| ts.parse::<i64>().ok())
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .ok_or_else(|| OAuthError::InvalidSignature {
            reason: "Missing or unparseable timestamp".to_string(),
        })?;

    if now - signed_at > TimeDelta::seconds(MAX_CALLBACK_AGE_SECS) {
        return Err(OAuthError::InvalidSignature {
            reason: format!("Callback signed at {signed_at} is too old"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::oauth::hmac::compute_signature;
    use crate::config::{ApiKey, ApiSecretKey, HostUrl};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SECRET: &str = "test-secret";

    fn config_for(server: &MockServer) -> AppConfig {
        AppConfig::builder()
            .api_key(ApiKey::new("test-api-key").unwrap())
            .api_secret_key(ApiSecretKey::new(SECRET).unwrap())
            .scopes("read_products".parse().unwrap())
            .api_host(HostUrl::new(server.uri()).unwrap())
            .build()
            .unwrap()
    }

    fn signed_callback(state: &StateParam, shop: &str, timestamp: i64) -> AuthQuery {
        let mut query = AuthQuery::from_pairs([
            ("code", "auth-code".to_string()),
            ("shop", shop.to_string()),
            ("state", state.to_string()),
            ("timestamp", timestamp.to_string()),
        ]);
        let hmac = compute_signature(&query.to_signable_string(), SECRET);
        query.set("hmac", hmac);
        query
    }

    async fn token_server(expected_calls: u64) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/admin/oauth/access_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "shpat_abc",
                "scope": "read_products"
            })))
            .expect(expected_calls)
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn test_valid_callback_exchanges_code() {
        let server = token_server(1).await;
        let state = StateParam::new();
        let query = signed_callback(&state, "acme.myshopify.com", Utc::now().timestamp());

        let verified = validate_auth_callback(
            &reqwest::Client::new(),
            &config_for(&server),
            &query,
            Some(&state),
        )
        .await
        .unwrap();

        assert_eq!(verified.shop.as_ref(), "acme.myshopify.com");
        assert_eq!(verified.token.access_token.as_ref(), "shpat_abc");
    }

    #[tokio::test]
    async fn test_state_mismatch_wins_over_bad_signature() {
        let server = token_server(0).await;
        let issued = StateParam::new();
        let mut query = signed_callback(&StateParam::new(), "acme", Utc::now().timestamp());
        query.set("hmac", "00");

        let result = validate_auth_callback(
            &reqwest::Client::new(),
            &config_for(&server),
            &query,
            Some(&issued),
        )
        .await;

        assert!(matches!(result, Err(OAuthError::InvalidState { .. })));
    }

    #[tokio::test]
    async fn test_missing_stored_state_is_rejected() {
        let server = token_server(0).await;
        let query = signed_callback(&StateParam::new(), "acme", Utc::now().timestamp());

        let result =
            validate_auth_callback(&reqwest::Client::new(), &config_for(&server), &query, None)
                .await;

        assert!(matches!(result, Err(OAuthError::InvalidState { received: Some(_) })));
    }

    #[tokio::test]
    async fn test_tampered_callback_never_reaches_token_endpoint() {
        let server = token_server(0).await;
        let state = StateParam::new();
        let mut query = signed_callback(&state, "acme.myshopify.com", Utc::now().timestamp());
        query.set("shop", "evil.myshopify.com");

        let result = validate_auth_callback(
            &reqwest::Client::new(),
            &config_for(&server),
            &query,
            Some(&state),
        )
        .await;

        assert!(matches!(result, Err(OAuthError::InvalidSignature { .. })));
    }

    #[tokio::test]
    async fn test_invalid_shop_after_valid_signature() {
        let server = token_server(0).await;
        let state = StateParam::new();
        let query = signed_callback(&state, "acme.example.com", Utc::now().timestamp());

        let result = validate_auth_callback(
            &reqwest::Client::new(),
            &config_for(&server),
            &query,
            Some(&state),
        )
        .await;

        assert!(matches!(result, Err(OAuthError::InvalidShopDomain { .. })));
    }

    #[tokio::test]
    async fn test_stale_callback_is_rejected() {
        let server = token_server(0).await;
        let state = StateParam::new();
        let two_days_ago = (Utc::now() - TimeDelta::days(2)).timestamp();
        let query = signed_callback(&state, "acme", two_days_ago);

        let result = validate_auth_callback(
            &reqwest::Client::new(),
            &config_for(&server),
            &query,
            Some(&state),
        )
        .await;

        assert!(matches!(result, Err(OAuthError::InvalidSignature { .. })));
    }

    #[tokio::test]
    async fn test_declined_install_reports_callback_error() {
        let server = token_server(0).await;
        let state = StateParam::new();
        let mut query = signed_callback(&state, "acme", Utc::now().timestamp());
        query.set("error", "access_denied");

        let result = validate_auth_callback(
            &reqwest::Client::new(),
            &config_for(&server),
            &query,
            Some(&state),
        )
        .await;

        assert!(matches!(result, Err(OAuthError::InvalidCallback { .. })));
    }

    #[test]
    fn test_check_timestamp_boundaries() {
        let now = Utc::now();
        let fresh = (now - TimeDelta::hours(23)).timestamp().to_string();
        let stale = (now - TimeDelta::hours(25)).timestamp().to_string();

        assert!(check_timestamp(Some(&fresh), now).is_ok());
        assert!(check_timestamp(Some(&stale), now).is_err());
        assert!(check_timestamp(Some("yesterday"), now).is_err());
        assert!(check_timestamp(None, now).is_err());
    }
}
