//! Authorization URL generation, the first step of the OAuth flow.

use crate::auth::oauth::error::OAuthError;
use crate::auth::oauth::state::StateParam;
use crate::config::{AppConfig, ShopDomain};

/// Result of starting an OAuth flow.
///
/// `state` must be stored in the browser session and handed to
/// [`validate_auth_callback`](crate::auth::oauth::validate_auth_callback)
/// when Shopify redirects back.
#[derive(Clone, Debug)]
pub struct BeginAuthResult {
    /// The validated shop the flow is for.
    pub shop: ShopDomain,

    /// Shopify's authorization URL with every query parameter filled in.
    pub auth_url: String,

    /// The nonce embedded in `auth_url`.
    pub state: StateParam,
}

/// Validates `shop` and builds the authorization URL for it.
///
/// The URL targets `https://{shop}/admin/oauth/authorize` with `client_id`,
/// `scope` (configured scopes in order), `redirect_uri` (app host plus
/// callback path) and a fresh `state` nonce, in that order.
///
/// # Errors
///
/// - [`OAuthError::InvalidShopDomain`] if `shop` is not a valid shop domain
/// - [`OAuthError::MissingHostConfig`] if the app host is not configured
///
/// # Example
///
/// ```rust
/// use shopify_auth::{AppConfig, ApiKey, ApiSecretKey, HostUrl};
/// use shopify_auth::auth::oauth::begin_auth;
///
/// let config = AppConfig::builder()
///     .api_key(ApiKey::new("key").unwrap())
///     .api_secret_key(ApiSecretKey::new("secret").unwrap())
///     .host(HostUrl::new("https://app.example.com").unwrap())
///     .scopes("read_products".parse().unwrap())
///     .build()
///     .unwrap();
///
/// let result = begin_auth(&config, "acme").unwrap();
/// assert!(result.auth_url.starts_with("https://acme.myshopify.com/admin/oauth/authorize?client_id=key&scope=read_products&"));
/// ```
pub fn begin_auth(config: &AppConfig, shop: &str) -> Result<BeginAuthResult, OAuthError> {
    let shop = ShopDomain::new(shop).map_err(|_| OAuthError::InvalidShopDomain {
        domain: shop.to_string(),
    })?;
    let redirect_uri = config.redirect_uri().ok_or(OAuthError::MissingHostConfig)?;

    let state = StateParam::new();
    let scope = config.scopes().to_string();

    let params = [
        ("client_id", config.api_key().as_ref()),
        ("scope", scope.as_str()),
        ("redirect_uri", redirect_uri.as_str()),
        ("state", state.as_ref()),
    ];

    let query_string = params
        .iter()
        .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");

    let auth_url = format!(
        "https://{}/admin/oauth/authorize?{}",
        shop.as_ref(),
        query_string
    );

    Ok(BeginAuthResult {
        shop,
        auth_url,
        state,
    })
}
