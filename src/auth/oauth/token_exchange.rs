//! Authorization code exchange against Shopify's token endpoint.

use serde::{Deserialize, Serialize};

use crate::auth::oauth::error::OAuthError;
use crate::auth::AuthScopes;
use crate::config::{AppConfig, ShopDomain};
use crate::user::AccessToken;

#[derive(Serialize)]
struct TokenExchangeRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    code: &'a str,
}

/// Body of a successful token exchange.
#[derive(Debug, Deserialize)]
pub struct AccessTokenResponse {
    /// The permanent (offline) access token.
    pub access_token: String,
    /// Comma-separated scopes granted with the token.
    #[serde(default)]
    pub scope: Option<String>,
}

/// A token obtained for a shop.
#[derive(Clone, Debug)]
pub struct GrantedToken {
    /// The access token.
    pub access_token: AccessToken,
    /// Scopes granted, empty when Shopify did not report them.
    pub scopes: AuthScopes,
}

/// Returns the token endpoint for `shop`, honouring the API host override.
#[must_use]
pub fn token_url(config: &AppConfig, shop: &ShopDomain) -> String {
    config.api_host().map_or_else(
        || format!("https://{}/admin/oauth/access_token", shop.as_ref()),
        |host| host.join("/admin/oauth/access_token"),
    )
}

/// Exchanges an authorization code for a permanent access token.
///
/// Sends exactly one POST; failures are not retried.
///
/// # Errors
///
/// Returns [`OAuthError::TokenExchangeFailed`] on transport errors, non-2xx
/// responses, unparseable bodies and empty tokens.
pub async fn exchange_code(
    http: &reqwest::Client,
    config: &AppConfig,
    shop: &ShopDomain,
    code: &str,
) -> Result<GrantedToken, OAuthError> {
    let url = token_url(config, shop);

    let request_body = TokenExchangeRequest {
        client_id: config.api_key().as_ref(),
        client_secret: config.api_secret_key().as_ref(),
        code,
    };

    let response = http
        .post(&url)
        .header("Accept", "application/json")
        .json(&request_body)
        .send()
        .await
        .map_err(|e| OAuthError::TokenExchangeFailed {
            status: 0,
            message: format!("Network error: {e}"),
        })?;

    let status = response.status().as_u16();

    if !response.status().is_success() {
        let error_body = response.text().await.unwrap_or_default();
        return Err(OAuthError::TokenExchangeFailed {
            status,
            message: error_body,
        });
    }

    let token_response: AccessTokenResponse =
        response
            .json()
            .await
            .map_err(|e| OAuthError::TokenExchangeFailed {
                status,
                message: format!("Failed to parse token response: {e}"),
            })?;

    let access_token =
        AccessToken::new(token_response.access_token).ok_or(OAuthError::TokenExchangeFailed {
            status,
            message: "Token response contained an empty access token".to_string(),
        })?;

    let scopes = match token_response.scope.as_deref() {
        Some(scope) => scope.parse().unwrap_or_else(|e| {
            tracing::warn!(shop = %shop, error = %e, "Ignoring unparseable granted scopes");
            AuthScopes::new()
        }),
        None => AuthScopes::new(),
    };

    if !scopes.is_empty() && !scopes.covers(config.scopes()) {
        tracing::warn!(
            shop = %shop,
            requested = %config.scopes(),
            granted = %scopes,
            "Shopify granted fewer scopes than requested"
        );
    }

    Ok(GrantedToken {
        access_token,
        scopes,
    })
}
