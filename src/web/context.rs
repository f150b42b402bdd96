//! App details exposed to templates.

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use std::convert::Infallible;
use tower_sessions::Session;

use crate::config::AppConfig;
use crate::user::ShopUser;
use crate::web::AuthState;

/// What a page needs to know about the app and the logged-in shop, for
/// instance to initialise App Bridge in an embedded app.
///
/// Works as an extractor: the shop comes from [`login_required`] if it ran,
/// otherwise from the browser session.
///
/// [`login_required`]: crate::web::login_required
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppContext {
    /// App display name.
    pub app_name: String,
    /// Public API key.
    pub api_key: String,
    /// Whether the app runs inside the Shopify admin.
    pub is_embedded: bool,
    /// Whether the dev login bypass is on.
    pub dev_mode: bool,
    /// The logged-in shop, if any.
    pub shop: Option<String>,
}

impl AppContext {
    /// Builds the context for `user`.
    #[must_use]
    pub fn new(config: &AppConfig, user: Option<&ShopUser>) -> Self {
        Self {
            app_name: config.app_name().to_string(),
            api_key: config.api_key().as_ref().to_string(),
            is_embedded: config.is_embedded(),
            dev_mode: config.dev_mode(),
            shop: user.map(|u| u.shop_domain.to_string()),
        }
    }
}

impl<S> FromRequestParts<S> for AppContext
where
    AuthState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth = AuthState::from_ref(state);

        if let Some(user) = parts.extensions.get::<ShopUser>() {
            return Ok(Self::new(auth.config(), Some(user)));
        }

        let user = match Session::from_request_parts(parts, state).await {
            Ok(session) => auth
                .backend()
                .current_user(&session)
                .await
                .unwrap_or_else(|e| {
                    tracing::error!(error = %e, "Failed to load shop user for template context");
                    None
                }),
            Err(_) => None,
        };

        Ok(Self::new(auth.config(), user.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthScopes;
    use crate::config::{ApiKey, ApiSecretKey, ShopDomain};
    use crate::user::AccessToken;

    #[test]
    fn test_context_reflects_config_and_user() {
        let config = AppConfig::builder()
            .app_name("Stock Sync")
            .api_key(ApiKey::new("public-key").unwrap())
            .api_secret_key(ApiSecretKey::new("private").unwrap())
            .is_embedded(true)
            .build()
            .unwrap();
        let user = ShopUser::new(
            ShopDomain::new("acme").unwrap(),
            AccessToken::new("t").unwrap(),
            AuthScopes::new(),
        );

        let anonymous = AppContext::new(&config, None);
        assert_eq!(anonymous.app_name, "Stock Sync");
        assert_eq!(anonymous.api_key, "public-key");
        assert!(anonymous.is_embedded);
        assert!(anonymous.shop.is_none());

        let logged_in = AppContext::new(&config, Some(&user));
        assert_eq!(logged_in.shop.as_deref(), Some("acme.myshopify.com"));
    }
}
