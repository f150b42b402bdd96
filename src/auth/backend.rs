//! The authentication backend: where a verified OAuth result becomes a
//! logged-in shop user.
//!
//! [`AuthBackend::authenticate`] upserts the [`ShopUser`] for a shop and
//! refuses deactivated users. [`AuthBackend::login`],
//! [`AuthBackend::current_user`] and [`AuthBackend::logout`] tie that user
//! to a `tower-sessions` browser session.

use std::sync::Arc;

use tower_sessions::Session;

use crate::auth::oauth::OAuthError;
use crate::auth::AuthScopes;
use crate::config::{AppConfig, ShopDomain};
use crate::user::{AccessToken, Principal, ShopUser, ShopUserStore, StoreError};

/// Session key holding the logged-in shop domain.
pub const SESSION_USER_KEY: &str = "shopify_auth.shop";

/// Placeholder token stored for shops logged in through dev mode.
pub const DEV_MODE_ACCESS_TOKEN: &str = "00000000000000000000000000000000";

/// Authenticates shops against a [`ShopUserStore`].
///
/// Cheap to clone; clones share the store.
#[derive(Clone)]
pub struct AuthBackend {
    store: Arc<dyn ShopUserStore>,
}

impl std::fmt::Debug for AuthBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthBackend").finish_non_exhaustive()
    }
}

impl AuthBackend {
    /// Creates a backend over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn ShopUserStore>) -> Self {
        Self { store }
    }

    /// Returns the underlying store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn ShopUserStore> {
        &self.store
    }

    /// Records a freshly obtained token for `shop` and returns its user.
    ///
    /// Creates the user on first sight. Otherwise the stored token and
    /// scopes are overwritten, then the user must still be active.
    ///
    /// # Errors
    ///
    /// - [`OAuthError::InvalidCallback`] if `access_token` is empty; nothing
    ///   is written
    /// - [`OAuthError::UserDeactivated`] if the user has been deactivated
    /// - [`OAuthError::Store`] if the store fails
    #[tracing::instrument(skip(self, access_token, scopes), fields(shop = %shop))]
    pub async fn authenticate(
        &self,
        shop: &ShopDomain,
        access_token: impl Into<String>,
        scopes: AuthScopes,
    ) -> Result<ShopUser, OAuthError> {
        let access_token =
            AccessToken::new(access_token).ok_or_else(|| OAuthError::InvalidCallback {
                reason: "Refusing to store an empty access token".to_string(),
            })?;

        let existing = match self.store.find_by_domain(shop).await? {
            Some(user) => Some(user),
            None => {
                let user = ShopUser::new(shop.clone(), access_token.clone(), scopes.clone());
                match self.store.insert(user).await {
                    Ok(user) => {
                        tracing::info!("Created shop user");
                        return Ok(user);
                    }
                    // Lost a race with a concurrent first login.
                    Err(StoreError::Duplicate { .. }) => self.store.find_by_domain(shop).await?,
                    Err(e) => return Err(e.into()),
                }
            }
        };

        let mut user = existing.ok_or_else(|| StoreError::NotFound {
            shop: shop.to_string(),
        })?;
        user.access_token = access_token;
        user.scopes = scopes;
        user.updated_at = chrono::Utc::now();
        let user = self.store.update(user).await?;

        if !user.is_active() {
            tracing::warn!("Deactivated shop user attempted to log in");
            return Err(OAuthError::UserDeactivated {
                shop: shop.to_string(),
            });
        }

        tracing::info!("Refreshed shop user token");
        Ok(user)
    }

    /// Logs in `shop` without OAuth, storing [`DEV_MODE_ACCESS_TOKEN`].
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::InvalidCallback`] unless dev mode is enabled in
    /// `config`, plus anything [`authenticate`](Self::authenticate) returns.
    pub async fn dev_login(
        &self,
        config: &AppConfig,
        shop: &ShopDomain,
    ) -> Result<ShopUser, OAuthError> {
        if !config.dev_mode() {
            return Err(OAuthError::InvalidCallback {
                reason: "Dev mode login attempted while dev mode is disabled".to_string(),
            });
        }
        tracing::warn!(shop = %shop, "Dev mode: logging in without OAuth");
        self.authenticate(shop, DEV_MODE_ACCESS_TOKEN, config.scopes().clone())
            .await
    }

    /// Attaches `user` to the browser session under a new session id.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::Session`] if the session store fails.
    pub async fn login(&self, session: &Session, user: &ShopUser) -> Result<(), OAuthError> {
        session.cycle_id().await?;
        session
            .insert(SESSION_USER_KEY, user.identifier().to_string())
            .await?;
        Ok(())
    }

    /// Returns the active user logged into `session`, if any.
    ///
    /// A user deactivated since login, or removed from the store, yields
    /// `None`.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::Session`] or [`OAuthError::Store`] on
    /// infrastructure failures.
    pub async fn current_user(&self, session: &Session) -> Result<Option<ShopUser>, OAuthError> {
        let Some(domain) = session.get::<String>(SESSION_USER_KEY).await? else {
            return Ok(None);
        };
        let Ok(shop) = ShopDomain::new(domain) else {
            return Ok(None);
        };
        let user = self.store.find_by_domain(&shop).await?;
        Ok(user.filter(Principal::is_active))
    }

    /// Clears the browser session.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::Session`] if the session store fails.
    pub async fn logout(&self, session: &Session) -> Result<(), OAuthError> {
        session.flush().await?;
        Ok(())
    }
}

const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<AuthBackend>();
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ApiKey, ApiSecretKey};
    use crate::user::MemoryShopUserStore;
    use tower_sessions::MemoryStore;

    fn backend() -> (AuthBackend, Arc<MemoryShopUserStore>) {
        let store = Arc::new(MemoryShopUserStore::new());
        (AuthBackend::new(store.clone()), store)
    }

    fn browser_session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    fn shop() -> ShopDomain {
        ShopDomain::new("acme").unwrap()
    }

    fn config(dev_mode: bool) -> AppConfig {
        AppConfig::builder()
            .api_key(ApiKey::new("k").unwrap())
            .api_secret_key(ApiSecretKey::new("s").unwrap())
            .dev_mode(dev_mode)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_first_authentication_creates_user() {
        let (backend, store) = backend();
        let user = backend
            .authenticate(&shop(), "shpat_1", AuthScopes::new())
            .await
            .unwrap();

        assert_eq!(user.shop_domain, shop());
        assert_eq!(user.access_token.as_ref(), "shpat_1");
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_repeat_authentication_rotates_token_without_duplicate() {
        let (backend, store) = backend();
        for token in ["shpat_1", "shpat_2", "shpat_3"] {
            backend
                .authenticate(&shop(), token, AuthScopes::new())
                .await
                .unwrap();
        }

        assert_eq!(store.len().await, 1);
        let stored = store.find_by_domain(&shop()).await.unwrap().unwrap();
        assert_eq!(stored.access_token.as_ref(), "shpat_3");
        assert!(stored.updated_at >= stored.created_at);
    }

    #[tokio::test]
    async fn test_empty_token_is_rejected_before_any_write() {
        let (backend, store) = backend();
        let result = backend.authenticate(&shop(), "", AuthScopes::new()).await;

        assert!(matches!(result, Err(OAuthError::InvalidCallback { .. })));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_deactivated_user_is_refused() {
        let (backend, store) = backend();
        backend
            .authenticate(&shop(), "shpat_1", AuthScopes::new())
            .await
            .unwrap();
        store.set_active(&shop(), false).await.unwrap();

        let result = backend
            .authenticate(&shop(), "shpat_2", AuthScopes::new())
            .await;
        assert!(matches!(result, Err(OAuthError::UserDeactivated { .. })));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_login_then_current_user_then_logout() {
        let (backend, _store) = backend();
        let session = browser_session();
        assert!(backend.current_user(&session).await.unwrap().is_none());

        let user = backend
            .authenticate(&shop(), "shpat_1", AuthScopes::new())
            .await
            .unwrap();
        backend.login(&session, &user).await.unwrap();

        let current = backend.current_user(&session).await.unwrap().unwrap();
        assert_eq!(current.shop_domain, shop());

        backend.logout(&session).await.unwrap();
        assert!(backend.current_user(&session).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_deactivation_ends_existing_login() {
        let (backend, store) = backend();
        let session = browser_session();
        let user = backend
            .authenticate(&shop(), "shpat_1", AuthScopes::new())
            .await
            .unwrap();
        backend.login(&session, &user).await.unwrap();

        store.set_active(&shop(), false).await.unwrap();
        assert!(backend.current_user(&session).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_dev_login_requires_dev_mode() {
        let (backend, store) = backend();

        let refused = backend.dev_login(&config(false), &shop()).await;
        assert!(matches!(refused, Err(OAuthError::InvalidCallback { .. })));
        assert!(store.is_empty().await);

        let user = backend.dev_login(&config(true), &shop()).await.unwrap();
        assert_eq!(user.access_token.as_ref(), DEV_MODE_ACCESS_TOKEN);
    }
}
