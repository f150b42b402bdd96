//! Persistence contract for shop users.

use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::config::ShopDomain;
use crate::user::ShopUser;

/// Errors returned by a [`ShopUserStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// A user already exists for this shop.
    #[error("A shop user already exists for '{shop}'")]
    Duplicate {
        /// The conflicting shop domain.
        shop: String,
    },

    /// No user exists for this shop.
    #[error("No shop user exists for '{shop}'")]
    NotFound {
        /// The missing shop domain.
        shop: String,
    },

    /// The underlying database failed.
    #[error("Shop user store failed: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Storage for [`ShopUser`] records, keyed by shop domain.
///
/// Implementations must keep `shop_domain` unique: [`insert`](Self::insert)
/// fails with [`StoreError::Duplicate`] for a known shop and
/// [`update`](Self::update) fails with [`StoreError::NotFound`] for an
/// unknown one.
#[async_trait]
pub trait ShopUserStore: Send + Sync {
    /// Looks a user up by shop domain.
    async fn find_by_domain(&self, shop: &ShopDomain) -> Result<Option<ShopUser>, StoreError>;

    /// Stores a new user.
    async fn insert(&self, user: ShopUser) -> Result<ShopUser, StoreError>;

    /// Replaces an existing user.
    async fn update(&self, user: ShopUser) -> Result<ShopUser, StoreError>;

    /// Activates or deactivates a user. Administrative; never called by the
    /// login flow.
    async fn set_active(&self, shop: &ShopDomain, active: bool) -> Result<(), StoreError>;
}

/// A [`ShopUserStore`] held in process memory.
///
/// Contents are lost on restart.
///
/// ```rust
/// use shopify_auth::{AccessToken, AuthScopes, MemoryShopUserStore, ShopDomain, ShopUser, ShopUserStore};
///
/// # tokio_test::block_on(async {
/// let store = MemoryShopUserStore::new();
/// let shop = ShopDomain::new("acme").unwrap();
/// store
///     .insert(ShopUser::new(shop.clone(), AccessToken::new("t").unwrap(), AuthScopes::new()))
///     .await
///     .unwrap();
///
/// assert!(store.find_by_domain(&shop).await.unwrap().is_some());
/// assert_eq!(store.len().await, 1);
/// # });
/// ```
#[derive(Debug, Default)]
pub struct MemoryShopUserStore {
    users: RwLock<HashMap<ShopDomain, ShopUser>>,
}

impl MemoryShopUserStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored users.
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    /// Returns `true` if no user is stored.
    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl ShopUserStore for MemoryShopUserStore {
    async fn find_by_domain(&self, shop: &ShopDomain) -> Result<Option<ShopUser>, StoreError> {
        Ok(self.users.read().await.get(shop).cloned())
    }

    async fn insert(&self, user: ShopUser) -> Result<ShopUser, StoreError> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.shop_domain) {
            return Err(StoreError::Duplicate {
                shop: user.shop_domain.to_string(),
            });
        }
        users.insert(user.shop_domain.clone(), user.clone());
        Ok(user)
    }

    async fn update(&self, user: ShopUser) -> Result<ShopUser, StoreError> {
        let mut users = self.users.write().await;
        let Some(slot) = users.get_mut(&user.shop_domain) else {
            return Err(StoreError::NotFound {
                shop: user.shop_domain.to_string(),
            });
        };
        *slot = user.clone();
        Ok(user)
    }

    async fn set_active(&self, shop: &ShopDomain, active: bool) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        let user = users.get_mut(shop).ok_or_else(|| StoreError::NotFound {
            shop: shop.to_string(),
        })?;
        user.is_active = active;
        Ok(())
    }
}

const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<MemoryShopUserStore>();
    assert_send_sync::<StoreError>();
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthScopes;
    use crate::user::AccessToken;

    fn user(shop: &str, token: &str) -> ShopUser {
        ShopUser::new(
            ShopDomain::new(shop).unwrap(),
            AccessToken::new(token).unwrap(),
            AuthScopes::new(),
        )
    }

    #[tokio::test]
    async fn test_insert_then_find() {
        let store = MemoryShopUserStore::new();
        assert!(store.is_empty().await);

        store.insert(user("acme", "t1")).await.unwrap();

        let found = store
            .find_by_domain(&ShopDomain::new("acme.myshopify.com").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.access_token.as_ref(), "t1");
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_domain() {
        let store = MemoryShopUserStore::new();
        store.insert(user("acme", "t1")).await.unwrap();

        let result = store.insert(user("ACME.myshopify.com", "t2")).await;
        assert!(matches!(result, Err(StoreError::Duplicate { .. })));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_update_requires_existing_user() {
        let store = MemoryShopUserStore::new();
        let result = store.update(user("acme", "t1")).await;
        assert!(matches!(result, Err(StoreError::NotFound { .. })));

        store.insert(user("acme", "t1")).await.unwrap();
        store.update(user("acme", "t2")).await.unwrap();

        let shop = ShopDomain::new("acme").unwrap();
        let found = store.find_by_domain(&shop).await.unwrap().unwrap();
        assert_eq!(found.access_token.as_ref(), "t2");
    }

    #[tokio::test]
    async fn test_set_active_toggles_flag() {
        let store = MemoryShopUserStore::new();
        let shop = ShopDomain::new("acme").unwrap();
        store.insert(user("acme", "t1")).await.unwrap();

        store.set_active(&shop, false).await.unwrap();
        assert!(!store.find_by_domain(&shop).await.unwrap().unwrap().is_active);

        let missing = ShopDomain::new("other").unwrap();
        assert!(matches!(
            store.set_active(&missing, false).await,
            Err(StoreError::NotFound { .. })
        ));
    }
}
