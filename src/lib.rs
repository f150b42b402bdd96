//! # Shopify Auth
//!
//! Shopify OAuth login for axum apps, where every authenticated shop becomes
//! an application user.
//!
//! ## Overview
//!
//! This crate provides:
//! - Type-safe configuration via [`AppConfig`] and [`AppConfigBuilder`]
//! - The OAuth 2.0 authorization code flow via [`auth::oauth`]: install URL,
//!   signed callback verification and the code-for-token exchange
//! - [`AuthBackend`], which turns a verified callback into a [`ShopUser`]
//!   and ties it to a browser session
//! - Login, callback and logout routes plus a login gate via [`web`]
//! - Shop-scoped Admin API calls via [`clients::ShopSession`]
//!
//! ## Quick Start
//!
//! ```rust
//! use shopify_auth::{AppConfig, ApiKey, ApiSecretKey, AuthScopes, HostUrl};
//!
//! let config = AppConfig::builder()
//!     .app_name("Stock Sync")
//!     .api_key(ApiKey::new("your-api-key").unwrap())
//!     .api_secret_key(ApiSecretKey::new("your-api-secret").unwrap())
//!     .host(HostUrl::new("https://stock-sync.example.com").unwrap())
//!     .scopes("read_products,write_orders".parse::<AuthScopes>().unwrap())
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(
//!     config.redirect_uri().as_deref(),
//!     Some("https://stock-sync.example.com/finalize")
//! );
//! ```
//!
//! ## Shop Users
//!
//! A shop authenticates once per OAuth flow. The backend creates its user on
//! first login and refreshes the token on every later one:
//!
//! ```rust
//! use std::sync::Arc;
//! use shopify_auth::{AuthBackend, AuthScopes, MemoryShopUserStore, Principal, ShopDomain};
//!
//! # tokio_test::block_on(async {
//! let store = Arc::new(MemoryShopUserStore::new());
//! let backend = AuthBackend::new(store.clone());
//! let shop = ShopDomain::new("acme").unwrap();
//!
//! let user = backend.authenticate(&shop, "shpat_first", AuthScopes::new()).await.unwrap();
//! assert_eq!(user.identifier(), "acme.myshopify.com");
//!
//! backend.authenticate(&shop, "shpat_second", AuthScopes::new()).await.unwrap();
//! assert_eq!(store.len().await, 1);
//! # });
//! ```
//!
//! ## Web Integration
//!
//! ```rust,ignore
//! use axum::{middleware, routing::get, Router};
//! use shopify_auth::web::{login_required, session_layer, AuthState, CurrentShopUser};
//! use tower_sessions::MemoryStore;
//!
//! let sessions = session_layer(MemoryStore::default(), &config);
//! let auth = AuthState::new(config, AuthBackend::new(store));
//! let app = Router::new()
//!     .route("/", get(home))
//!     .route_layer(middleware::from_fn_with_state(auth.clone(), login_required))
//!     .merge(auth.router())
//!     .with_state(auth)
//!     .layer(sessions);
//! ```
//!
//! ## Making API Requests
//!
//! ```rust,ignore
//! use shopify_auth::clients::{self, HttpMethod, HttpRequest};
//!
//! let response = user
//!     .session(&config)
//!     .scope(async {
//!         let request = HttpRequest::builder(HttpMethod::Get, "shop.json").build()?;
//!         clients::request(request).await
//!     })
//!     .await?;
//! ```
//!
//! ## Design Principles
//!
//! - **No global state**: configuration is passed explicitly, and the active
//!   shop session is task-local
//! - **Fail-fast validation**: all newtypes validate on construction
//! - **Thread-safe**: all shared types are `Send + Sync`
//! - **Dev mode is opt-in**: the OAuth bypass is off unless configured and
//!   logged on every use

pub mod auth;
pub mod clients;
pub mod config;
pub mod error;
pub mod user;
pub mod web;

// Re-export public types at crate root for convenience
pub use auth::{AuthBackend, AuthScopes};
pub use config::{
    ApiKey, ApiSecretKey, ApiVersion, AppConfig, AppConfigBuilder, HostUrl, ShopDomain,
};
pub use error::ConfigError;
pub use user::{AccessToken, MemoryShopUserStore, Principal, ShopUser, ShopUserStore, StoreError};

// Re-export the API session types
pub use clients::{HttpClient, HttpError, ShopSession};

// Re-export OAuth types for convenience
pub use auth::oauth::{OAuthError, StateParam};
