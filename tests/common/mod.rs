//! Shared harness for the router-level tests.
//!
//! Drives the login routes plus one protected page through
//! `tower::ServiceExt::oneshot`, carrying the session cookie between
//! requests like a browser would. Shopify's token endpoint and Admin API
//! are stood in for by a `wiremock` server.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::header::{COOKIE, LOCATION, SET_COOKIE};
use axum::http::{Request, Response};
use axum::routing::get;
use axum::{middleware, Router};
use chrono::Utc;
use shopify_auth::auth::oauth::hmac::compute_signature;
use shopify_auth::auth::oauth::AuthQuery;
use shopify_auth::web::{login_required, session_layer, AuthState, CurrentShopUser};
use shopify_auth::{
    ApiKey, ApiSecretKey, AppConfig, AppConfigBuilder, AuthBackend, HostUrl, MemoryShopUserStore,
};
use tower::ServiceExt;
use tower_sessions::MemoryStore;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const API_KEY: &str = "test-api-key";
pub const SECRET: &str = "test-secret";

/// Builds the app configuration used by every test, pointing Shopify calls
/// at `server`.
pub fn config_builder(server: &MockServer) -> AppConfigBuilder {
    AppConfig::builder()
        .app_name("Stock Sync")
        .api_key(ApiKey::new(API_KEY).unwrap())
        .api_secret_key(ApiSecretKey::new(SECRET).unwrap())
        .host(HostUrl::new("https://app.example.com").unwrap())
        .scopes("read_products".parse().unwrap())
        .api_host(HostUrl::new(server.uri()).unwrap())
}

/// Mounts a token endpoint returning `token`, expected to be hit
/// `expected_calls` times.
pub async fn mount_token_endpoint(server: &MockServer, token: &str, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/admin/oauth/access_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": token,
            "scope": "read_products"
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

/// Builds a callback URI for `shop` signed with `secret`.
pub fn signed_callback_uri(shop: &str, state: &str, secret: &str) -> String {
    let mut query = AuthQuery::from_pairs([
        ("code", "auth-code".to_string()),
        ("shop", shop.to_string()),
        ("state", state.to_string()),
        ("timestamp", Utc::now().timestamp().to_string()),
    ]);
    let hmac = compute_signature(&query.to_signable_string(), secret);
    query.set("hmac", hmac);

    let pairs = ["code", "hmac", "shop", "state", "timestamp"]
        .iter()
        .map(|key| format!("{key}={}", urlencoding::encode(query.get(key).unwrap())))
        .collect::<Vec<_>>()
        .join("&");
    format!("/finalize?{pairs}")
}

async fn home(CurrentShopUser(user): CurrentShopUser) -> String {
    format!("Hello {}", user.shop_domain)
}

/// A browser talking to the app.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryShopUserStore>,
    pub auth: AuthState,
    cookie: Option<String>,
}

impl TestApp {
    pub fn new(config: AppConfig) -> Self {
        let store = Arc::new(MemoryShopUserStore::new());
        let sessions = session_layer(MemoryStore::default(), &config);
        let auth = AuthState::new(config, AuthBackend::new(store.clone()));

        let router = Router::new()
            .route("/", get(home))
            .route("/reports", get(home))
            .route_layer(middleware::from_fn_with_state(auth.clone(), login_required))
            .merge(auth.router())
            .with_state(auth.clone())
            .layer(sessions);

        Self {
            router,
            store,
            auth,
            cookie: None,
        }
    }

    /// Sends a GET, keeping whatever session cookie the app sets.
    pub async fn get(&mut self, uri: &str) -> Response<Body> {
        let mut request = Request::builder().uri(uri);
        if let Some(cookie) = &self.cookie {
            request = request.header(COOKIE, cookie);
        }

        let response = self
            .router
            .clone()
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap();

        if let Some(set_cookie) = response.headers().get(SET_COOKIE) {
            let pair = set_cookie.to_str().unwrap().split(';').next().unwrap();
            self.cookie = Some(pair.to_string());
        }
        response
    }

    /// Starts the flow for `shop` and returns the issued state nonce.
    pub async fn begin(&mut self, shop: &str) -> String {
        let response = self.get(&format!("/authenticate?shop={shop}")).await;
        assert!(response.status().is_redirection());
        state_from(&location(&response))
    }

    /// Runs a complete, valid flow for `shop`.
    pub async fn login(&mut self, shop: &str) -> Response<Body> {
        let state = self.begin(shop).await;
        self.get(&signed_callback_uri(shop, &state, SECRET)).await
    }
}

pub fn location(response: &Response<Body>) -> String {
    response
        .headers()
        .get(LOCATION)
        .expect("response should redirect")
        .to_str()
        .unwrap()
        .to_string()
}

pub fn state_from(auth_url: &str) -> String {
    auth_url
        .split("state=")
        .nth(1)
        .and_then(|rest| rest.split('&').next())
        .expect("authorization URL should carry a state")
        .to_string()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
