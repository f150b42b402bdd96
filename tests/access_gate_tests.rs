//! The login gate in front of app routes.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::routing::get;
use axum::Router;
use common::{body_text, config_builder, location, mount_token_endpoint, TestApp};
use shopify_auth::web::{AppContext, AuthState, CurrentShopUser};
use shopify_auth::{AuthBackend, MemoryShopUserStore};
use std::sync::Arc;
use tower::ServiceExt;
use tower_sessions::{MemoryStore, SessionManagerLayer};
use wiremock::MockServer;

#[tokio::test]
async fn test_anonymous_request_is_sent_to_login_with_next() {
    let server = MockServer::start().await;
    let mut app = TestApp::new(config_builder(&server).build().unwrap());

    let response = app.get("/reports?range=week").await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login?next=%2Freports%3Frange%3Dweek");
}

#[tokio::test]
async fn test_embedded_load_forwards_shopify_params_to_login() {
    let server = MockServer::start().await;
    let mut app = TestApp::new(config_builder(&server).build().unwrap());

    let response = app
        .get("/?shop=acme.myshopify.com&hmac=abc&timestamp=1700000000&host=xyz")
        .await;

    let url = location(&response);
    assert!(url.starts_with("/login?shop=acme.myshopify.com&hmac=abc&timestamp=1700000000&next="));

    let next = app.get(&url).await;
    assert_eq!(location(&next), "/authenticate?shop=acme.myshopify.com");
}

#[tokio::test]
async fn test_logged_in_request_reaches_handler() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, "shpat_fresh", 1).await;
    let mut app = TestApp::new(config_builder(&server).build().unwrap());

    app.login("acme").await;
    let response = app.get("/reports").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "Hello acme.myshopify.com");
}

#[tokio::test]
async fn test_extractors_work_without_middleware() {
    let server = MockServer::start().await;
    let config = config_builder(&server).is_embedded(true).build().unwrap();
    let auth = AuthState::new(config, AuthBackend::new(Arc::new(MemoryShopUserStore::new())));

    async fn whoami(context: AppContext, CurrentShopUser(user): CurrentShopUser) -> String {
        format!("{} {}", context.app_name, user.shop_domain)
    }
    async fn about(context: AppContext) -> String {
        format!("{} embedded={} shop={:?}", context.api_key, context.is_embedded, context.shop)
    }

    let router = Router::new()
        .route("/whoami", get(whoami))
        .route("/about", get(about))
        .with_state(auth)
        .layer(SessionManagerLayer::new(MemoryStore::default()));

    let gated = router
        .clone()
        .oneshot(Request::builder().uri("/whoami").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(location(&gated), "/login?next=%2Fwhoami");

    let open = router
        .oneshot(Request::builder().uri("/about").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(open.status(), StatusCode::OK);
    assert_eq!(
        body_text(open).await,
        "test-api-key embedded=true shop=None"
    );
}
