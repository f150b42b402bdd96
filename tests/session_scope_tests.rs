//! Admin API calls made through a shop's scoped session.

use shopify_auth::clients::{self, HttpError, HttpMethod, HttpRequest, ShopSession};
use shopify_auth::{
    AccessToken, ApiKey, ApiSecretKey, ApiVersion, AppConfig, AuthScopes, HostUrl, ShopDomain,
    ShopUser,
};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> AppConfig {
    AppConfig::builder()
        .api_key(ApiKey::new("test-api-key").unwrap())
        .api_secret_key(ApiSecretKey::new("test-secret").unwrap())
        .api_host(HostUrl::new(server.uri()).unwrap())
        .user_agent_prefix("StockSync/1.0")
        .build()
        .unwrap()
}

fn user(shop: &str, token: &str) -> ShopUser {
    ShopUser::new(
        ShopDomain::new(shop).unwrap(),
        AccessToken::new(token).unwrap(),
        AuthScopes::new(),
    )
}

fn shop_json() -> String {
    format!("/admin/api/{}/shop.json", ApiVersion::latest())
}

#[tokio::test]
async fn test_request_uses_the_scoped_shop_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(shop_json()))
        .and(header("X-Shopify-Access-Token", "shpat_acme"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"shop": {"name": "Acme"}})),
        )
        .expect(1)
        .mount(&server)
        .await;
    let config = config_for(&server);

    let response = user("acme", "shpat_acme")
        .session(&config)
        .scope(async {
            let request = HttpRequest::builder(HttpMethod::Get, "shop.json").build()?;
            clients::request(request).await
        })
        .await
        .unwrap();

    assert_eq!(response.code, 200);
    assert_eq!(response.body["shop"]["name"], "Acme");
}

#[tokio::test]
async fn test_request_outside_scope_fails() {
    let request = HttpRequest::builder(HttpMethod::Get, "shop.json")
        .build()
        .unwrap();

    let result = clients::request(request).await;

    assert!(matches!(result, Err(HttpError::NoActiveSession)));
}

#[tokio::test]
async fn test_concurrent_scopes_keep_their_own_shop() {
    let server = MockServer::start().await;
    for (token, name) in [("shpat_acme", "Acme"), ("shpat_globex", "Globex")] {
        Mock::given(method("GET"))
            .and(path(shop_json()))
            .and(header("X-Shopify-Access-Token", token))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"shop": {"name": name}})),
            )
            .mount(&server)
            .await;
    }
    let config = config_for(&server);

    let fetch_name = |session: ShopSession| async move {
        session
            .scope(async {
                let request = HttpRequest::builder(HttpMethod::Get, "shop.json").build()?;
                let response = clients::request(request).await?;
                Ok::<_, HttpError>(response.body["shop"]["name"].as_str().map(str::to_string))
            })
            .await
    };

    let acme = tokio::spawn(fetch_name(user("acme", "shpat_acme").session(&config)));
    let globex = tokio::spawn(fetch_name(user("globex", "shpat_globex").session(&config)));

    assert_eq!(acme.await.unwrap().unwrap().as_deref(), Some("Acme"));
    assert_eq!(globex.await.unwrap().unwrap().as_deref(), Some("Globex"));
}

#[tokio::test]
async fn test_failed_request_restores_outer_scope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(shop_json()))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "errors": "Not Found"
        })))
        .mount(&server)
        .await;
    let config = config_for(&server);

    let outer = user("acme", "shpat_acme").session(&config);
    let inner = user("globex", "shpat_globex").session(&config);

    let shop_after_error = outer
        .scope(async {
            let result = inner
                .scope(async {
                    let request = HttpRequest::builder(HttpMethod::Get, "shop.json").build()?;
                    clients::request(request).await
                })
                .await;
            assert!(matches!(result, Err(HttpError::Response { code: 404, .. })));
            ShopSession::current().map(|s| s.shop().to_string())
        })
        .await;

    assert_eq!(shop_after_error.as_deref(), Some("acme.myshopify.com"));
    assert!(ShopSession::current().is_none());
}

#[tokio::test]
async fn test_user_agent_carries_app_prefix() {
    let server = MockServer::start().await;
    let config = config_for(&server);

    let client = user("acme", "shpat_acme").session(&config).client().unwrap();
    let user_agent = &client.default_headers()["User-Agent"];

    assert!(user_agent.starts_with("StockSync/1.0 | shopify-auth v"));
}
