//! Demo server: Shopify login in front of a couple of protected pages.
//!
//! Reads its configuration from the environment (see
//! [`AppConfig::from_env`]) and keeps shop users and sessions in memory.

use std::sync::Arc;

use anyhow::Context;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{middleware, Json, Router};
use shopify_auth::clients::{self, HttpMethod, HttpRequest};
use shopify_auth::web::{
    login_required, session_layer, AppContext, AuthState, CurrentShopUser,
};
use shopify_auth::{AppConfig, AuthBackend, MemoryShopUserStore};
use tower_http::trace::TraceLayer;
use tower_sessions::MemoryStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging()?;

    let config = AppConfig::from_env().context("Failed to load configuration")?;
    tracing::info!(
        app = config.app_name(),
        embedded = config.is_embedded(),
        dev_mode = config.dev_mode(),
        "Starting Shopify auth demo"
    );

    let sessions = session_layer(MemoryStore::default(), &config);
    let backend = AuthBackend::new(Arc::new(MemoryShopUserStore::new()));
    let auth = AuthState::new(config, backend);

    let protected = Router::new()
        .route("/", get(home))
        .route("/shop", get(shop_details))
        .route_layer(middleware::from_fn_with_state(auth.clone(), login_required));

    let app = Router::new()
        .merge(protected)
        .merge(auth.router())
        .with_state(auth)
        .layer(sessions)
        .layer(TraceLayer::new_for_http());

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

async fn home(context: AppContext, CurrentShopUser(user): CurrentShopUser) -> String {
    format!(
        "{}: logged in as {} ({})",
        context.app_name,
        user.short_name(),
        user.scopes
    )
}

/// Fetches `shop.json` through the logged-in shop's API session.
async fn shop_details(
    State(auth): State<AuthState>,
    CurrentShopUser(user): CurrentShopUser,
) -> Response {
    let result = user
        .session(auth.config())
        .scope(async {
            let request = HttpRequest::builder(HttpMethod::Get, "shop.json").build()?;
            clients::request(request).await
        })
        .await;

    match result {
        Ok(response) => Json(response.body).into_response(),
        Err(e) => {
            tracing::error!(error = %e, shop = %user.shop_domain, "Admin API call failed");
            (StatusCode::BAD_GATEWAY, "Shopify request failed").into_response()
        }
    }
}

fn init_logging() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("shopify_auth=debug,info"))
        .context("Invalid log filter")?;

    let json = std::env::var("LOG_FORMAT").is_ok_and(|format| format == "json");
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_target(false))
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
    Ok(())
}
