//! Login route handlers.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::auth::oauth::{begin_auth, validate_auth_callback, AuthQuery, OAuthError, StateParam};
use crate::config::{is_local_path, ShopDomain};
use crate::web::error::WebError;
use crate::web::templates::{render, IframeRedirectTemplate, LoginTemplate};
use crate::web::{AuthState, SESSION_NEXT_KEY, SESSION_STATE_KEY};

#[derive(Debug, Default, Deserialize)]
pub struct LoginParams {
    shop: Option<String>,
    next: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AuthenticateParams {
    #[serde(default)]
    shop: String,
}

/// `GET /login`: the shop form, or straight on to Shopify when `shop` is
/// already known.
#[instrument(skip(state, session))]
pub async fn login(
    State(state): State<AuthState>,
    session: Session,
    Query(params): Query<LoginParams>,
) -> Response {
    if let Some(next) = params.next.as_deref() {
        if is_local_path(next) {
            if let Err(e) = session.insert(SESSION_NEXT_KEY, next.to_string()).await {
                return WebError::from(e).into_page(&state);
            }
        } else {
            tracing::warn!(next, "Ignoring non-local return address");
        }
    }

    match params.shop.as_deref().map(str::trim) {
        Some(shop) if !shop.is_empty() => {
            let target = format!(
                "{}?shop={}",
                state.paths().authenticate,
                urlencoding::encode(shop)
            );
            Redirect::to(&target).into_response()
        }
        _ => login_page(&state, StatusCode::OK, String::new(), None),
    }
}

/// `GET /authenticate?shop=`: starts the OAuth flow, or logs in directly in
/// dev mode.
///
/// Dev mode skips Shopify but still validates the shop name. An invalid name
/// re-renders the login page with 400 in both modes.
#[instrument(skip(state, session))]
pub async fn authenticate(
    State(state): State<AuthState>,
    session: Session,
    Query(params): Query<AuthenticateParams>,
) -> Response {
    let shop = params.shop.trim();
    match begin(&state, &session, shop).await {
        Ok(response) => response,
        Err(WebError::OAuth(OAuthError::InvalidShopDomain { domain })) => {
            tracing::warn!(domain = %domain, "Rejected shop domain on login");
            login_page(
                &state,
                StatusCode::BAD_REQUEST,
                shop.to_string(),
                Some(format!("'{domain}' is not a valid myshopify.com domain.")),
            )
        }
        Err(e) => e.into_page(&state),
    }
}

async fn begin(state: &AuthState, session: &Session, shop: &str) -> Result<Response, WebError> {
    let config = state.config();

    if config.dev_mode() {
        let domain = ShopDomain::new(shop).map_err(|_| OAuthError::InvalidShopDomain {
            domain: shop.to_string(),
        })?;
        let user = state.backend().dev_login(config, &domain).await?;
        state.backend().login(session, &user).await?;
        return Ok(Redirect::to(&post_login_target(state, session).await?).into_response());
    }

    let started = begin_auth(config, shop)?;
    session.insert(SESSION_STATE_KEY, &started.state).await?;
    tracing::info!(shop = %started.shop, "Redirecting to Shopify for authorization");

    if config.is_embedded() {
        return Ok(render(
            StatusCode::OK,
            &IframeRedirectTemplate {
                app_name: config.app_name().to_string(),
                redirect_url: started.auth_url,
            },
        ));
    }
    Ok(Redirect::to(&started.auth_url).into_response())
}

/// OAuth callback: verifies the request, records the token and logs the
/// shop in.
#[instrument(skip_all)]
pub async fn finalize(
    State(state): State<AuthState>,
    session: Session,
    Query(query): Query<AuthQuery>,
) -> Response {
    match complete(&state, &session, &query).await {
        Ok(target) => Redirect::to(&target).into_response(),
        Err(e) => e.into_page(&state),
    }
}

async fn complete(
    state: &AuthState,
    session: &Session,
    query: &AuthQuery,
) -> Result<String, WebError> {
    let expected = session.remove::<StateParam>(SESSION_STATE_KEY).await?;

    let verified =
        validate_auth_callback(state.http(), state.config(), query, expected.as_ref()).await?;

    let user = state
        .backend()
        .authenticate(
            &verified.shop,
            verified.token.access_token.as_ref(),
            verified.token.scopes,
        )
        .await?;
    state.backend().login(session, &user).await?;
    tracing::info!(shop = %user.shop_domain, "Shop authenticated");

    post_login_target(state, session).await
}

/// `GET /logout`
#[instrument(skip(state, session))]
pub async fn logout(State(state): State<AuthState>, session: Session) -> Response {
    match state.backend().logout(&session).await {
        Ok(()) => Redirect::to(&state.paths().login).into_response(),
        Err(e) => WebError::from(e).into_page(&state),
    }
}

async fn post_login_target(state: &AuthState, session: &Session) -> Result<String, WebError> {
    Ok(session
        .remove::<String>(SESSION_NEXT_KEY)
        .await?
        .filter(|next| is_local_path(next))
        .unwrap_or_else(|| state.config().login_redirect_url().to_string()))
}

fn login_page(state: &AuthState, status: StatusCode, shop: String, error: Option<String>) -> Response {
    let config = state.config();
    render(
        status,
        &LoginTemplate {
            app_name: config.app_name().to_string(),
            authenticate_path: state.paths().authenticate.clone(),
            shop,
            error,
            dev_mode: config.dev_mode(),
        },
    )
}
