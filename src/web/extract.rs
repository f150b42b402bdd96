//! Gating handlers behind a logged-in shop.
//!
//! [`login_required`] wraps whole routers or single routes; it puts the
//! [`ShopUser`] into request extensions for handlers to pick up with
//! [`CurrentShopUser`]. The extractor also works alone, performing the same
//! check itself.
//!
//! Anonymous requests are redirected to the login page with the requested
//! path in `next`. Shopify's `shop`, `hmac`, `timestamp` and `signature`
//! parameters are carried over, so an embedded app opened from the Shopify
//! admin restarts the flow without asking for the shop name.

use axum::extract::{FromRef, FromRequestParts, Query, Request, State};
use axum::http::request::Parts;
use axum::http::Uri;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use tower_sessions::Session;

use crate::user::ShopUser;
use crate::web::error::WebError;
use crate::web::{AuthState, RoutePaths};

const FORWARDED_PARAMS: [&str; 4] = ["shop", "timestamp", "signature", "hmac"];

/// Builds the login URL for an anonymous request to `uri`.
///
/// ```rust
/// use axum::http::Uri;
/// use shopify_auth::web::{login_redirect_url, RoutePaths};
///
/// let uri: Uri = "/orders?page=2&shop=acme.myshopify.com".parse().unwrap();
/// assert_eq!(
///     login_redirect_url(&RoutePaths::default(), &uri),
///     "/login?shop=acme.myshopify.com&next=%2Forders%3Fpage%3D2%26shop%3Dacme.myshopify.com"
/// );
/// ```
#[must_use]
pub fn login_redirect_url(paths: &RoutePaths, uri: &Uri) -> String {
    let mut params: Vec<(String, String)> = Query::<Vec<(String, String)>>::try_from_uri(uri)
        .map(|Query(pairs)| pairs)
        .unwrap_or_default()
        .into_iter()
        .filter(|(k, _)| FORWARDED_PARAMS.contains(&k.as_str()))
        .collect();

    let next = uri
        .path_and_query()
        .map_or_else(|| uri.path().to_string(), ToString::to_string);
    params.push(("next".to_string(), next));

    let query = params
        .iter()
        .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");

    format!("{}?{query}", paths.login)
}

async fn resolve_user(
    state: &AuthState,
    session: &Session,
    uri: &Uri,
) -> Result<ShopUser, Response> {
    match state.backend().current_user(session).await {
        Ok(Some(user)) => Ok(user),
        Ok(None) => {
            tracing::debug!(path = %uri.path(), "Anonymous request, redirecting to login");
            Err(Redirect::to(&login_redirect_url(state.paths(), uri)).into_response())
        }
        Err(e) => Err(WebError::from(e).into_page(state)),
    }
}

/// Middleware that lets only logged-in shops through.
///
/// ```rust,ignore
/// let protected = Router::new()
///     .route("/", get(home))
///     .route_layer(axum::middleware::from_fn_with_state(auth.clone(), login_required));
/// ```
pub async fn login_required(
    State(state): State<AuthState>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Response {
    match resolve_user(&state, &session, request.uri()).await {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(response) => response,
    }
}

/// The logged-in shop user.
///
/// ```rust,ignore
/// async fn home(CurrentShopUser(user): CurrentShopUser) -> String {
///     format!("Hello {}", user.short_name())
/// }
/// ```
#[derive(Clone, Debug)]
pub struct CurrentShopUser(pub ShopUser);

impl<S> FromRequestParts<S> for CurrentShopUser
where
    AuthState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<ShopUser>() {
            return Ok(Self(user.clone()));
        }

        let auth = AuthState::from_ref(state);
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;

        resolve_user(&auth, &session, &parts.uri).await.map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_redirect_preserves_path_only() {
        let uri: Uri = "/reports".parse().unwrap();
        assert_eq!(
            login_redirect_url(&RoutePaths::default(), &uri),
            "/login?next=%2Freports"
        );
    }

    #[test]
    fn test_login_redirect_forwards_shopify_params_only() {
        let uri: Uri = "/?hmac=abc&timestamp=1&shop=acme.myshopify.com&other=x"
            .parse()
            .unwrap();
        let url = login_redirect_url(&RoutePaths::default(), &uri);

        assert!(url.starts_with("/login?hmac=abc&timestamp=1&shop=acme.myshopify.com&next="));
        assert!(!url.contains("other=x&"));
    }

    #[test]
    fn test_login_redirect_uses_configured_path() {
        let paths = RoutePaths {
            login: "/shopify/login".to_string(),
            ..RoutePaths::default()
        };
        let uri: Uri = "/".parse().unwrap();
        assert_eq!(login_redirect_url(&paths, &uri), "/shopify/login?next=%2F");
    }
}
