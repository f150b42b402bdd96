//! HTTP responses for failed logins.
//!
//! Security-relevant failures get a generic page; their detail only goes
//! to the logs.
//!
//! | Error | Status | Page |
//! |---|---|---|
//! | invalid shop, state, signature or callback | 400 | "could not be verified" |
//! | token exchange failed | 502 | "please try again" |
//! | user deactivated | 403 | "access denied" |
//! | anything else | 500 | "something went wrong" |

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::auth::oauth::OAuthError;
use crate::web::templates::{render, ErrorTemplate};
use crate::web::{AuthState, RoutePaths};

/// Error returned by the login routes and the access gate.
#[derive(Debug, Error)]
pub enum WebError {
    /// The OAuth flow or the backend failed.
    #[error(transparent)]
    OAuth(#[from] OAuthError),

    /// The browser session could not be read or written.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

impl WebError {
    /// Returns the status code for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::OAuth(
                OAuthError::InvalidShopDomain { .. }
                | OAuthError::InvalidState { .. }
                | OAuthError::InvalidSignature { .. }
                | OAuthError::InvalidCallback { .. },
            ) => StatusCode::BAD_REQUEST,
            Self::OAuth(OAuthError::TokenExchangeFailed { .. }) => StatusCode::BAD_GATEWAY,
            Self::OAuth(OAuthError::UserDeactivated { .. }) => StatusCode::FORBIDDEN,
            Self::OAuth(
                OAuthError::MissingHostConfig | OAuthError::Session(_) | OAuthError::Store(_),
            )
            | Self::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn page(&self) -> (&'static str, &'static str) {
        match self.status() {
            StatusCode::BAD_REQUEST => (
                "Login could not be verified",
                "This login request could not be verified. Please start again from your Shopify admin.",
            ),
            StatusCode::BAD_GATEWAY => (
                "Shopify is not responding",
                "Shopify could not complete the login. Please try again in a moment.",
            ),
            StatusCode::FORBIDDEN => (
                "Access denied",
                "This shop's access to the app has been deactivated.",
            ),
            _ => (
                "Something went wrong",
                "An unexpected error occurred. Please try again later.",
            ),
        }
    }

    fn log(&self) {
        match self {
            Self::OAuth(e) if e.is_suspicious() => {
                tracing::warn!(error = %e, "Rejected login request");
            }
            Self::OAuth(e @ OAuthError::UserDeactivated { .. }) => {
                tracing::warn!(error = %e, "Refused deactivated shop");
            }
            e => tracing::error!(error = %e, "Login failed"),
        }
    }

    /// Renders the error page with the app's name and login path.
    #[must_use]
    pub fn into_page(self, state: &AuthState) -> Response {
        self.respond(state.config().app_name(), &state.paths().login)
    }

    fn respond(self, app_name: &str, login_path: &str) -> Response {
        self.log();
        let (title, message) = self.page();
        render(
            self.status(),
            &ErrorTemplate {
                app_name: app_name.to_string(),
                title,
                message,
                login_path: login_path.to_string(),
            },
        )
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        self.respond("", &RoutePaths::default().login)
    }
}
