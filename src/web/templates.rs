//! HTML pages rendered by the login routes.

use askama::Template;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

/// The shop name form.
#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub app_name: String,
    pub authenticate_path: String,
    pub shop: String,
    pub error: Option<String>,
    pub dev_mode: bool,
}

/// Top-level redirect out of the Shopify admin iframe.
#[derive(Template)]
#[template(path = "iframe_redirect.html")]
pub struct IframeRedirectTemplate {
    pub app_name: String,
    pub redirect_url: String,
}

/// Generic failure page.
#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub app_name: String,
    pub title: &'static str,
    pub message: &'static str,
    pub login_path: String,
}

/// Renders `template` with `status`, falling back to plain text if
/// rendering fails.
pub fn render<T: Template>(status: StatusCode, template: &T) -> Response {
    match template.render() {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Template render error");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}
