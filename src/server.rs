// src/server.rs

//! The HTTP surface: discovery, JWKS, and the authorization endpoint.
//!
//! Handlers stay thin; all protocol logic lives in the core modules. The
//! discovery document and JWK Set are built once at startup and served
//! verbatim, so every route here is read-only except `/authorize`.

use crate::discovery::DiscoveryDocument;
use crate::error::ProviderError;
use crate::issuer::{IssuedToken, TokenIssuer};
use crate::request;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::error;

/// Path the JWK Set is served from, referenced by the discovery document.
pub const JWKS_PATH: &str = "/jwks.json";

/// Path of the authorization endpoint.
pub const AUTH_PATH: &str = "/authorize";

/// Read-mostly state shared across all requests.
pub struct AppState {
    pub discovery: DiscoveryDocument,
    pub jwks: Value,
    pub issuer: TokenIssuer,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/.well-known/openid-configuration", get(discovery_doc))
        .route(JWKS_PATH, get(key_set))
        .route(AUTH_PATH, post(authorize))
        .with_state(state)
}

async fn index() -> &'static str {
    "Hello, World!"
}

async fn discovery_doc(State(state): State<Arc<AppState>>) -> Json<DiscoveryDocument> {
    Json(state.discovery.clone())
}

async fn key_set(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(state.jwks.clone())
}

async fn authorize(State(state): State<Arc<AppState>>, body: String) -> Response {
    let request = match request::parse_form(&body) {
        Ok(request) => request,
        Err(e) => return e.into_response(),
    };

    match state.issuer.authorize(request).await {
        Ok(issued) => form_post_page(&issued).into_response(),
        Err(e) => e.into_response(),
    }
}

impl IntoResponse for ProviderError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ProviderError::MissingField(_)
            | ProviderError::InvalidValue(_)
            | ProviderError::Transport(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ProviderError::AuthenticationFailed(_) => {
                (StatusCode::UNAUTHORIZED, self.to_string())
            }
            // Signing and startup failures stay internal.
            _ => {
                error!(error = %self, "internal error while handling request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        let body = json!({
            "error": self.kind(),
            "message": message,
        });

        (status, Json(body)).into_response()
    }
}

/// Renders the self-submitting HTML form that delivers the token to the
/// relying party's redirect_uri, per the OAuth 2.0 Form Post Response Mode.
/// `state` travels next to the token, never inside it.
fn form_post_page(issued: &IssuedToken) -> Html<String> {
    let mut fields = format!(
        r#"<input type="hidden" name="id_token" value="{}">"#,
        escape_html(&issued.id_token)
    );
    if let Some(state) = &issued.state {
        fields.push_str(&format!(
            r#"<input type="hidden" name="state" value="{}">"#,
            escape_html(state)
        ));
    }

    Html(format!(
        "<!DOCTYPE html>\n<html>\n<head><title>Submitting&hellip;</title></head>\n\
         <body onload=\"document.forms[0].submit()\">\n\
         <form method=\"post\" action=\"{action}\">\n{fields}\n\
         <noscript><button type=\"submit\">Continue</button></noscript>\n\
         </form>\n</body>\n</html>\n",
        action = escape_html(&issued.redirect_uri),
        fields = fields,
    ))
}

// State and nonce are opaque caller-supplied strings, so everything
// interpolated into the page is escaped.
fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
