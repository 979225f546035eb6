use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::sync::Arc;
use subtle::ConstantTimeEq;

use crate::server::HEALTH_PATH;
use crate::types::HookResponse;

/// Header the backend uses to present the shared webhook key
pub const WEBHOOK_KEY_HEADER: &str = "X-Parse-Webhook-Key";

/// Shared webhook key state
#[derive(Clone)]
pub struct AuthConfig {
    pub webhook_key: Option<String>,
}

impl AuthConfig {
    pub fn new(webhook_key: Option<String>) -> Self {
        Self { webhook_key }
    }

    pub fn is_enabled(&self) -> bool {
        self.webhook_key.is_some()
    }

    /// Constant-time comparison against the configured key
    pub fn accepts(&self, presented: Option<&str>) -> bool {
        match (&self.webhook_key, presented) {
            (None, _) => true,
            (Some(expected), Some(key)) => key.as_bytes().ct_eq(expected.as_bytes()).into(),
            (Some(_), None) => false,
        }
    }
}

/// Rejects hook calls that do not carry the configured webhook key
pub async fn webhook_key_middleware(
    auth_config: Arc<AuthConfig>,
    request: Request,
    next: Next,
) -> Response {
    // Skip auth for health endpoint
    if request.uri().path() == HEALTH_PATH || !auth_config.is_enabled() {
        return next.run(request).await;
    }

    let presented = request
        .headers()
        .get(WEBHOOK_KEY_HEADER)
        .and_then(|h| h.to_str().ok());

    if auth_config.accepts(presented) {
        return next.run(request).await;
    }

    (
        StatusCode::UNAUTHORIZED,
        Json(HookResponse::Error("Unauthorized".to_string())),
    )
        .into_response()
}
