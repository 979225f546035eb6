//! Tests for the webhook key middleware (401 on missing/invalid key) and health route.


use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Json;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use cloudhook_gateway::{create_router, AppState, HookResponse, WEBHOOK_KEY_HEADER};
use test_helpers::{make_test_state, unreachable_service};

async fn ping() -> Json<HookResponse> {
    Json(HookResponse::Success(json!("pong")))
}

fn make_app(webhook_key: Option<&str>) -> axum::Router {
    let (state, mut registrar) = make_test_state(unreachable_service(&["http://s1/parse"]), webhook_key);
    registrar.function("ping", &["ping"], ping);
    create_router(state, registrar)
}

// ── Webhook key ─────────────────────────────────────────────────────────

async fn hook_call(key: Option<&str>, app: axum::Router) -> StatusCode {
    let mut builder = Request::builder().method("POST").uri("/ping");
    if let Some(k) = key {
        builder = builder.header(WEBHOOK_KEY_HEADER, k);
    }
    let req = builder.body(Body::empty()).unwrap();
    app.oneshot(req).await.unwrap().status()
}

#[tokio::test]
async fn test_missing_key_returns_401() {
    let status = hook_call(None, make_app(Some("webhookKey"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_invalid_key_returns_401() {
    let status = hook_call(Some("wrong"), make_app(Some("webhookKey"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_valid_key_returns_ok() {
    let status = hook_call(Some("webhookKey"), make_app(Some("webhookKey"))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_no_key_configured_allows_calls() {
    let status = hook_call(None, make_app(None)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_unauthorized_body_uses_error_envelope() {
    let app = make_app(Some("webhookKey"));
    let req = Request::builder()
        .method("POST")
        .uri("/ping")
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, json!({"error": "Unauthorized"}));
}

// ── Health ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_health_bypasses_key_and_reports_count() {
    let app = make_app(Some("webhookKey"));

    let req = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["registered_hooks"], 0);
}

#[tokio::test]
async fn test_unknown_route_is_404_with_key() {
    let (state, registrar): (AppState, _) =
        make_test_state(unreachable_service(&["http://s1/parse"]), Some("k"));
    let app = create_router(state, registrar);

    let req = Request::builder()
        .method("POST")
        .uri("/missing")
        .header(WEBHOOK_KEY_HEADER, "k")
        .body(Body::empty())
        .unwrap();
    assert_eq!(app.oneshot(req).await.unwrap().status(), StatusCode::NOT_FOUND);
}
