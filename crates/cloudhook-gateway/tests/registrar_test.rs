//! Route declaration: routes are served immediately while hooks sync with the backends.


use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Json;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use cloudhook_gateway::{create_router, remove_hooks, HookRequest, HookResponse, RouteRegistrar};
use cloudhook_runtime::{HookService, TriggerKey, TriggerType};
use test_helpers::*;

async fn hello(Json(req): Json<HookRequest>) -> Json<HookResponse> {
    let name = req
        .params
        .and_then(|p| p["name"].as_str().map(str::to_string))
        .unwrap_or_else(|| "world".to_string());
    Json(HookResponse::Success(json!(format!("Hello {}!", name))))
}

async fn before_save(Json(req): Json<HookRequest>) -> Json<HookResponse> {
    Json(HookResponse::Success(req.object.unwrap_or(Value::Null)))
}

async fn post_json(
    app: axum::Router,
    uri: &str,
    body: Value,
    webhook_key: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(key) = webhook_key {
        builder = builder.header(cloudhook_gateway::WEBHOOK_KEY_HEADER, key);
    }
    let req = builder.body(Body::from(body.to_string())).unwrap();

    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

// ── Unreachable backends ────────────────────────────────────────────────

#[tokio::test]
async fn test_route_served_when_every_server_unreachable() {
    let service = unreachable_service(&["http://s1/parse", "http://s2/parse"]);
    let (state, mut registrar) = make_test_state(service.clone(), None);

    let route = registrar.function("hello", &["hello"], hello);
    assert_eq!(route.path, "/hello");
    assert_eq!(route.url.as_deref(), Some("http://localhost:8081/hello"));
    assert_eq!(registrar.routes().len(), 1);

    registrar.wait_for_sync().await;
    assert!(service.registry().is_empty().await);

    let app = create_router(state, registrar);
    let (status, body) = post_json(app, "/hello", json!({"params": {"name": "cloud"}}), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": "Hello cloud!"}));
}

#[tokio::test]
async fn test_route_served_when_server_refuses_connections() {
    // Nothing listens on the discard port
    let service = rest_service(vec!["http://127.0.0.1:9/parse".to_string()]);
    let (state, mut registrar) = make_test_state(service.clone(), None);

    registrar.function("hello", &["hello"], hello);
    registrar.wait_for_sync().await;
    assert!(service.registry().is_empty().await);

    let app = create_router(state, registrar);
    let (status, _) = post_json(app, "/hello", json!({}), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_unresolvable_host_skips_sync_but_mounts_route() {
    let service = unreachable_service(&["http://s1/parse"]);
    let mut config = server_config();
    config.host = "bad host".to_string();
    let mut registrar = RouteRegistrar::new(service.clone(), &config);
    let state = cloudhook_gateway::AppState::new(service, None);

    let route = registrar.function("hello", &["hello"], hello);
    assert!(route.url.is_none());
    assert!(route.mounted);

    let app = create_router(state, registrar);
    let (status, _) = post_json(app, "/hello", json!({}), None).await;
    assert_eq!(status, StatusCode::OK);
}

// ── Rejected paths ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_capture_syntax_segments_are_not_mounted() {
    let service = unreachable_service(&["http://s1/parse"]);
    let (state, mut registrar) = make_test_state(service.clone(), None);

    let rejected: [&[&str]; 5] = [&[":id"], &["*rest"], &["{}"], &["score", "{id}"], &[]];
    for segments in rejected {
        let route = registrar.function("x", segments, hello);
        assert!(!route.mounted, "{:?} should not be mounted", segments);
        assert!(route.url.is_none());
    }
    registrar.function("hello", &["hello"], hello);
    registrar.wait_for_sync().await;

    let mounted: Vec<&str> = registrar
        .routes()
        .iter()
        .filter(|r| r.mounted)
        .map(|r| r.path.as_str())
        .collect();
    assert_eq!(mounted, vec!["/hello"]);

    let app = create_router(state, registrar);
    let (status, _) = post_json(app, "/hello", json!({}), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_duplicate_path_keeps_first_handler() {
    let backend = MockBackend::start().await;
    let s1 = backend.server("s1");
    let service = rest_service(vec![s1.clone()]);
    let (state, mut registrar) = make_test_state(service.clone(), None);

    let first = registrar.function("hello", &["hello"], hello);
    let second = registrar.trigger(Some("Score"), TriggerType::BeforeSave, &["hello"], before_save);
    assert!(first.mounted);
    assert!(!second.mounted);
    registrar.wait_for_sync().await;

    // Only the mounted declaration is registered remotely
    assert!(backend.get(&s1, &function_identity("hello")).is_some());
    assert!(backend
        .get(&s1, &trigger_identity("Score", "beforeSave"))
        .is_none());

    let app = create_router(state, registrar);
    let (status, body) = post_json(app, "/hello", json!({}), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": "Hello world!"}));
}

#[tokio::test]
async fn test_health_path_is_reserved() {
    let service = unreachable_service(&["http://s1/parse"]);
    let (state, mut registrar) = make_test_state(service, None);

    let route = registrar.function("health", &["health"], hello);
    assert!(!route.mounted);

    let app = create_router(state, registrar);
    let req = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    assert_eq!(app.oneshot(req).await.unwrap().status(), StatusCode::OK);
}

// ── Against the mock backend ────────────────────────────────────────────

#[tokio::test]
async fn test_function_registered_on_both_servers_with_conflict_recovery() {
    let backend = MockBackend::start().await;
    let s1 = backend.server("s1");
    let s2 = backend.server("s2");
    backend.seed(
        &s2,
        &function_identity("hello"),
        json!({"functionName": "hello", "url": "http://stale/hello"}),
    );

    let service = rest_service(vec![s1.clone(), s2.clone()]);
    let (_state, mut registrar) = make_test_state(service.clone(), None);

    registrar.function("hello", &["hello"], hello);
    registrar.wait_for_sync().await;

    assert_eq!(backend.methods_for(&s1), vec!["POST"]);
    assert_eq!(backend.methods_for(&s2), vec!["POST", "DELETE", "POST"]);

    let expected = "http://localhost:8081/hello";
    assert_eq!(
        backend.get(&s2, &function_identity("hello")).unwrap()["url"],
        expected
    );

    let functions = service.registry().functions().await;
    assert_eq!(functions[&s1]["hello"].url, expected);
    assert_eq!(functions[&s2]["hello"].url, expected);
}

#[tokio::test]
async fn test_trigger_redeclared_with_new_url_wins() {
    let backend = MockBackend::start().await;
    let s1 = backend.server("s1");
    let service = rest_service(vec![s1.clone()]);

    let (_state, mut first) = make_test_state(service.clone(), None);
    first.trigger(Some("Score"), TriggerType::BeforeSave, &["score", "v1"], before_save);
    first.wait_for_sync().await;

    let (_state, mut second) = make_test_state(service.clone(), None);
    second.trigger(Some("Score"), TriggerType::BeforeSave, &["score", "v2"], before_save);
    second.wait_for_sync().await;

    // Second create collides, then delete and recreate
    assert_eq!(backend.methods_for(&s1), vec!["POST", "POST", "DELETE", "POST"]);

    let remote = backend
        .get(&s1, &trigger_identity("Score", "beforeSave"))
        .unwrap();
    assert_eq!(remote["url"], "http://localhost:8081/score/v2");

    let key = TriggerKey {
        class_name: Some("Score".to_string()),
        trigger_type: TriggerType::BeforeSave,
    };
    let triggers = service.registry().triggers().await;
    assert_eq!(triggers[&s1].len(), 1);
    assert_eq!(triggers[&s1][&key].url, "http://localhost:8081/score/v2");
}

#[tokio::test]
async fn test_file_trigger_and_partial_failure() {
    let backend = MockBackend::start().await;
    let s1 = backend.server("s1");
    let dead = "http://127.0.0.1:9/parse".to_string();
    let service = rest_service(vec![s1.clone(), dead.clone()]);
    let (_state, mut registrar) = make_test_state(service.clone(), None);

    registrar.trigger(None, TriggerType::AfterSaveFile, &["file", "saved"], before_save);
    registrar.wait_for_sync().await;

    let remote = backend
        .get(&s1, &trigger_identity("@File", "afterSaveFile"))
        .unwrap();
    assert_eq!(remote["className"], "@File");

    let triggers = service.registry().triggers().await;
    assert_eq!(triggers[&s1].len(), 1);
    assert!(!triggers.contains_key(&dead));
}

#[tokio::test]
async fn test_fetch_all_lists_registered_hooks() {
    let backend = MockBackend::start().await;
    let s1 = backend.server("s1");
    let service = rest_service(vec![s1.clone()]);
    let (_state, mut registrar) = make_test_state(service.clone(), None);

    registrar.function("hello", &["hello"], hello);
    registrar.function("bye", &["bye"], hello);
    registrar.wait_for_sync().await;

    let listed = service
        .fetch_all(cloudhook_runtime::HookKind::Function)
        .await;
    assert_eq!(listed.len(), 1);
    let (server, hooks) = &listed[0];
    assert_eq!(server, &s1);
    assert_eq!(hooks.as_ref().unwrap().len(), 2);
}

#[tokio::test]
async fn test_delete_all_removes_remote_hooks() {
    let backend = MockBackend::start().await;
    let s1 = backend.server("s1");
    let service: HookService = rest_service(vec![s1.clone()]);
    let (_state, mut registrar) = make_test_state(service.clone(), None);

    registrar.function("hello", &["hello"], hello);
    registrar.trigger(Some("GameScore"), TriggerType::AfterSave, &["score"], before_save);
    registrar.wait_for_sync().await;
    assert_eq!(service.registry().len().await, 2);

    service.delete_all().await;

    assert!(backend.get(&s1, &function_identity("hello")).is_none());
    assert!(backend
        .get(&s1, &trigger_identity("GameScore", "afterSave"))
        .is_none());
    assert!(service.registry().is_empty().await);
}

#[tokio::test]
async fn test_remove_hooks_waits_for_pending_registrations() {
    let backend = MockBackend::start().await;
    let s1 = backend.server("s1");
    let service = rest_service(vec![s1.clone()]);
    let (_state, mut registrar) = make_test_state(service.clone(), None);

    registrar.function("hello", &["hello"], hello);
    registrar.trigger(Some("GameScore"), TriggerType::AfterSave, &["score"], before_save);

    // Registrations are still in flight when shutdown starts
    let pending = registrar.take_pending();
    assert_eq!(pending.len(), 2);
    remove_hooks(pending, &service).await;

    assert!(backend.get(&s1, &function_identity("hello")).is_none());
    assert!(backend
        .get(&s1, &trigger_identity("GameScore", "afterSave"))
        .is_none());
    assert!(service.registry().is_empty().await);
}

// ── Request limits ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_oversized_body_rejected() {
    let service = unreachable_service(&["http://s1/parse"]);
    let (state, mut registrar) = make_test_state(service, None);
    registrar.function("hello", &["hello"], hello);

    let app = create_router(state, registrar);
    let big = "x".repeat(4096);
    let (status, _) = post_json(app, "/hello", json!({"params": {"name": big}}), None).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
}
