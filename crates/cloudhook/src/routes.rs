//! Hook routes this server exposes.

use axum::Json;
use cloudhook_gateway::{HookRequest, HookResponse, RouteRegistrar};
use cloudhook_runtime::TriggerType;
use serde_json::{json, Value};
use tracing::info;

const SCORE_CLASS: &str = "GameScore";

/// Declare every hook route on the registrar
pub fn declare(registrar: &mut RouteRegistrar) {
    registrar.function("hello", &["hello"], hello);
    registrar.trigger(
        Some(SCORE_CLASS),
        TriggerType::BeforeSave,
        &["score", "save", "before"],
        score_before_save,
    );
    registrar.trigger(
        Some(SCORE_CLASS),
        TriggerType::AfterSave,
        &["score", "save", "after"],
        score_after_save,
    );
    registrar.trigger(None, TriggerType::AfterSaveFile, &["file", "save", "after"], file_after_save);
}

async fn hello(Json(req): Json<HookRequest>) -> Json<HookResponse> {
    let name = req
        .params
        .as_ref()
        .and_then(|p| p.get("name"))
        .and_then(Value::as_str)
        .unwrap_or("world");
    Json(HookResponse::Success(json!(format!("Hello {}!", name))))
}

async fn score_before_save(Json(req): Json<HookRequest>) -> Json<HookResponse> {
    let Some(object) = req.object else {
        return Json(HookResponse::Error("missing object".to_string()));
    };
    match object.get("points").and_then(Value::as_i64) {
        Some(points) if points < 0 => {
            Json(HookResponse::Error("points cannot be negative".to_string()))
        }
        _ => Json(HookResponse::Success(object)),
    }
}

async fn score_after_save(Json(req): Json<HookRequest>) -> Json<HookResponse> {
    let id = req
        .object
        .as_ref()
        .and_then(|o| o.get("objectId"))
        .and_then(Value::as_str)
        .unwrap_or_default();
    info!(object_id = id, "GameScore saved");
    Json(HookResponse::Success(json!(true)))
}

async fn file_after_save(Json(req): Json<HookRequest>) -> Json<HookResponse> {
    let name = req
        .extra
        .get("file")
        .and_then(|f| f.get("name"))
        .and_then(Value::as_str)
        .unwrap_or_default();
    info!(file = name, "File saved");
    Json(HookResponse::Success(json!(true)))
}
