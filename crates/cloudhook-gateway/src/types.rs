use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Payload the backend posts to a hook endpoint.
///
/// Only the envelope is typed; object contents stay raw JSON.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HookRequest {
    #[serde(default)]
    pub master: bool,
    pub trigger_name: Option<String>,
    pub function_name: Option<String>,
    pub params: Option<Value>,
    pub object: Option<Value>,
    pub original: Option<Value>,
    pub user: Option<Value>,
    pub installation_id: Option<String>,
    pub ip: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Hook reply envelope: `{"success": ...}` or `{"error": "..."}`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HookResponse {
    Success(Value),
    Error(String),
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub registered_hooks: usize,
}
