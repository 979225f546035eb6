use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, Method, StatusCode, Url};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

use super::client::RemoteHookClient;
use super::error::{RemoteError, RemoteErrorKind};
use super::types::{Hook, HookFunction, HookKind, HookTrigger, HookVerb};
use crate::config::BackendConfig;

const APPLICATION_ID_HEADER: &str = "X-Parse-Application-Id";
const PRIMARY_KEY_HEADER: &str = "X-Parse-Master-Key";

/// Backend error codes relevant to hook management
const CODE_OBJECT_NOT_FOUND: i64 = 101;
const CODE_INVALID_JSON: i64 = 107;
const CODE_WEBHOOK_ERROR: i64 = 143;

/// REST client for the backend's `/hooks` API
pub struct RestHookClient {
    client: Client,
    application_id: String,
    primary_key: String,
}

impl RestHookClient {
    pub fn new(application_id: &str, primary_key: &str, timeout: Duration) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            application_id: application_id.to_string(),
            primary_key: primary_key.to_string(),
        })
    }

    pub fn from_config(config: &BackendConfig) -> Result<Self> {
        Self::new(
            &config.application_id,
            &config.primary_key,
            config.request_timeout(),
        )
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<Value>,
        server: &str,
    ) -> Result<Value, RemoteError> {
        debug!(method = %method, url = %url, "Hook request");

        let mut request = self
            .client
            .request(method, url)
            .header(APPLICATION_ID_HEADER, &self.application_id)
            .header(PRIMARY_KEY_HEADER, &self.primary_key);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| transport_error(e, server))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| transport_error(e, server))?;

        if !status.is_success() {
            return Err(classify_failure(status, &text, server));
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| {
            RemoteError::new(
                RemoteErrorKind::InvalidPayload,
                server,
                format!("undecodable response: {}", e),
            )
        })
    }
}

#[async_trait]
impl RemoteHookClient for RestHookClient {
    async fn perform(
        &self,
        verb: HookVerb,
        hook: &Hook,
        server: &str,
    ) -> Result<Option<Hook>, RemoteError> {
        let (method, url, body) = match verb {
            HookVerb::Fetch => (Method::GET, item_url(server, hook)?, None),
            HookVerb::Create => (
                Method::POST,
                collection_url(server, hook.kind())?,
                Some(create_body(hook)),
            ),
            HookVerb::Update => (
                Method::PUT,
                item_url(server, hook)?,
                Some(json!({ "url": hook.url() })),
            ),
            HookVerb::Delete => (
                Method::PUT,
                item_url(server, hook)?,
                Some(json!({ "__op": "Delete" })),
            ),
        };

        let value = self.send(method, url, body, server).await?;
        if verb == HookVerb::Delete {
            return Ok(None);
        }
        decode_hook(hook.kind(), value, server).map(Some)
    }

    async fn fetch_all(&self, kind: HookKind, server: &str) -> Result<Vec<Hook>, RemoteError> {
        let url = collection_url(server, kind)?;
        let value = self.send(Method::GET, url, None, server).await?;

        let items = match value {
            Value::Array(items) => items,
            Value::Null => Vec::new(),
            other => {
                return Err(RemoteError::new(
                    RemoteErrorKind::InvalidPayload,
                    server,
                    format!("expected an array, got {}", other),
                ))
            }
        };

        items
            .into_iter()
            .map(|item| decode_hook(kind, item, server))
            .collect()
    }
}

fn collection_segment(kind: HookKind) -> &'static str {
    match kind {
        HookKind::Function => "functions",
        HookKind::Trigger => "triggers",
    }
}

fn server_url(server: &str, segments: &[&str]) -> Result<Url, RemoteError> {
    let mut url = Url::parse(server).map_err(|e| {
        RemoteError::new(RemoteErrorKind::Other, server, format!("invalid server url: {}", e))
    })?;
    url.path_segments_mut()
        .map_err(|_| RemoteError::new(RemoteErrorKind::Other, server, "server url cannot be a base"))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

fn collection_url(server: &str, kind: HookKind) -> Result<Url, RemoteError> {
    server_url(server, &["hooks", collection_segment(kind)])
}

fn item_url(server: &str, hook: &Hook) -> Result<Url, RemoteError> {
    match hook {
        Hook::Function(f) => server_url(server, &["hooks", "functions", &f.name]),
        Hook::Trigger(t) => {
            let class = t.wire_class().ok_or_else(|| {
                RemoteError::new(
                    RemoteErrorKind::InvalidPayload,
                    server,
                    format!("trigger {} requires a class name", t.trigger_type),
                )
            })?;
            server_url(server, &["hooks", "triggers", class, t.trigger_type.as_str()])
        }
    }
}

fn create_body(hook: &Hook) -> Value {
    match hook {
        Hook::Function(f) => json!({ "functionName": f.name, "url": f.url }),
        Hook::Trigger(t) => json!({
            "className": t.wire_class(),
            "triggerName": t.trigger_type.as_str(),
            "url": t.url,
        }),
    }
}

fn decode_hook(kind: HookKind, value: Value, server: &str) -> Result<Hook, RemoteError> {
    let invalid = |e: serde_json::Error| {
        RemoteError::new(
            RemoteErrorKind::InvalidPayload,
            server,
            format!("undecodable {}: {}", kind, e),
        )
    };
    match kind {
        HookKind::Function => serde_json::from_value::<HookFunction>(value)
            .map(Hook::Function)
            .map_err(invalid),
        HookKind::Trigger => serde_json::from_value::<HookTrigger>(value)
            .map(|t| Hook::Trigger(t.normalized()))
            .map_err(invalid),
    }
}

/// Backend error body
#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: Option<i64>,
    error: Option<String>,
}

fn transport_error(e: reqwest::Error, server: &str) -> RemoteError {
    let kind = if e.is_timeout() {
        RemoteErrorKind::Timeout
    } else if e.is_decode() {
        RemoteErrorKind::InvalidPayload
    } else {
        RemoteErrorKind::Other
    };
    RemoteError::new(kind, server, e.to_string())
}

/// Map a non-success response onto an error kind
pub fn classify_failure(status: StatusCode, body: &str, server: &str) -> RemoteError {
    let parsed: Option<ErrorBody> = serde_json::from_str(body).ok();
    let code = parsed.as_ref().and_then(|b| b.code);
    let message = parsed
        .and_then(|b| b.error)
        .unwrap_or_else(|| format!("{}: {}", status, body));
    let lowered = message.to_lowercase();

    // Functions report "function name: X already exists", triggers
    // "class X already has trigger Y" and "class X does not exist"
    let webhook_error = code == Some(CODE_WEBHOOK_ERROR);
    let kind = if webhook_error
        && (lowered.contains("already exists") || lowered.contains("already has trigger"))
    {
        RemoteErrorKind::Conflict
    } else if lowered.contains("no function named")
        || lowered.contains("no trigger")
        || (webhook_error && lowered.contains("does not exist"))
        || code == Some(CODE_OBJECT_NOT_FOUND)
        || status == StatusCode::NOT_FOUND
    {
        RemoteErrorKind::NotFound
    } else if code == Some(CODE_INVALID_JSON) || status == StatusCode::BAD_REQUEST {
        RemoteErrorKind::InvalidPayload
    } else if status == StatusCode::REQUEST_TIMEOUT || status == StatusCode::GATEWAY_TIMEOUT {
        RemoteErrorKind::Timeout
    } else {
        RemoteErrorKind::Other
    };

    RemoteError::new(kind, server, message)
}
