use std::sync::Arc;

use axum::extract::State;
use axum::middleware;
use axum::routing::get;
use axum::{Json, Router};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use cloudhook_runtime::HookService;

use crate::auth::{webhook_key_middleware, AuthConfig};
use crate::registrar::{PendingSync, RouteRegistrar};
use crate::types::HealthResponse;

/// Served by the gateway itself; hook routes cannot take it
pub const HEALTH_PATH: &str = "/health";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub hooks: HookService,
    pub auth_config: Arc<AuthConfig>,
}

impl AppState {
    pub fn new(hooks: HookService, webhook_key: Option<String>) -> Self {
        Self {
            hooks,
            auth_config: Arc::new(AuthConfig::new(webhook_key)),
        }
    }
}

/// Create the Axum router with the health route and every declared hook route
pub fn create_router(state: AppState, registrar: RouteRegistrar) -> Router {
    let auth_config = state.auth_config.clone();

    Router::new()
        .route(HEALTH_PATH, get(health_check))
        .merge(registrar.into_router())
        .layer(middleware::from_fn(move |req, next| {
            webhook_key_middleware(auth_config.clone(), req, next)
        }))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until Ctrl+C, then optionally remove registered hooks from the backends
pub async fn start_server(
    state: AppState,
    mut registrar: RouteRegistrar,
    host: &str,
    port: u16,
    delete_hooks_on_shutdown: bool,
) -> anyhow::Result<()> {
    let hooks = state.hooks.clone();
    let pending = registrar.take_pending();
    let router = create_router(state, registrar);
    let addr = format!("{}:{}", host, port);

    info!(addr = %addr, "Starting hook server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if delete_hooks_on_shutdown {
        remove_hooks(pending, &hooks).await;
    }

    info!("Hook server stopped");
    Ok(())
}

/// Let in-flight registrations land in the registry, then delete every
/// registered hook from its server
pub async fn remove_hooks(pending: PendingSync, hooks: &HookService) {
    if !pending.is_empty() {
        info!(count = pending.len(), "Waiting for hook registrations before removal");
    }
    pending.wait().await;
    hooks.delete_all().await;
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        registered_hooks: state.hooks.registry().len().await,
    })
}
