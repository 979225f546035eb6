pub mod auth;
pub mod registrar;
pub mod server;
pub mod types;

pub use auth::{AuthConfig, WEBHOOK_KEY_HEADER};
pub use registrar::{PendingSync, Route, RouteRegistrar};
pub use server::{create_router, remove_hooks, start_server, AppState, HEALTH_PATH};
pub use types::{HealthResponse, HookRequest, HookResponse};
