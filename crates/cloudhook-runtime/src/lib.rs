pub mod config;
pub mod hooks;
pub mod path;

pub use config::{load_config, BackendConfig, Config, ServerConfig};
pub use hooks::{
    Hook, HookFunction, HookKind, HookRegistry, HookService, HookSynchronizer, HookTrigger,
    HookVerb, PathResolutionError, RemoteError, RemoteErrorKind, RemoteHookClient,
    RestHookClient, TriggerKey, TriggerType, VerbParseError,
};
pub use path::PathResolver;

/// Initialize structured JSON logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    fmt()
        .json()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}
