use crate::routes;
use anyhow::Result;
use cloudhook_gateway::{start_server, AppState, RouteRegistrar};
use cloudhook_runtime::{Config, HookService};
use tracing::info;

pub async fn execute(bind: Option<String>, port: Option<u16>, mut config: Config) -> Result<()> {
    if let Some(bind) = bind {
        config.server.bind = bind;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    info!(
        bind = %config.server.bind,
        port = config.server.port,
        servers = config.backend.urls.len(),
        "Starting hook server"
    );

    let service = HookService::from_config(&config.backend)?;
    let state = AppState::new(service.clone(), config.backend.webhook_key.clone());

    let mut registrar = RouteRegistrar::new(service, &config.server);
    routes::declare(&mut registrar);

    start_server(
        state,
        registrar,
        &config.server.bind,
        config.server.port,
        config.backend.delete_hooks_on_shutdown,
    )
    .await?;

    Ok(())
}
