mod cli;
mod commands;
mod routes;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    cloudhook_runtime::init_logging();

    // Parse CLI args
    let cli = Cli::parse();

    // Handle init command early (doesn't need config)
    if let Commands::Init { path } = &cli.command {
        return commands::init::run_init(path);
    }

    // Load config
    let config = cloudhook_runtime::load_config(cli.config.as_deref())?;

    // Dispatch to command
    match cli.command {
        Commands::Init { .. } => {
            // Already handled above
            unreachable!()
        }
        Commands::Serve { bind, port } => {
            commands::serve::execute(bind, port, config).await?;
        }
        Commands::Hooks { action } => {
            commands::hooks::execute(action, &config).await?;
        }
    }

    Ok(())
}
