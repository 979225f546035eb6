use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
pub enum KindArg {
    Functions,
    Triggers,
}

#[derive(Subcommand)]
pub enum HookTarget {
    /// A cloud function
    Function {
        /// Function name
        #[arg(long)]
        name: String,
        /// Callback URL, required for create and update
        #[arg(long)]
        url: Option<String>,
    },
    /// An object or lifecycle trigger
    Trigger {
        /// Class name; omit for file and connect triggers
        #[arg(long)]
        class: Option<String>,
        /// Trigger type, e.g. beforeSave
        #[arg(long)]
        trigger: String,
        /// Callback URL, required for create and update
        #[arg(long)]
        url: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum HookCommands {
    /// List hooks registered on every configured server
    List {
        #[arg(long, value_enum, default_value = "functions")]
        kind: KindArg,
    },
    /// Apply fetch, create, update or delete to one hook on every server
    Apply {
        /// Operation name
        verb: String,
        #[command(subcommand)]
        target: HookTarget,
    },
}

#[derive(Parser)]
#[command(name = "cloudhook")]
#[command(about = "Cloud Code hook server with backend hook registration", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new config file
    Init {
        /// Path for new config file
        #[arg(default_value = "cloudhook.toml")]
        path: PathBuf,
    },
    /// Serve hook routes and register them with the backends
    Serve {
        /// Address to bind to (overrides server.bind)
        #[arg(long)]
        bind: Option<String>,
        /// Port to listen on and advertise (overrides server.port)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Inspect or change hooks on the backends directly
    Hooks {
        #[command(subcommand)]
        action: HookCommands,
    },
}
