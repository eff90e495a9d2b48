//! CLI definitions for OverlayHub.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use overlayhub_config::DEFAULT_CONFIG_PATH;

/// OverlayHub CLI.
#[derive(Parser)]
#[command(name = "overlayhub")]
#[command(about = "Command hub that lets an analysis agent drive a browser overlay")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path
    #[arg(
        short,
        long,
        default_value = DEFAULT_CONFIG_PATH,
        global = true,
        env = "OVERLAYHUB_CONFIG"
    )]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub(crate) enum Commands {
    /// Run the hub in foreground (default)
    Run {
        /// Listen host, overrides `server.host`
        #[arg(long)]
        host: Option<String>,

        /// Listen port for HTTP and WebSocket, overrides `server.port`
        #[arg(long)]
        port: Option<u16>,
    },

    /// Print the command catalog as JSON
    Schemas,

    /// Validate the configuration file and exit
    CheckConfig,
}
