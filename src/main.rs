//! OverlayHub - command hub between an analysis agent and a browser overlay.
//!
//! Main entry point for the CLI and server.

mod cli;
mod register;

use std::future::Future;
use std::path::Path;
use std::sync::{Arc, OnceLock};

use clap::Parser;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use overlayhub_api::{spawn_outbox, AppState, HubServer, InterfaceConfig};
use overlayhub_config::{Config, ConfigLoader, ConfigValidator, LoggingConfig};
use overlayhub_core::SchemaRegistry;

use cli::{Cli, Commands};

/// Keeps the non-blocking file writer flushing until exit.
static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = ConfigLoader::load_or_default(&cli.config)?;

    match cli.command {
        Some(Commands::Schemas) => print_schemas(),
        Some(Commands::CheckConfig) => check_config(&cli.config, &config),
        Some(Commands::Run { host, port }) => run(config, host, port).await,
        None => run(config, None, None).await,
    }
}

fn init_tracing(logging: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let console_layer = fmt::layer().with_target(true).with_ansi(true);

    let file_layer = if logging.file {
        let log_dir = logging.resolved_dir();
        std::fs::create_dir_all(&log_dir)?;
        let file_appender = RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix("overlayhub")
            .filename_suffix("log")
            .max_log_files(30)
            .build(&log_dir)?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        let _ = LOG_GUARD.set(guard);
        Some(
            fmt::layer()
                .with_writer(non_blocking)
                .with_target(true)
                .with_ansi(false),
        )
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();
    Ok(())
}

async fn run(
    mut config: Config,
    host: Option<String>,
    port: Option<u16>,
) -> Result<(), Box<dyn std::error::Error>> {
    init_tracing(&config.logging)?;

    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let validation = ConfigValidator::validate(&config);
    for warning in &validation.warnings {
        warn!("Config {}: {}", warning.path, warning.message);
    }
    if !validation.is_valid() {
        for err in &validation.errors {
            error!("Config {}: {}", err.path, err.message);
        }
        return Err(format!("{} configuration error(s)", validation.errors.len()).into());
    }

    info!("Starting OverlayHub v{}", env!("CARGO_PKG_VERSION"));

    let store = register::build_store(&config);
    let state = Arc::new(AppState::from_config(&config, store));
    let outbox = spawn_outbox(state.clone());

    let loaded = register::load_extensions(&state.extensions, &config).await;
    info!("{} extension(s) loaded", loaded);

    let server = HubServer::new(
        InterfaceConfig::new(config.server.host.clone(), config.server.port),
        state,
    );
    let shutdown = async {
        let _ = tokio::signal::ctrl_c().await;
        info!("Received shutdown signal");
    };
    serve_until(&server, outbox, shutdown).await
}

/// Serve until `shutdown` resolves or the server fails, then unload every
/// extension. A bind failure is returned to the caller.
async fn serve_until(
    server: &HubServer,
    outbox: Option<JoinHandle<()>>,
    shutdown: impl Future<Output = ()>,
) -> Result<(), Box<dyn std::error::Error>> {
    let result = tokio::select! {
        result = server.run() => result,
        _ = shutdown => Ok(()),
    };

    server.state().extensions.unload_all().await;
    if let Some(handle) = outbox {
        handle.abort();
    }

    if let Err(e) = &result {
        error!("Hub server error: {}", e);
    }
    info!("OverlayHub stopped");
    result
}

fn print_schemas() -> Result<(), Box<dyn std::error::Error>> {
    let catalog = SchemaRegistry::with_builtin_catalog().catalog();
    println!("{}", serde_json::to_string_pretty(&catalog)?);
    Ok(())
}

fn check_config(path: &Path, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let validation = ConfigValidator::validate(config);
    for warning in &validation.warnings {
        println!("warning: {}: {}", warning.path, warning.message);
    }
    for err in &validation.errors {
        println!("error: {}: {}", err.path, err.message);
    }
    if !validation.is_valid() {
        return Err(format!(
            "{}: {} error(s)",
            path.display(),
            validation.errors.len()
        )
        .into());
    }
    println!("{}: ok", path.display());
    Ok(())
}
