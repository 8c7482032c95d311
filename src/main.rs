//! addrfill - credential proxy for address autocomplete
//!
//! Main entry point for the backend server.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{error, info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use addrfill_api::{AppState, InterfaceConfig, InterfaceServer};
use addrfill_config::{Config, ConfigLoader, ConfigValidator, LoggingConfig};

#[derive(Parser)]
#[command(name = "addrfill")]
#[command(about = "Credential proxy for address autocomplete")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "addrfill.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server
    Serve {
        /// Overrides server.host
        #[arg(long)]
        host: Option<String>,

        /// Overrides server.port
        #[arg(long)]
        port: Option<u16>,
    },
    /// Validate the configuration and exit
    CheckConfig,
}

/// Initialize tracing with console and, when configured, file output.
fn init_tracing(logging: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let file_layer = match &logging.dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let file_appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix("addrfill")
                .filename_suffix("log")
                .max_log_files(30)
                .build(dir)?;
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            // Dropping the guard stops the writer thread.
            static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
                std::sync::OnceLock::new();
            let _ = GUARD.set(guard);

            Some(fmt::layer().with_writer(non_blocking).with_ansi(false))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true).with_ansi(true))
        .with(file_layer)
        .init();

    Ok(())
}

fn load_config(path: &Path) -> Result<Config, Box<dyn std::error::Error>> {
    let config = ConfigLoader::load_or_default(path)?;
    Ok(config)
}

/// Log validation findings. Returns whether the config is usable.
fn report_validation(config: &Config) -> bool {
    let result = ConfigValidator::validate(config);
    for warning in &result.warnings {
        warn!("{}: {}", warning.path, warning.message);
    }
    for err in &result.errors {
        error!("{}: {}", err.path, err.message);
    }
    result.is_valid()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut config = load_config(&cli.config)?;
    init_tracing(&config.logging)?;

    match cli.command {
        Some(Commands::CheckConfig) => {
            if report_validation(&config) {
                info!("Configuration OK: {}", cli.config.display());
                Ok(())
            } else {
                Err("configuration is invalid".into())
            }
        }
        Some(Commands::Serve { host, port }) => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            run_server(config).await
        }
        None => run_server(config).await,
    }
}

async fn run_server(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting addrfill v{}", env!("CARGO_PKG_VERSION"));

    if !report_validation(&config) {
        return Err("configuration is invalid".into());
    }

    let state = Arc::new(AppState::from_config(&config)?);
    info!(
        allowed_domain = %config.credentials.allowed_domain,
        maps_key = state.credentials.maps_api_key().is_some(),
        "Credentials loaded"
    );

    let server = InterfaceServer::new(InterfaceConfig::from(&config.server), state);
    server.run().await
}
