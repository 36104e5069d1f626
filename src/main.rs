//! Kapu RPC - Main entrypoint.
//!
//! Loads configuration, initializes logging, and serves the JSON-RPC engine
//! over the configured transport.

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use kapu_rpc_lib::config::{self, ConfigLoader, KapuConfig, LogConfig, TransportType};
use kapu_rpc_lib::error::{KapuError, KapuResult};
use kapu_rpc_lib::protocol::jsonrpc::create_engine_from_config;
use kapu_rpc_lib::transport::StdioTransport;
use tracing::{error, info};
use tracing_error::ErrorLayer;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Command line arguments for Kapu RPC.
#[derive(Parser, Debug)]
#[clap(name = "Kapu RPC", version, author, about)]
struct Args {
    /// Path to configuration file
    #[clap(short, long, value_parser)]
    config: Option<PathBuf>,

    /// Command to execute
    #[clap(subcommand)]
    command: Option<Command>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the engine on the configured transport
    Start,

    /// Validate the configuration file
    Validate,

    /// Generate a default configuration file
    GenConfig {
        /// Path to output configuration file
        #[clap(short, long, value_parser)]
        output: PathBuf,
    },
}

/// Initialize the logging system.
///
/// Logs go to stderr; stdout belongs to the stdio transport.
fn init_logging(log: &LogConfig) -> KapuResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&log.level))
        .map_err(|e| KapuError::Custom(format!("Invalid log filter: {e}")))?;

    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(ErrorLayer::default());

    let result = if log.json {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_file(log.source_location)
                    .with_line_number(log.source_location),
            )
            .try_init()
    } else {
        registry
            .with(
                fmt::layer()
                    .pretty()
                    .with_writer(std::io::stderr)
                    .with_file(log.source_location)
                    .with_line_number(log.source_location),
            )
            .try_init()
    };

    result.map_err(|e| KapuError::Custom(format!("Failed to set global tracing subscriber: {e}")))
}

/// Serves the engine until the transport closes.
async fn serve(config: &KapuConfig) -> KapuResult<()> {
    let engine = create_engine_from_config(config, Vec::new())?;
    info!(
        procedures = engine.registry().len(),
        max_batch_size = config.limits.max_batch_size,
        "Engine ready"
    );

    match config.server.transport {
        TransportType::Stdio => {
            let mut transport = StdioTransport::stdio(config.server.max_message_size);
            engine.serve(&mut transport).await?;
        }
    }

    Ok(())
}

fn start(config: KapuConfig) -> KapuResult<()> {
    info!(
        name = %config.server.name,
        transport = ?config.server.transport,
        worker_threads = config.server.worker_threads,
        "Starting Kapu RPC"
    );

    config::init_global_config(config);
    let config = config::get_global_config();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.server.worker_threads)
        .thread_name("kapu-worker")
        .enable_all()
        .build()?;

    runtime.block_on(serve(&config))?;

    info!("Kapu RPC stopped");
    Ok(())
}

fn gen_config(output: &Path) -> KapuResult<()> {
    info!("Generating default configuration");

    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let toml = KapuConfig::default().to_toml()?;
    std::fs::write(output, toml)?;

    info!("Default configuration written to {:?}", output);
    Ok(())
}

/// Main entry point for the application.
fn main() -> KapuResult<()> {
    let args = Args::parse();

    let loader = ConfigLoader::new(args.config.as_deref(), config::ENV_PREFIX);
    let loaded = loader.load();

    // Logging comes up before any configuration error is reported.
    let log_config = loaded
        .as_ref()
        .map(|config| config.log.clone())
        .unwrap_or_default();
    init_logging(&log_config)?;
    kapu_rpc_lib::init();

    match args.command.unwrap_or(Command::Start) {
        Command::Start => match loaded {
            Ok(config) => start(config),
            Err(e) => {
                error!("Configuration error: {}", e);
                process::exit(1);
            }
        },
        Command::Validate => match loaded {
            Ok(_) => {
                info!("Configuration validated successfully");
                Ok(())
            }
            Err(e) => {
                error!("Configuration validation error: {}", e);
                process::exit(1);
            }
        },
        Command::GenConfig { output } => gen_config(&output),
    }
}
