//! OBP Sandbox Companion Server
//!
//! JSON API server for browsing and populating an OBP sandbox.

use clap::Parser;
use sandbox_server::config::{build_config, CliArgs as ConfigCliArgs};
use sandbox_server::server::Server;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// OBP Sandbox Companion Server - browse and populate an OBP sandbox
#[derive(Parser, Debug)]
#[command(name = "sandbox-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (TOML format)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Host address to bind to
    #[arg(long, env = "SANDBOX_SERVER_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "SANDBOX_SERVER_PORT")]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "SANDBOX_LOG_LEVEL")]
    log_level: Option<String>,

    /// Base URL of the OBP deployment to proxy to
    #[arg(long, env = "SANDBOX_OBP_BASE_URL")]
    obp_base_url: Option<String>,
}

impl From<Args> for ConfigCliArgs {
    fn from(args: Args) -> Self {
        ConfigCliArgs {
            config_file: args.config,
            host: args.host,
            port: args.port,
            log_level: args.log_level,
            obp_base_url: args.obp_base_url,
        }
    }
}

fn init_tracing(log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let cli_args: ConfigCliArgs = args.into();
    let config = build_config(&cli_args)?;

    init_tracing(config.log_level.as_filter_str());

    tracing::info!("OBP Sandbox Companion Server v{}", sandbox_server::VERSION);
    tracing::info!(
        host = %config.host,
        port = %config.port,
        log_level = %config.log_level,
        obp_base_url = %config.obp_base_url,
        obp_api_version = %config.obp_api_version,
        "Server configuration loaded"
    );

    let server = Server::new(config);
    tracing::info!(address = %server.socket_addr(), "Starting server");

    server.run().await?;

    Ok(())
}
