//! Registry gateway binary
//!
//! Every option can also be supplied through the environment, which is how
//! the gateway is normally configured inside a container.

use anyhow::Result;
use clap::Parser;
use registry_gateway::{run_server_with_shutdown, GatewayConfig, DEFAULT_HOST, DEFAULT_PORT};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "registry-gateway")]
#[command(about = "Reverse proxy in front of a container registry that reports pulls and pushes to the hub")]
#[command(version)]
struct Cli {
    /// Base URL of the upstream registry
    #[arg(long, env = "REGISTRY_URL")]
    registry_url: Option<String>,

    /// Base URL of the hub
    #[arg(long, env = "D2HUB_URL")]
    hub_url: Option<String>,

    /// Host to bind to
    #[arg(long, env = "LISTEN_HOST", default_value = DEFAULT_HOST)]
    host: String,

    /// Port to bind to
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _log_guard = gateway_logging::init_subscriber();

    let cli = Cli::parse();

    let config = match GatewayConfig::from_raw(
        cli.registry_url.as_deref(),
        cli.hub_url.as_deref(),
        cli.host,
        cli.port,
    ) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid gateway configuration");
            eprintln!("❌ Invalid gateway configuration: {e}");
            std::process::exit(1);
        }
    };

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C received");
            shutdown_tx.send(()).ok();
        }
    });

    run_server_with_shutdown(config, Some(shutdown_rx)).await
}
