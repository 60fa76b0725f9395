//! Authentication gateway binary.

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use auth_gateway::config::loader::load_config;
use auth_gateway::config::GatewayConfig;
use auth_gateway::GatewayServer;

#[derive(Parser, Debug)]
#[command(name = "auth-gateway", about = "Authentication gateway for a clustered data service")]
struct Args {
    /// Path to the TOML configuration file. Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "auth_gateway=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("auth-gateway v0.1.0 starting");

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };

    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.address,
        security_index = %config.permission.security_index,
        token_max_age = %config.token.max_age,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            auth_gateway::observability::metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!(address = %local_addr, "Listening for connections");

    let server = GatewayServer::new(config)?;
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
