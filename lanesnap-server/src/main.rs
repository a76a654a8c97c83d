//! HTTP front door for a lanesnap placement session.

mod api;
mod config;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::ServerConfig;
use lanesnap_core::Session;

#[derive(Parser, Debug)]
#[command(
    name = "lanesnap-server",
    about = "HTTP interface to the lanesnap facility-placement session"
)]
struct Args {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Listen address, overrides the config file
    #[arg(long)]
    addr: Option<SocketAddr>,

    /// SUMO network file to load at startup, overrides the config file
    #[arg(long)]
    network: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => ServerConfig::from_file(path)?,
        None => ServerConfig::default(),
    };
    if let Some(addr) = args.addr {
        config.addr = addr;
    }
    if let Some(network) = args.network {
        config.network = Some(network);
    }

    let mut session = Session::new();
    if let Some(path) = &config.network {
        session.load_network_file(path)?;
    }

    let app = api::router(Arc::new(Mutex::new(session)));
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    info!("listening on {}", config.addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        tracing::warn!("failed to install ctrl-c handler, running without graceful shutdown");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
