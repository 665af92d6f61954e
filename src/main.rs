//! homepointsd - HomePoints server daemon

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use homepoints::{Config, Server};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// HomePoints server daemon
#[derive(Parser, Debug)]
#[command(name = "homepointsd", version, about = "Serve saved homes for a game server")]
struct Args {
    /// Path to the TOML config file (default: ./homepoints.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the bind address
    #[arg(long)]
    bind: Option<std::net::SocketAddr>,

    /// Override the home data file
    #[arg(long)]
    data: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "homepoints=info,homepointsd=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(data) = args.data {
        config.data_path = Some(data);
    }
    if config.data_path.is_none() {
        warn!("No data_path configured; homes will not survive a restart");
    }

    let server = Arc::new(Server::new(config).await?);

    let signal_server = server.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, shutting down");
            signal_server.shutdown();
        }
    });

    server.run().await?;

    Ok(())
}
