//! homepoints - saved homes for multiplayer game servers
//!
//! Players save named locations, teleport back to them, publish public
//! homes and share copies of their homes with other players. The registry
//! lives in memory and is flushed to disk in the background.

pub mod api;
pub mod commands;
pub mod homes;
pub mod sessions;
pub mod store;

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::Router;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{error, info};

use commands::HomeService;
use homes::HomeRegistry;
use sessions::SessionDirectory;
use store::{FlushScheduler, HomeStore, JsonFileStore, MemoryStore, StoreError};

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "homepoints.toml";

/// Server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub bind_addr: SocketAddr,
    /// JSON file holding all homes. None = in-memory only
    pub data_path: Option<PathBuf>,
    /// Milliseconds between background flushes of dirty state
    pub flush_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            data_path: None,
            flush_interval_ms: store::flush::DEFAULT_FLUSH_INTERVAL_MS,
        }
    }
}

impl Config {
    /// Load configuration: defaults, then the TOML file, then
    /// `HOMEPOINTS_*` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self, figment::Error> {
        let file = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(file))
            .merge(Env::prefixed("HOMEPOINTS_"))
            .extract()
    }

    pub fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms.max(1))
    }
}

/// The homepoints server instance
pub struct Server {
    config: Config,
    homes: Arc<HomeService>,
    flusher: Arc<FlushScheduler>,
    /// Set when stored data was corrupt and the registry started empty
    load_error: Option<StoreError>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl Server {
    /// Create a new server instance, loading persisted homes
    pub async fn new(config: Config) -> Result<Self> {
        let store: Arc<dyn HomeStore> = match &config.data_path {
            Some(path) => Arc::new(JsonFileStore::new(path)),
            None => Arc::new(MemoryStore::new()),
        };
        Self::with_store(config, store).await
    }

    /// Create a server backed by a specific store
    pub async fn with_store(config: Config, store: Arc<dyn HomeStore>) -> Result<Self> {
        let loader = store.clone();
        let report =
            tokio::task::spawn_blocking(move || store::load_fail_closed(loader.as_ref())).await??;

        if let Some(ref path) = report.quarantined {
            info!("Previous home data kept at {}", path.display());
        }

        let registry = Arc::new(HomeRegistry::from_state(report.state));
        info!(
            "Home registry ready: {} owners, {} public homes",
            registry.owner_count(),
            registry.public_home_count()
        );

        let sessions = Arc::new(SessionDirectory::new());
        let homes = Arc::new(HomeService::new(registry.clone(), sessions));
        let flusher = Arc::new(FlushScheduler::new(registry, store, config.flush_interval()));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        Ok(Self {
            config,
            homes,
            flusher,
            load_error: report.recovered_from,
            shutdown_tx,
            shutdown_rx,
        })
    }

    /// Get the home service handle
    pub fn homes(&self) -> Arc<HomeService> {
        self.homes.clone()
    }

    /// The load failure the server recovered from at startup, if any
    pub fn load_error(&self) -> Option<&StoreError> {
        self.load_error.as_ref()
    }

    /// Persist any unsaved changes right away
    pub async fn flush(&self) -> Result<bool> {
        Ok(self.flusher.flush_now().await?)
    }

    /// Build the router
    fn router(&self) -> Router {
        api::router(self.homes.clone())
    }

    /// Run the server until shutdown
    pub async fn run(&self) -> Result<()> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        let local_addr = listener.local_addr()?;
        info!("homepointsd listening on {}", local_addr);

        let flusher = self.flusher.clone().spawn(self.shutdown_rx.clone());

        let router = self.router();
        let mut shutdown_rx = self.shutdown_rx.clone();

        let served = axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                shutdown_rx.changed().await.ok();
            })
            .await;

        // Stop the flusher even if serve failed, so the final flush runs
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = flusher.await {
            error!("Flush task ended abnormally: {}", e);
        }

        served?;
        info!("homepointsd shutdown complete");
        Ok(())
    }

    /// Signal the server to shutdown
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    /// Get the configured bind address
    pub fn bind_addr(&self) -> SocketAddr {
        self.config.bind_addr
    }
}
