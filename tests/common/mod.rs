//! Common test utilities - HomepointsTest harness for end-to-end testing

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use homepoints::{Config, Server};
use reqwest::Client;
use serde_json::{json, Value};
use tokio::task::JoinHandle;

/// Test harness that spawns a real homepointsd on a random port
pub struct HomepointsTest {
    pub addr: SocketAddr,
    pub client: Client,
    server: Arc<Server>,
    handle: JoinHandle<()>,
}

impl HomepointsTest {
    /// Start a server with an in-memory store
    pub async fn start() -> Result<Self> {
        Self::start_with(None).await
    }

    /// Start a server persisting to the given file
    pub async fn start_persistent(data_path: &Path) -> Result<Self> {
        Self::start_with(Some(data_path)).await
    }

    async fn start_with(data_path: Option<&Path>) -> Result<Self> {
        // Find a random available port
        let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
        let addr = listener.local_addr()?;
        drop(listener);

        let config = Config {
            bind_addr: addr,
            data_path: data_path.map(Path::to_path_buf),
            flush_interval_ms: 50,
        };

        let server = Arc::new(Server::new(config).await?);
        let server_clone = server.clone();

        let handle = tokio::spawn(async move {
            if let Err(e) = server_clone.run().await {
                eprintln!("Server error: {}", e);
            }
        });

        let client = Client::builder().timeout(Duration::from_secs(5)).build()?;

        // Poll until server is ready (max 2 seconds)
        let mut ready = false;
        for _ in 0..20 {
            tokio::time::sleep(Duration::from_millis(100)).await;
            if client
                .get(format!("http://{}/health", addr))
                .send()
                .await
                .is_ok()
            {
                ready = true;
                break;
            }
        }

        if !ready {
            panic!("Server failed to start within 2 seconds");
        }

        Ok(Self {
            addr,
            client,
            server,
            handle,
        })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn server(&self) -> &Server {
        &self.server
    }

    pub async fn get(&self, path: &str) -> Result<reqwest::Response> {
        Ok(self
            .client
            .get(format!("{}{}", self.base_url(), path))
            .send()
            .await?)
    }

    pub async fn post<T: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<reqwest::Response> {
        Ok(self
            .client
            .post(format!("{}{}", self.base_url(), path))
            .json(body)
            .send()
            .await?)
    }

    pub async fn put<T: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<reqwest::Response> {
        Ok(self
            .client
            .put(format!("{}{}", self.base_url(), path))
            .json(body)
            .send()
            .await?)
    }

    pub async fn delete(&self, path: &str) -> Result<reqwest::Response> {
        Ok(self
            .client
            .delete(format!("{}{}", self.base_url(), path))
            .send()
            .await?)
    }

    /// Report a player as online
    pub async fn join(&self, id: &str, name: &str) -> Result<()> {
        let resp = self.post("/sessions", &json!({ "id": id, "name": name })).await?;
        anyhow::ensure!(resp.status() == 204, "join failed: {}", resp.status());
        Ok(())
    }

    /// Save a home at a fixed spot in the overworld
    pub async fn set_home(&self, player: &str, name: &str, x: i32) -> Result<reqwest::Response> {
        self.put(
            &format!("/players/{}/homes/{}", player, name),
            &json!({ "world": "minecraft:overworld", "x": x, "y": 64, "z": -5 }),
        )
        .await
    }

    pub async fn json(&self, path: &str) -> Result<Value> {
        Ok(self.get(path).await?.json().await?)
    }

    /// Shutdown and wait for the final flush
    pub async fn stop(self) -> Result<()> {
        self.server.shutdown();
        self.handle.await?;
        Ok(())
    }
}
