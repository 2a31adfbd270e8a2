//! Test server lifecycle management
//!
//! Each test gets an isolated server with its own prepared catalog on disk.

use super::constants::*;
use super::fixtures::{create_test_assets, create_test_catalog};
use iem_recommender::assets::{AssetKeys, AssetResolver, LocalAssetResolver};
use iem_recommender::catalog::load_catalog;
use iem_recommender::recommend::RecommendationEngine;
use iem_recommender::server::{make_app, RequestsLoggingLevel, ServerConfig};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Test server instance with an isolated catalog
///
/// When dropped, the server gracefully shuts down and temp resources are cleaned up.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The port the server is listening on
    pub port: u16,

    // Private fields - keep resources alive until drop
    _temp_catalog_dir: TempDir,
    _temp_assets_dir: Option<TempDir>,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a new test server on a random port, returning bare asset keys
    ///
    /// # Panics
    ///
    /// Panics if the fixture catalog cannot be written or loaded, or the
    /// server doesn't become ready within the timeout.
    pub async fn spawn() -> Self {
        Self::spawn_with(false).await
    }

    /// Like [`TestServer::spawn`], but also serves a fixture assets directory
    /// under `/static` and resolves product images against it.
    pub async fn spawn_with_assets() -> Self {
        Self::spawn_with(true).await
    }

    async fn spawn_with(with_assets: bool) -> Self {
        let (temp_catalog_dir, catalog_path) =
            create_test_catalog().expect("Failed to create test catalog");
        let catalog = load_catalog(&catalog_path).expect("Failed to load test catalog");

        let (temp_assets_dir, assets_root) = if with_assets {
            let (dir, root) = create_test_assets().expect("Failed to create test assets");
            (Some(dir), Some(root))
        } else {
            (None, None)
        };

        let assets: Arc<dyn AssetResolver> = match assets_root.as_ref() {
            Some(root) => Arc::new(LocalAssetResolver::new(root.clone())),
            None => Arc::new(AssetKeys),
        };
        let engine = Arc::new(RecommendationEngine::new(catalog, assets));

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");

        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();

        let base_url = format!("http://127.0.0.1:{}", port);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let config = ServerConfig {
            port,
            requests_logging_level: RequestsLoggingLevel::None,
            assets_dir: assets_root,
            asset_cache_age_sec: 0, // Disable caching in tests
            image_relay_timeout_sec: 2,
            image_relay_max_bytes: TEST_RELAY_MAX_BYTES,
            ..ServerConfig::default()
        };

        let app = make_app(config, engine).expect("Failed to build app");

        // Spawn server in background task with graceful shutdown
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            port,
            _temp_catalog_dir: temp_catalog_dir,
            _temp_assets_dir: temp_assets_dir,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Waits for the server to become ready by polling the home endpoint
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => return,
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
