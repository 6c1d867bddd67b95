//! Test server harness.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use roomfix::config::Config;
use roomfix::gateway::{HandlerState, create_router_with_state};
use roomfix::matching::{CandidateRanker, RankerConfig};
use roomfix::providers::{OfflineEmbeddingProvider, OfflineVisionAnalyzer};
use roomfix::repair::{DuplicateDetector, ReportIntakeWorkflow};
use roomfix::store::{FileImageStore, FileVectorStore, JsonlReportStore};
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

const STARTUP_WAIT_TIMEOUT_SECS: u64 = 5;
const STARTUP_POLL_INTERVAL_MS: u64 = 50;

#[derive(Debug, Clone, Default)]
pub struct TestServerConfig {
    /// Reuse an existing storage root (e.g. to test a restart).
    pub storage_path: Option<PathBuf>,
    pub max_results: Option<usize>,
}

pub struct TestServer {
    pub addr: SocketAddr,
    pub storage_path: PathBuf,
    server_handle: Option<JoinHandle<()>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    _temp_dir: Option<TempDir>,
}

impl TestServer {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Stops the server and waits for it to release its stores.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.server_handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

pub async fn wait_for_server_ready(
    addr: SocketAddr,
    timeout: Duration,
    interval: Duration,
) -> Result<(), ServerStartupError> {
    let start = std::time::Instant::now();

    loop {
        if start.elapsed() > timeout {
            return Err(ServerStartupError::Timeout);
        }

        match tokio::net::TcpStream::connect(addr).await {
            Ok(_) => return Ok(()),
            Err(_) => {
                tokio::time::sleep(interval).await;
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServerStartupError {
    #[error("Server failed to start within timeout")]
    Timeout,
    #[error("Failed to bind to address: {0}")]
    BindError(#[from] std::io::Error),
    #[error("Server startup failed: {0}")]
    StartupFailed(String),
}

/// Spawns a server with offline providers and file-backed stores under a temp dir.
///
/// Wiring matches the binary's mock-provider mode, so these tests exercise the same
/// stores and router as production without network access.
pub async fn spawn_test_server(config: TestServerConfig) -> Result<TestServer, ServerStartupError> {
    let (temp_dir, storage_path) = match config.storage_path {
        Some(path) => (None, path),
        None => {
            let dir = TempDir::new()?;
            let path = dir.path().to_path_buf();
            (Some(dir), path)
        }
    };

    let settings = Config {
        storage_path: storage_path.clone(),
        mock_provider: true,
        max_results: config.max_results.unwrap_or(20),
        ..Default::default()
    };

    let embedder = Arc::new(OfflineEmbeddingProvider::new());
    let vectors = Arc::new(FileVectorStore::new(settings.vectors_dir()));
    let reports = Arc::new(
        JsonlReportStore::open(settings.reports_log())
            .map_err(|e| ServerStartupError::StartupFailed(e.to_string()))?,
    );
    let images = Arc::new(FileImageStore::new(settings.images_dir()));

    let intake = ReportIntakeWorkflow::new(
        embedder.clone(),
        Arc::new(OfflineVisionAnalyzer::new()),
        reports,
        images,
        DuplicateDetector::new(settings.duplicate_threshold),
    );
    let ranker =
        CandidateRanker::with_config(RankerConfig::with_max_results(settings.max_results));
    let state = HandlerState::new(ranker, embedder, vectors, intake);
    let app = create_router_with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let server_handle = tokio::spawn(async move {
        let _ = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await;
    });

    wait_for_server_ready(
        addr,
        Duration::from_secs(STARTUP_WAIT_TIMEOUT_SECS),
        Duration::from_millis(STARTUP_POLL_INTERVAL_MS),
    )
    .await?;

    Ok(TestServer {
        addr,
        storage_path,
        server_handle: Some(server_handle),
        shutdown_tx: Some(shutdown_tx),
        _temp_dir: temp_dir,
    })
}
