//! Roomfix HTTP server entrypoint.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tokio::signal;

use roomfix::config::Config;
use roomfix::gateway::{HandlerState, create_router_with_state};
use roomfix::matching::{CandidateRanker, RankerConfig};
use roomfix::providers::{
    EmbeddingProvider, HttpEmbeddingProvider, HttpVisionAnalyzer, OfflineEmbeddingProvider,
    OfflineVisionAnalyzer, VisionAnalyzer,
};
use roomfix::repair::{DuplicateDetector, ReportIntakeWorkflow};
use roomfix::store::{FileImageStore, FileVectorStore, JsonlReportStore};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if std::env::args().any(|arg| arg == "--health-check") {
        std::process::exit(run_health_check());
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    config.validate()?;
    let addr: SocketAddr = config.socket_addr().parse()?;

    tracing::info!(
        bind_addr = %config.bind_addr,
        port = config.port,
        storage_path = %config.storage_path.display(),
        mock_provider = config.mock_provider,
        "Roomfix starting"
    );

    let (embedder, analyzer) = build_providers(&config);

    let vectors = Arc::new(FileVectorStore::new(config.vectors_dir()));
    vectors.ensure_root()?;
    let reports = Arc::new(JsonlReportStore::open(config.reports_log())?);
    let images = Arc::new(FileImageStore::new(config.images_dir()));

    let intake = ReportIntakeWorkflow::new(
        embedder.clone(),
        analyzer,
        reports,
        images,
        DuplicateDetector::new(config.duplicate_threshold),
    );
    let ranker = CandidateRanker::with_config(RankerConfig::with_max_results(config.max_results));

    let state = HandlerState::new(ranker, embedder, vectors, intake);
    let app = create_router_with_state(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Roomfix shutdown complete");
    Ok(())
}

fn build_providers(config: &Config) -> (Arc<dyn EmbeddingProvider>, Arc<dyn VisionAnalyzer>) {
    if config.mock_provider {
        tracing::warn!("ROOMFIX_MOCK_PROVIDER set, using offline embeddings and analysis");
        return (
            Arc::new(OfflineEmbeddingProvider::new()),
            Arc::new(OfflineVisionAnalyzer::new()),
        );
    }

    let embedder = HttpEmbeddingProvider::new(config.embedding_endpoint())
        .with_text_model_prefix(config.embedding_model_prefix.clone())
        .with_image_model(config.image_model.clone());
    let analyzer =
        HttpVisionAnalyzer::new(config.vision_endpoint()).with_model(config.vision_model.clone());

    (Arc::new(embedder), Arc::new(analyzer))
}

fn run_health_check() -> i32 {
    let port = std::env::var(Config::ENV_PORT)
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8080);

    let url = format!("http://127.0.0.1:{}/healthz", port);

    let Ok(rt) = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    else {
        return 1;
    };

    rt.block_on(async {
        let Ok(client) = reqwest::Client::builder()
            .timeout(Duration::from_secs(1))
            .build()
        else {
            return 1;
        };

        match client.get(&url).send().await {
            Ok(res) if res.status().is_success() => 0,
            _ => 1,
        }
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
