//! Semantle Game Server
//!
//! Loads the vocabulary, assembles the guess ranking & session engine and
//! serves the HTTP API.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use semantle::engine::stats::StatsStore;
use semantle::server::{create_router, AppState};
use semantle::{EngineConfig, GameEngine, StubEmbeddingProvider, Vocabulary, VERSION};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Semantle Server v{}", VERSION);

    let vocab_path =
        std::env::var("SEMANTLE_VOCABULARY").unwrap_or_else(|_| "data/vocabulary.json".to_string());
    let vocabulary = Arc::new(
        Vocabulary::load_from_path(&vocab_path)
            .with_context(|| format!("loading vocabulary from {vocab_path}"))?,
    );
    info!(
        words = vocabulary.len(),
        dimension = vocabulary.dimension(),
        "vocabulary loaded from {vocab_path}"
    );

    let config = EngineConfig {
        reject_duplicates: std::env::var("SEMANTLE_REJECT_DUPLICATES")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false),
        ..Default::default()
    };

    // The stub provider only answers cache misses; every vocabulary vector
    // is served from the seeded cache. Swap in a model-backed provider here
    // to embed words outside the precomputed set.
    let provider = Arc::new(StubEmbeddingProvider::new(vocabulary.dimension()));
    let engine = Arc::new(GameEngine::new(vocabulary, provider, config).await);

    // Background eviction sweep for idle sessions.
    let eviction_interval = engine.config().eviction_interval;
    let evictor = Arc::clone(&engine);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(eviction_interval.max(Duration::from_secs(1)));
        interval.tick().await; // first tick fires immediately
        loop {
            interval.tick().await;
            evictor.evict_expired().await;
        }
    });

    let state = AppState {
        engine,
        stats: Arc::new(StatsStore::new()),
    };
    let app = create_router(state);

    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8000);

    let listener = tokio::net::TcpListener::bind(format!("{host}:{port}"))
        .await
        .with_context(|| format!("binding {host}:{port}"))?;
    info!("listening on {host}:{port}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to install CTRL+C handler: {err}");
    }
}
