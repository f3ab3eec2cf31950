mod analysis;
mod config;
mod db;
mod documents;
mod errors;
mod history;
mod llm_client;
mod models;
mod routes;
mod screening;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::history::postgres::PgScreeningStore;
use crate::history::{InMemoryScreeningStore, ScreeningStore};
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::screening::ranker::LlmResumeRanker;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Screener API v{}", env!("CARGO_PKG_VERSION"));

    // Screening history
    let store: Arc<dyn ScreeningStore> = match &config.database_url {
        Some(url) => Arc::new(PgScreeningStore::new(create_pool(url).await?, config.history_cap)),
        None => {
            warn!("DATABASE_URL not set, screening history is in-memory only");
            Arc::new(InMemoryScreeningStore::new(config.history_cap))
        }
    };

    // Initialize LLM client
    let llm = LlmClient::new(config.anthropic_api_key.clone(), config.llm_timeout)?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let ranker = Arc::new(LlmResumeRanker::new(llm.clone()));
    info!(
        batch_size = config.batch_size.get(),
        batch_timeout_secs = config.batch_timeout.as_secs(),
        "Resume ranker ready"
    );

    let state = AppState {
        llm,
        config: config.clone(),
        ranker,
        store,
    };

    // The browser UI is served from a different origin.
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
