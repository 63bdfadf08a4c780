mod config;
mod db;
mod errors;
mod extraction;
mod llm_client;
mod models;
mod profile;
mod routes;
mod shortlist;
mod state;
mod store;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::DefaultBodyLimit;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::extraction::{DocumentExtractor, PdftoppmRenderer, TesseractOcr};
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::PgProfileStore;

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

    info!("Starting screener v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL (migrations run here)
    let db = create_pool(&config.database_url).await?;
    let store = Arc::new(PgProfileStore::new(db));

    // Initialize LLM client
    let llm = LlmClient::new(config.anthropic_api_key.clone())?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // OCR fallback shells out to poppler and tesseract
    let extractor = DocumentExtractor::new(
        Arc::new(PdftoppmRenderer::new(config.pdftoppm_bin.clone())),
        Arc::new(TesseractOcr::new(
            config.tesseract_bin.clone(),
            config.ocr_lang.clone(),
        )),
    );
    info!(
        "Document extractor ready (pdftoppm: {}, tesseract: {} [{}])",
        config.pdftoppm_bin, config.tesseract_bin, config.ocr_lang
    );
    info!("Shortlist filter mode: {:?}", config.filter_mode);

    let state = AppState {
        store,
        oracle: Arc::new(llm),
        extractor,
        filter_mode: config.filter_mode,
    };

    let app = build_router(state)
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the admin UI host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
