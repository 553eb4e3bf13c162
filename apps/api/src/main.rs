mod config;
mod cv;
mod errors;
mod insights;
mod interpret;
mod llm_client;
mod observability;
mod routes;
mod security;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::cv::model::{OllamaSeq2Seq, Seq2SeqModel};
use crate::llm_client::LlmClient;
use crate::observability::Metrics;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (aborts on malformed env values)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={},tower_http=info",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting career API v{}", env!("CARGO_PKG_VERSION"));

    if config.is_production() && config.cors_allow_origins.iter().any(|o| o == "*") {
        warn!("CORS allows any origin in production; set CORS_ALLOW_ORIGINS");
    }

    // Initialize LLM client
    let llm = LlmClient::new(
        &config.ollama_url,
        Duration::from_secs(config.llm_timeout_secs),
        config.llm_max_retries,
    )?;
    info!(
        "LLM client initialized (url: {}, model: {})",
        config.ollama_url, config.ollama_model
    );

    // CV rewriter backend (swap by implementing Seq2SeqModel)
    let rewriter: Arc<dyn Seq2SeqModel> =
        Arc::new(OllamaSeq2Seq::new(llm.clone(), config.rewrite_model.clone()));
    info!("CV rewriter initialized (model: {})", rewriter.name());

    let state = AppState {
        llm,
        rewriter,
        metrics: Arc::new(Metrics::default()),
        config: config.clone(),
    };

    let app = build_router(state);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
