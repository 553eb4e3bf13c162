use std::sync::Arc;

use axum::extract::FromRef;

use crate::config::Config;
use crate::cv::model::Seq2SeqModel;
use crate::llm_client::LlmClient;
use crate::observability::Metrics;

/// Shared application state injected into all route handlers via Axum extractors.
/// Built once in `main` and handed to the router.
#[derive(Clone)]
pub struct AppState {
    pub llm: LlmClient,
    /// Pluggable CV rewriter. Default: `OllamaSeq2Seq` on `REWRITE_MODEL`.
    pub rewriter: Arc<dyn Seq2SeqModel>,
    pub metrics: Arc<Metrics>,
    pub config: Config,
}

impl FromRef<AppState> for Arc<Metrics> {
    fn from_ref(state: &AppState) -> Self {
        state.metrics.clone()
    }
}
