//! Sequence-to-sequence model seam used to structure and rewrite CV text.
//!
//! Inputs carry a T5-style task prefix (`structure experience: ...`,
//! `improve: ...`, `suggest: ...`). `AppState` holds an `Arc<dyn Seq2SeqModel>`.

use async_trait::async_trait;

use crate::errors::AppError;
use crate::llm_client::LlmClient;

#[async_trait]
pub trait Seq2SeqModel: Send + Sync {
    async fn generate(&self, input: &str) -> Result<String, AppError>;

    /// Identifier for logs.
    fn name(&self) -> &str;
}

const REWRITER_SYSTEM: &str = "\
You are a text-to-text model for CV processing. Every input starts with a task prefix:
- \"structure <section>: <text>\" → rewrite the text as a clean, structured list of entries for that CV section.
- \"improve: <text>\" → rewrite the text to be concise, action-oriented and quantified where the text supports it. Never invent facts.
- \"suggest: <section>: <text>\" → give one short, concrete suggestion for improving that section.
Respond with the output text only. No preamble, no markdown fences.";

/// Default backend: routes task-prefixed inputs through the shared Ollama client.
pub struct OllamaSeq2Seq {
    llm: LlmClient,
    model: String,
}

impl OllamaSeq2Seq {
    pub fn new(llm: LlmClient, model: String) -> Self {
        Self { llm, model }
    }
}

#[async_trait]
impl Seq2SeqModel for OllamaSeq2Seq {
    async fn generate(&self, input: &str) -> Result<String, AppError> {
        Ok(self.llm.generate(&self.model, REWRITER_SYSTEM, input).await?)
    }

    fn name(&self) -> &str {
        &self.model
    }
}
