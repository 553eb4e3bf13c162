//! LLM client: the single point of entry for calls to the local Ollama server.
//!
//! No other module talks to Ollama directly. Callers get the model's raw text
//! back and decide how to interpret it (see `crate::interpret`).
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

const GENERATE_PATH: &str = "/api/generate";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Could not decode Ollama response: {0}")]
    Decode(String),

    #[error("Gave up after {attempts} attempts: {last}")]
    Exhausted {
        attempts: u32,
        #[source]
        last: Box<LlmError>,
    },
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub prompt_eval_count: Option<u32>,
    #[serde(default)]
    pub eval_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OllamaError {
    error: String,
}

/// The single LLM client shared by all services.
/// Wraps Ollama's non-streaming generate endpoint with retry logic.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    base_url: String,
    max_retries: u32,
}

impl LlmClient {
    pub fn new(base_url: &str, timeout: Duration, max_retries: u32) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_retries: max_retries.max(1),
        })
    }

    /// Sends one system+user prompt pair and returns the model's trimmed text.
    /// Retries on transport errors, 429 and 5xx with exponential backoff.
    pub async fn generate(&self, model: &str, system: &str, user: &str) -> Result<String, LlmError> {
        let prompt = prompts::format_prompt(system, user);
        let request_body = GenerateRequest {
            model,
            prompt: &prompt,
            stream: false,
        };
        let url = format!("{}{}", self.base_url, GENERATE_PATH);

        let mut attempt = 0;

        loop {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s, 4s
                let delay = Duration::from_millis(1000 * (1 << (attempt - 1).min(5)));
                warn!(
                    "Ollama call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }
            attempt += 1;

            let retryable = match self.client.post(&url).json(&request_body).send().await {
                Err(e) => LlmError::Http(e),
                Ok(response) => {
                    let status = response.status();

                    if status.as_u16() == 429 || status.is_server_error() {
                        let body = response.text().await.unwrap_or_default();
                        warn!("Ollama returned {}: {}", status, body);
                        LlmError::Api {
                            status: status.as_u16(),
                            message: error_message(body),
                        }
                    } else if !status.is_success() {
                        let body = response.text().await.unwrap_or_default();
                        return Err(LlmError::Api {
                            status: status.as_u16(),
                            message: error_message(body),
                        });
                    } else {
                        let body = response.text().await?;
                        let parsed: GenerateResponse = serde_json::from_str(&body)
                            .map_err(|e| LlmError::Decode(e.to_string()))?;

                        debug!(
                            model,
                            prompt_tokens = parsed.prompt_eval_count.unwrap_or(0),
                            output_tokens = parsed.eval_count.unwrap_or(0),
                            "Ollama call succeeded"
                        );

                        return Ok(parsed.response.unwrap_or_default().trim().to_string());
                    }
                }
            };

            if attempt >= self.max_retries {
                return Err(LlmError::Exhausted {
                    attempts: attempt,
                    last: Box::new(retryable),
                });
            }
        }
    }
}

fn error_message(body: String) -> String {
    serde_json::from_str::<OllamaError>(&body)
        .map(|e| e.error)
        .unwrap_or(body)
}
