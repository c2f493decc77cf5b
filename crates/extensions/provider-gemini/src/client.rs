//! Gemini model client with ordered fallback.

use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::Client;
use tracing::{debug, info, warn};

use pagefill_config::GeminiConfig;
use pagefill_protocols::{GenerationError, GenerationResult, TextGenerator};

use crate::types::*;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1";

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Sends prompts to Gemini, trying candidate models in order.
///
/// The first model that answers is remembered for the lifetime of the client.
/// When every configured candidate fails, a remembered model missing from the
/// list is tried once more before giving up.
pub struct ModelClient {
    client: Client,
    base_url: String,
    candidates: RwLock<Vec<String>>,
    generation_config: GenerationConfig,
    last_working_model: RwLock<Option<String>>,
}

impl ModelClient {
    /// Client for the public Gemini endpoint with default settings.
    pub fn new(candidates: Vec<String>) -> Self {
        Self::with_url(candidates, DEFAULT_BASE_URL.to_string())
    }

    /// Client for a custom endpoint.
    pub fn with_url(candidates: Vec<String>, base_url: String) -> Self {
        Self::build(
            candidates,
            base_url,
            GenerationConfig {
                temperature: Some(0.7),
                max_output_tokens: Some(250),
            },
            DEFAULT_CONNECT_TIMEOUT,
            DEFAULT_REQUEST_TIMEOUT,
        )
    }

    pub fn from_config(config: &GeminiConfig) -> Self {
        Self::build(
            config.models.clone(),
            config.base_url.clone(),
            GenerationConfig {
                temperature: Some(config.temperature),
                max_output_tokens: Some(config.max_output_tokens),
            },
            Duration::from_secs(config.connect_timeout_secs),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    fn build(
        candidates: Vec<String>,
        base_url: String,
        generation_config: GenerationConfig,
        connect_timeout: Duration,
        request_timeout: Duration,
    ) -> Self {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(request_timeout)
            .build()
            .unwrap_or_else(|e| {
                warn!("Falling back to default HTTP client: {}", e);
                Client::new()
            });
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            candidates: RwLock::new(sanitize(candidates)),
            generation_config,
            last_working_model: RwLock::new(None),
        }
    }

    /// Seed the remembered model, e.g. from a previous session.
    pub fn with_last_working_model(self, model: impl Into<String>) -> Self {
        *self.last_working_model.write() = Some(model.into());
        self
    }

    /// Model that answered most recently, if any.
    pub fn last_working_model(&self) -> Option<String> {
        self.last_working_model.read().clone()
    }

    pub fn candidates(&self) -> Vec<String> {
        self.candidates.read().clone()
    }

    /// Replace the candidate list. The remembered model is kept.
    pub fn set_candidates(&self, candidates: Vec<String>) {
        *self.candidates.write() = sanitize(candidates);
    }

    /// One request against one model.
    async fn generate_with(&self, model: &str, prompt: &str, credential: &str) -> GenerationResult {
        let url = format!("{}/models/{}:generateContent", self.base_url, model);
        let request = GenerateContentRequest::prompt(prompt, self.generation_config.clone());

        debug!("Gemini generate_content: model={}", model);

        let network = |e: reqwest::Error| GenerationError::Network {
            model: model.to_string(),
            message: e.to_string(),
        };

        let response = self
            .client
            .post(&url)
            .query(&[("key", credential)])
            .json(&request)
            .send()
            .await
            .map_err(network)?;

        let status = response.status();
        let body = response.text().await.map_err(network)?;

        if !status.is_success() {
            let message = match serde_json::from_str::<GeminiError>(&body) {
                Ok(e) => e.error.message,
                Err(_) => body,
            };
            return Err(GenerationError::Api {
                model: model.to_string(),
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateContentResponse =
            serde_json::from_str(&body).map_err(|e| GenerationError::MalformedResponse {
                model: model.to_string(),
                reason: format!("Failed to parse response: {}", e),
            })?;

        parsed
            .first_text()
            .map(str::to_string)
            .ok_or_else(|| GenerationError::MalformedResponse {
                model: model.to_string(),
                reason: "missing candidates[0].content.parts[0].text".to_string(),
            })
    }

    fn remember(&self, model: &str) {
        let mut last = self.last_working_model.write();
        if last.as_deref() != Some(model) {
            info!("Using Gemini model {}", model);
            *last = Some(model.to_string());
        }
    }
}

#[async_trait]
impl TextGenerator for ModelClient {
    fn id(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, prompt: &str, credential: &str) -> GenerationResult {
        let candidates = self.candidates();
        let mut failures = Vec::new();

        for model in &candidates {
            match self.generate_with(model, prompt, credential).await {
                Ok(text) => {
                    self.remember(model);
                    return Ok(text);
                }
                Err(e) => {
                    warn!("Gemini model failed: {}", e);
                    failures.push(e);
                }
            }
        }

        let fallback = self
            .last_working_model()
            .filter(|model| !candidates.contains(model));
        if let Some(model) = fallback {
            debug!("Retrying remembered model {}", model);
            match self.generate_with(&model, prompt, credential).await {
                Ok(text) => return Ok(text),
                Err(e) => {
                    warn!("Remembered Gemini model failed: {}", e);
                    failures.push(e);
                }
            }
        }

        Err(GenerationError::AllCandidatesExhausted { failures })
    }
}

fn sanitize(candidates: Vec<String>) -> Vec<String> {
    candidates
        .into_iter()
        .map(|model| model.trim().to_string())
        .filter(|model| !model.is_empty())
        .collect()
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
