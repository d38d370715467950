//! OpenRouter provider using the OpenAI-compatible REST surface
//!
//! Calls `{base_url}/embeddings` and `{base_url}/completions` with a bearer
//! token. Works against any OpenAI-compatible endpoint by changing
//! `openrouter.base_url`. Failures are logged and returned; there are no
//! retries.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::config::Config;
use crate::error::{AgeniError, Result};
use crate::provider::ModelProvider;

/// Client for the embedding and completion endpoints
#[derive(Debug, Clone)]
pub struct OpenRouterClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    embedding_model: String,
}

/// OpenAI-compatible embedding request
#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    #[serde(default)]
    data: Vec<EmbeddingData>,
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// OpenAI-compatible (legacy) completion request
#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    #[serde(default)]
    text: String,
}

/// OpenRouter reports some upstream failures inside a 200 response
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

impl OpenRouterClient {
    /// Build a client from the `openrouter` and `memory` sections of `config`
    pub fn new(config: &Config) -> Result<Self> {
        let base_url = normalize_base_url(&config.openrouter.base_url)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.openrouter.timeout_secs))
            .build()
            .map_err(|e| AgeniError::Config(format!("Failed to build HTTP client: {e}")))?;

        debug!(
            "OpenRouterClient initialized with model: {}, embedding model: {}, base_url: {}",
            config.openrouter.model, config.memory.embedding_model, base_url
        );

        Ok(Self {
            client,
            base_url,
            api_key: config.openrouter.api_key.clone(),
            model: config.openrouter.model.clone(),
            embedding_model: config.memory.embedding_model.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn embedding_model(&self) -> &str {
        &self.embedding_model
    }

    async fn request_embedding(&self, text: &str) -> Result<Vec<f32>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AgeniError::Embedding("API key not configured".to_string()))?;

        let request = EmbeddingRequest {
            model: &self.embedding_model,
            input: text,
        };

        let url = format!("{}/embeddings", self.base_url);
        debug!("Requesting embedding from {url}");

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AgeniError::Embedding(format!("Request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AgeniError::Embedding(format!(
                "API returned {status}: {error_text}"
            )));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| AgeniError::Embedding(format!("Failed to parse response: {e}")))?;

        if let Some(error) = parsed.error {
            return Err(AgeniError::Embedding(error.message));
        }

        parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .filter(|embedding| !embedding.is_empty())
            .ok_or_else(|| AgeniError::Embedding("Empty embedding in response".to_string()))
    }

    async fn request_completion(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AgeniError::Generation("API key not configured".to_string()))?;

        let request = CompletionRequest {
            model: &self.model,
            prompt,
            max_tokens,
        };

        let url = format!("{}/completions", self.base_url);
        debug!("Requesting completion from {url} (max_tokens: {max_tokens})");

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AgeniError::Generation(format!("Request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AgeniError::Generation(format!(
                "API returned {status}: {error_text}"
            )));
        }

        let parsed: CompletionResponse = response
            .json()
            .await
            .map_err(|e| AgeniError::Generation(format!("Failed to parse response: {e}")))?;

        if let Some(error) = parsed.error {
            return Err(AgeniError::Generation(error.message));
        }

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.text)
            .ok_or_else(|| AgeniError::Generation("Empty response".to_string()))
    }
}

#[async_trait]
impl ModelProvider for OpenRouterClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let result = self.request_embedding(text).await;
        if let Err(ref e) = result {
            warn!("Error getting embedding: {e}");
        }
        result
    }

    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        let result = self.request_completion(prompt, max_tokens).await;
        if let Err(ref e) = result {
            warn!("Error generating text: {e}");
        }
        result
    }

    fn name(&self) -> &'static str {
        "openrouter"
    }
}

fn normalize_base_url(raw: &str) -> Result<String> {
    Url::parse(raw)
        .map_err(|e| AgeniError::Config(format!("Invalid provider base URL '{raw}': {e}")))?;
    Ok(raw.trim_end_matches('/').to_string())
}
