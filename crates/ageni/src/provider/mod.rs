//! Embedding and text-generation providers
//!
//! The memory manager only talks to a [`ModelProvider`]; the production
//! implementation is [`OpenRouterClient`], tests use
//! [`MockModelProvider`](crate::testing::MockModelProvider).

use async_trait::async_trait;

use crate::error::Result;

pub mod openrouter;

pub use openrouter::OpenRouterClient;

/// Trait for remote model backends (embeddings + completions)
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Embed a single text. The manager treats an empty vector as a failure.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate a completion for `prompt`, capped at `max_tokens`
    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}
