//! Typed configuration for Ageni
//!
//! Every known key has a default, so a partial (or missing) config file still
//! yields a usable [`Config`]. Keys outside the schema are kept in the `extra`
//! maps so that they survive a load/save round trip.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub mod store;

pub use store::{ConfigStore, default_config_path};

/// Main configuration structure for Ageni
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Vector database connection
    #[serde(default)]
    pub qdrant: QdrantConfig,
    /// Embedding/generation provider
    #[serde(default)]
    pub openrouter: OpenRouterConfig,
    /// Memory behaviour (collection naming, search tuning)
    #[serde(default)]
    pub memory: MemoryConfig,
    /// General switches
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Config {
    /// True when the provider API key and the vector store address are all set.
    pub fn is_complete(&self) -> bool {
        self.openrouter.api_key.is_some() && self.qdrant.host.is_some() && self.qdrant.port.is_some()
    }
}

/// Qdrant connection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QdrantConfig {
    /// Host name or IP of the Qdrant REST API
    #[serde(default = "default_qdrant_host")]
    pub host: Option<String>,
    /// REST port
    #[serde(default = "default_qdrant_port")]
    pub port: Option<u16>,
    /// Optional key sent as the `api-key` header
    #[serde(default)]
    pub api_key: Option<String>,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for QdrantConfig {
    fn default() -> Self {
        Self {
            host: default_qdrant_host(),
            port: default_qdrant_port(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
            extra: Map::new(),
        }
    }
}

fn default_qdrant_host() -> Option<String> {
    Some("localhost".to_string())
}

fn default_qdrant_port() -> Option<u16> {
    Some(6333)
}

fn default_timeout_secs() -> u64 {
    30
}

/// OpenRouter (or any OpenAI-compatible API) configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenRouterConfig {
    /// Bearer token for the provider
    #[serde(default)]
    pub api_key: Option<String>,
    /// Model used for text generation (summaries)
    #[serde(default = "default_generation_model")]
    pub model: String,
    /// API root; `/embeddings` and `/completions` are appended
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for OpenRouterConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_generation_model(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            extra: Map::new(),
        }
    }
}

fn default_generation_model() -> String {
    "openai/gpt-4o".to_string()
}

fn default_base_url() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

/// Memory storage and retrieval configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Whether contexts name characters or chats; drives the collection prefix
    #[serde(default)]
    pub collection_type: CollectionType,
    /// Model used for embeddings
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
    /// Dimension of the vectors stored in new collections
    #[serde(default = "default_vector_size")]
    pub vector_size: usize,
    /// Minimum score (inclusive) for a retrieved memory to be returned
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,
    /// Default number of search hits requested on retrieval
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            collection_type: CollectionType::default(),
            embedding_model: default_embedding_model(),
            vector_size: default_vector_size(),
            similarity_threshold: default_similarity_threshold(),
            max_results: default_max_results(),
            extra: Map::new(),
        }
    }
}

fn default_embedding_model() -> String {
    "openai/text-embedding-ada-002".to_string()
}

fn default_vector_size() -> usize {
    1536
}

fn default_similarity_threshold() -> f64 {
    0.75
}

fn default_max_results() -> usize {
    10
}

/// General switches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Turns on debug-level logging in the CLI
    #[serde(default)]
    pub debug: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            debug: false,
            extra: Map::new(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

/// Kind of context a collection is scoped to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionType {
    /// One collection per character
    #[default]
    Character,
    /// One collection per chat
    Chat,
}

impl CollectionType {
    /// Prefix prepended to the normalized context name
    pub fn prefix(&self) -> &'static str {
        match self {
            CollectionType::Character => "character_",
            CollectionType::Chat => "chat_",
        }
    }
}

impl fmt::Display for CollectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectionType::Character => write!(f, "character"),
            CollectionType::Chat => write!(f, "chat"),
        }
    }
}

impl FromStr for CollectionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "character" => Ok(CollectionType::Character),
            "chat" => Ok(CollectionType::Chat),
            _ => Err(format!("Unknown collection type: {s}. Use character or chat.")),
        }
    }
}
