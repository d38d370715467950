//! Ageni - Long-term memory for character chat
//!
//! This crate stores conversational memories in a Qdrant vector database and
//! retrieves semantically relevant ones later, using an OpenAI-compatible
//! provider (OpenRouter by default) for embeddings and summaries.

pub mod config;
pub mod error;
pub mod memory;
pub mod provider;
pub mod storage;
pub mod testing;

pub use config::{Config, ConfigStore};
pub use error::{AgeniError, Result};
pub use memory::{KeywordTaxonomy, MemoryManager, MemoryRecord, MessageType};
