//! Vector storage for memories
//!
//! [`VectorStore`] is the seam between the memory manager and the vector
//! database. [`QdrantClient`] talks to Qdrant's REST API;
//! [`InMemoryVectorStore`](crate::testing::InMemoryVectorStore) backs tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::CollectionType;
use crate::error::Result;
use crate::memory::MemoryRecord;

pub mod qdrant;

pub use qdrant::QdrantClient;

/// A vector plus its memory payload, ready to upsert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorPoint {
    pub id: Uuid,
    pub vector: Vec<f32>,
    pub payload: MemoryRecord,
}

impl VectorPoint {
    /// Create a point with a fresh random id
    pub fn new(vector: Vec<f32>, payload: MemoryRecord) -> Self {
        Self {
            id: Uuid::new_v4(),
            vector,
            payload,
        }
    }
}

/// A search hit, in the order the store ranked it
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredPoint {
    /// Similarity score as reported by the store (cosine for our collections)
    pub score: f64,
    pub payload: MemoryRecord,
}

/// Trait for vector database backends
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Create a collection sized for the configured embedding dimension
    async fn create_collection(&self, name: &str) -> Result<()>;

    /// Insert or replace a batch of points
    async fn upsert_vectors(&self, collection: &str, points: Vec<VectorPoint>) -> Result<()>;

    /// Nearest neighbours of `vector`, best first, with payloads
    async fn search_vectors(
        &self,
        collection: &str,
        vector: Vec<f32>,
        limit: usize,
    ) -> Result<Vec<ScoredPoint>>;

    /// Names of all existing collections
    async fn list_collections(&self) -> Result<Vec<String>>;
}

/// Derive the collection name for a context.
///
/// Lower-cases the context and replaces spaces and dots with underscores,
/// then prepends `character_` or `chat_`.
pub fn collection_name(context: &str, collection_type: CollectionType) -> String {
    let normalized = context.to_lowercase().replace([' ', '.'], "_");
    format!("{}{}", collection_type.prefix(), normalized)
}
