//! Memory manager - orchestrates memory storage and retrieval
//!
//! Combines a [`ModelProvider`] (embeddings, summaries) with a
//! [`VectorStore`] (one collection per context).
//!
//! Writes are two remote calls, embed then upsert, and are not atomic: if the
//! upsert fails after a collection was created, the empty collection stays.

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AgeniError, Result};
use crate::memory::keywords::KeywordTaxonomy;
use crate::memory::prompts::{
    NO_MEMORIES_MESSAGE, SUMMARY_MAX_TOKENS, SUMMARY_QUERY, SUMMARY_SEARCH_LIMIT, summary_prompt,
};
use crate::memory::types::{MemoryRecord, MessageType};
use crate::provider::{ModelProvider, OpenRouterClient};
use crate::storage::{QdrantClient, VectorPoint, VectorStore, collection_name};

/// Outcome of [`MemoryManager::test_connection`]
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionReport {
    /// Name of the model provider that answered
    pub provider: &'static str,
    /// Length of the test embedding
    pub embedding_dimension: usize,
    /// Collections currently in the vector store
    pub collections: Vec<String>,
}

/// Memory manager combining a model provider and a vector store
pub struct MemoryManager {
    provider: Arc<dyn ModelProvider>,
    store: Arc<dyn VectorStore>,
    config: Config,
    taxonomy: KeywordTaxonomy,
}

impl MemoryManager {
    /// Create a manager talking to OpenRouter and Qdrant as configured.
    ///
    /// Succeeds even when the config is incomplete; operations then fail with
    /// [`AgeniError::ConfigIncomplete`].
    pub fn new(config: &Config) -> Result<Self> {
        let provider = OpenRouterClient::new(config)?;
        let store = QdrantClient::new(config)?;
        Ok(Self::with_clients(
            config.clone(),
            Arc::new(provider),
            Arc::new(store),
        ))
    }

    /// Create a manager over arbitrary backends
    pub fn with_clients(
        config: Config,
        provider: Arc<dyn ModelProvider>,
        store: Arc<dyn VectorStore>,
    ) -> Self {
        Self {
            provider,
            store,
            config,
            taxonomy: KeywordTaxonomy::default(),
        }
    }

    /// Replace the keyword taxonomy used to tag new memories
    pub fn with_taxonomy(mut self, taxonomy: KeywordTaxonomy) -> Self {
        self.taxonomy = taxonomy;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn taxonomy(&self) -> &KeywordTaxonomy {
        &self.taxonomy
    }

    /// Collection that holds the memories of `context`
    pub fn collection_name(&self, context: &str) -> String {
        collection_name(context, self.config.memory.collection_type)
    }

    /// Tag `text` with the manager's keyword taxonomy
    pub fn extract_keywords(&self, text: &str) -> Vec<String> {
        self.taxonomy.extract(text)
    }

    /// Store a new memory for `context`, creating its collection on first use.
    ///
    /// Returns the id of the stored vector point.
    pub async fn add_memory(
        &self,
        text: &str,
        context: &str,
        message_type: MessageType,
    ) -> Result<Uuid> {
        self.ensure_complete()?;

        let collection = self.collection_name(context);

        if !self.collection_exists(&collection).await? {
            self.store.create_collection(&collection).await.map_err(|e| {
                warn!("Failed to create collection: {collection}");
                AgeniError::CollectionCreate(format!("{collection} ({e})"))
            })?;
        }

        let record = MemoryRecord::new(
            text.to_string(),
            context.to_string(),
            message_type,
            self.extract_keywords(text),
        );

        let embedding = self.embed(text).await?;
        if embedding.len() != self.config.memory.vector_size {
            warn!(
                "Embedding has {} dimensions, collection expects {}",
                embedding.len(),
                self.config.memory.vector_size
            );
        }

        let point = VectorPoint::new(embedding, record);
        let id = point.id;

        match self.store.upsert_vectors(&collection, vec![point]).await {
            Ok(()) => {
                info!("Successfully added memory {id} to {collection}");
                Ok(id)
            }
            Err(e) => {
                warn!("Failed to add memory to {collection}");
                Err(e)
            }
        }
    }

    /// Memories of `context` relevant to `query`, best match first.
    ///
    /// Requests `limit` hits (default `memory.max_results`) and keeps those
    /// scoring at least `memory.similarity_threshold`.
    pub async fn retrieve_memories(
        &self,
        query: &str,
        context: &str,
        limit: Option<usize>,
    ) -> Result<Vec<MemoryRecord>> {
        self.ensure_complete()?;

        let limit = limit.unwrap_or(self.config.memory.max_results);
        let collection = self.collection_name(context);

        let embedding = self.embed(query).await?;
        let hits = self
            .store
            .search_vectors(&collection, embedding, limit)
            .await?;

        let threshold = self.config.memory.similarity_threshold;
        let total = hits.len();
        let memories: Vec<MemoryRecord> = hits
            .into_iter()
            .filter(|hit| hit.score >= threshold)
            .map(|hit| hit.payload)
            .collect();

        debug!(
            "Retrieved {} of {total} hits from {collection} (threshold {threshold})",
            memories.len()
        );
        Ok(memories)
    }

    /// Summarize what is remembered about `context`.
    ///
    /// Returns [`NO_MEMORIES_MESSAGE`] without further remote calls when the
    /// context has no collection. Otherwise samples up to 20 memories with a
    /// generic query (no threshold) and asks the provider to summarize the
    /// first 10. The generated text is returned verbatim.
    pub async fn get_context_summary(&self, context: &str) -> Result<String> {
        self.ensure_complete()?;

        let collection = self.collection_name(context);
        if !self.collection_exists(&collection).await? {
            debug!("No collection {collection}; nothing to summarize");
            return Ok(NO_MEMORIES_MESSAGE.to_string());
        }

        let embedding = self.embed(SUMMARY_QUERY).await?;
        let hits = self
            .store
            .search_vectors(&collection, embedding, SUMMARY_SEARCH_LIMIT)
            .await?;

        let prompt = summary_prompt(hits.iter().map(|hit| hit.payload.text.as_str()));
        self.provider.generate(&prompt, SUMMARY_MAX_TOKENS).await
    }

    /// Check both backends: embed a short test text, then list collections
    pub async fn test_connection(&self) -> Result<ConnectionReport> {
        self.ensure_complete()?;

        let embedding = self.embed("test").await?;
        let collections = self.store.list_collections().await?;

        info!(
            "Connected to {} and vector store ({} collections)",
            self.provider.name(),
            collections.len()
        );

        Ok(ConnectionReport {
            provider: self.provider.name(),
            embedding_dimension: embedding.len(),
            collections,
        })
    }

    /// Names of all collections in the vector store
    pub async fn list_collections(&self) -> Result<Vec<String>> {
        self.ensure_complete()?;
        self.store.list_collections().await
    }

    fn ensure_complete(&self) -> Result<()> {
        if self.config.is_complete() {
            Ok(())
        } else {
            warn!("Configuration not complete. Please set up your API keys.");
            Err(AgeniError::ConfigIncomplete)
        }
    }

    async fn collection_exists(&self, collection: &str) -> Result<bool> {
        let collections = self.store.list_collections().await?;
        Ok(collections.iter().any(|name| name == collection))
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let embedding = self.provider.embed(text).await?;
        if embedding.is_empty() {
            warn!("Failed to get embedding for text");
            return Err(AgeniError::Embedding("Provider returned an empty embedding".to_string()));
        }
        Ok(embedding)
    }
}
