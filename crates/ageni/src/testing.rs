//! Test utilities for ageni - mock backends
//!
//! In-process stand-ins for the model provider and the vector store so that
//! memory manager tests run without network access:
//! - [`MockModelProvider`] produces deterministic hash-based embeddings
//! - [`InMemoryVectorStore`] keeps collections in a map and ranks by cosine

use std::collections::BTreeMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::error::{AgeniError, Result};
use crate::provider::ModelProvider;
use crate::storage::{ScoredPoint, VectorPoint, VectorStore};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// How [`MockModelProvider::embed`] answers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EmbeddingMode {
    Hashed,
    Empty,
    Failing,
}

/// Model provider for fast tests that don't need a real API.
///
/// Embeddings are derived from a hash of the input text, so equal texts embed
/// identically. Generation returns a fixed reply and records every prompt.
#[derive(Debug)]
pub struct MockModelProvider {
    dimension: usize,
    embedding_mode: EmbeddingMode,
    reply: Option<String>,
    embed_calls: AtomicUsize,
    prompts: Mutex<Vec<(String, u32)>>,
}

impl MockModelProvider {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            embedding_mode: EmbeddingMode::Hashed,
            reply: Some("Mock summary".to_string()),
            embed_calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Reply returned by `generate`
    pub fn with_reply(mut self, reply: impl Into<String>) -> Self {
        self.reply = Some(reply.into());
        self
    }

    /// Make `embed` succeed with an empty vector
    pub fn with_empty_embeddings(mut self) -> Self {
        self.embedding_mode = EmbeddingMode::Empty;
        self
    }

    /// Make `embed` fail with an embedding error
    pub fn with_failing_embeddings(mut self) -> Self {
        self.embedding_mode = EmbeddingMode::Failing;
        self
    }

    /// Make `generate` fail with a generation error
    pub fn with_failing_generation(mut self) -> Self {
        self.reply = None;
        self
    }

    /// Deterministic embedding of `text` with values in [-1, 1]
    pub fn embedding_for(&self, text: &str) -> Vec<f32> {
        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        let seed = hasher.finish();

        (0..self.dimension)
            .map(|i| {
                let x = seed
                    .wrapping_mul(i as u64 + 1)
                    .wrapping_add(0x9e3779b97f4a7c15);
                let normalized = (x as f32) / (u64::MAX as f32);
                (normalized * 2.0) - 1.0
            })
            .collect()
    }

    pub fn embed_calls(&self) -> usize {
        self.embed_calls.load(Ordering::SeqCst)
    }

    pub fn generate_calls(&self) -> usize {
        lock(&self.prompts).len()
    }

    /// Every `(prompt, max_tokens)` passed to `generate`, in call order
    pub fn prompts(&self) -> Vec<(String, u32)> {
        lock(&self.prompts).clone()
    }
}

#[async_trait]
impl ModelProvider for MockModelProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_calls.fetch_add(1, Ordering::SeqCst);
        match self.embedding_mode {
            EmbeddingMode::Hashed => Ok(self.embedding_for(text)),
            EmbeddingMode::Empty => Ok(Vec::new()),
            EmbeddingMode::Failing => {
                Err(AgeniError::Embedding("mock embedding failure".to_string()))
            }
        }
    }

    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        lock(&self.prompts).push((prompt.to_string(), max_tokens));
        self.reply
            .clone()
            .ok_or_else(|| AgeniError::Generation("mock generation failure".to_string()))
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

/// A call received by [`InMemoryVectorStore`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    CreateCollection(String),
    Upsert { collection: String, points: usize },
    Search { collection: String, limit: usize },
    ListCollections,
}

/// Vector store kept in process memory.
///
/// Search ranks by cosine similarity unless canned hits were supplied with
/// [`with_search_results`](Self::with_search_results). Every call is recorded.
#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    collections: Mutex<BTreeMap<String, Vec<VectorPoint>>>,
    search_results: Option<Vec<ScoredPoint>>,
    fail_create: bool,
    fail_upsert: bool,
    fail_search: bool,
    calls: Mutex<Vec<StoreCall>>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an existing, empty collection
    pub fn with_collection(self, name: impl Into<String>) -> Self {
        lock(&self.collections).entry(name.into()).or_default();
        self
    }

    /// Answer every search with `hits` (truncated to the requested limit)
    pub fn with_search_results(mut self, hits: Vec<ScoredPoint>) -> Self {
        self.search_results = Some(hits);
        self
    }

    pub fn with_failing_create(mut self) -> Self {
        self.fail_create = true;
        self
    }

    pub fn with_failing_upsert(mut self) -> Self {
        self.fail_upsert = true;
        self
    }

    pub fn with_failing_search(mut self) -> Self {
        self.fail_search = true;
        self
    }

    /// Every call received so far, in order
    pub fn calls(&self) -> Vec<StoreCall> {
        lock(&self.calls).clone()
    }

    pub fn upsert_calls(&self) -> usize {
        lock(&self.calls)
            .iter()
            .filter(|c| matches!(c, StoreCall::Upsert { .. }))
            .count()
    }

    /// Points stored in `collection` (empty if it doesn't exist)
    pub fn points(&self, collection: &str) -> Vec<VectorPoint> {
        lock(&self.collections)
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    pub fn has_collection(&self, collection: &str) -> bool {
        lock(&self.collections).contains_key(collection)
    }

    fn record(&self, call: StoreCall) {
        lock(&self.calls).push(call);
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn create_collection(&self, name: &str) -> Result<()> {
        self.record(StoreCall::CreateCollection(name.to_string()));
        if self.fail_create {
            return Err(AgeniError::VectorStore("mock create failure".to_string()));
        }
        lock(&self.collections).entry(name.to_string()).or_default();
        Ok(())
    }

    async fn upsert_vectors(&self, collection: &str, points: Vec<VectorPoint>) -> Result<()> {
        self.record(StoreCall::Upsert {
            collection: collection.to_string(),
            points: points.len(),
        });
        if self.fail_upsert {
            return Err(AgeniError::VectorStore("mock upsert failure".to_string()));
        }

        let mut collections = lock(&self.collections);
        let stored = collections.get_mut(collection).ok_or_else(|| {
            AgeniError::VectorStore(format!("Collection `{collection}` doesn't exist"))
        })?;
        for point in points {
            match stored.iter_mut().find(|p| p.id == point.id) {
                Some(existing) => *existing = point,
                None => stored.push(point),
            }
        }
        Ok(())
    }

    async fn search_vectors(
        &self,
        collection: &str,
        vector: Vec<f32>,
        limit: usize,
    ) -> Result<Vec<ScoredPoint>> {
        self.record(StoreCall::Search {
            collection: collection.to_string(),
            limit,
        });
        if self.fail_search {
            return Err(AgeniError::VectorStore("mock search failure".to_string()));
        }
        if let Some(hits) = &self.search_results {
            return Ok(hits.iter().take(limit).cloned().collect());
        }

        let collections = lock(&self.collections);
        let stored = collections.get(collection).ok_or_else(|| {
            AgeniError::VectorStore(format!("Collection `{collection}` doesn't exist"))
        })?;

        let mut hits: Vec<ScoredPoint> = stored
            .iter()
            .map(|point| ScoredPoint {
                score: cosine_similarity(&vector, &point.vector),
                payload: point.payload.clone(),
            })
            .collect();
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(limit);
        Ok(hits)
    }

    async fn list_collections(&self) -> Result<Vec<String>> {
        self.record(StoreCall::ListCollections);
        Ok(lock(&self.collections).keys().cloned().collect())
    }
}

/// Cosine similarity, 0.0 when either vector has zero length or sizes differ
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f64 = a.iter().zip(b).map(|(x, y)| f64::from(*x) * f64::from(*y)).sum();
    let norm_a: f64 = a.iter().map(|x| f64::from(*x).powi(2)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| f64::from(*x).powi(2)).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}
