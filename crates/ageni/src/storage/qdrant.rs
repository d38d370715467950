//! Qdrant REST client
//!
//! Implements [`VectorStore`] over Qdrant's HTTP API:
//!
//! | operation | request |
//! |---|---|
//! | create collection | `PUT /collections/{name}` |
//! | upsert | `PUT /collections/{name}/points` |
//! | search | `POST /collections/{name}/points/search` |
//! | list | `GET /collections` |
//!
//! When `qdrant.api_key` is set it is sent as the `api-key` header on every
//! request.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::{CollectionType, Config};
use crate::error::{AgeniError, Result};
use crate::memory::MemoryRecord;
use crate::storage::{ScoredPoint, VectorPoint, VectorStore, collection_name};

const DEFAULT_SEGMENT_NUMBER: u32 = 4;

/// Vector store backed by a Qdrant server
#[derive(Debug, Clone)]
pub struct QdrantClient {
    client: Client,
    base_url: Url,
    vector_size: usize,
    collection_type: CollectionType,
}

#[derive(Debug, Serialize)]
struct CreateCollectionRequest {
    vectors: VectorParams,
    optimizers_config: OptimizersConfig,
}

#[derive(Debug, Serialize)]
struct VectorParams {
    size: usize,
    distance: &'static str,
}

#[derive(Debug, Serialize)]
struct OptimizersConfig {
    default_segment_number: u32,
    reordering_enabled: bool,
}

#[derive(Debug, Serialize)]
struct UpsertRequest<'a> {
    points: &'a [VectorPoint],
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    vector: &'a [f32],
    limit: usize,
    with_payload: bool,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    result: Vec<RawScoredPoint>,
}

#[derive(Debug, Deserialize)]
struct RawScoredPoint {
    score: f64,
    #[serde(default)]
    payload: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct CollectionsResponse {
    result: CollectionsResult,
}

#[derive(Debug, Deserialize)]
struct CollectionsResult {
    collections: Vec<CollectionDescription>,
}

#[derive(Debug, Deserialize)]
struct CollectionDescription {
    name: String,
}

impl QdrantClient {
    /// Build a client from the `qdrant` and `memory` sections of `config`.
    ///
    /// A missing host or port falls back to `localhost:6333`; completeness is
    /// enforced by the memory manager, not here.
    pub fn new(config: &Config) -> Result<Self> {
        let host = config.qdrant.host.as_deref().unwrap_or("localhost");
        let port = config.qdrant.port.unwrap_or(6333);
        let base_url = base_url(host, port)?;

        let mut headers = HeaderMap::new();
        let api_key = config
            .qdrant
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty());
        if let Some(api_key) = api_key {
            let mut value = HeaderValue::from_str(api_key)
                .map_err(|e| AgeniError::Config(format!("Invalid Qdrant API key: {e}")))?;
            value.set_sensitive(true);
            headers.insert("api-key", value);
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.qdrant.timeout_secs))
            .build()
            .map_err(|e| AgeniError::Config(format!("Failed to build HTTP client: {e}")))?;

        debug!("QdrantClient initialized for {base_url}");

        Ok(Self {
            client,
            base_url,
            vector_size: config.memory.vector_size,
            collection_type: config.memory.collection_type,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Collection name for `context` under the configured collection type
    pub fn collection_name(&self, context: &str) -> String {
        collection_name(context, self.collection_type)
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| AgeniError::VectorStore(format!("Invalid Qdrant URL: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn put_collection(&self, name: &str) -> Result<()> {
        let request = CreateCollectionRequest {
            vectors: VectorParams {
                size: self.vector_size,
                distance: "Cosine",
            },
            optimizers_config: OptimizersConfig {
                default_segment_number: DEFAULT_SEGMENT_NUMBER,
                reordering_enabled: true,
            },
        };

        let url = self.endpoint(&["collections", name])?;
        debug!("Creating collection {name} (size: {})", self.vector_size);

        let response = self
            .client
            .put(url)
            .json(&request)
            .send()
            .await
            .map_err(|e| AgeniError::VectorStore(format!("Request failed: {e}")))?;

        match response.status() {
            StatusCode::OK | StatusCode::CREATED => {
                info!("Collection {name} created");
                Ok(())
            }
            _ => Err(failure(response, "Create collection").await),
        }
    }

    async fn put_points(&self, collection: &str, points: &[VectorPoint]) -> Result<()> {
        let url = self.endpoint(&["collections", collection, "points"])?;
        debug!("Upserting {} points into {collection}", points.len());

        let response = self
            .client
            .put(url)
            .json(&UpsertRequest { points })
            .send()
            .await
            .map_err(|e| AgeniError::VectorStore(format!("Request failed: {e}")))?;

        if response.status() != StatusCode::OK {
            return Err(failure(response, "Upsert").await);
        }
        Ok(())
    }

    async fn post_search(
        &self,
        collection: &str,
        vector: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredPoint>> {
        let url = self.endpoint(&["collections", collection, "points", "search"])?;
        debug!("Searching {collection} (limit: {limit})");

        let response = self
            .client
            .post(url)
            .json(&SearchRequest {
                vector,
                limit,
                with_payload: true,
            })
            .send()
            .await
            .map_err(|e| AgeniError::VectorStore(format!("Request failed: {e}")))?;

        if response.status() != StatusCode::OK {
            return Err(failure(response, "Search").await);
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| AgeniError::VectorStore(format!("Failed to parse search response: {e}")))?;

        let hits = parsed
            .result
            .into_iter()
            .filter_map(|hit| {
                let payload = hit.payload?;
                match serde_json::from_value::<MemoryRecord>(payload) {
                    Ok(record) => Some(ScoredPoint {
                        score: hit.score,
                        payload: record,
                    }),
                    Err(e) => {
                        warn!("Skipping search hit with unreadable payload: {e}");
                        None
                    }
                }
            })
            .collect::<Vec<_>>();

        debug!("Found {} hits in {collection}", hits.len());
        Ok(hits)
    }

    async fn get_collections(&self) -> Result<Vec<String>> {
        let url = self.endpoint(&["collections"])?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AgeniError::VectorStore(format!("Request failed: {e}")))?;

        if response.status() != StatusCode::OK {
            return Err(failure(response, "List collections").await);
        }

        let parsed: CollectionsResponse = response.json().await.map_err(|e| {
            AgeniError::VectorStore(format!("Failed to parse collections response: {e}"))
        })?;

        Ok(parsed
            .result
            .collections
            .into_iter()
            .map(|c| c.name)
            .collect())
    }
}

#[async_trait]
impl VectorStore for QdrantClient {
    async fn create_collection(&self, name: &str) -> Result<()> {
        logged("creating collection", self.put_collection(name).await)
    }

    async fn upsert_vectors(&self, collection: &str, points: Vec<VectorPoint>) -> Result<()> {
        logged("upserting vectors", self.put_points(collection, &points).await)
    }

    async fn search_vectors(
        &self,
        collection: &str,
        vector: Vec<f32>,
        limit: usize,
    ) -> Result<Vec<ScoredPoint>> {
        logged(
            "searching vectors",
            self.post_search(collection, &vector, limit).await,
        )
    }

    async fn list_collections(&self) -> Result<Vec<String>> {
        logged("listing collections", self.get_collections().await)
    }
}

/// Base URL for `host`. A bare host gets `http://` and `port`; a full URL
/// keeps its scheme and path, and its own port if it has one.
fn base_url(host: &str, port: u16) -> Result<Url> {
    let invalid = |e: &dyn std::fmt::Display| {
        AgeniError::Config(format!("Invalid Qdrant address '{host}': {e}"))
    };

    if !host.contains("://") {
        return Url::parse(&format!("http://{host}:{port}")).map_err(|e| invalid(&e));
    }

    let mut url = Url::parse(host).map_err(|e| invalid(&e))?;
    if url.port().is_none() {
        url.set_port(Some(port))
            .map_err(|_| invalid(&"cannot carry a port"))?;
    }
    Ok(url)
}

async fn failure(response: Response, operation: &str) -> AgeniError {
    let status = response.status();
    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    AgeniError::VectorStore(format!("{operation} returned {status}: {error_text}"))
}

fn logged<T>(operation: &str, result: Result<T>) -> Result<T> {
    if let Err(ref e) = result {
        warn!("Error {operation}: {e}");
    }
    result
}
