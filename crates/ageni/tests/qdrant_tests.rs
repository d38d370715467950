//! Integration tests for the Qdrant REST client
//!
//! Runs `QdrantClient` against a wiremock server and checks request shapes
//! and status handling.

use ageni::config::Config;
use ageni::storage::{QdrantClient, VectorPoint, VectorStore};
use ageni::{AgeniError, MemoryRecord, MessageType};
use serde_json::json;
use wiremock::matchers::{body_json, body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

/// Test fixture: Config pointing the Qdrant client at `server`
fn config_for(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.qdrant.host = Some(server.address().ip().to_string());
    config.qdrant.port = Some(server.address().port());
    config.memory.vector_size = 4;
    config
}

/// Test fixture: A point with a known vector
fn create_test_point(text: &str) -> VectorPoint {
    VectorPoint::new(
        vec![0.5, 0.25, 0.0, 1.0],
        MemoryRecord::new(
            text.to_string(),
            "Alice".to_string(),
            MessageType::User,
            vec!["user_i".to_string()],
        ),
    )
}

fn payload_json(text: &str, score: f64) -> serde_json::Value {
    json!({
        "id": "0b4a9f0e-7e37-4f4a-9b55-3f1f3c1a2d10",
        "version": 3,
        "score": score,
        "payload": {
            "text": text,
            "context": "Alice",
            "type": "character",
            "timestamp": 1700000000.25,
            "keywords": [],
            "source": "risu_ai"
        }
    })
}

// =============================================================================
// Collections
// =============================================================================

mod collection_tests {
    use super::*;

    #[tokio::test]
    async fn test_create_collection_request_body() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/collections/character_alice"))
            .and(body_json(json!({
                "vectors": {"size": 4, "distance": "Cosine"},
                "optimizers_config": {"default_segment_number": 4, "reordering_enabled": true}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": true, "status": "ok"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = QdrantClient::new(&config_for(&server)).unwrap();
        client.create_collection("character_alice").await.unwrap();
    }

    #[tokio::test]
    async fn test_create_collection_accepts_created() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/collections/chat_lobby"))
            .respond_with(ResponseTemplate::new(201))
            .mount(&server)
            .await;

        let client = QdrantClient::new(&config_for(&server)).unwrap();
        assert!(client.create_collection("chat_lobby").await.is_ok());
    }

    #[tokio::test]
    async fn test_create_collection_conflict() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/collections/chat_lobby"))
            .respond_with(
                ResponseTemplate::new(409).set_body_string("Collection `chat_lobby` already exists!"),
            )
            .mount(&server)
            .await;

        let client = QdrantClient::new(&config_for(&server)).unwrap();
        let err = client.create_collection("chat_lobby").await.unwrap_err();

        assert!(matches!(err, AgeniError::VectorStore(_)));
        assert!(err.to_string().contains("409"));
        assert!(err.to_string().contains("already exists"));
    }

    #[tokio::test]
    async fn test_list_collections() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/collections"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": {"collections": [{"name": "character_alice"}, {"name": "chat_lobby"}]},
                "status": "ok",
                "time": 0.0001
            })))
            .mount(&server)
            .await;

        let client = QdrantClient::new(&config_for(&server)).unwrap();
        let names = client.list_collections().await.unwrap();

        assert_eq!(names, ["character_alice", "chat_lobby"]);
    }

    #[tokio::test]
    async fn test_list_collections_server_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/collections"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = QdrantClient::new(&config_for(&server)).unwrap();
        assert!(matches!(
            client.list_collections().await,
            Err(AgeniError::VectorStore(_))
        ));
    }

    #[tokio::test]
    async fn test_list_collections_malformed_body() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/collections"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy</html>"))
            .mount(&server)
            .await;

        let client = QdrantClient::new(&config_for(&server)).unwrap();
        assert!(client.list_collections().await.is_err());
    }

    #[tokio::test]
    async fn test_unreachable_server() {
        let mut config = Config::default();
        config.qdrant.host = Some("127.0.0.1".to_string());
        config.qdrant.port = Some(1);

        let client = QdrantClient::new(&config).unwrap();
        assert!(matches!(
            client.list_collections().await,
            Err(AgeniError::VectorStore(_))
        ));
    }
}

// =============================================================================
// Points
// =============================================================================

mod point_tests {
    use super::*;

    #[tokio::test]
    async fn test_upsert_request_body() {
        let server = MockServer::start().await;
        let point = create_test_point("hello there");

        Mock::given(method("PUT"))
            .and(path("/collections/character_alice/points"))
            .and(body_partial_json(json!({
                "points": [{
                    "id": point.id.to_string(),
                    "vector": [0.5, 0.25, 0.0, 1.0],
                    "payload": {
                        "text": "hello there",
                        "context": "Alice",
                        "type": "user",
                        "keywords": ["user_i"],
                        "source": "risu_ai"
                    }
                }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": {"operation_id": 1, "status": "acknowledged"},
                "status": "ok"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = QdrantClient::new(&config_for(&server)).unwrap();
        client
            .upsert_vectors("character_alice", vec![point])
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_upsert_rejects_non_ok_status() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/collections/character_alice/points"))
            .respond_with(ResponseTemplate::new(201))
            .mount(&server)
            .await;

        let client = QdrantClient::new(&config_for(&server)).unwrap();
        let result = client
            .upsert_vectors("character_alice", vec![create_test_point("x")])
            .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_search_request_and_results() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/collections/character_alice/points/search"))
            .and(body_json(json!({
                "vector": [1.0, 0.0, 0.0, 0.5],
                "limit": 5,
                "with_payload": true
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": [payload_json("best", 0.91), payload_json("second", 0.8)],
                "status": "ok"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = QdrantClient::new(&config_for(&server)).unwrap();
        let hits = client
            .search_vectors("character_alice", vec![1.0, 0.0, 0.0, 0.5], 5)
            .await
            .unwrap();

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].payload.text, "best");
        assert!((hits[0].score - 0.91).abs() < 1e-9);
        assert_eq!(hits[1].payload.message_type, MessageType::Character);
    }

    #[tokio::test]
    async fn test_search_skips_foreign_payloads() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/collections/character_alice/points/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": [
                    {"id": 1, "score": 0.99, "payload": {"title": "not a memory"}},
                    {"id": 2, "score": 0.95},
                    payload_json("kept", 0.9)
                ]
            })))
            .mount(&server)
            .await;

        let client = QdrantClient::new(&config_for(&server)).unwrap();
        let hits = client
            .search_vectors("character_alice", vec![0.0; 4], 10)
            .await
            .unwrap();

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].payload.text, "kept");
    }

    #[tokio::test]
    async fn test_search_missing_collection() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/collections/character_ghost/points/search"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "status": {"error": "Not found: Collection `character_ghost` doesn't exist!"}
            })))
            .mount(&server)
            .await;

        let client = QdrantClient::new(&config_for(&server)).unwrap();
        let err = client
            .search_vectors("character_ghost", vec![0.0; 4], 10)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("404"));
    }
}

// =============================================================================
// Authentication
// =============================================================================

mod auth_tests {
    use super::*;

    #[tokio::test]
    async fn test_api_key_header_sent_when_configured() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/collections"))
            .and(header("api-key", "qdrant-secret"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"result": {"collections": []}})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let mut config = config_for(&server);
        config.qdrant.api_key = Some("qdrant-secret".to_string());

        let client = QdrantClient::new(&config).unwrap();
        assert!(client.list_collections().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_no_api_key_header_by_default() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/collections"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"result": {"collections": []}})),
            )
            .mount(&server)
            .await;

        let client = QdrantClient::new(&config_for(&server)).unwrap();
        client.list_collections().await.unwrap();

        let requests: Vec<Request> = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert!(!requests[0].headers.contains_key("api-key"));
    }

    #[tokio::test]
    async fn test_blank_api_key_sends_no_header() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/collections"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"result": {"collections": []}})),
            )
            .mount(&server)
            .await;

        for blank in ["", "   "] {
            let mut config = config_for(&server);
            config.qdrant.api_key = Some(blank.to_string());

            let client = QdrantClient::new(&config).unwrap();
            client.list_collections().await.unwrap();
        }

        let requests: Vec<Request> = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 2);
        assert!(requests.iter().all(|r| !r.headers.contains_key("api-key")));
    }
}
