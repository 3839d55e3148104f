use std::sync::Arc;

use api_router::{api_routes, api_state::ApiState};
use axum::Router;
use common::{
    storage::db::SurrealDbClient,
    utils::{config::get_config, embedding::EmbeddingProvider},
};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Set up tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .try_init()
        .ok();

    // Get config
    let config = get_config()?;

    // Open the embedded vector index
    let db = Arc::new(SurrealDbClient::open(&config.index_dir).await?);

    let openai_client = Arc::new(async_openai::Client::with_config(
        async_openai::config::OpenAIConfig::new()
            .with_api_key(&config.openai_api_key)
            .with_api_base(&config.openai_base_url),
    ));

    // Create embedding provider based on config
    let embedding = Arc::new(EmbeddingProvider::from_config(
        &config,
        Arc::clone(&openai_client),
    ));
    info!(
        embedding_backend = embedding.backend_label(),
        embedding_dimension = embedding.dimension(),
        "Embedding provider initialized"
    );

    db.ensure_chunk_index(embedding.dimension()).await?;

    let state = ApiState::new(db, openai_client, embedding, config.clone());
    let app = build_router(state);

    info!("Starting server listening on 0.0.0.0:{}", config.http_port);
    let serve_address = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(serve_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_router(state: ApiState) -> Router {
    Router::new().merge(api_routes()).with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use common::utils::{config::AppConfig, embedding::EmbeddingBackend};
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;
    use tower::ServiceExt;
    use uuid::Uuid;

    fn test_config(markdown_dir: &Path, openai_base_url: &str) -> AppConfig {
        AppConfig {
            openai_api_key: "test-key".to_string(),
            openai_model: "gpt-5.2".to_string(),
            openai_embedding_model: "text-embedding-3-large".to_string(),
            openai_base_url: openai_base_url.to_string(),
            embedding_dimensions: 8,
            embedding_backend: EmbeddingBackend::Hashed,
            index_dir: "./unused".to_string(),
            markdown_dir: markdown_dir.to_string_lossy().into_owned(),
            http_port: 3000,
        }
    }

    async fn test_router(markdown_dir: &Path) -> Router {
        test_router_against(markdown_dir, "http://localhost:11434/v1").await
    }

    async fn test_router_against(markdown_dir: &Path, openai_base_url: &str) -> Router {
        let db = Arc::new(
            SurrealDbClient::memory("test_ns", &Uuid::new_v4().to_string())
                .await
                .expect("Failed to start in-memory surrealdb"),
        );
        let config = test_config(markdown_dir, openai_base_url);
        let openai_client = Arc::new(async_openai::Client::with_config(
            async_openai::config::OpenAIConfig::new()
                .with_api_key(&config.openai_api_key)
                .with_api_base(&config.openai_base_url),
        ));
        let embedding = Arc::new(EmbeddingProvider::from_config(
            &config,
            Arc::clone(&openai_client),
        ));
        build_router(ApiState::new(db, openai_client, embedding, config))
    }

    async fn get_json(
        router: Router,
        method: &str,
        uri: &str,
    ) -> (StatusCode, serde_json::Value) {
        let response = router
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .expect("request should build"),
            )
            .await
            .expect("request should run");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should collect");
        let json = serde_json::from_slice(&bytes).expect("body should be json");
        (status, json)
    }

    async fn post_json(
        router: Router,
        uri: &str,
        body: serde_json::Value,
    ) -> (StatusCode, serde_json::Value) {
        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .expect("request should build"),
            )
            .await
            .expect("request should run");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should collect");
        let json = serde_json::from_slice(&bytes).expect("body should be json");
        (status, json)
    }

    /// Serves a fixed chat completion on a local port and returns the base url
    /// to point the OpenAI client at.
    async fn spawn_chat_completion_stub(answer: &str) -> String {
        let reply = serde_json::json!({
            "id": "chatcmpl-local",
            "object": "chat.completion",
            "created": 0,
            "model": "gpt-5.2",
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": answer },
                "finish_reason": "stop",
                "logprobs": null
            }]
        });
        let app = Router::new().route(
            "/v1/chat/completions",
            axum::routing::post(move || async move { axum::Json(reply) }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("stub listener should bind");
        let address = listener.local_addr().expect("stub listener address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("stub should serve");
        });
        format!("http://{address}/v1")
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let dir = TempDir::new().expect("tempdir");
        let router = test_router(dir.path()).await;

        let (status, body) = get_json(router, "GET", "/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_ingest_then_stats() {
        let dir = TempDir::new().expect("tempdir");
        fs::write(dir.path().join("a.md"), "Hello world.").expect("write a.md");
        let router = test_router(dir.path()).await;

        let (status, body) = get_json(router.clone(), "POST", "/ingest").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["files"], 1);
        assert_eq!(body["chunks"], 1);

        let (status, body) = get_json(router, "GET", "/stats").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["documents"], 1);
        assert_eq!(body["chunks"], 1);
        assert_eq!(body["files"][0], "a.md");
    }

    #[tokio::test]
    async fn test_ask_answers_with_ingested_sources() {
        let dir = TempDir::new().expect("tempdir");
        fs::write(dir.path().join("a.md"), "Hello world.").expect("write a.md");
        let base_url = spawn_chat_completion_stub("The note says hello world.").await;
        let router = test_router_against(dir.path(), &base_url).await;

        let (status, body) = get_json(router.clone(), "POST", "/ingest").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["chunks"], 1);

        let (status, body) = post_json(
            router,
            "/ask",
            serde_json::json!({ "question": "What does the note say?" }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["answer"], "The note says hello world.");
        assert_eq!(body["sources"], serde_json::json!(["a.md"]));
    }

    #[tokio::test]
    async fn test_ingest_missing_directory_is_an_error() {
        let dir = TempDir::new().expect("tempdir");
        let missing = dir.path().join("nope");
        let router = test_router(&missing).await;

        let (status, body) = get_json(router, "POST", "/ingest").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["status"], "error");
    }

    #[tokio::test]
    async fn test_stats_without_index_reports_zero_chunks() {
        let dir = TempDir::new().expect("tempdir");
        fs::write(dir.path().join("a.md"), "Hello world.").expect("write a.md");
        let router = test_router(dir.path()).await;

        let (status, body) = get_json(router, "GET", "/stats").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["documents"], 1);
        assert_eq!(body["chunks"], 0);
    }

    #[tokio::test]
    async fn test_stats_is_idempotent() {
        let dir = TempDir::new().expect("tempdir");
        fs::write(dir.path().join("a.md"), "Hello world.").expect("write a.md");
        fs::write(dir.path().join("b.md"), "Second file.").expect("write b.md");
        let router = test_router(dir.path()).await;

        let (_, _) = get_json(router.clone(), "POST", "/ingest").await;
        let (_, first) = get_json(router.clone(), "GET", "/stats").await;
        let (_, second) = get_json(router, "GET", "/stats").await;

        assert_eq!(first, second);
    }
}
