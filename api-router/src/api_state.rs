use std::sync::Arc;

use async_openai::{config::OpenAIConfig, Client};
use common::{
    storage::db::SurrealDbClient,
    utils::{config::AppConfig, embedding::EmbeddingProvider},
};

/// Shared handler state: the vector index client, the chat client, the
/// embedding provider, and the immutable configuration. All externally
/// synchronized; no locking happens in this layer.
#[derive(Clone)]
pub struct ApiState {
    pub db: Arc<SurrealDbClient>,
    pub openai_client: Arc<Client<OpenAIConfig>>,
    pub embedding: Arc<EmbeddingProvider>,
    pub config: AppConfig,
}

impl ApiState {
    pub fn new(
        db: Arc<SurrealDbClient>,
        openai_client: Arc<Client<OpenAIConfig>>,
        embedding: Arc<EmbeddingProvider>,
        config: AppConfig,
    ) -> Self {
        Self {
            db,
            openai_client,
            embedding,
            config,
        }
    }
}
