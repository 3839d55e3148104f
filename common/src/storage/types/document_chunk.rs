use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::storage::types::{deserialize_flexible_id, serialize_datetime, StoredObject};

/// One split window of a source document, persisted together with its
/// embedding vector. Chunks are written once during ingestion and never
/// updated or deleted afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentChunk {
    #[serde(deserialize_with = "deserialize_flexible_id")]
    pub id: String,
    #[serde(serialize_with = "serialize_datetime")]
    pub created_at: DateTime<Utc>,
    pub source: String,
    pub chunk: String,
    pub embedding: Vec<f32>,
}

impl StoredObject for DocumentChunk {
    fn table_name() -> &'static str {
        "document_chunk"
    }

    fn get_id(&self) -> &str {
        &self.id
    }
}

impl DocumentChunk {
    pub fn new(source: String, chunk: String, embedding: Vec<f32>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            source,
            chunk,
            embedding,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::db::SurrealDbClient;

    #[test]
    fn test_document_chunk_creation() {
        let chunk = DocumentChunk::new(
            "notes.md".to_string(),
            "Some markdown text".to_string(),
            vec![0.1, 0.2, 0.3],
        );

        assert_eq!(chunk.source, "notes.md");
        assert_eq!(chunk.chunk, "Some markdown text");
        assert_eq!(chunk.embedding, vec![0.1, 0.2, 0.3]);
        assert!(!chunk.id.is_empty());
    }

    #[tokio::test]
    async fn test_document_chunk_persistence() {
        let namespace = "test_ns";
        let database = &Uuid::new_v4().to_string();
        let db = SurrealDbClient::memory(namespace, database)
            .await
            .expect("Failed to start in-memory surrealdb");

        let chunk = DocumentChunk::new(
            "guide.md".to_string(),
            "Hello world.".to_string(),
            vec![0.5; 8],
        );
        let chunk_id = chunk.id.clone();

        db.store_item(chunk.clone())
            .await
            .expect("Failed to store chunk");

        let retrieved: Option<DocumentChunk> = db
            .get_item(&chunk_id)
            .await
            .expect("Failed to retrieve chunk");

        let retrieved = retrieved.expect("Chunk should exist");
        assert_eq!(retrieved.id, chunk.id);
        assert_eq!(retrieved.source, chunk.source);
        assert_eq!(retrieved.chunk, chunk.chunk);
        assert_eq!(retrieved.embedding, chunk.embedding);
    }
}
