pub mod answer_retrieval;
pub mod prompt;

use common::{error::AppError, storage::db::SurrealDbClient, utils::embedding::EmbeddingProvider};
use serde::Deserialize;
use tracing::debug;

/// Fixed number of nearest chunks returned per question.
pub const TOP_K: usize = 4;
/// HNSW search breadth for the KNN operator.
const KNN_EF: usize = 40;

/// A chunk returned from the vector index, ranked by distance to the query
/// embedding. `source` is optional so records lacking one surface as null
/// rather than being skipped.
#[derive(Debug, Clone, Deserialize)]
pub struct RetrievedChunk {
    pub chunk: String,
    pub source: Option<String>,
    pub distance: f32,
}

/// Embeds `question` and returns the `TOP_K` nearest chunks from the index,
/// closest first. A missing or corrupt index surfaces as a database error;
/// recovery is the caller's concern.
pub async fn retrieve_chunks(
    db: &SurrealDbClient,
    embedding: &EmbeddingProvider,
    question: &str,
) -> Result<Vec<RetrievedChunk>, AppError> {
    let query_embedding = embedding.embed(question).await?;

    let chunks: Vec<RetrievedChunk> = db
        .query(format!(
            "SELECT chunk, source, vector::distance::knn() AS distance \
             FROM document_chunk WHERE embedding <|{TOP_K},{KNN_EF}|> $embedding \
             ORDER BY distance"
        ))
        .bind(("embedding", query_embedding))
        .await?
        .take(0)?;

    debug!("retrieved {} chunks for question", chunks.len());

    Ok(chunks)
}
