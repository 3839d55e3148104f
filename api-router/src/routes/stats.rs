use std::path::Path;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use common::storage::types::document_chunk::DocumentChunk;
use ingestion_pipeline::loader::list_markdown_files;
use serde::Serialize;
use tracing::warn;

use crate::{api_state::ApiState, error::ApiError};

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub documents: usize,
    pub chunks: usize,
    pub files: Vec<String>,
}

/// Diagnostic read-only snapshot: the `.md` files currently on disk and a
/// best-effort count of indexed chunks.
pub async fn stats(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let mut files: Vec<String> = list_markdown_files(Path::new(&state.config.markdown_dir))?
        .iter()
        .filter_map(|path| path.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .collect();
    files.sort();

    // Deliberate fallback: a count failure (index never created, corrupt
    // store) degrades to zero instead of failing the whole stats read.
    let chunks = match state.db.count_table::<DocumentChunk>().await {
        Ok(count) => count,
        Err(error) => {
            warn!("chunk count unavailable, reporting 0: {error}");
            0
        }
    };

    Ok((
        StatusCode::OK,
        Json(StatsResponse {
            documents: files.len(),
            chunks,
            files,
        }),
    ))
}
