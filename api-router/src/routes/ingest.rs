use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use ingestion_pipeline::IngestionPipeline;
use serde_json::json;
use tracing::info;

use crate::{api_state::ApiState, error::ApiError};

pub async fn ingest(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    info!(
        markdown_dir = %state.config.markdown_dir,
        "Received ingestion request"
    );

    let pipeline = IngestionPipeline::new(
        Arc::clone(&state.db),
        Arc::clone(&state.embedding),
        state.config.clone(),
    );
    let report = pipeline.run().await?;

    Ok((
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "files": report.files,
            "chunks": report.chunks,
            "elapsed_seconds": report.elapsed_seconds,
        })),
    ))
}
