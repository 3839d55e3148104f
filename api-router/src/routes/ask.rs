use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use common::storage::types::message::ChatMessage;
use retrieval_pipeline::answer_retrieval::answer_question;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{api_state::ApiState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
    #[serde(default)]
    pub history: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub answer: String,
    pub sources: Vec<Option<String>>,
}

pub async fn ask(
    State(state): State<ApiState>,
    Json(input): Json<AskRequest>,
) -> Result<impl IntoResponse, ApiError> {
    info!(
        question_bytes = input.question.len(),
        history_len = input.history.len(),
        "Received ask request"
    );

    let answer = answer_question(
        &state.db,
        &state.openai_client,
        &state.embedding,
        &state.config,
        &input.question,
        &input.history,
    )
    .await?;

    Ok((
        StatusCode::OK,
        Json(AskResponse {
            answer: answer.answer,
            sources: answer.sources,
        }),
    ))
}
