use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestUserMessage, CreateChatCompletionRequest,
        CreateChatCompletionRequestArgs, CreateChatCompletionResponse,
    },
    Client,
};
use common::{
    error::AppError,
    storage::{db::SurrealDbClient, types::message::ChatMessage},
    utils::{config::AppConfig, embedding::EmbeddingProvider},
};
use tracing::info;

use crate::{
    prompt::{assemble_prompt, build_context},
    retrieve_chunks,
};

/// Fixed sampling temperature for grounded answers.
const CHAT_TEMPERATURE: f32 = 0.2;

/// A grounded answer plus the source path of every retrieved chunk, in
/// retrieval order.
#[derive(Debug)]
pub struct Answer {
    pub answer: String,
    pub sources: Vec<Option<String>>,
}

/// Builds the single-message chat request carrying the assembled prompt.
pub fn create_chat_request(
    prompt: String,
    model: &str,
) -> Result<CreateChatCompletionRequest, OpenAIError> {
    CreateChatCompletionRequestArgs::default()
        .model(model)
        .temperature(CHAT_TEMPERATURE)
        .messages([ChatCompletionRequestUserMessage::from(prompt).into()])
        .build()
}

/// Pulls the answer text out of the first completion choice.
pub fn process_chat_response(
    response: CreateChatCompletionResponse,
) -> Result<String, AppError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or(AppError::LLMParsing(
            "No content found in chat response".into(),
        ))
}

/// End-to-end "ask" operation: retrieve the nearest chunks, assemble the
/// prompt with conversation history, call the chat model, and return the
/// answer with its sources. Sequential, no retries; every dependency failure
/// propagates unchanged.
pub async fn answer_question(
    db: &SurrealDbClient,
    openai_client: &Client<OpenAIConfig>,
    embedding: &EmbeddingProvider,
    config: &AppConfig,
    question: &str,
    history: &[ChatMessage],
) -> Result<Answer, AppError> {
    let chunks = retrieve_chunks(db, embedding, question).await?;
    info!(
        retrieved = chunks.len(),
        history_len = history.len(),
        "answering question"
    );

    let context = build_context(&chunks);
    let prompt = assemble_prompt(&context, history, question);

    let request = create_chat_request(prompt, &config.openai_model)?;
    let response = openai_client.chat().create(request).await?;
    let answer = process_chat_response(response)?;

    Ok(Answer {
        answer,
        sources: chunks.into_iter().map(|chunk| chunk.source).collect(),
    })
}
