use common::storage::types::message::{format_history, ChatMessage};

use crate::RetrievedChunk;

/// Fixed instruction prepended to every prompt.
pub const SYSTEM_PROMPT: &str = "You are a documentation assistant. Answer the question using only \
the provided context. If the context does not contain the answer, say so instead of guessing.";

/// History is truncated to this many most-recent messages before inclusion.
pub const MAX_HISTORY_MESSAGES: usize = 10;

/// Concatenates retrieved chunk texts, blank-line separated, in retrieval
/// order.
pub fn build_context(chunks: &[RetrievedChunk]) -> String {
    chunks
        .iter()
        .map(|chunk| chunk.chunk.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Assembles the final prompt: system instruction, context section, an
/// optional history section (most recent `MAX_HISTORY_MESSAGES`, oldest
/// dropped, chronological order), then the question. The history section is
/// omitted entirely when the history is empty.
pub fn assemble_prompt(context: &str, history: &[ChatMessage], question: &str) -> String {
    let mut prompt = format!("{SYSTEM_PROMPT}\n\nContext:\n{context}\n");

    if !history.is_empty() {
        let start = history.len().saturating_sub(MAX_HISTORY_MESSAGES);
        prompt.push_str(&format!(
            "\nConversation so far:\n{}\n",
            format_history(&history[start..])
        ));
    }

    prompt.push_str(&format!("\nQuestion:\n{question}\n"));
    prompt
}
