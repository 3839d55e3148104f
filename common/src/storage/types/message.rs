#![allow(clippy::module_name_repetitions)]
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of a conversation message as supplied by the caller.
#[derive(Deserialize, Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// A single caller-supplied conversation turn. History is read-only input to
/// the question-answering flow and is never persisted.
#[derive(Deserialize, Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::User => write!(f, "User"),
            MessageRole::Assistant => write!(f, "Assistant"),
        }
    }
}

impl fmt::Display for ChatMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.role, self.content)
    }
}

// helper function to format a slice of messages
pub fn format_history(history: &[ChatMessage]) -> String {
    history
        .iter()
        .map(|msg| format!("{msg}"))
        .collect::<Vec<String>>()
        .join("\n")
}
