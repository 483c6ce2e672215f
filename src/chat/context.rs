//! Conversation context assembly.
//!
//! Builds the ordered message list sent to the inference server and applies
//! a completed turn back onto the session. The entire prior history is always
//! resent; no truncation, summarization, or windowing is applied.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::chat::session::{ChatMessage, Role, Session};

/// A role/content pair in the wire format of the inference server.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PromptMessage {
    /// Sender role.
    pub role: Role,
    /// Message text.
    pub content: String,
}

impl PromptMessage {
    /// Create a prompt message.
    #[must_use]
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

impl From<&ChatMessage> for PromptMessage {
    fn from(message: &ChatMessage) -> Self {
        Self {
            role: message.role,
            content: message.content.clone(),
        }
    }
}

/// Build the prompt message sequence for a new user message.
///
/// Returns the full prior history in chronological order with the new user
/// message appended last; for a session with N completed turns the result
/// holds 2N+1 entries.
#[must_use]
pub fn build_prompt(session: &Session, new_user_text: &str) -> Vec<PromptMessage> {
    let mut prompt: Vec<PromptMessage> = session.messages.iter().map(PromptMessage::from).collect();
    prompt.push(PromptMessage::new(Role::User, new_user_text));
    prompt
}

/// Apply a completed turn to a session.
///
/// Appends the user message and a freshly timestamped assistant message, in
/// that order, and bumps `updated_at`. The caller is expected to persist the
/// returned session.
#[must_use]
pub fn apply_turn(mut session: Session, user: ChatMessage, assistant_text: &str) -> Session {
    session.messages.push(user);
    session.messages.push(ChatMessage::assistant(assistant_text));
    session.updated_at = Utc::now();
    session
}
