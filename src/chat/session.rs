//! Session and message types.
//!
//! A session is a persisted, uniquely identified conversation record. Its
//! message sequence is append-only: every completed chat turn adds exactly
//! one user message and one assistant message, in that order.

use core::fmt;
use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::intent::{Complexity, Intent};

/// Identifier for a conversation session.
///
/// A random 128-bit UUID; its string form is also the on-disk file stem of
/// the session record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Allocate a fresh random identifier.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[inline]
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for SessionId {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Role of a chat message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// User-sent message.
    User,
    /// Assistant reply.
    Assistant,
    /// System message.
    System,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => f.write_str("user"),
            Self::Assistant => f.write_str("assistant"),
            Self::System => f.write_str("system"),
        }
    }
}

/// A single message within a session. Immutable once appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Sender role.
    pub role: Role,
    /// Message text.
    pub content: String,
    /// When the message was appended.
    pub timestamp: DateTime<Utc>,
    /// Classified intent (user messages only).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub intent: Option<Intent>,
    /// Confidence of the intent classification.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub intent_confidence: Option<f64>,
    /// Extracted keywords (user messages only).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub keywords: Option<Vec<String>>,
    /// Complexity bucket (user messages only).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub complexity: Option<Complexity>,
}

impl ChatMessage {
    /// Create a message with the current timestamp.
    #[must_use]
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
            intent: None,
            intent_confidence: None,
            keywords: None,
            complexity: None,
        }
    }

    /// Create a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create an assistant message.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Create a system message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Attach intent analysis annotations.
    #[must_use]
    pub fn with_intent(
        mut self,
        intent: Intent,
        confidence: f64,
        keywords: Vec<String>,
        complexity: Complexity,
    ) -> Self {
        self.intent = Some(intent);
        self.intent_confidence = Some(confidence);
        self.keywords = Some(keywords);
        self.complexity = Some(complexity);
        self
    }
}

/// Observable lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No messages yet; nothing persisted.
    Empty,
    /// At least one completed turn.
    Active,
}

/// A persisted conversation record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Unique session identifier; equals the record file stem.
    pub session_id: SessionId,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
    /// When the session was last saved.
    pub updated_at: DateTime<Utc>,
    /// Ordered message history; insertion order is conversation order.
    pub messages: Vec<ChatMessage>,
}

impl Session {
    /// Create an empty session with a fresh identifier.
    #[must_use]
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            session_id: SessionId::new(),
            created_at: now,
            updated_at: now,
            messages: Vec::new(),
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        if self.messages.is_empty() {
            SessionState::Empty
        } else {
            SessionState::Active
        }
    }

    /// Number of messages in the history.
    #[must_use]
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Lightweight summary of the session.
    #[must_use]
    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            session_id: self.session_id,
            message_count: self.messages.len(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Lightweight session summary, the element type of session listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Session identifier.
    pub session_id: SessionId,
    /// Number of messages in the history.
    pub message_count: usize,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
    /// When the session was last saved.
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_roundtrip() {
        let id = SessionId::new();
        let parsed: SessionId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_session_id_rejects_garbage() {
        assert!("not-a-uuid".parse::<SessionId>().is_err());
    }

    #[test]
    fn test_new_session_is_empty() {
        let session = Session::new();
        assert_eq!(session.state(), SessionState::Empty);
        assert_eq!(session.message_count(), 0);
    }

    #[test]
    fn test_session_with_messages_is_active() {
        let mut session = Session::new();
        session.messages.push(ChatMessage::user("hi"));
        assert_eq!(session.state(), SessionState::Active);
    }

    #[test]
    fn test_message_serialization_skips_absent_annotations() {
        let message = ChatMessage::assistant("Spun sugar.");
        let value = serde_json::to_value(&message).unwrap();
        assert!(value.get("intent").is_none());
        assert!(value.get("keywords").is_none());
        assert_eq!(value["role"], "assistant");
    }

    #[test]
    fn test_message_serialization_keeps_annotations() {
        let message = ChatMessage::user("What is cotton candy?").with_intent(
            crate::intent::Intent::Query,
            0.9,
            vec!["cotton".to_string(), "candy".to_string()],
            crate::intent::Complexity::Moderate,
        );
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["intent"], "query");
        assert_eq!(value["complexity"], "moderate");
    }

    #[test]
    fn test_session_serialization_roundtrip() {
        let mut session = Session::new();
        session.messages.push(ChatMessage::user("What is cotton candy?"));
        session.messages.push(ChatMessage::assistant("Spun sugar."));

        let json = serde_json::to_string(&session).unwrap();
        let restored: Session = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.session_id, session.session_id);
        assert_eq!(restored.message_count(), 2);
        assert_eq!(restored.messages[0].role, Role::User);
        assert_eq!(restored.messages[1].content, "Spun sugar.");
    }
}
