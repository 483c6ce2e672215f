//! Intent analysis for inbound user messages.
//!
//! Messages are classified into one of four categories before being sent to
//! the inference server. Two classifier modes exist: a regex-based heuristic
//! (default) and an LLM-assisted mode that falls back to the heuristic when
//! the model is unavailable or returns an unusable reply.

pub mod heuristic;
pub mod llm;

use core::fmt;

use serde::{Deserialize, Serialize};

/// Intent category of a user message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Greeting or conversation opener.
    Greetings,
    /// Question or request for information.
    Query,
    /// Statement providing information or sharing knowledge.
    Information,
    /// Feedback, thanks, or expressed opinion.
    Feedback,
}

impl Intent {
    /// All intent categories, in classification priority order.
    pub const ALL: [Self; 4] = [
        Self::Greetings,
        Self::Query,
        Self::Information,
        Self::Feedback,
    ];

    /// Human-readable description of the category.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Greetings => "User is greeting or starting a conversation",
            Self::Query => "User is asking a question or seeking information",
            Self::Information => "User is providing information or sharing knowledge",
            Self::Feedback => "User is giving feedback, thanks, or expressing opinion",
        }
    }

    /// Short example phrases for the category.
    #[must_use]
    pub const fn examples(self) -> &'static str {
        match self {
            Self::Greetings => "Hello, Hi there, Good morning, How are you?",
            Self::Query => "What is..., How do I..., Can you help me..., Explain...",
            Self::Information => "I want to tell you..., Here's what I know..., Let me share...",
            Self::Feedback => "Thank you, That's helpful, I like this, Great job",
        }
    }

    /// Category name as it appears on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Greetings => "greetings",
            Self::Query => "query",
            Self::Information => "information",
            Self::Feedback => "feedback",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Message complexity bucket, by word count.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    /// Up to three words.
    Simple,
    /// Four to ten words.
    Moderate,
    /// More than ten words.
    Complex,
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simple => f.write_str("simple"),
            Self::Moderate => f.write_str("moderate"),
            Self::Complex => f.write_str("complex"),
        }
    }
}

/// Outcome of classifying a single message.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IntentClassification {
    /// Chosen category.
    pub intent: Intent,
    /// Confidence in the range [0, 1].
    pub confidence: f64,
}

/// Full intent analysis of a message, as returned by the analyze endpoint.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IntentAnalysis {
    /// Chosen category.
    pub intent: Intent,
    /// Confidence in the range [0, 1].
    pub confidence: f64,
    /// Human-readable description of the category.
    pub description: String,
    /// Extracted keywords.
    pub keywords: Vec<String>,
    /// Complexity bucket.
    pub complexity: Complexity,
}

/// Stop words excluded from keyword extraction.
const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by", "is",
    "are", "was", "were", "be", "been", "being", "have", "has", "had", "do", "does", "did", "will",
    "would", "could", "should", "may", "might", "can", "this", "that", "these", "those", "i",
    "you", "he", "she", "it", "we", "they", "me", "him", "her", "us", "them",
];

/// Maximum number of keywords returned per message.
const MAX_KEYWORDS: usize = 10;

/// Extract up to [`MAX_KEYWORDS`] keywords from a message.
///
/// Words are lowercased; stop words and words of fewer than three characters
/// are dropped.
#[must_use]
pub fn keywords(message: &str) -> Vec<String> {
    message
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| word.len() > 2 && !STOP_WORDS.contains(word))
        .map(ToOwned::to_owned)
        .take(MAX_KEYWORDS)
        .collect()
}

/// Bucket a message into a [`Complexity`] level by word count.
#[must_use]
pub fn complexity(message: &str) -> Complexity {
    let word_count = message.split_whitespace().count();
    if word_count <= 3 {
        Complexity::Simple
    } else if word_count <= 10 {
        Complexity::Moderate
    } else {
        Complexity::Complex
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_serde_names() {
        let json = serde_json::to_string(&Intent::Greetings).unwrap();
        assert_eq!(json, "\"greetings\"");
        let parsed: Intent = serde_json::from_str("\"feedback\"").unwrap();
        assert_eq!(parsed, Intent::Feedback);
    }

    #[test]
    fn test_keywords_drop_stop_words_and_short_words() {
        let words = keywords("What is the best way to make cotton candy?");
        assert!(words.contains(&"cotton".to_string()));
        assert!(words.contains(&"candy".to_string()));
        assert!(!words.contains(&"the".to_string()));
        assert!(!words.contains(&"is".to_string()));
        assert!(!words.contains(&"to".to_string()));
    }

    #[test]
    fn test_keywords_capped_at_ten() {
        let message = "alpha bravo charlie delta echo foxtrot golf hotel india juliet kilo lima";
        assert_eq!(keywords(message).len(), 10);
    }

    #[test]
    fn test_complexity_buckets() {
        assert_eq!(complexity("Hello"), Complexity::Simple);
        assert_eq!(complexity("What is cotton candy?"), Complexity::Moderate);
        assert_eq!(
            complexity("Could you please walk me through every step of making cotton candy at home?"),
            Complexity::Complex
        );
    }
}
