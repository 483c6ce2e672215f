//! LLM-assisted intent classification.
//!
//! Sends the message to the inference server with a low-temperature
//! classification prompt and parses the reply as a small JSON object. Replies
//! that are not valid JSON are scanned for a bare category name; anything
//! else is an error the caller handles by falling back to the heuristic
//! classifier.

use std::sync::Arc;

use regex::Regex;
use serde::Deserialize;

use crate::chat::context::PromptMessage;
use crate::chat::errors::{ChatResult, InferenceError};
use crate::chat::session::Role;
use crate::intent::{Intent, IntentClassification};
use crate::llm::{CompletionClient, GenerationParams};

/// Temperature for classification calls. Low, for consistent output.
const CLASSIFICATION_TEMPERATURE: f64 = 0.1;
/// Token budget for classification replies.
const CLASSIFICATION_MAX_TOKENS: i64 = 200;
/// Confidence assigned when the intent is only found as plain text.
const TEXT_FALLBACK_CONFIDENCE: f64 = 0.8;

/// LLM-assisted intent classifier.
pub struct LlmClassifier {
    client: Arc<dyn CompletionClient>,
}

impl LlmClassifier {
    /// Create a classifier over an existing completion client.
    #[must_use]
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }

    /// Classify a message by asking the inference server.
    ///
    /// # Errors
    /// Returns an error if the completion call fails or the reply cannot be
    /// interpreted at all.
    pub async fn classify(&self, message: &str) -> ChatResult<IntentClassification> {
        let prompt = classification_prompt(message);
        let params = GenerationParams {
            temperature: CLASSIFICATION_TEMPERATURE,
            max_tokens: CLASSIFICATION_MAX_TOKENS,
        };

        let reply = self
            .client
            .complete(vec![PromptMessage::new(Role::User, prompt)], params)
            .await?;

        parse_reply(&reply).ok_or_else(|| {
            InferenceError::MalformedResponse("unusable classification reply".to_string()).into()
        })
    }
}

/// Build the classification prompt for a message.
fn classification_prompt(message: &str) -> String {
    let mut prompt = String::from(
        "You are an expert at classifying user messages into intent categories.\n\n\
         INTENT CATEGORIES:\n",
    );
    for intent in Intent::ALL {
        prompt.push_str(&format!(
            "\n{}:\n- Description: {}\n- Examples: {}\n",
            intent.as_str().to_uppercase(),
            intent.description(),
            intent.examples()
        ));
    }
    prompt.push_str(
        "\nTASK:\nClassify the given user message into ONE of the four intent categories above.\n\n\
         RESPONSE FORMAT:\nRespond with ONLY a JSON object in this exact format:\n\
         {\"intent\": \"category_name\", \"confidence\": 0.95}\n\n\
         Now classify this message:",
    );
    prompt.push_str(&format!("\n\nMessage: \"{message}\"\n\nResponse:"));
    prompt
}

#[derive(Deserialize)]
struct ClassifierReply {
    intent: Intent,
    confidence: f64,
}

/// Parse a classification reply.
///
/// Accepts a JSON object anywhere in the reply; falls back to scanning the
/// text for a category name. Confidence is clamped to [0, 1].
#[must_use]
pub fn parse_reply(reply: &str) -> Option<IntentClassification> {
    if let Some(parsed) = parse_json_reply(reply) {
        return Some(parsed);
    }
    parse_text_reply(reply)
}

fn parse_json_reply(reply: &str) -> Option<IntentClassification> {
    // The model often wraps the object in prose; locate it first.
    let json_pattern = Regex::new(r#"\{[^}]*"intent"[^}]*\}"#).ok()?;
    let fragment = json_pattern.find(reply)?.as_str();
    let parsed: ClassifierReply = serde_json::from_str(fragment).ok()?;

    Some(IntentClassification {
        intent: parsed.intent,
        confidence: parsed.confidence.clamp(0.0, 1.0),
    })
}

fn parse_text_reply(reply: &str) -> Option<IntentClassification> {
    let lowered = reply.to_lowercase();
    let intent = Intent::ALL
        .into_iter()
        .find(|intent| lowered.contains(intent.as_str()))?;

    let confidence = Regex::new(r"(\d+\.?\d*)")
        .ok()
        .and_then(|re| re.find(reply).map(|m| m.as_str().to_string()))
        .and_then(|raw| raw.parse::<f64>().ok())
        .map_or(TEXT_FALLBACK_CONFIDENCE, |value| {
            if value > 1.0 { value / 100.0 } else { value }
        });

    Some(IntentClassification {
        intent,
        confidence: confidence.clamp(0.0, 1.0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_strict_json_reply() {
        let reply = r#"{"intent": "greetings", "confidence": 0.98}"#;
        let parsed = parse_reply(reply).unwrap();
        assert_eq!(parsed.intent, Intent::Greetings);
        assert!((parsed.confidence - 0.98).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parses_json_embedded_in_prose() {
        let reply = "Sure! Here's the classification:\n{\"intent\": \"query\", \"confidence\": 0.9}\nHope that helps.";
        let parsed = parse_reply(reply).unwrap();
        assert_eq!(parsed.intent, Intent::Query);
    }

    #[test]
    fn test_clamps_out_of_range_confidence() {
        let reply = r#"{"intent": "feedback", "confidence": 3.5}"#;
        let parsed = parse_reply(reply).unwrap();
        assert!((parsed.confidence - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_falls_back_to_category_name_in_text() {
        let reply = "The message looks like a query to me, about 85 out of 100.";
        let parsed = parse_reply(reply).unwrap();
        assert_eq!(parsed.intent, Intent::Query);
        assert!((parsed.confidence - 0.85).abs() < f64::EPSILON);
    }

    #[test]
    fn test_text_fallback_without_number_uses_default_confidence() {
        let reply = "This is clearly feedback.";
        let parsed = parse_reply(reply).unwrap();
        assert_eq!(parsed.intent, Intent::Feedback);
        assert!((parsed.confidence - TEXT_FALLBACK_CONFIDENCE).abs() < f64::EPSILON);
    }

    #[test]
    fn test_garbage_reply_is_rejected() {
        assert!(parse_reply("I cannot classify that.").is_none());
    }

    #[test]
    fn test_unknown_intent_name_in_json_falls_through_to_text_scan() {
        // The JSON carries an invalid category, but "query" appears in prose.
        let reply = r#"{"intent": "smalltalk", "confidence": 0.7} — maybe a query?"#;
        let parsed = parse_reply(reply).unwrap();
        assert_eq!(parsed.intent, Intent::Query);
    }

    #[test]
    fn test_prompt_mentions_all_categories() {
        let prompt = classification_prompt("hello");
        for intent in Intent::ALL {
            assert!(prompt.contains(&intent.as_str().to_uppercase()));
        }
        assert!(prompt.contains("Message: \"hello\""));
    }
}
