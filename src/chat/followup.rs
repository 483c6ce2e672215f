//! Follow-up question generation.
//!
//! After a successful turn the returned response may be enhanced with one
//! engaging follow-up question, generated by the inference server. The
//! persisted assistant message always stays the raw model reply; only the
//! text returned to the caller is enhanced. Generation failures never fail a
//! turn — a fixed per-intent template takes over.

use std::sync::Arc;

use tracing::debug;

use crate::chat::config::FollowUpConfig;
use crate::chat::context::PromptMessage;
use crate::chat::errors::ChatResult;
use crate::chat::session::Role;
use crate::intent::Intent;
use crate::llm::{CompletionClient, GenerationParams};

/// Temperature for question generation.
const GENERATION_TEMPERATURE: f64 = 0.7;
/// Token budget for question generation.
const GENERATION_MAX_TOKENS: i64 = 200;
/// Shortest string accepted as a question.
const MIN_QUESTION_CHARS: usize = 10;

/// Characters stripped from the start of candidate question lines.
const QUESTION_TRIM: &[char] = &[
    '•', '-', '*', '1', '2', '3', '4', '5', '6', '7', '8', '9', '.', ' ', '"',
];

/// Follow-up question generator.
pub struct FollowUpGenerator {
    client: Arc<dyn CompletionClient>,
    config: FollowUpConfig,
}

impl FollowUpGenerator {
    /// Create a generator over an existing completion client.
    #[must_use]
    pub fn new(client: Arc<dyn CompletionClient>, config: FollowUpConfig) -> Self {
        Self { client, config }
    }

    /// Whether a follow-up should be generated for this turn.
    ///
    /// Never for greetings and never for short replies.
    #[must_use]
    pub fn should_generate(&self, intent: Intent, response_len: usize) -> bool {
        self.config.enabled
            && intent != Intent::Greetings
            && response_len >= self.config.min_response_chars
    }

    /// Append the best follow-up question to a response.
    ///
    /// Returns the response unchanged when no usable question can be
    /// produced. This method never fails.
    pub async fn enhance(&self, user_message: &str, response: &str, intent: Intent) -> String {
        let questions = match self.generate(user_message, response).await {
            Ok(questions) => questions,
            Err(err) => {
                debug!("Follow-up generation failed, using templates: {err}");
                fallback_questions(intent)
                    .iter()
                    .map(ToString::to_string)
                    .collect()
            }
        };

        match questions.first() {
            Some(question) => format!("{response}\n\n{question}"),
            None => response.to_string(),
        }
    }

    async fn generate(&self, user_message: &str, response: &str) -> ChatResult<Vec<String>> {
        let prompt = generation_prompt(user_message, response);
        let params = GenerationParams {
            temperature: GENERATION_TEMPERATURE,
            max_tokens: GENERATION_MAX_TOKENS,
        };

        let reply = self
            .client
            .complete(vec![PromptMessage::new(Role::User, prompt)], params)
            .await?;

        Ok(parse_questions(&reply, self.config.max_questions))
    }
}

/// Build the question-generation prompt.
fn generation_prompt(user_message: &str, response: &str) -> String {
    let user_excerpt: String = user_message.chars().take(200).collect();
    let response_excerpt: String = response.chars().take(500).collect();
    format!(
        "Based on this conversation, generate 2-3 engaging follow-up questions:\n\n\
         User asked: \"{user_excerpt}\"\n\
         AI responded: \"{response_excerpt}\"\n\n\
         Generate follow-up questions that:\n\
         1. Are natural and conversational\n\
         2. Encourage deeper exploration\n\
         3. Are specific to the topics discussed\n\n\
         Generate 2-3 questions, one per line, without numbering or bullet points.\n"
    )
}

/// Extract candidate questions from a generation reply.
///
/// Keeps lines containing a question mark, cleaned of bullets and numbering,
/// longer than [`MIN_QUESTION_CHARS`]; caps the result at `max`.
#[must_use]
pub fn parse_questions(reply: &str, max: usize) -> Vec<String> {
    let mut questions: Vec<String> = reply
        .lines()
        .map(|line| line.trim().trim_matches(QUESTION_TRIM).trim().to_string())
        .filter(|line| line.contains('?') && line.len() > MIN_QUESTION_CHARS)
        .collect();

    // Some models answer in one paragraph; fall back to sentence splitting.
    if questions.is_empty() {
        questions = reply
            .split('.')
            .map(str::trim)
            .filter(|sentence| sentence.contains('?') && sentence.len() > MIN_QUESTION_CHARS)
            .map(ToString::to_string)
            .collect();
    }

    questions.truncate(max);
    questions
}

/// Fixed fallback questions per intent.
fn fallback_questions(intent: Intent) -> &'static [&'static str] {
    match intent {
        Intent::Query => &[
            "Would you like to know more about this?",
            "Do you want me to explain this in more detail?",
            "Should I tell you more about this topic?",
        ],
        Intent::Information => &[
            "Would you like to explore this further?",
            "Do you want to know more about this?",
            "Should I dive deeper into this topic?",
        ],
        Intent::Greetings | Intent::Feedback => &[
            "Would you like to know more about this?",
            "Do you want to explore this further?",
            "Should I tell you more about this?",
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::errors::{ChatError, InferenceError};
    use crate::llm::ClientFuture;

    struct StubClient {
        reply: Option<String>,
    }

    impl CompletionClient for StubClient {
        fn complete(
            &self,
            _messages: Vec<PromptMessage>,
            _params: GenerationParams,
        ) -> ClientFuture<'_, ChatResult<String>> {
            let reply = self.reply.clone();
            Box::pin(async move {
                reply.ok_or_else(|| {
                    ChatError::Inference(InferenceError::Unreachable("stub".to_string()))
                })
            })
        }

        fn check_connection(&self) -> ClientFuture<'_, bool> {
            Box::pin(async move { false })
        }
    }

    fn generator(reply: Option<&str>) -> FollowUpGenerator {
        FollowUpGenerator::new(
            Arc::new(StubClient {
                reply: reply.map(ToString::to_string),
            }),
            FollowUpConfig::default(),
        )
    }

    #[test]
    fn test_should_generate_rejects_greetings() {
        let generator = generator(None);
        assert!(!generator.should_generate(Intent::Greetings, 500));
    }

    #[test]
    fn test_should_generate_rejects_short_responses() {
        let generator = generator(None);
        assert!(!generator.should_generate(Intent::Query, 10));
    }

    #[test]
    fn test_should_generate_accepts_long_query_responses() {
        let generator = generator(None);
        assert!(generator.should_generate(Intent::Query, 120));
        assert!(generator.should_generate(Intent::Information, 120));
        assert!(generator.should_generate(Intent::Feedback, 120));
    }

    #[test]
    fn test_should_generate_respects_disabled_config() {
        let mut config = FollowUpConfig::default();
        config.enabled = false;
        let generator = FollowUpGenerator::new(Arc::new(StubClient { reply: None }), config);
        assert!(!generator.should_generate(Intent::Query, 500));
    }

    #[test]
    fn test_parse_questions_strips_bullets_and_numbering() {
        let reply = "1. Would you like to see some examples?\n\
                     - Do you want to explore the history of this topic?\n\
                     Not a question at all";
        let questions = parse_questions(reply, 3);
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0], "Would you like to see some examples?");
        assert_eq!(
            questions[1],
            "Do you want to explore the history of this topic?"
        );
    }

    #[test]
    fn test_parse_questions_caps_at_max() {
        let reply = "Would you like more detail on this?\n\
                     Do you want a concrete example of this?\n\
                     Should I compare the alternatives for you?\n\
                     Would a diagram of the process help?";
        assert_eq!(parse_questions(reply, 3).len(), 3);
    }

    #[test]
    fn test_parse_questions_keeps_mid_line_questions() {
        let reply = "Here are some ideas. Would you like to dive deeper into spun sugar?";
        let questions = parse_questions(reply, 3);
        assert_eq!(questions.len(), 1);
        assert!(questions[0].ends_with("spun sugar?"));
    }

    #[test]
    fn test_parse_questions_drops_short_fragments() {
        assert!(parse_questions("ok?\nwhy?", 3).is_empty());
    }

    #[tokio::test]
    async fn test_enhance_appends_generated_question() {
        let generator = generator(Some("Would you like to see how it is made?"));
        let enhanced = generator
            .enhance("What is cotton candy?", "A long answer about spun sugar.", Intent::Query)
            .await;
        assert_eq!(
            enhanced,
            "A long answer about spun sugar.\n\nWould you like to see how it is made?"
        );
    }

    #[tokio::test]
    async fn test_enhance_uses_template_when_generation_fails() {
        let generator = generator(None);
        let enhanced = generator
            .enhance("What is cotton candy?", "A long answer about spun sugar.", Intent::Query)
            .await;
        assert_eq!(
            enhanced,
            "A long answer about spun sugar.\n\nWould you like to know more about this?"
        );
    }

    #[tokio::test]
    async fn test_enhance_returns_response_unchanged_without_questions() {
        let generator = generator(Some("No questions here, just a statement."));
        let enhanced = generator
            .enhance("hi", "A statement response that is long enough.", Intent::Query)
            .await;
        assert_eq!(enhanced, "A statement response that is long enough.");
    }
}
