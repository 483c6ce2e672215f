//! Chat engine orchestration.
//!
//! Composes the session store, the context assembler, the inference client,
//! and the intent/follow-up supplements behind the one entry point the HTTP
//! layer calls. Each request re-reads its session from durable storage and
//! re-writes the full record on completion; there is no shared in-memory
//! session cache.

use std::sync::Arc;

use tracing::{debug, info};

use crate::chat::config::{ChatConfig, IntentMode};
use crate::chat::context;
use crate::chat::errors::{ChatError, ChatResult};
use crate::chat::followup::FollowUpGenerator;
use crate::chat::session::{ChatMessage, Session, SessionId, SessionSummary};
use crate::chat::store::{FileSessionStore, SessionStore};
use crate::intent::heuristic::HeuristicClassifier;
use crate::intent::llm::LlmClassifier;
use crate::intent::{self, IntentAnalysis, IntentClassification};
use crate::llm::{CompletionClient, GenerationParams, LmStudioClient};

/// One inbound chat turn.
#[derive(Clone, Debug)]
pub struct TurnRequest {
    /// Session to continue; omitted or unknown means "create a new session".
    pub session_id: Option<String>,
    /// The user's message.
    pub message: String,
    /// Optional temperature override.
    pub temperature: Option<f64>,
    /// Optional token budget override.
    pub max_tokens: Option<i64>,
}

/// Outcome of a completed chat turn.
#[derive(Clone, Debug)]
pub struct TurnOutcome {
    /// Session the turn was recorded under.
    pub session_id: SessionId,
    /// Assistant response, possibly enhanced with a follow-up question.
    pub response: String,
    /// Intent classification of the user message.
    pub intent: IntentClassification,
}

/// Health probe outcome.
#[derive(Clone, Copy, Debug)]
pub struct HealthReport {
    /// Whether the inference server answered the probe.
    pub connected: bool,
}

/// Chat engine over pluggable store and client backends.
pub struct ChatEngine {
    config: ChatConfig,
    store: Arc<dyn SessionStore>,
    client: Arc<dyn CompletionClient>,
    heuristic: HeuristicClassifier,
    llm_classifier: Option<LlmClassifier>,
    follow_up: FollowUpGenerator,
}

impl ChatEngine {
    /// Create a new engine over explicit backends.
    ///
    /// # Errors
    /// Returns an error if the configuration or the built-in classifier
    /// patterns are invalid.
    pub fn new(
        config: ChatConfig,
        store: Arc<dyn SessionStore>,
        client: Arc<dyn CompletionClient>,
    ) -> ChatResult<Self> {
        config.validate()?;

        let heuristic = HeuristicClassifier::new()
            .map_err(|err| ChatError::InvalidConfig(err.to_string()))?;
        let llm_classifier = match config.intent.mode {
            IntentMode::Heuristic => None,
            IntentMode::Llm => Some(LlmClassifier::new(Arc::clone(&client))),
        };
        let follow_up = FollowUpGenerator::new(Arc::clone(&client), config.follow_up.clone());

        Ok(Self {
            config,
            store,
            client,
            heuristic,
            llm_classifier,
            follow_up,
        })
    }

    /// Create an engine with the default file store and LM Studio client.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be built.
    pub fn from_config(config: ChatConfig) -> ChatResult<Self> {
        let store = Arc::new(FileSessionStore::new(&config.storage));
        let client = Arc::new(LmStudioClient::new(&config.llm)?);
        Self::new(config, store, client)
    }

    /// Run one chat turn.
    ///
    /// On inference failure the session is neither created nor mutated; no
    /// partial record with only the user message is ever written.
    ///
    /// # Errors
    /// `Validation` for an empty message; storage and inference failures are
    /// surfaced unchanged.
    pub async fn chat_turn(&self, request: TurnRequest) -> ChatResult<TurnOutcome> {
        let text = request.message.trim();
        if text.is_empty() {
            return Err(ChatError::Validation(
                "message must not be empty".to_string(),
            ));
        }

        let session = self.resolve_session(request.session_id.as_deref()).await?;
        debug!(
            "Chat turn for session {} with {} prior messages",
            session.session_id,
            session.message_count()
        );

        let classification = self.classify(text).await;
        let user = ChatMessage::user(text).with_intent(
            classification.intent,
            classification.confidence,
            intent::keywords(text),
            intent::complexity(text),
        );

        let prompt = context::build_prompt(&session, text);
        let params = GenerationParams {
            temperature: request.temperature.unwrap_or(self.config.llm.temperature),
            max_tokens: request.max_tokens.unwrap_or(self.config.llm.max_tokens),
        };
        debug!("Sending {} messages to the inference server", prompt.len());
        let reply = self.client.complete(prompt, params).await?;

        let session = context::apply_turn(session, user, &reply);
        self.store.save(&session).await?;
        info!(
            "Recorded turn for session {} ({} messages)",
            session.session_id,
            session.message_count()
        );

        let response = if self
            .follow_up
            .should_generate(classification.intent, reply.len())
        {
            self.follow_up
                .enhance(text, &reply, classification.intent)
                .await
        } else {
            reply
        };

        Ok(TurnOutcome {
            session_id: session.session_id,
            response,
            intent: classification,
        })
    }

    /// Load a full session record.
    ///
    /// # Errors
    /// `NotFound` when the identifier is unknown or unparsable.
    pub async fn session(&self, raw_id: &str) -> ChatResult<Session> {
        let id = parse_session_id(raw_id)?;
        self.store.load(id).await
    }

    /// Load only the message sequence of a session.
    ///
    /// # Errors
    /// `NotFound` when the identifier is unknown or unparsable.
    pub async fn session_messages(&self, raw_id: &str) -> ChatResult<Vec<ChatMessage>> {
        Ok(self.session(raw_id).await?.messages)
    }

    /// Enumerate all persisted sessions, most-recently-updated first.
    ///
    /// # Errors
    /// Returns an error if the storage directory cannot be read.
    pub async fn list_sessions(&self) -> ChatResult<Vec<SessionSummary>> {
        self.store.list().await
    }

    /// Delete a session record.
    ///
    /// # Errors
    /// `NotFound` when the identifier is unknown or unparsable.
    pub async fn delete_session(&self, raw_id: &str) -> ChatResult<()> {
        let id = parse_session_id(raw_id)?;
        self.store.delete(id).await?;
        info!("Deleted session {id}");
        Ok(())
    }

    /// Probe the inference server.
    pub async fn health(&self) -> HealthReport {
        HealthReport {
            connected: self.client.check_connection().await,
        }
    }

    /// Analyze a message without touching any session.
    pub async fn analyze_intent(&self, message: &str) -> IntentAnalysis {
        let classification = self.classify(message).await;
        IntentAnalysis {
            intent: classification.intent,
            confidence: classification.confidence,
            description: classification.intent.description().to_string(),
            keywords: intent::keywords(message),
            complexity: intent::complexity(message),
        }
    }

    async fn resolve_session(&self, raw_id: Option<&str>) -> ChatResult<Session> {
        let Some(id) = raw_id.and_then(|raw| raw.parse::<SessionId>().ok()) else {
            let session = self.store.create();
            info!("New session created: {}", session.session_id);
            return Ok(session);
        };

        match self.store.load(id).await {
            Ok(session) => Ok(session),
            Err(ChatError::NotFound(_)) => {
                let session = self.store.create();
                info!(
                    "Unknown session {id}; new session created: {}",
                    session.session_id
                );
                Ok(session)
            }
            Err(err) => Err(err),
        }
    }

    async fn classify(&self, message: &str) -> IntentClassification {
        if let Some(classifier) = &self.llm_classifier {
            match classifier.classify(message).await {
                Ok(classification) => return classification,
                Err(err) => debug!("LLM intent classification failed: {err}"),
            }
        }
        self.heuristic.classify(message)
    }
}

fn parse_session_id(raw: &str) -> ChatResult<SessionId> {
    raw.parse::<SessionId>()
        .map_err(|_| ChatError::NotFound(raw.to_string()))
}
