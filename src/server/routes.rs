//! HTTP route handlers for the chat API.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::chat::engine::TurnRequest;
use crate::chat::errors::ChatError;
use crate::chat::session::{ChatMessage, Session, SessionSummary};
use crate::intent::{Intent, IntentAnalysis};

use super::state::AppState;

/// Create the API router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/chat", post(chat_turn))
        .route("/api/sessions", get(list_sessions))
        .route("/api/sessions/{id}", get(get_session).delete(delete_session))
        .route("/api/sessions/{id}/messages", get(get_session_messages))
        .route("/api/analyze-intent", get(analyze_intent))
        .route("/api/intents", get(get_intents))
        .route("/api/health", get(health_check))
        .with_state(state)
}

/// Error wrapper mapping [`ChatError`] onto HTTP status codes and a
/// structured body naming the failing collaborator.
pub struct ApiError(ChatError);

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind) = match &self.0 {
            ChatError::Validation(_) => (StatusCode::BAD_REQUEST, "validation"),
            ChatError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            ChatError::CorruptSession { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "corrupt_session")
            }
            ChatError::Storage(_) | ChatError::Serialization(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "storage")
            }
            ChatError::Inference(_) => (StatusCode::BAD_GATEWAY, "inference"),
            ChatError::InvalidConfig(_) | ChatError::Url(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal")
            }
        };

        let body = Json(serde_json::json!({
            "error": kind,
            "message": self.0.to_string(),
        }));

        (status, body).into_response()
    }
}

/// Chat turn request body.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// Session to continue; omitted or unknown means "create a new session".
    pub session_id: Option<String>,
    /// The user's message.
    pub message: String,
    /// Optional temperature override.
    pub temperature: Option<f64>,
    /// Optional token budget override.
    pub max_tokens: Option<i64>,
}

/// Chat turn response body.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    /// Session the turn was recorded under.
    pub session_id: String,
    /// Assistant response.
    pub response: String,
    /// Classified intent of the user message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_intent: Option<Intent>,
    /// Confidence of the intent classification.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent_confidence: Option<f64>,
}

/// Handle a chat turn.
async fn chat_turn(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let outcome = state
        .engine
        .chat_turn(TurnRequest {
            session_id: request.session_id,
            message: request.message,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        })
        .await?;

    Ok(Json(ChatResponse {
        session_id: outcome.session_id.to_string(),
        response: outcome.response,
        user_intent: Some(outcome.intent.intent),
        intent_confidence: Some(outcome.intent.confidence),
    }))
}

/// List all persisted sessions, most-recently-updated first.
async fn list_sessions(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<SessionSummary>>, ApiError> {
    Ok(Json(state.engine.list_sessions().await?))
}

/// Fetch a full session record.
async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Session>, ApiError> {
    Ok(Json(state.engine.session(&id).await?))
}

/// Fetch only the message sequence of a session.
async fn get_session_messages(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<ChatMessage>>, ApiError> {
    Ok(Json(state.engine.session_messages(&id).await?))
}

/// Delete a session record.
async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.engine.delete_session(&id).await?;
    Ok(Json(serde_json::json!({
        "message": "Session deleted successfully",
        "session_id": id,
    })))
}

/// Query parameters of the intent analysis endpoint.
#[derive(Debug, Deserialize)]
pub struct AnalyzeIntentParams {
    /// The message to analyze.
    pub message: String,
}

/// Analyze the intent of a message without touching any session.
async fn analyze_intent(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AnalyzeIntentParams>,
) -> Json<IntentAnalysis> {
    Json(state.engine.analyze_intent(&params.message).await)
}

/// Descriptor of one intent category.
#[derive(Debug, Serialize)]
pub struct IntentDescriptor {
    /// Category name.
    pub intent: Intent,
    /// Human-readable description.
    pub description: &'static str,
    /// Short example phrases.
    pub examples: &'static str,
}

/// List all intent categories with descriptions.
async fn get_intents() -> Json<Vec<IntentDescriptor>> {
    Json(
        Intent::ALL
            .into_iter()
            .map(|intent| IntentDescriptor {
                intent,
                description: intent.description(),
                examples: intent.examples(),
            })
            .collect(),
    )
}

/// Check the health of the service and the inference server connection.
async fn health_check(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let report = state.engine.health().await;
    let status = if report.connected { "healthy" } else { "degraded" };
    let message = if report.connected {
        "Service is running"
    } else {
        "LM Studio connection failed"
    };

    Json(serde_json::json!({
        "status": status,
        "lm_studio_connected": report.connected,
        "timestamp": Utc::now().to_rfc3339(),
        "message": message,
    }))
}
