//! LM Studio client for chat completions.
//!
//! LM Studio exposes an OpenAI-compatible HTTP API on localhost. This client
//! covers the two calls the service needs: `POST /v1/chat/completions` for a
//! single non-streaming completion and `GET /v1/models` as a reachability
//! probe. No retries, no caching, no request coalescing.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::chat::config::LlmConfig;
use crate::chat::context::PromptMessage;
use crate::chat::errors::{ChatError, ChatResult, InferenceError};

/// Probe timeout for the reachability check.
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Boxed future type for client operations.
pub type ClientFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Generation parameters for a single completion call.
#[derive(Clone, Copy, Debug)]
pub struct GenerationParams {
    /// Sampling temperature.
    pub temperature: f64,
    /// Token budget; `-1` means no limit (LM Studio convention).
    pub max_tokens: i64,
}

/// Completion client trait, the seam between the chat engine and the
/// external inference server.
pub trait CompletionClient: Send + Sync {
    /// Request one completion for an assembled message list.
    ///
    /// # Errors
    /// Returns an [`InferenceError`]-wrapping error when the server is
    /// unreachable, times out, answers with a non-success status, or returns
    /// an unusable body.
    fn complete(
        &self,
        messages: Vec<PromptMessage>,
        params: GenerationParams,
    ) -> ClientFuture<'_, ChatResult<String>>;

    /// Probe whether the inference server is reachable.
    fn check_connection(&self) -> ClientFuture<'_, bool>;
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [PromptMessage],
    temperature: f64,
    max_tokens: i64,
    stream: bool,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Async LM Studio client.
pub struct LmStudioClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl LmStudioClient {
    /// Create a client for the configured LM Studio endpoint.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &LlmConfig) -> ChatResult<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|err| ChatError::InvalidConfig(format!("http client: {err}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    async fn post_completion(
        &self,
        messages: &[PromptMessage],
        params: GenerationParams,
    ) -> ChatResult<String> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let request = ChatCompletionRequest {
            model: &self.model,
            messages,
            temperature: params.temperature,
            max_tokens: params.max_tokens,
            stream: false,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(classify_request_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(InferenceError::Status {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|err| InferenceError::MalformedResponse(err.to_string()))?;

        extract_content(parsed)
    }
}

impl CompletionClient for LmStudioClient {
    fn complete(
        &self,
        messages: Vec<PromptMessage>,
        params: GenerationParams,
    ) -> ClientFuture<'_, ChatResult<String>> {
        Box::pin(async move { self.post_completion(&messages, params).await })
    }

    fn check_connection(&self) -> ClientFuture<'_, bool> {
        Box::pin(async move {
            let url = format!("{}/v1/models", self.base_url);
            match self.client.get(&url).timeout(PROBE_TIMEOUT).send().await {
                Ok(response) => response.status().is_success(),
                Err(_) => false,
            }
        })
    }
}

fn classify_request_error(err: reqwest::Error) -> ChatError {
    if err.is_timeout() {
        return InferenceError::Timeout.into();
    }
    InferenceError::Unreachable(err.to_string()).into()
}

fn extract_content(response: ChatCompletionResponse) -> ChatResult<String> {
    let content = response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| InferenceError::MalformedResponse("no choices in reply".to_string()))?;

    if content.is_empty() {
        return Err(InferenceError::EmptyResponse.into());
    }

    Ok(content)
}
