//! Error types for the chat service.

use thiserror::Error;

/// Chat service error type.
#[derive(Debug, Error)]
pub enum ChatError {
    /// Invalid configuration or unsupported values.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Missing or malformed request input.
    #[error("validation error: {0}")]
    Validation(String),
    /// No session record exists for the identifier.
    #[error("session not found: {0}")]
    NotFound(String),
    /// A session record exists on disk but cannot be parsed.
    #[error("corrupt session record {id}: {source}")]
    CorruptSession {
        /// Identifier of the unreadable record.
        id: String,
        /// The underlying parse failure.
        #[source]
        source: serde_json::Error,
    },
    /// Storage-layer I/O failure.
    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),
    /// Serialization error while writing a record.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// The external inference server failed.
    #[error("inference error: {0}")]
    Inference(#[from] InferenceError),
    /// URL parse error.
    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),
}

/// Failure modes of the external inference server.
///
/// The server performs no retries; a single failed call is surfaced directly
/// to the HTTP caller.
#[derive(Debug, Error)]
pub enum InferenceError {
    /// The inference server refused the connection or could not be reached.
    #[error("inference server unreachable: {0}")]
    Unreachable(String),
    /// The request did not complete within the client timeout.
    #[error("inference request timed out")]
    Timeout,
    /// The inference server answered with a non-success HTTP status.
    #[error("inference server returned status {status}: {body}")]
    Status {
        /// HTTP status code of the reply.
        status: u16,
        /// Reply body, as far as it could be read.
        body: String,
    },
    /// The reply body could not be parsed into a completion.
    #[error("inference response malformed: {0}")]
    MalformedResponse(String),
    /// The reply parsed but contained no assistant text.
    #[error("inference response contained no content")]
    EmptyResponse,
}

/// Convenience result alias for chat operations.
pub type ChatResult<T> = Result<T, ChatError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_collaborator() {
        let storage = ChatError::Storage(std::io::Error::other("disk full"));
        assert!(storage.to_string().starts_with("storage error"));

        let inference = ChatError::Inference(InferenceError::Timeout);
        assert!(inference.to_string().starts_with("inference error"));
    }

    #[test]
    fn test_not_found_is_distinct_from_corrupt() {
        let not_found = ChatError::NotFound("abc".to_string());
        assert!(matches!(not_found, ChatError::NotFound(_)));

        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let corrupt = ChatError::CorruptSession {
            id: "abc".to_string(),
            source: parse_err,
        };
        assert!(matches!(corrupt, ChatError::CorruptSession { .. }));
    }
}
