//! Application state shared across all request handlers.

use std::sync::Arc;

use crate::chat::config::ChatConfig;
use crate::chat::engine::ChatEngine;
use crate::chat::errors::ChatResult;

/// Shared application state.
pub struct AppState {
    /// Chat engine handling all session and inference operations.
    pub engine: ChatEngine,
}

impl AppState {
    /// Create application state from a configuration.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid or the inference
    /// client cannot be created.
    pub fn new(config: ChatConfig) -> ChatResult<Arc<Self>> {
        let engine = ChatEngine::from_config(config)?;
        Ok(Arc::new(Self { engine }))
    }

    /// Wrap an already-built engine, mainly for tests.
    #[must_use]
    pub fn from_engine(engine: ChatEngine) -> Arc<Self> {
        Arc::new(Self { engine })
    }
}
