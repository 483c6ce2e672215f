//! Startup helpers for the offline chat server.

use std::future::Future;
use std::process::ExitCode;
use std::sync::Arc;

use crate::chat::config::ChatConfig;
use crate::server::{self, AppState};

/// Run the server with configuration taken from the environment.
///
/// # Returns
/// `ExitCode::SUCCESS` on graceful shutdown, `1` on failure.
#[must_use]
pub fn run() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Starting offline chat server v{}", env!("CARGO_PKG_VERSION"));

    let config = ChatConfig::from_env();
    tracing::info!("LM Studio endpoint: {}", config.llm.base_url);
    tracing::info!("Sessions directory: {}", config.storage.sessions_dir.display());

    let port = config.server.port;
    let state = match AppState::new(config) {
        Ok(state) => state,
        Err(err) => {
            tracing::error!("Failed to create state: {err}");
            return ExitCode::from(1);
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(err) => {
            tracing::error!("Failed to create runtime: {err}");
            return ExitCode::from(1);
        }
    };

    if let Err(err) = rt.block_on(server::run_server(state, port)) {
        tracing::error!("Server error: {err}");
        return ExitCode::from(1);
    }

    ExitCode::SUCCESS
}

/// Initialize application state without starting the server.
///
/// # Errors
/// Returns an error if state creation fails.
pub fn initialize() -> Result<Arc<AppState>, Box<dyn std::error::Error + Send + Sync>> {
    let config = ChatConfig::from_env();
    tracing::info!("LM Studio endpoint: {}", config.llm.base_url);

    AppState::new(config).map_err(|err| format!("Failed to create state: {err}").into())
}

/// Run server with graceful shutdown.
///
/// # Errors
/// Returns an error if the server fails.
pub async fn run_server_with_shutdown<F>(
    state: Arc<AppState>,
    port: u16,
    shutdown_signal: F,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
where
    F: Future<Output = ()> + Send + 'static,
{
    server::run_server_with_shutdown(state, port, shutdown_signal).await
}
