//! Startup helpers for the Gemini chat server.

use std::future::Future;
use std::process::ExitCode;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::server::{self, AppState};
use crate::session::SessionSweeper;

/// Run the server (used by the `gemini-chat` binary).
///
/// # Returns
/// `ExitCode::SUCCESS` on graceful shutdown, `1` on failure. A missing API
/// key is a failure: the server never starts without one.
#[must_use]
pub fn run() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Starting Gemini chat v{}", env!("CARGO_PKG_VERSION"));

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {e}");
            return ExitCode::from(1);
        }
    };
    tracing::info!(model = %config.model, base_url = %config.base_url, "Gemini endpoint");

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to create runtime: {e}");
            return ExitCode::from(1);
        }
    };

    let result = rt.block_on(async {
        let state = initialize(&config).map_err(|e| e.to_string())?;
        run_server_with_shutdown(state, &config, shutdown_signal())
            .await
            .map_err(|e| e.to_string())
    });

    if let Err(e) = result {
        tracing::error!("Server error: {e}");
        return ExitCode::from(1);
    }

    tracing::info!("Gemini chat stopped");
    ExitCode::SUCCESS
}

/// Initialize application state without starting the server.
///
/// # Errors
/// Returns an error if state creation fails.
pub fn initialize(config: &AppConfig) -> anyhow::Result<Arc<AppState>> {
    AppState::new(config)
}

/// Run the server together with the idle-session sweeper. On shutdown the
/// sweeper is stopped and every remaining session is ended, cancelling any
/// model call still in flight.
///
/// # Errors
/// Returns an error if the server fails.
pub async fn run_server_with_shutdown<F>(
    state: Arc<AppState>,
    config: &AppConfig,
    shutdown_signal: F,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
where
    F: Future<Output = ()> + Send + 'static,
{
    let sweeper = SessionSweeper::new(Arc::clone(&state.sessions), config.sweep_interval);
    let stop_sweeper = sweeper.shutdown_notifier();
    let sweeper_handle = sweeper.spawn();

    let sessions = Arc::clone(&state.sessions);
    let result = server::run_server_with_shutdown(state, config.port, shutdown_signal).await;

    stop_sweeper.notify_one();
    if let Err(e) = sweeper_handle.await {
        tracing::warn!("Session sweeper task failed: {e}");
    }
    sessions.shutdown();

    result
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
