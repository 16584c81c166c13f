//! Line tracer control backend entry point.

mod config;

use linetrace_api_server::{ApiServer, AppState};
use linetrace_command_log::CommandLog;
use linetrace_telemetry::TelemetryLog;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = config::Config::load()?;

    // Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.environment.default_log_filter())),
        )
        .init();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        name = %config.name,
        environment = ?config.environment,
        "starting line tracer backend"
    );

    // Stores live for the whole process and are shared by every request.
    let commands =
        CommandLog::with_capacity(config.command_capacity).with_limits(config.limit_policy());
    let telemetry = TelemetryLog::with_capacity(config.telemetry_capacity);
    let state = AppState::new(commands, telemetry, config.api_settings());

    let server = ApiServer::bind(&config.server_config(), state).await?;

    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("interrupt received");
                shutdown.cancel();
            }
            Err(e) => tracing::error!("failed to listen for interrupt: {e}"),
        }
    });

    server.run(cancel).await?;

    tracing::info!("server shut down cleanly");
    Ok(())
}
