//! `/api` routes: command submission, listing, stats and health.

use axum::Json;
use axum::Router;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::routing::{get, post};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use linetrace_command_log::parse_limit;
use linetrace_protocol::constants::SERVICE_NAME;
use linetrace_protocol::{CommandStats, CommandWord, LogEntry};

use crate::envelope::Envelope;
use crate::error::ApiError;
use crate::state::AppState;

pub(crate) fn routes() -> Router<AppState> {
    Router::new()
        .route("/command", get(get_command))
        .route("/command/latest", get(get_device_command))
        .route("/log", post(add_log))
        .route("/logs", get(get_logs))
        .route("/logs/clear", post(clear_logs))
        .route("/stats", get(get_stats))
        .route("/health", get(health))
        .route("/pico/status", post(pico_status))
}

#[derive(Debug, Deserialize)]
struct CommandRequest {
    word: String,
}

#[derive(Debug, Serialize)]
struct CommandView {
    command: String,
    timestamp: DateTime<Local>,
}

#[derive(Debug, Serialize)]
struct LogView {
    id: u64,
    word: CommandWord,
    timestamp: DateTime<Local>,
    display_time: String,
    display_date: String,
}

impl From<LogEntry> for LogView {
    fn from(entry: LogEntry) -> Self {
        Self {
            id: entry.id,
            word: entry.word,
            display_time: entry.timestamp.format("%H:%M:%S").to_string(),
            display_date: entry.timestamp.format("%m/%d").to_string(),
            timestamp: entry.timestamp,
        }
    }
}

#[derive(Debug, Deserialize)]
struct LogsQuery {
    limit: Option<String>,
}

#[derive(Debug, Serialize)]
struct Cleared {
    cleared: usize,
}

#[derive(Debug, Serialize)]
struct HealthStats {
    total_commands: usize,
    last_command: Option<CommandWord>,
    is_active: bool,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: DateTime<Local>,
    service: &'static str,
    version: &'static str,
    host: String,
    uptime_secs: u64,
    stats: HealthStats,
}

#[derive(Debug, Deserialize)]
struct PicoStatusRequest {
    status: String,
    /// Device clock, seconds since the Unix epoch.
    timestamp: Option<f64>,
}

#[derive(Debug, Serialize)]
struct PicoStatusAck {
    received_status: String,
    server_timestamp: DateTime<Local>,
}

/// Dashboard view of the current command.
async fn get_command(State(state): State<AppState>) -> Result<Json<CommandView>, ApiError> {
    let command = state
        .commands
        .latest_command()?
        .map(|w| w.to_string())
        .unwrap_or_else(|| state.settings.idle_placeholder.clone());
    Ok(Json(CommandView {
        command,
        timestamp: Local::now(),
    }))
}

/// Polled by the vehicle. Falls back to a safe placeholder (`STOP`).
async fn get_device_command(
    State(state): State<AppState>,
) -> Result<Envelope<CommandView>, ApiError> {
    let command = state
        .commands
        .latest_command()?
        .map(|w| w.to_string())
        .unwrap_or_else(|| state.settings.device_placeholder.clone());
    Ok(Envelope::ok(CommandView {
        command,
        timestamp: Local::now(),
    })
    .with_message("latest command"))
}

async fn add_log(
    State(state): State<AppState>,
    body: Result<Json<CommandRequest>, JsonRejection>,
) -> Result<Envelope<LogEntry>, ApiError> {
    let Json(request) = body.map_err(|rejection| {
        tracing::warn!(error = %rejection.body_text(), "rejected command request body");
        ApiError::bad_request("invalid request body", rejection.body_text())
    })?;

    let entry = state.commands.submit(&request.word)?;
    tracing::info!(id = entry.id, word = %entry.word, "command submitted");
    let message = format!("{} command registered", entry.word);
    Ok(Envelope::ok(entry).with_message(message))
}

async fn get_logs(
    State(state): State<AppState>,
    Query(query): Query<LogsQuery>,
) -> Result<Envelope<Vec<LogView>>, ApiError> {
    let requested = query.limit.as_deref().and_then(parse_limit);
    let logs: Vec<LogView> = state
        .commands
        .recent(requested)?
        .into_iter()
        .map(LogView::from)
        .collect();
    let total = logs.len();
    Ok(Envelope::ok(logs)
        .with_total(total)
        .with_message(format!("{total} log entries")))
}

async fn clear_logs(State(state): State<AppState>) -> Result<Envelope<Cleared>, ApiError> {
    let cleared = state.commands.clear()?;
    Ok(Envelope::ok(Cleared { cleared }).with_message(format!("{cleared} log entries cleared")))
}

async fn get_stats(State(state): State<AppState>) -> Result<Envelope<CommandStats>, ApiError> {
    Ok(Envelope::ok(state.commands.stats()?))
}

async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    let stats = state.commands.stats()?;
    Ok(Json(HealthResponse {
        status: "ok",
        timestamp: Local::now(),
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
        host: state.settings.instance_name.clone(),
        uptime_secs: state.started_at.elapsed().as_secs(),
        stats: HealthStats {
            is_active: stats.total_commands > 0,
            total_commands: stats.total_commands,
            last_command: stats.last_command,
        },
    }))
}

/// Status line reported by the vehicle. Logged only; nothing is stored.
async fn pico_status(
    body: Result<Json<PicoStatusRequest>, JsonRejection>,
) -> Result<Envelope<PicoStatusAck>, ApiError> {
    let Json(request) = body.map_err(|rejection| {
        ApiError::bad_request("invalid status report", rejection.body_text())
    })?;

    let status = request.status.trim().to_owned();
    let device_time = request
        .timestamp
        .and_then(|secs| DateTime::from_timestamp_millis((secs * 1000.0) as i64))
        .map(|t| t.with_timezone(&Local));
    tracing::info!(%status, device_time = ?device_time, "vehicle status received");

    Ok(Envelope::ok(PicoStatusAck {
        received_status: status,
        server_timestamp: Local::now(),
    })
    .with_message("status received"))
}
