//! Telemetry routes used by the vehicle firmware and the dashboard.

use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::routing::{get, post};
use serde::{Deserialize, Serialize};

use linetrace_protocol::TelemetryRecord;

use crate::error::ApiError;
use crate::state::AppState;

pub(crate) fn routes() -> Router<AppState> {
    Router::new()
        .route("/ping", get(ping))
        .route("/telemetry", post(ingest))
        .route("/telemetry/latest", get(latest))
        .route("/telemetry/history", get(history))
        .route("/telemetry/export", get(export))
        .route("/telemetry/clear", post(clear))
}

#[derive(Debug, Serialize)]
struct StatusMessage {
    status: &'static str,
    message: &'static str,
}

#[derive(Debug, Serialize)]
struct IngestAck {
    status: &'static str,
    received: bool,
}

#[derive(Debug, Deserialize)]
struct HistoryQuery {
    count: Option<String>,
}

#[derive(Debug, Serialize)]
struct ExportResponse {
    status: &'static str,
    filename: String,
    count: usize,
}

#[derive(Debug, Serialize)]
struct ClearResponse {
    status: &'static str,
    cleared: usize,
}

async fn ping() -> Json<StatusMessage> {
    Json(StatusMessage {
        status: "ok",
        message: "Server is running",
    })
}

/// Accepts any JSON object. The body is parsed here rather than through the
/// `Json` extractor so content-type and syntax problems both map to 400.
async fn ingest(State(state): State<AppState>, body: Bytes) -> Result<Json<IngestAck>, ApiError> {
    state.telemetry.ingest_slice(&body)?;
    Ok(Json(IngestAck {
        status: "success",
        received: true,
    }))
}

async fn latest(State(state): State<AppState>) -> Result<Json<TelemetryRecord>, ApiError> {
    state
        .telemetry
        .latest()?
        .map(Json)
        .ok_or(ApiError::NoTelemetry)
}

/// Missing or non-numeric counts use the configured default; zero or
/// negative counts yield an empty list.
fn resolve_count(requested: Option<&str>, default: usize) -> usize {
    match requested.map(|s| s.trim().parse::<i64>()) {
        Some(Ok(n)) => usize::try_from(n).unwrap_or(0),
        _ => default,
    }
}

async fn history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<TelemetryRecord>>, ApiError> {
    let count = resolve_count(query.count.as_deref(), state.settings.default_history_count);
    Ok(Json(state.telemetry.history(count)?))
}

async fn export(State(state): State<AppState>) -> Result<Json<ExportResponse>, ApiError> {
    let telemetry = Arc::clone(&state.telemetry);
    let dir = state.settings.export_dir.clone();
    let summary = tokio::task::spawn_blocking(move || telemetry.export(&dir))
        .await
        .map_err(|e| ApiError::Internal(format!("export task failed: {e}")))??;

    Ok(Json(ExportResponse {
        status: "success",
        filename: summary.filename,
        count: summary.count,
    }))
}

async fn clear(State(state): State<AppState>) -> Result<Json<ClearResponse>, ApiError> {
    let cleared = state.telemetry.clear()?;
    Ok(Json(ClearResponse {
        status: "success",
        cleared,
    }))
}
