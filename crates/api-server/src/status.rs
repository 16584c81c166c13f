//! Service index.

use axum::Json;
use axum::Router;
use axum::routing::get;
use serde_json::{Value, json};

use linetrace_protocol::constants::SERVICE_NAME;

use crate::state::AppState;

pub(crate) fn routes() -> Router<AppState> {
    Router::new().route("/", get(index))
}

async fn index() -> Json<Value> {
    Json(json!({
        "message": SERVICE_NAME,
        "description": "Backend API for the line tracer remote control system",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "endpoints": {
            "health": "/api/health",
            "command": "/api/command",
            "device_command": "/api/command/latest",
            "log": "/api/log",
            "logs": "/api/logs",
            "logs_clear": "/api/logs/clear",
            "stats": "/api/stats",
            "pico_status": "/api/pico/status",
            "ping": "/ping",
            "telemetry": "/telemetry",
            "telemetry_latest": "/telemetry/latest",
            "telemetry_history": "/telemetry/history",
            "telemetry_export": "/telemetry/export",
            "telemetry_clear": "/telemetry/clear"
        }
    }))
}
