//! Telemetry error types.

use linetrace_history::HistoryError;

/// Errors produced by the telemetry ring and its exporter.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("telemetry payload must be a JSON object")]
    NotAnObject,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("history error: {0}")]
    History(#[from] HistoryError),
}

impl TelemetryError {
    /// Whether the error was caused by the submitted payload.
    pub fn is_malformed_payload(&self) -> bool {
        match self {
            TelemetryError::NotAnObject => true,
            TelemetryError::Json(e) => !e.is_io(),
            _ => false,
        }
    }
}
