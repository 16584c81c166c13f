//! HTTP error mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use linetrace_command_log::CommandError;
use linetrace_protocol::CommandWord;
use linetrace_telemetry::TelemetryError;

use crate::envelope::ErrorEnvelope;

/// Errors returned by request handlers.
///
/// `/api` errors use the wrapped [`ErrorEnvelope`]; telemetry validation
/// and "no data" errors keep the telemetry service's `{status, ...}` shape.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{message}")]
    BadRequest {
        message: String,
        details: Option<String>,
    },

    #[error("malformed telemetry: {0}")]
    MalformedTelemetry(String),

    #[error("no telemetry received yet")]
    NoTelemetry,

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. } | ApiError::MalformedTelemetry(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::NoTelemetry => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub(crate) fn bad_request(message: impl Into<String>, details: impl Into<String>) -> Self {
        ApiError::BadRequest {
            message: message.into(),
            details: Some(details.into()),
        }
    }
}

fn valid_commands() -> String {
    format!("valid commands: {}", CommandWord::vocabulary())
}

impl From<CommandError> for ApiError {
    fn from(err: CommandError) -> Self {
        match err {
            CommandError::Empty => {
                ApiError::bad_request("command is empty, enter a valid command", valid_commands())
            }
            CommandError::Unknown { word } => {
                ApiError::bad_request(format!("invalid command: {word}"), valid_commands())
            }
            CommandError::History(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<TelemetryError> for ApiError {
    fn from(err: TelemetryError) -> Self {
        if err.is_malformed_payload() {
            ApiError::MalformedTelemetry(err.to_string())
        } else {
            ApiError::Internal(err.to_string())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            ApiError::BadRequest { message, details } => (
                status,
                Json(ErrorEnvelope::new(status.as_u16(), message, details)),
            )
                .into_response(),
            ApiError::MalformedTelemetry(message) => (
                status,
                Json(json!({ "status": "error", "message": message })),
            )
                .into_response(),
            ApiError::NoTelemetry => (status, Json(json!({ "status": "no_data" }))).into_response(),
            ApiError::Internal(detail) => {
                tracing::error!(%detail, "request failed");
                (
                    status,
                    Json(ErrorEnvelope::new(
                        status.as_u16(),
                        "internal server error",
                        Some(detail),
                    )),
                )
                    .into_response()
            }
        }
    }
}
