//! Response envelopes for the `/api` surface.

use axum::Json;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Local};
use serde::Serialize;

/// Successful `/api` response: `{success: true, data?, message?, total?, timestamp}`.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    total: Option<usize>,
    timestamp: DateTime<Local>,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            total: None,
            timestamp: Local::now(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_total(mut self, total: usize) -> Self {
        self.total = Some(total);
        self
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Failed `/api` response: `{success: false, error, error_code, details?, timestamp}`.
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    success: bool,
    error: String,
    error_code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
    timestamp: DateTime<Local>,
}

impl ErrorEnvelope {
    pub fn new(code: u16, error: impl Into<String>, details: Option<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            error_code: code,
            details,
            timestamp: Local::now(),
        }
    }
}
