//! HTTP surface for the line tracer backend.
//!
//! Two route groups share one [`AppState`]:
//! - `/api/*`: command submission, listing, stats and health for the
//!   dashboard, plus the polling endpoint used by the vehicle.
//! - `/telemetry*` and `/ping`: report ingest from the vehicle firmware.
//!
//! The stores are constructed once by the caller and injected here; the
//! router never creates state of its own.

mod commands;
mod envelope;
mod error;
mod server;
mod state;
mod status;
mod telemetry;

use axum::Router;

pub use error::ApiError;
pub use server::{ApiServer, ServerConfig, ServerError};
pub use state::{ApiSettings, AppState};

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(status::routes())
        .nest("/api", commands::routes())
        .merge(telemetry::routes())
        .with_state(state)
}
