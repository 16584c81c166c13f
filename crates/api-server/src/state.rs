//! Shared router state.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use linetrace_command_log::CommandLog;
use linetrace_protocol::constants::{DEFAULT_HISTORY_COUNT, DEVICE_PLACEHOLDER, IDLE_PLACEHOLDER};
use linetrace_telemetry::TelemetryLog;

/// Presentation settings for the HTTP layer.
#[derive(Debug, Clone)]
pub struct ApiSettings {
    /// Name of this instance, reported by the health endpoint.
    pub instance_name: String,
    /// Returned by `GET /api/command` before any command was accepted.
    pub idle_placeholder: String,
    /// Returned by `GET /api/command/latest` before any command was accepted.
    pub device_placeholder: String,
    /// Telemetry history size when the caller gives no usable count.
    pub default_history_count: usize,
    /// Directory that telemetry exports are written to.
    pub export_dir: PathBuf,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            instance_name: "linetrace".into(),
            idle_placeholder: IDLE_PLACEHOLDER.into(),
            device_placeholder: DEVICE_PLACEHOLDER.into(),
            default_history_count: DEFAULT_HISTORY_COUNT,
            export_dir: PathBuf::from("."),
        }
    }
}

/// State handed to every handler.
///
/// Cloning is cheap; all clones refer to the same stores.
#[derive(Clone)]
pub struct AppState {
    pub commands: Arc<CommandLog>,
    pub telemetry: Arc<TelemetryLog>,
    pub settings: Arc<ApiSettings>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(commands: CommandLog, telemetry: TelemetryLog, settings: ApiSettings) -> Self {
        Self {
            commands: Arc::new(commands),
            telemetry: Arc::new(telemetry),
            settings: Arc::new(settings),
            started_at: Instant::now(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(CommandLog::new(), TelemetryLog::new(), ApiSettings::default())
    }
}
