/// Service identity reported by the index and health endpoints.
pub const SERVICE_NAME: &str = "Line Tracer Control API";

/// Maximum number of command log entries kept resident.
pub const COMMAND_CAPACITY: usize = 50;

/// Maximum number of telemetry reports kept resident.
pub const TELEMETRY_CAPACITY: usize = 100;

/// Number of log entries returned when the caller gives no usable limit.
pub const DEFAULT_LOG_LIMIT: usize = 20;

/// Upper bound for a single log listing.
pub const MAX_LOG_LIMIT: usize = 100;

/// Number of telemetry reports returned by the history endpoint by default.
pub const DEFAULT_HISTORY_COUNT: usize = 10;

/// Shown by the dashboard-facing command endpoint before any command arrives.
pub const IDLE_PLACEHOLDER: &str = "IDLE";

/// Returned to the vehicle before any command arrives, so it stays put.
pub const DEVICE_PLACEHOLDER: &str = "STOP";

/// Key under which the receipt instant is stored in a telemetry record.
pub const SERVER_TIMESTAMP_KEY: &str = "server_timestamp";
