pub mod command;
pub mod constants;
pub mod telemetry;

// Re-export primary types for convenience.
pub use command::{CommandStats, CommandWord, LogEntry, UnknownCommand};
pub use telemetry::{ReportShape, TelemetryRecord};
