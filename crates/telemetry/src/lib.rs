//! Telemetry ingest for the line tracer.
//!
//! The firmware posts JSON reports whose layout has changed between
//! revisions. Reports are stored as opaque objects, stamped on receipt, and
//! kept in a bounded ring that can be read back or exported to disk.

mod error;
mod export;
mod log;

pub use error::TelemetryError;
pub use export::{ExportSummary, export_filename, write_export};
pub use log::TelemetryLog;
