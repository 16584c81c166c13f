//! Remote-control command log.
//!
//! Validates free-text submissions against the fixed command vocabulary,
//! assigns lifetime ids, keeps a bounded window of recent entries, and
//! aggregates that window into per-word counts.

pub mod error;
pub mod limit;
pub mod log;

pub use error::CommandError;
pub use limit::{LimitPolicy, parse_limit};
pub use log::CommandLog;
