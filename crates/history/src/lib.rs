//! Bounded record history.
//!
//! [`RingBuffer`] is the plain fixed-capacity container. [`History`] wraps
//! it with a lifetime sequence counter and a last-value pointer behind a
//! single mutex, so one instance can be shared by concurrent request
//! handlers.

mod buffer;
mod store;

pub use buffer::RingBuffer;
pub use store::History;

/// Errors produced by a [`History`].
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("history lock poisoned")]
    Poisoned,
}
