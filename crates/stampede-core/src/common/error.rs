//! Error types for the traffic-generation service.
//!
//! This module defines the central `Error` enum, which captures all
//! recoverable and reportable error cases shared between the registry, the
//! dispatcher, and the worker pool. Mapping these errors onto HTTP responses
//! is the server crate's concern; this crate stays transport-agnostic.
//!
//! ## Error Cases
//! - `InvalidSpec`: A submitted traffic spec failed validation (non-positive
//!   pool size or iteration count, pool size over the configured cap, bad
//!   header name/value).
//! - `Lane`: An internal channel failure between the dispatcher and a worker
//!   lane (closed lane, lost drain acknowledgement).
//! - `Client`: The per-job HTTP client could not be constructed.

pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for the traffic-generation service.
#[derive(Clone, thiserror::Error, Debug)]
pub enum Error {
    /// The submitted traffic spec was invalid or exceeded constraints.
    #[error("Invalid traffic spec: {reason}")]
    InvalidSpec { reason: String },

    /// Internal lane send/receive failure (e.g., a closed worker channel).
    #[error("Lane error: {context}")]
    Lane { context: String },

    /// The per-job HTTP client could not be built.
    #[error("Client error: {context}")]
    Client { context: String },
}

impl Error {
    /// Shorthand for an [`Error::InvalidSpec`] with the given reason.
    pub fn invalid_spec(reason: impl Into<String>) -> Self {
        Self::InvalidSpec {
            reason: reason.into(),
        }
    }
}
