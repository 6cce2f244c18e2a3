//! Error taxonomy for the approximation core
//!
//! The library surfaces every failure to the caller of
//! [`approximate_pi`](crate::coordinator::approximate_pi); nothing is retried or
//! recovered locally.

use thiserror::Error;

/// Failure of a single approximation run
#[derive(Debug, Error)]
pub enum PiError {
    /// Rejected before any worker was dispatched
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A worker panicked or stopped without reporting its partial sum
    #[error("worker for chunk {chunk} failed: {reason}")]
    WorkerFailure { chunk: usize, reason: String },

    /// The system could not provide the requested number of workers
    #[error("could not create {requested} workers (created {spawned}): {source}")]
    ResourceExhaustion {
        requested: usize,
        spawned: usize,
        #[source]
        source: std::io::Error,
    },

    /// The caller raised the cancellation token
    #[error("approximation cancelled")]
    Cancelled,
}

impl PiError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        PiError::InvalidArgument(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = PiError::invalid("workers must be at least 1");
        assert_eq!(err.to_string(), "invalid argument: workers must be at least 1");

        let err = PiError::WorkerFailure { chunk: 3, reason: "panicked".into() };
        assert_eq!(err.to_string(), "worker for chunk 3 failed: panicked");

        assert_eq!(PiError::Cancelled.to_string(), "approximation cancelled");
    }

    #[test]
    fn test_resource_exhaustion_keeps_source() {
        use std::error::Error as _;

        let err = PiError::ResourceExhaustion {
            requested: 8,
            spawned: 5,
            source: std::io::Error::new(std::io::ErrorKind::WouldBlock, "EAGAIN"),
        };
        assert!(err.to_string().contains("could not create 8 workers (created 5)"));
        assert!(err.source().is_some());
    }
}
