//! leibniz-pi - parallel Leibniz-series approximation of π
//!
//! Sums the truncated series π/4 = Σ (-1)^i / (2i+1) by splitting the term range
//! into contiguous chunks, summing each chunk on its own worker and reducing the
//! partial sums in chunk order.
//!
//! # Architecture
//!
//! - **Series**: pure partial sums over a half-open index range
//! - **Coordinator**: partitioning, dispatch and reduction
//! - **Worker pool**: thread-per-chunk or rayon fan-out with cooperative cancellation
//! - **Config / output**: the CLI shell around the core

pub mod config;
pub mod coordinator;
pub mod error;
pub mod output;
pub mod series;
pub mod util;
pub mod worker;

// Re-export commonly used types
pub use config::{Backend, Config};
pub use coordinator::{approximate_pi, approximate_pi_with, Approximation, Chunk, RunOptions};
pub use error::PiError;
pub use worker::CancelToken;

/// Result type used by the CLI-facing layers
pub type Result<T> = anyhow::Result<T>;
