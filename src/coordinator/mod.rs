//! Coordinator module
//!
//! Partitions the term range, dispatches one chunk per worker and reduces the
//! partial sums into the π approximation.
//!
//! # Partitioning
//!
//! With `chunk_size = ceil(terms / workers)`, worker `k` owns
//! `[min(k * chunk_size, terms), min((k + 1) * chunk_size, terms))`. Exactly
//! `workers` chunks are produced; when `workers` exceeds what the ceiling needs,
//! the trailing chunks are empty and still dispatched.
//!
//! # Reduction
//!
//! Partial sums are added in chunk order, so a given `(terms, workers)` pair always
//! yields the same bits. Different worker counts group the additions differently
//! and may differ in the last few ulps.

use crate::config::Backend;
use crate::error::PiError;
use crate::series::MAX_TERMS;
use crate::worker::{CancelToken, WorkerPool};
use serde::Serialize;
use std::fmt;
use std::time::{Duration, Instant};

/// Contiguous half-open range of term indices owned by one worker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Chunk {
    pub start: u64,
    pub end: u64,
}

impl Chunk {
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl fmt::Display for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// Per-run options beyond the term and worker counts
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub backend: Backend,
    /// Raised by the caller to abandon the run
    pub cancel: Option<CancelToken>,
}

/// Result of one coordinator run
#[derive(Debug, Clone)]
pub struct Approximation {
    /// `4 * Σ partials`
    pub value: f64,
    pub terms: u64,
    pub workers: usize,
    pub backend: Backend,
    pub chunks: Vec<Chunk>,
    /// Partial sums, one per chunk, in chunk order
    pub partials: Vec<f64>,
    /// Wall-clock time from dispatch to reduction
    pub elapsed: Duration,
}

/// Split `[0, terms)` into exactly `workers` contiguous chunks
///
/// `workers` must be at least 1.
///
/// # Examples
///
/// ```
/// use leibniz_pi::coordinator::{partition, Chunk};
///
/// let chunks = partition(10, 3);
/// assert_eq!(chunks, vec![
///     Chunk { start: 0, end: 4 },
///     Chunk { start: 4, end: 8 },
///     Chunk { start: 8, end: 10 },
/// ]);
/// ```
pub fn partition(terms: u64, workers: usize) -> Vec<Chunk> {
    debug_assert!(workers >= 1, "partition needs at least one worker");

    let workers = workers as u64;
    let chunk_size = terms.div_ceil(workers.max(1));

    (0..workers)
        .map(|k| Chunk {
            start: k.saturating_mul(chunk_size).min(terms),
            end: (k + 1).saturating_mul(chunk_size).min(terms),
        })
        .collect()
}

/// Approximate π with `terms` series terms spread over `workers` threads
///
/// # Examples
///
/// ```
/// use leibniz_pi::approximate_pi;
///
/// assert_eq!(approximate_pi(1, 1)?, 4.0);
/// assert!((approximate_pi(1_000_000, 4)? - std::f64::consts::PI).abs() < 1e-5);
/// # Ok::<(), leibniz_pi::PiError>(())
/// ```
pub fn approximate_pi(terms: u64, workers: usize) -> Result<f64, PiError> {
    approximate_pi_with(terms, workers, &RunOptions::default()).map(|a| a.value)
}

/// Like [`approximate_pi`], with an explicit backend and cancellation token
pub fn approximate_pi_with(
    terms: u64,
    workers: usize,
    options: &RunOptions,
) -> Result<Approximation, PiError> {
    let pool = WorkerPool::new(options.backend);
    approximate_with_pool(terms, workers, &pool, options.cancel.as_ref())
}

pub(crate) fn approximate_with_pool(
    terms: u64,
    workers: usize,
    pool: &WorkerPool,
    cancel: Option<&CancelToken>,
) -> Result<Approximation, PiError> {
    validate_arguments(terms, workers)?;

    let start = Instant::now();
    let chunks = partition(terms, workers);
    let partials = pool.run(&chunks, cancel)?;
    let value = 4.0 * reduce(&partials);
    let elapsed = start.elapsed();

    Ok(Approximation {
        value,
        terms,
        workers,
        backend: pool.backend(),
        chunks,
        partials,
        elapsed,
    })
}

/// Add partial sums in chunk order, starting from `+0.0`
fn reduce(partials: &[f64]) -> f64 {
    partials.iter().fold(0.0, |acc, partial| acc + partial)
}

fn validate_arguments(terms: u64, workers: usize) -> Result<(), PiError> {
    if workers == 0 {
        return Err(PiError::invalid("workers must be at least 1"));
    }
    if terms > MAX_TERMS {
        return Err(PiError::invalid(format!(
            "terms must be at most {}, got {}",
            MAX_TERMS, terms
        )));
    }
    Ok(())
}
