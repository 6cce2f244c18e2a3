//! Result reporting
//!
//! A finished [`Approximation`] is turned into a [`RunReport`], which the text and
//! JSON writers render.

pub mod json;
pub mod text;

use crate::config::Backend;
use crate::coordinator::Approximation;
use crate::util::resource::available_cpus;
use crate::util::time::{calculate_rate, format_duration};
use serde::Serialize;
use std::f64::consts::PI;
use std::time::Duration;

/// Everything reported about one run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// RFC 3339 time the report was built
    pub timestamp: String,
    pub terms: u64,
    pub workers: usize,
    pub backend: Backend,
    pub available_cpus: usize,
    pub value: f64,
    pub elapsed: ReportDuration,
    pub terms_per_second: f64,
    pub chunks: Vec<ChunkReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorReport>,
}

/// Duration with both seconds and human-readable format
#[derive(Debug, Clone, Serialize)]
pub struct ReportDuration {
    pub seconds: f64,
    pub human: String,
}

/// One chunk and the partial sum its worker returned
#[derive(Debug, Clone, Serialize)]
pub struct ChunkReport {
    pub start: u64,
    pub end: u64,
    pub partial_sum: f64,
}

/// Distance from π next to the alternating-series bound `4 / (2 * terms + 1)`
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ErrorReport {
    pub absolute_error: f64,
    pub error_bound: f64,
}

impl ErrorReport {
    pub fn new(value: f64, terms: u64) -> Self {
        Self {
            absolute_error: (value - PI).abs(),
            error_bound: 4.0 / (2.0 * terms as f64 + 1.0),
        }
    }
}

impl ReportDuration {
    pub fn from_duration(d: Duration) -> Self {
        Self {
            seconds: d.as_secs_f64(),
            human: format_duration(d),
        }
    }
}

impl RunReport {
    /// Build a report for `approximation`, timed externally as `elapsed`
    pub fn new(approximation: &Approximation, elapsed: Duration, show_error: bool) -> Self {
        let chunks = approximation
            .chunks
            .iter()
            .zip(&approximation.partials)
            .map(|(chunk, &partial_sum)| ChunkReport {
                start: chunk.start,
                end: chunk.end,
                partial_sum,
            })
            .collect();

        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            terms: approximation.terms,
            workers: approximation.workers,
            backend: approximation.backend,
            available_cpus: available_cpus(),
            value: approximation.value,
            elapsed: ReportDuration::from_duration(elapsed),
            terms_per_second: calculate_rate(approximation.terms, elapsed),
            chunks,
            error: show_error.then(|| ErrorReport::new(approximation.value, approximation.terms)),
        }
    }

    /// Elapsed time as a `Duration`
    pub fn elapsed(&self) -> Duration {
        Duration::from_secs_f64(self.elapsed.seconds)
    }
}
