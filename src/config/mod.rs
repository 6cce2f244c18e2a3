//! Configuration module
//!
//! Handles CLI argument parsing, TOML configuration files, and validation.

pub mod cli;
pub mod cli_convert;
pub mod toml;
pub mod validator;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Terms handed to each worker by the default worker-count heuristic
pub const TERMS_PER_WORKER: u64 = 1000;

/// Upper bound on the heuristic worker count
pub const MAX_DEFAULT_WORKERS: usize = 100;

/// Complete run configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// What to compute and how to spread it
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunConfig {
    /// Number of series terms (prompted on stdin when unset)
    pub terms: Option<u64>,
    /// Worker count (heuristic when unset)
    pub workers: Option<usize>,
    /// Worker pool backend
    #[serde(default)]
    pub backend: Backend,
}

/// How results are reported
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
    /// Also write a JSON report to this file
    pub json_output: Option<PathBuf>,
    /// Print the absolute error against π and the series error bound
    #[serde(default)]
    pub show_error: bool,
}

/// Worker pool backend
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// One OS thread per chunk
    #[default]
    Threads,
    /// Dedicated rayon thread pool
    Rayon,
}

/// Console output format
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Threads => write!(f, "threads"),
            Backend::Rayon => write!(f, "rayon"),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Default worker count for a term count
///
/// Roughly one worker per [`TERMS_PER_WORKER`] terms, capped at
/// [`MAX_DEFAULT_WORKERS`], never below one.
///
/// # Examples
///
/// ```
/// use leibniz_pi::config::default_workers;
///
/// assert_eq!(default_workers(0), 1);
/// assert_eq!(default_workers(2_500), 3);
/// assert_eq!(default_workers(10_000_000), 100);
/// ```
pub fn default_workers(terms: u64) -> usize {
    let wanted = terms.div_ceil(TERMS_PER_WORKER);
    wanted.clamp(1, MAX_DEFAULT_WORKERS as u64) as usize
}

impl Config {
    /// Worker count for a run over `terms`, honouring an explicit setting
    pub fn resolve_workers(&self, terms: u64) -> usize {
        self.run.workers.unwrap_or_else(|| default_workers(terms))
    }
}
