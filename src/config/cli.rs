//! CLI argument parsing using clap

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// leibniz-pi - parallel Leibniz-series approximation of π
#[derive(Parser, Debug)]
#[command(name = "leibniz-pi")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Number of series terms (e.g., 1000000, 250k, 5M)
    ///
    /// Prompted on standard input when omitted.
    #[arg(short = 'n', long)]
    pub terms: Option<String>,

    /// Number of workers (default: one per 1000 terms, at most 100)
    #[arg(short = 'w', long)]
    pub workers: Option<usize>,

    /// Worker pool backend
    #[arg(long, value_enum)]
    pub backend: Option<BackendType>,

    /// TOML configuration file (CLI flags take precedence)
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    // === Output Options ===
    /// Console output format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormatType>,

    /// Write a JSON report to this file
    #[arg(long)]
    pub json_output: Option<PathBuf>,

    /// Also print the absolute error against π and the series error bound
    #[arg(long)]
    pub show_error: bool,

    /// Validate configuration and exit without computing
    #[arg(long)]
    pub dry_run: bool,

    /// Print debug diagnostics to stderr
    #[arg(long)]
    pub debug: bool,
}

/// Worker pool backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendType {
    /// One OS thread per chunk
    Threads,
    /// Dedicated rayon thread pool
    Rayon,
}

/// Console output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormatType {
    /// Human-readable lines
    Text,
    /// A single JSON document
    Json,
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate CLI arguments
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.workers == Some(0) {
            anyhow::bail!("workers must be at least 1");
        }

        if let Some(ref terms) = self.terms {
            if terms.trim().is_empty() {
                anyhow::bail!("terms must not be empty");
            }
        }

        if let Some(ref path) = self.json_output {
            if path.is_dir() {
                anyhow::bail!("json_output must be a file path, got directory {}", path.display());
            }
        }

        Ok(())
    }
}
