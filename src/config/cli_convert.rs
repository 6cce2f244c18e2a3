//! CLI to Config conversion utilities

use crate::config::{cli, Backend, OutputFormat};
use anyhow::{Context, Result};

/// Parse a term count (e.g., "1000", "250k", "5M", "1g") to a number
///
/// Suffixes are decimal: k = 1000, m = 1000², g = 1000³. Underscores are
/// ignored so `1_000_000` is accepted as well.
pub fn parse_count(s: &str) -> Result<u64> {
    let s = s.trim().to_lowercase().replace('_', "");

    let (num_str, multiplier) = if let Some(num) = s.strip_suffix('k') {
        (num, 1_000u64)
    } else if let Some(num) = s.strip_suffix('m') {
        (num, 1_000_000)
    } else if let Some(num) = s.strip_suffix('g') {
        (num, 1_000_000_000)
    } else {
        (s.as_str(), 1)
    };

    let num: u64 = num_str.parse()
        .with_context(|| format!("Invalid term count: {}", s))?;

    num.checked_mul(multiplier)
        .with_context(|| format!("Term count overflows: {}", s))
}

/// Convert CLI BackendType to config Backend
pub fn convert_backend(cli_type: cli::BackendType) -> Backend {
    match cli_type {
        cli::BackendType::Threads => Backend::Threads,
        cli::BackendType::Rayon => Backend::Rayon,
    }
}

/// Convert CLI OutputFormatType to config OutputFormat
pub fn convert_output_format(cli_type: cli::OutputFormatType) -> OutputFormat {
    match cli_type {
        cli::OutputFormatType::Text => OutputFormat::Text,
        cli::OutputFormatType::Json => OutputFormat::Json,
    }
}
