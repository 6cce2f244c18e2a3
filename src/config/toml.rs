//! TOML configuration file parsing
//!
//! ```toml
//! [run]
//! terms = 10_000_000
//! workers = 8
//! backend = "rayon"
//!
//! [output]
//! format = "json"
//! json_output = "pi.json"
//! show_error = true
//! ```

use super::*;
use crate::config::cli::Cli;
use crate::config::cli_convert::{convert_backend, convert_output_format, parse_count};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Parse TOML configuration file
pub fn parse_toml_file(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_toml_string(&contents)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Parse TOML configuration from string
pub fn parse_toml_string(contents: &str) -> Result<Config> {
    let config: Config = ::toml::from_str(contents)
        .context("Failed to parse TOML configuration")?;

    Ok(config)
}

/// Merge CLI arguments with TOML configuration (CLI takes precedence)
pub fn merge_cli_with_config(cli: &Cli, mut config: Config) -> Result<Config> {
    if let Some(ref terms) = cli.terms {
        config.run.terms = Some(parse_count(terms)?);
    }
    if let Some(workers) = cli.workers {
        config.run.workers = Some(workers);
    }
    if let Some(backend) = cli.backend {
        config.run.backend = convert_backend(backend);
    }

    if let Some(format) = cli.format {
        config.output.format = convert_output_format(format);
    }
    if let Some(ref path) = cli.json_output {
        config.output.json_output = Some(path.clone());
    }
    if cli.show_error {
        config.output.show_error = true;
    }

    Ok(config)
}
