//! Configuration validation

use super::*;
use crate::series::MAX_TERMS;
use anyhow::Result;

/// Validate complete configuration
pub fn validate_config(config: &Config) -> Result<()> {
    validate_run(&config.run)?;
    validate_output(&config.output)?;

    Ok(())
}

/// Validate run configuration
pub fn validate_run(run: &RunConfig) -> Result<()> {
    if let Some(terms) = run.terms {
        validate_terms(terms)?;
    }

    if run.workers == Some(0) {
        anyhow::bail!("run.workers must be at least 1");
    }

    Ok(())
}

/// Validate a term count, whether configured or read from the prompt
pub fn validate_terms(terms: u64) -> Result<()> {
    if terms > MAX_TERMS {
        anyhow::bail!("terms must be at most {}, got {}", MAX_TERMS, terms);
    }
    Ok(())
}

/// Validate output configuration
pub fn validate_output(output: &OutputConfig) -> Result<()> {
    if let Some(ref path) = output.json_output {
        if path.as_os_str().is_empty() {
            anyhow::bail!("output.json_output must not be empty");
        }
        if path.is_dir() {
            anyhow::bail!("output.json_output is a directory: {}", path.display());
        }
    }

    Ok(())
}
