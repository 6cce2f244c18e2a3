//! leibniz-pi CLI entry point

use anyhow::{Context, Result};
use leibniz_pi::config::{cli::Cli, toml as config_toml, validator, Config, OutputFormat};
use leibniz_pi::output::{json, text, RunReport};
use leibniz_pi::{approximate_pi_with, CancelToken, RunOptions};
use std::io::{self, Write};
use std::time::Instant;

fn main() -> Result<()> {
    let cli = Cli::parse_args();
    cli.validate()?;

    let config = build_config(&cli)?;
    validator::validate_config(&config)
        .context("Configuration validation failed")?;
    if cli.debug {
        eprintln!("DEBUG: Resolved configuration: {:?}", config);
    }

    if cli.dry_run {
        print_configuration(&config);
        println!();
        println!("Dry run mode - configuration validated successfully");
        return Ok(());
    }

    let terms = match config.run.terms {
        Some(terms) => terms,
        None => prompt_terms()?,
    };
    validator::validate_terms(terms)?;
    let workers = config.resolve_workers(terms);

    let cancel = CancelToken::new();
    install_interrupt_handler(&cancel, cli.debug)?;
    let options = RunOptions {
        backend: config.run.backend,
        cancel: Some(cancel),
    };

    if cli.debug {
        eprintln!(
            "DEBUG: Summing {} terms on {} {} workers",
            terms, workers, config.run.backend
        );
    }

    let start = Instant::now();
    let approximation = approximate_pi_with(terms, workers, &options)
        .context("Pi approximation failed")?;
    let elapsed = start.elapsed();

    let report = RunReport::new(&approximation, elapsed, config.output.show_error);
    if cli.debug {
        text::print_debug_details(&report);
    }

    // Written before anything reaches stdout so a failed write prints nothing
    if let Some(ref path) = config.output.json_output {
        json::write_json_output(path, &report, true)?;
        if cli.debug {
            eprintln!("DEBUG: JSON report written to {}", path.display());
        }
    }

    match config.output.format {
        OutputFormat::Text => text::print_report(&report),
        OutputFormat::Json => println!("{}", json::to_json_string(&report)?),
    }

    Ok(())
}

/// Load the config file if one was given, then apply CLI overrides
fn build_config(cli: &Cli) -> Result<Config> {
    let base = match cli.config {
        Some(ref path) => config_toml::parse_toml_file(path)?,
        None => Config::default(),
    };

    config_toml::merge_cli_with_config(cli, base)
}

/// Ask for the term count on stdin
fn prompt_terms() -> Result<u64> {
    print!("Enter number of terms to calculate: ");
    io::stdout().flush()?;

    let mut input = String::new();
    let read = io::stdin()
        .read_line(&mut input)
        .context("Failed to read number of terms")?;
    if read == 0 {
        anyhow::bail!("No number of terms given on standard input");
    }

    input
        .trim()
        .parse::<u64>()
        .with_context(|| format!("Invalid number of terms: {:?}", input.trim()))
}

/// Raise the cancel token on Ctrl-C; a second Ctrl-C exits immediately
#[cfg(unix)]
fn install_interrupt_handler(cancel: &CancelToken, debug: bool) -> Result<()> {
    use signal_hook::consts::SIGINT;
    use signal_hook::flag;
    use std::sync::Arc;

    let raised = cancel.flag();
    flag::register_conditional_shutdown(SIGINT, 130, Arc::clone(&raised))
        .context("Failed to install SIGINT handler")?;
    flag::register(SIGINT, raised)
        .context("Failed to install SIGINT handler")?;

    if debug {
        eprintln!("DEBUG: Ctrl-C cancels the running approximation");
    }
    Ok(())
}

#[cfg(not(unix))]
fn install_interrupt_handler(_cancel: &CancelToken, _debug: bool) -> Result<()> {
    Ok(())
}

fn print_configuration(config: &Config) {
    println!("Configuration:");
    match config.run.terms {
        Some(terms) => {
            println!("  Terms:   {}", terms);
            println!("  Workers: {}", config.resolve_workers(terms));
        }
        None => {
            println!("  Terms:   (prompted)");
            match config.run.workers {
                Some(workers) => println!("  Workers: {}", workers),
                None => println!("  Workers: (one per 1000 terms, at most 100)"),
            }
        }
    }
    println!("  Backend: {}", config.run.backend);
    println!("  Format:  {}", config.output.format);
    if let Some(ref path) = config.output.json_output {
        println!("  JSON:    {}", path.display());
    }
    if config.output.show_error {
        println!("  Error:   shown");
    }
}
