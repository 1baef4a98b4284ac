//! Sleeker - Derived Prometheus counters
//!
//! # Usage
//!
//! ```bash
//! # Run the recorder (default)
//! sleeker
//! sleeker --config configs/config.toml
//!
//! # Validate a config and print the generated queries
//! sleeker check -c configs/config.toml
//! ```

mod cmd;
mod exporter;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use sleeker_config::{Config, LogFormat};
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Sleeker - Derived Prometheus counters
#[derive(Parser, Debug)]
#[command(name = "sleeker")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file
    #[arg(short, long, global = true, default_value = "config.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error). Overrides config file.
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Shorthand for --log-level debug
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Shorthand for --log-level warn
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Prometheus base URL. Overrides `[prometheus] url`.
    #[arg(long, global = true, env = "SLEEKER_PROMETHEUS_URL")]
    prometheus_url: Option<String>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Run the recorder and serve the derived counters
    Serve,

    /// Validate the configuration and print each metric's queries
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cmd::load_config(&cli.config, cli.prometheus_url.as_deref())?;

    match cli.command.unwrap_or(Command::Serve) {
        // Check only prints to stdout
        Command::Check => cmd::check::run(&config),
        Command::Serve => {
            let log_level = resolve_log_level(&cli, &config);
            init_logging(&log_level, config.log.format)?;
            cmd::serve::run(config, &cli.config).await
        }
    }
}

/// Resolve the log filter: CLI flags > config file > default "info"
fn resolve_log_level(cli: &Cli, config: &Config) -> String {
    let flag = match (&cli.log_level, cli.verbose, cli.quiet) {
        (Some(level), _, _) => Some(level.as_str()),
        (None, true, _) => Some("debug"),
        (None, false, true) => Some("warn"),
        (None, false, false) => None,
    };
    config.log.filter(flag)
}

/// Parse `level`, falling back to "info" and returning the rejection
fn build_filter(level: &str) -> Result<(EnvFilter, Option<ParseError>)> {
    match EnvFilter::try_new(level) {
        Ok(filter) => Ok((filter, None)),
        Err(rejected) => {
            let filter = EnvFilter::try_new("info")
                .map_err(|e| anyhow::anyhow!("invalid log level: {}", e))?;
            Ok((filter, Some(rejected)))
        }
    }
}

/// Initialize the tracing subscriber for logging
fn init_logging(level: &str, format: LogFormat) -> Result<()> {
    let (filter, rejected) = build_filter(level)?;

    match format {
        LogFormat::Console => tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_thread_ids(false))
            .with(filter)
            .init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(fmt::layer().json().with_target(true))
            .with(filter)
            .init(),
    }

    if let Some(e) = rejected {
        tracing::warn!(filter = level, error = %e, "invalid log filter, using info");
    }

    Ok(())
}
