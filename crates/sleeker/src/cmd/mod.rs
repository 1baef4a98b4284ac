//! Command implementations for the sleeker CLI

pub mod check;
pub mod serve;

use std::path::Path;

use anyhow::{Context, Result};
use sleeker_config::Config;

/// Load and validate the configuration, applying the CLI URL override
pub fn load_config(path: &Path, prometheus_url: Option<&str>) -> Result<Config> {
    if !path.exists() {
        return Err(anyhow::anyhow!(
            "config file not found: {}",
            path.display()
        ));
    }

    let mut config = Config::from_file(path)
        .with_context(|| format!("failed to load configuration from {}", path.display()))?;

    if let Some(url) = prometheus_url {
        config.prometheus.url = url.to_string();
        config
            .validate()
            .context("invalid prometheus url override")?;
    }

    Ok(config)
}
