//! Check command - Validate a configuration
//!
//! Loading already validated the file; this prints what the recorder would
//! query so the PromQL can be tried by hand.

use std::fmt::Write;

use anyhow::Result;
use sleeker_config::Config;
use sleeker_recorder::{MetricSpec, aggregation_query, liveness_query, recatch_query};

/// Run the check command
pub fn run(config: &Config) -> Result<()> {
    print!("{}", render(config));
    Ok(())
}

/// Human-readable summary of `config`
fn render(config: &Config) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "configuration ok");
    let _ = writeln!(out, "  prometheus: {}", config.prometheus.base_url());
    let _ = writeln!(out, "  exporter:   {}", config.exporter.addr());
    let _ = writeln!(out, "  interval:   {:?}", config.scheduler.interval);
    let _ = writeln!(
        out,
        "  catch-up:   {:?} every {:?} ({} points)",
        config.scheduler.catchup_window,
        config.scheduler.catchup_step,
        config.scheduler.catchup_points()
    );
    let _ = writeln!(out, "  ttl:        {}", config.options.ttl);

    for metric in &config.metrics {
        let spec = MetricSpec::from_config(metric);
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", spec.output());
        let _ = writeln!(out, "  help:     {}", spec.help());
        let _ = writeln!(out, "  input:    {}", aggregation_query(&spec));
        let _ = writeln!(out, "  liveness: {}", liveness_query(&spec, &config.options.ttl));
        let _ = writeln!(out, "  recatch:  {}", recatch_query(&spec));
    }

    out
}
