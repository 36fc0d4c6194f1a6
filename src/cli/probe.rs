//! Probe command - check which dataset URLs are still online

use anyhow::{Context, Result};
use console::style;
use std::path::Path;

use crate::config::PhishnetConfig;
use crate::dataset::load_raw;
use crate::probe::{probe_all, write_report, ProbeConfig, Reachability};

pub const REPORT_FILE: &str = "raw_dataset_website_accessibility.csv";

pub fn run(
    config: &PhishnetConfig,
    input: Option<&Path>,
    tail: usize,
    output: Option<&Path>,
    workers: Option<usize>,
) -> Result<()> {
    let raw_path = input.unwrap_or(&config.paths.raw_dataset);
    let records = load_raw(raw_path)
        .with_context(|| format!("Failed to read {}", raw_path.display()))?;

    let start = if tail == 0 {
        0
    } else {
        records.len().saturating_sub(tail)
    };
    let records = &records[start..];

    let probe_config = ProbeConfig {
        workers: workers.unwrap_or(config.probe.workers),
        ..config.probe.clone()
    };

    println!(
        "{} {} URLs ({} workers, {}s deadline)",
        style("Probing").bold(),
        records.len(),
        probe_config.workers,
        probe_config.deadline().as_secs()
    );

    let urls: Vec<&str> = records.iter().map(|r| r.url.as_str()).collect();
    let results = probe_all(&urls, &probe_config);

    let report = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.paths.datasets_dir.join(REPORT_FILE));
    write_report(&report, records, &results)
        .with_context(|| format!("Failed to write {}", report.display()))?;

    let count = |r: Reachability| results.iter().filter(|&&x| x == r).count();
    println!(
        "{} {} reachable, {} unreachable, {} timed out",
        style("[OK]").green(),
        style(count(Reachability::Reachable)).green(),
        style(count(Reachability::Unreachable)).red(),
        style(count(Reachability::TimedOut)).yellow()
    );
    println!("  Report: {}", style(report.display()).cyan());
    Ok(())
}
