//! Preprocess command - build the feature tables and the train/test split

use anyhow::{Context, Result};
use console::style;
use std::path::Path;

use crate::config::PhishnetConfig;
use crate::dataset;

pub fn run(
    config: &PhishnetConfig,
    input: Option<&Path>,
    train_fraction: Option<f64>,
    seed: Option<u64>,
) -> Result<()> {
    let raw_path = input.unwrap_or(&config.paths.raw_dataset);
    let schema = config.schema.build()?;
    let fraction = train_fraction.unwrap_or(config.split.train_fraction);
    let seed = seed.unwrap_or(config.split.seed);

    println!(
        "{} {}",
        style("Preprocessing").bold(),
        style(raw_path.display()).cyan()
    );

    let summary = dataset::preprocess(
        raw_path,
        &config.paths.datasets_dir,
        &schema,
        fraction,
        seed,
    )
    .with_context(|| format!("Failed to preprocess {}", raw_path.display()))?;

    let skipped = summary.raw_rows - summary.kept_rows;
    println!(
        "{} {} rows extracted ({} features){}",
        style("[OK]").green(),
        summary.kept_rows,
        schema.len(),
        if skipped > 0 {
            format!(", {}", style(format!("{skipped} skipped")).yellow())
        } else {
            String::new()
        }
    );
    println!(
        "  {:<18} {}",
        "transformed",
        style(summary.transformed.display()).dim()
    );
    println!(
        "  {:<18} {} rows  {}",
        "train/validation",
        summary.train_rows,
        style(summary.train_validation.display()).dim()
    );
    println!(
        "  {:<18} {} rows  {}",
        "testing",
        summary.test_rows,
        style(summary.testing.display()).dim()
    );
    Ok(())
}
