//! Evaluate command - score a saved model on the testing split

use anyhow::{Context, Result};
use console::style;
use std::path::Path;

use super::resolve_model;
use crate::classifier::{evaluate, EvaluationReport};
use crate::config::PhishnetConfig;
use crate::dataset::load_feature_table;
use crate::models::Label;

fn print_report(report: &EvaluationReport) {
    let m = &report.confusion_matrix;
    let l = Label::Legitimate.index();
    let p = Label::Phishing.index();

    println!("\n{}", style("Evaluation").bold());
    println!("  {:<10} {:.4}", "accuracy", report.accuracy);
    println!(
        "  {:<10} {:.4}  {}",
        "precision",
        report.precision,
        style(format!("(positive: {})", report.positive_label)).dim()
    );
    println!("  {:<10} {:.4}", "recall", report.recall);
    println!("  {:<10} {:.4}", "f1", report.f1);

    println!("\n  {}", style("Confusion matrix (rows: actual)").dim());
    println!("  {:<12} {:>10} {:>10}", "", "legitimate", "phishing");
    println!("  {:<12} {:>10} {:>10}", "legitimate", m[l][l], m[l][p]);
    println!("  {:<12} {:>10} {:>10}", "phishing", m[p][l], m[p][p]);
}

pub fn run(
    config: &PhishnetConfig,
    model_path: Option<&Path>,
    input: Option<&Path>,
    positive: Option<Label>,
    json: bool,
) -> Result<()> {
    let model = resolve_model(config, model_path)?;
    let path = input
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.testing_path());
    let table = load_feature_table(&path, model.schema(), &config.schema.target)
        .with_context(|| format!("Failed to load {}", path.display()))?;

    let report = evaluate(&model, &table, positive.unwrap_or(config.schema.positive_label))?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "{} {} model, {} rows",
            style("Scored").bold(),
            model.provenance(),
            report.total()
        );
        print_report(&report);
    }
    Ok(())
}
