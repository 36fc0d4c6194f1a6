//! Train and tune commands

use anyhow::{Context, Result};
use console::style;
use std::path::Path;

use crate::classifier::{search, SearchConfig, SearchOutcome, TrainedModel};
use crate::config::PhishnetConfig;
use crate::dataset::{load_feature_table, FeatureTable};

fn load_training_table(config: &PhishnetConfig, input: Option<&Path>) -> Result<FeatureTable> {
    let path = input
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.train_validation_path());
    let schema = config.schema.build()?;
    let table = load_feature_table(&path, &schema, &config.schema.target).with_context(|| {
        format!(
            "Failed to load {}. Run `phishnet preprocess` first.",
            path.display()
        )
    })?;
    tracing::info!("Loaded {} training rows from {}", table.len(), path.display());
    Ok(table)
}

fn print_search(outcome: &SearchOutcome) {
    println!("\n{}", style("Hyperparameter search").bold());
    println!(
        "  {:>12}  {:>9}  {:>13}  {}",
        "n_estimators", "max_depth", "learning_rate", "mean accuracy"
    );
    for c in &outcome.candidates {
        let hp = c.hyperparameters;
        let line = format!(
            "  {:>12}  {:>9}  {:>13.3}  {:.4}",
            hp.n_estimators, hp.max_depth, hp.learning_rate, c.mean_accuracy
        );
        if hp == outcome.best {
            println!("{}", style(line).green());
        } else {
            println!("{}", line);
        }
    }
    println!(
        "\n{} best: n_estimators={} max_depth={} ({:.4})",
        style("[OK]").green(),
        outcome.best.n_estimators,
        outcome.best.max_depth,
        outcome.best_score
    );
}

/// Train a model and save it under the models directory.
pub fn run_train(config: &PhishnetConfig, tune: bool, input: Option<&Path>) -> Result<()> {
    let table = load_training_table(config, input)?;

    let hyperparameters = if tune {
        let outcome = search(&table, &config.search)?;
        print_search(&outcome);
        Some(outcome.best)
    } else {
        None
    };

    let model = TrainedModel::fit(&table, hyperparameters)?;
    let path = model
        .persist(&config.paths.models_dir)
        .with_context(|| format!("Failed to save model to {}", config.paths.models_dir.display()))?;

    let hp = model.hyperparameters();
    println!(
        "{} Trained {} model on {} rows (n_estimators={}, max_depth={}, learning_rate={})",
        style("[OK]").green(),
        model.provenance(),
        table.len(),
        hp.n_estimators,
        hp.max_depth,
        hp.learning_rate
    );
    println!("  Saved to {}", style(path.display()).cyan());
    Ok(())
}

/// Run the search alone and report it.
pub fn run_tune(
    config: &PhishnetConfig,
    input: Option<&Path>,
    n_iter: Option<usize>,
    cv: Option<usize>,
    json: bool,
) -> Result<()> {
    let table = load_training_table(config, input)?;
    let search_config = SearchConfig {
        n_iter: n_iter.unwrap_or(config.search.n_iter),
        cv: cv.unwrap_or(config.search.cv),
        ..config.search.clone()
    };

    let outcome = search(&table, &search_config)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_search(&outcome);
    }
    Ok(())
}
