//! CLI command definitions and handlers

mod classify;
mod evaluate;
mod features;
mod preprocess;
mod probe;
mod train;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::classifier::{Provenance, TrainedModel};
use crate::config::{load_config, PhishnetConfig};
use crate::models::Label;

/// Parse and validate workers count (1-256)
fn parse_workers(s: &str) -> Result<usize, String> {
    let n: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if n == 0 {
        Err("workers must be at least 1".to_string())
    } else if n > 256 {
        Err("workers cannot exceed 256".to_string())
    } else {
        Ok(n)
    }
}

/// Parse a train fraction in (0, 1)
fn parse_fraction(s: &str) -> Result<f64, String> {
    let f: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if f > 0.0 && f < 1.0 {
        Ok(f)
    } else {
        Err("fraction must be between 0 and 1 (exclusive)".to_string())
    }
}

fn parse_label(s: &str) -> Result<Label, String> {
    s.parse::<Label>().map_err(|e| e.to_string())
}

/// phishnet - Phishing URL classifier
#[derive(Parser, Debug)]
#[command(name = "phishnet")]
#[command(
    version,
    about = "Classify URLs as phishing or legitimate from lexical and structural URL features",
    long_about = "phishnet extracts a fixed, versioned feature vector from a raw URL \
(hostname structure, brand look-alikes, suspicious TLDs, character statistics) and \
classifies it with a gradient-boosted tree ensemble.\n\n\
The same extractor builds the training tables and classifies single URLs, so \
training and inference always agree on column order.",
    after_help = "\
Examples:
  phishnet preprocess --input datasets/raw_dataset.csv   Build feature tables and split 70/30
  phishnet train                                         Train with default hyperparameters
  phishnet train --tune                                  Search hyperparameters, then train
  phishnet evaluate                                      Score the model on the testing split
  phishnet classify http://paypa1-login.tk/signin        Classify one or more URLs
  phishnet repl                                          Interactive classification loop
  phishnet features https://example.com/login            Dump every feature as JSON"
)]
pub struct Cli {
    /// Config file (default: ./phishnet.toml, then the user config dir)
    #[arg(long, global = true, env = "PHISHNET_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "info", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract features from a raw url,status CSV and write the train/test split
    Preprocess {
        /// Raw dataset (default: [paths].raw_dataset)
        #[arg(long, short = 'i')]
        input: Option<PathBuf>,

        /// Fraction of each class used for training
        #[arg(long, value_parser = parse_fraction)]
        train_fraction: Option<f64>,

        /// Split seed
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Train a model on the train/validation split
    Train {
        /// Run the hyperparameter search first and train a tuned model
        #[arg(long)]
        tune: bool,

        /// Feature table (default: <datasets_dir>/train_validation_dataset.csv)
        #[arg(long, short = 'i')]
        input: Option<PathBuf>,
    },

    /// Run the randomized hyperparameter search and report the best candidate
    Tune {
        /// Feature table (default: <datasets_dir>/train_validation_dataset.csv)
        #[arg(long, short = 'i')]
        input: Option<PathBuf>,

        /// Number of sampled candidates
        #[arg(long)]
        n_iter: Option<usize>,

        /// Cross-validation folds
        #[arg(long)]
        cv: Option<usize>,

        /// Output JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Score a model on the testing split
    Evaluate {
        /// Model file (default: tuned model if present, else untuned)
        #[arg(long, short = 'm')]
        model: Option<PathBuf>,

        /// Feature table (default: <datasets_dir>/testing_dataset.csv)
        #[arg(long, short = 'i')]
        input: Option<PathBuf>,

        /// Positive class for precision/recall (phishing, legitimate)
        #[arg(long, value_parser = parse_label)]
        positive: Option<Label>,

        /// Output JSON
        #[arg(long)]
        json: bool,
    },

    /// Classify one or more URLs
    Classify {
        /// URLs to classify (must start with http:// or https://)
        #[arg(required = true)]
        urls: Vec<String>,

        /// Model file (default: tuned model if present, else untuned)
        #[arg(long, short = 'm')]
        model: Option<PathBuf>,

        /// Output JSON
        #[arg(long)]
        json: bool,
    },

    /// Interactive loop: type a URL, get a classification ("exit" to quit)
    Repl {
        /// Model file (default: tuned model if present, else untuned)
        #[arg(long, short = 'm')]
        model: Option<PathBuf>,
    },

    /// Print every feature of a URL as JSON
    Features {
        /// URL to inspect
        url: String,
    },

    /// Show the configured feature schema and its fingerprint
    Schema {
        /// Show the full catalog instead of the configured selection
        #[arg(long)]
        full: bool,

        /// Output JSON
        #[arg(long)]
        json: bool,
    },

    /// Check which dataset URLs still answer (writes a CSV report)
    Probe {
        /// Raw dataset (default: [paths].raw_dataset)
        #[arg(long, short = 'i')]
        input: Option<PathBuf>,

        /// Only probe the last N rows (0 = all)
        #[arg(long, default_value = "100")]
        tail: usize,

        /// Report path (default: <datasets_dir>/raw_dataset_website_accessibility.csv)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Concurrent probes (1-256)
        #[arg(long, value_parser = parse_workers)]
        workers: Option<usize>,
    },
}

/// Load the model at `explicit`, or the tuned/untuned model in the models
/// directory.
pub(crate) fn resolve_model(config: &PhishnetConfig, explicit: Option<&Path>) -> Result<TrainedModel> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => [Provenance::Tuned, Provenance::Untuned]
            .iter()
            .map(|p| config.paths.models_dir.join(p.file_name()))
            .find(|p| p.exists())
            .with_context(|| {
                format!(
                    "No model found in {}. Run `phishnet train` first.",
                    config.paths.models_dir.display()
                )
            })?,
    };
    tracing::debug!("Using model {}", path.display());
    TrainedModel::load(&path).with_context(|| format!("Failed to load model {}", path.display()))
}

/// Run the CLI
pub fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;
    if let Some(source) = &config.source {
        tracing::debug!("Config: {}", source.display());
    }

    match cli.command {
        Commands::Preprocess {
            input,
            train_fraction,
            seed,
        } => preprocess::run(&config, input.as_deref(), train_fraction, seed),

        Commands::Train { tune, input } => train::run_train(&config, tune, input.as_deref()),

        Commands::Tune {
            input,
            n_iter,
            cv,
            json,
        } => train::run_tune(&config, input.as_deref(), n_iter, cv, json),

        Commands::Evaluate {
            model,
            input,
            positive,
            json,
        } => evaluate::run(&config, model.as_deref(), input.as_deref(), positive, json),

        Commands::Classify { urls, model, json } => {
            classify::run(&config, &urls, model.as_deref(), json)
        }

        Commands::Repl { model } => classify::run_repl(&config, model.as_deref()),

        Commands::Features { url } => features::run_features(&url),

        Commands::Schema { full, json } => features::run_schema(&config, full, json),

        Commands::Probe {
            input,
            tail,
            output,
            workers,
        } => probe::run(&config, input.as_deref(), tail, output.as_deref(), workers),
    }
}
