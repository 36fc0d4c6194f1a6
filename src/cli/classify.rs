//! Classify and repl commands

use anyhow::Result;
use console::style;
use serde::Serialize;
use std::io::{BufRead, Write};
use std::path::Path;

use super::resolve_model;
use crate::classifier::{classify, classify_batch, is_invalid_input, Prediction, TrainedModel};
use crate::config::PhishnetConfig;
use crate::error::PhishError;
use crate::models::Label;
use crate::schema::FeatureSchema;

const PROMPT: &str = "Enter a URL for classification.\n\
Please make sure to include 'http://' or 'https://' in your input.\n\
(Enter 'exit' to quit the application):\n\t";

#[derive(Serialize)]
struct ClassifiedUrl<'a> {
    url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<Label>,
    #[serde(skip_serializing_if = "Option::is_none")]
    phishing_probability: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn styled_label(label: Label) -> String {
    match label {
        Label::Phishing => style(label).red().bold().to_string(),
        Label::Legitimate => style(label).green().to_string(),
    }
}

/// Classify every URL given on the command line. Invalid URLs are reported
/// inline; schema or model errors abort.
pub fn run(config: &PhishnetConfig, urls: &[String], model_path: Option<&Path>, json: bool) -> Result<()> {
    let model = resolve_model(config, model_path)?;
    let schema = config.schema.build()?;
    let results = classify_batch(&model, &schema, urls);

    if let Some(err) = results.iter().find_map(|r| match r {
        Err(e) if !is_invalid_input(e) => Some(e),
        _ => None,
    }) {
        if matches!(err, PhishError::SchemaMismatch { .. }) {
            anyhow::bail!(
                "{}. The configured [schema] differs from the one the model was trained on; retrain or pass --model.",
                err
            );
        }
        anyhow::bail!("{}", err);
    }

    if json {
        let rows: Vec<ClassifiedUrl> = urls
            .iter()
            .zip(&results)
            .map(|(url, r)| match r {
                Ok(p) => ClassifiedUrl {
                    url,
                    label: Some(p.label),
                    phishing_probability: Some(p.phishing_probability),
                    error: None,
                },
                Err(e) => ClassifiedUrl {
                    url,
                    label: None,
                    phishing_probability: None,
                    error: Some(e.to_string()),
                },
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    for (url, result) in urls.iter().zip(&results) {
        match result {
            Ok(Prediction {
                label,
                phishing_probability,
            }) => println!(
                "{:<12} {}  {}",
                styled_label(*label),
                style(format!("{:.3}", phishing_probability)).dim(),
                url
            ),
            Err(_) => println!("{:<12} {}", style("Invalid URL").yellow(), url),
        }
    }
    Ok(())
}

/// Interactive loop over the configured model.
pub fn run_repl(config: &PhishnetConfig, model_path: Option<&Path>) -> Result<()> {
    let model = resolve_model(config, model_path)?;
    let schema = config.schema.build()?;
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    repl(&model, &schema, stdin.lock(), stdout.lock())
}

/// Read URLs line by line until `exit` or end of input, answering each with
/// its classification.
pub fn repl<R: BufRead, W: Write>(
    model: &TrainedModel,
    schema: &FeatureSchema,
    mut input: R,
    mut output: W,
) -> Result<()> {
    let mut line = String::new();
    loop {
        write!(output, "{}", PROMPT)?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            writeln!(output)?;
            break;
        }
        let url = line.trim();
        if url == "exit" {
            break;
        }

        match classify(model, schema, url) {
            Ok(prediction) => writeln!(output, "Classification: {}", prediction.label)?,
            Err(e) if is_invalid_input(&e) => writeln!(output, "\nResult: Invalid URL")?,
            Err(e) => return Err(e.into()),
        }
        writeln!(output)?;
    }
    Ok(())
}
