//! Features and schema commands - inspect the extractor

use anyhow::Result;
use console::style;
use serde::Serialize;

use crate::config::PhishnetConfig;
use crate::extract;
use crate::schema::FeatureSchema;

/// Print every catalog feature for `url` as JSON.
pub fn run_features(url: &str) -> Result<()> {
    let features = extract::named(url)?;
    println!("{}", serde_json::to_string_pretty(&features)?);
    Ok(())
}

#[derive(Serialize)]
struct SchemaReport<'a> {
    version: u32,
    fingerprint: String,
    columns: Vec<&'a str>,
}

pub fn run_schema(config: &PhishnetConfig, full: bool, json: bool) -> Result<()> {
    let schema = if full {
        FeatureSchema::full()
    } else {
        config.schema.build()?
    };

    if json {
        let report = SchemaReport {
            version: schema.version(),
            fingerprint: schema.fingerprint(),
            columns: schema.names(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "{} v{}  {} structural, {} statistical",
        style("Feature schema").bold(),
        schema.version(),
        schema.structural().len(),
        schema.statistical().len()
    );
    println!("  fingerprint {}", style(schema.fingerprint()).cyan());
    println!();
    for (i, name) in schema.names().iter().enumerate() {
        println!("  {:>3}  {}", style(i).dim(), name);
    }
    Ok(())
}
