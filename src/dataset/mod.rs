//! Dataset pipeline
//!
//! Raw CSV (`url`, `status`) → feature table built with the same extractor
//! used at inference → stratified train/test split → CSV files.
//!
//! Feature-table CSVs carry a header of `url`, the schema column names in
//! schema order, then the target column.

mod split;

pub use split::{stratified_folds, stratified_split};

use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::{PhishError, PhishResult};
use crate::extract;
use crate::models::{Label, LabeledRow};
use crate::schema::FeatureSchema;

/// Default name of the target column.
pub const DEFAULT_TARGET: &str = "status";

/// Files written by [`preprocess`] under the datasets directory.
pub const TRANSFORMED_FILE: &str = "transformed_dataset.csv";
pub const TRAIN_VALIDATION_FILE: &str = "train_validation_dataset.csv";
pub const TESTING_FILE: &str = "testing_dataset.csv";

/// One row of a raw dataset, before extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub url: String,
    pub status: String,
}

impl RawRecord {
    pub fn new(url: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status: status.into(),
        }
    }
}

/// Labelled feature rows bound to the schema that produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    schema: FeatureSchema,
    target: String,
    rows: Vec<LabeledRow>,
}

impl FeatureTable {
    /// Build a table, checking every row has one value per schema column.
    pub fn new(schema: FeatureSchema, rows: Vec<LabeledRow>) -> PhishResult<Self> {
        Self::with_target(schema, DEFAULT_TARGET, rows)
    }

    pub fn with_target(
        schema: FeatureSchema,
        target: impl Into<String>,
        rows: Vec<LabeledRow>,
    ) -> PhishResult<Self> {
        if let Some(bad) = rows.iter().find(|r| r.values.len() != schema.len()) {
            return Err(PhishError::Dataset(format!(
                "row for {:?} has {} values, schema has {} columns",
                bad.url,
                bad.values.len(),
                schema.len()
            )));
        }
        Ok(Self {
            schema,
            target: target.into(),
            rows,
        })
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn rows(&self) -> &[LabeledRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row counts indexed by [`Label::index`].
    pub fn class_counts(&self) -> [usize; 2] {
        let mut counts = [0usize; 2];
        for row in &self.rows {
            counts[row.label.index()] += 1;
        }
        counts
    }

    /// New table holding the rows at `indices`, in that order.
    pub fn select(&self, indices: &[usize]) -> Self {
        Self {
            schema: self.schema.clone(),
            target: self.target.clone(),
            rows: indices
                .iter()
                .filter_map(|&i| self.rows.get(i).cloned())
                .collect(),
        }
    }
}

/// Paths and counts produced by [`preprocess`].
#[derive(Debug, Clone)]
pub struct PreprocessSummary {
    pub transformed: PathBuf,
    pub train_validation: PathBuf,
    pub testing: PathBuf,
    pub raw_rows: usize,
    pub kept_rows: usize,
    pub train_rows: usize,
    pub test_rows: usize,
}

fn column_index(headers: &csv::StringRecord, name: &str, path: &Path) -> PhishResult<usize> {
    headers
        .iter()
        .position(|h| h.trim() == name)
        .ok_or_else(|| {
            PhishError::Dataset(format!(
                "{}: missing column {:?}",
                path.display(),
                name
            ))
        })
}

/// Read a raw dataset with at least `url` and `status` columns.
pub fn load_raw(path: &Path) -> PhishResult<Vec<RawRecord>> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();
    let url_idx = column_index(&headers, "url", path)?;
    let status_idx = column_index(&headers, DEFAULT_TARGET, path)?;

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result?;
        records.push(RawRecord {
            url: record.get(url_idx).unwrap_or_default().trim().to_string(),
            status: record.get(status_idx).unwrap_or_default().to_string(),
        });
    }
    debug!("Loaded {} raw records from {}", records.len(), path.display());
    Ok(records)
}

/// Extract a feature row for every record. Records with an invalid URL or
/// unknown status are skipped; input order is preserved.
pub fn build_feature_table(records: &[RawRecord], schema: &FeatureSchema) -> FeatureTable {
    let rows: Vec<Option<LabeledRow>> = records
        .par_iter()
        .map(|record| {
            let label = match record.status.parse::<Label>() {
                Ok(label) => label,
                Err(e) => {
                    warn!("Skipping {:?}: {}", record.url, e);
                    return None;
                }
            };
            match extract::extract(&record.url, schema) {
                Ok(vector) => Some(LabeledRow {
                    url: record.url.clone(),
                    values: vector.into_values(),
                    label,
                }),
                Err(e) => {
                    warn!("Skipping row: {}", e);
                    None
                }
            }
        })
        .collect();

    let rows: Vec<LabeledRow> = rows.into_iter().flatten().collect();
    if rows.len() < records.len() {
        info!(
            "Extracted {} of {} rows ({} skipped)",
            rows.len(),
            records.len(),
            records.len() - rows.len()
        );
    }

    FeatureTable {
        schema: schema.clone(),
        target: DEFAULT_TARGET.to_string(),
        rows,
    }
}

/// Write `table` as CSV: `url`, schema columns, target.
pub fn write_feature_table(table: &FeatureTable, path: &Path) -> PhishResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut writer = csv::Writer::from_path(path)?;

    let mut header = Vec::with_capacity(table.schema.len() + 2);
    header.push("url");
    header.extend(table.schema.names());
    header.push(table.target.as_str());
    writer.write_record(&header)?;

    for row in &table.rows {
        let mut record = Vec::with_capacity(row.values.len() + 2);
        record.push(row.url.clone());
        record.extend(row.values.iter().map(|v| v.to_string()));
        record.push(row.label.as_status().to_string());
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Read a feature table written by [`write_feature_table`] (or any CSV that
/// has every schema column and the target column). The `url` column is
/// optional.
pub fn load_feature_table(
    path: &Path,
    schema: &FeatureSchema,
    target: &str,
) -> PhishResult<FeatureTable> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();

    let url_idx = headers.iter().position(|h| h.trim() == "url");
    let target_idx = column_index(&headers, target, path)?;
    let value_idx = schema
        .names()
        .into_iter()
        .map(|name| column_index(&headers, name, path))
        .collect::<PhishResult<Vec<_>>>()?;

    let mut rows = Vec::new();
    for (line, result) in reader.records().enumerate() {
        let record = result?;
        // +2: header line and 1-based numbering
        let line = line + 2;

        let mut values = Vec::with_capacity(value_idx.len());
        for (&idx, name) in value_idx.iter().zip(schema.names()) {
            let raw = record.get(idx).unwrap_or_default().trim();
            let value = raw.parse::<f64>().map_err(|_| {
                PhishError::Dataset(format!(
                    "{}:{}: column {:?} is not numeric ({:?})",
                    path.display(),
                    line,
                    name,
                    raw
                ))
            })?;
            values.push(value);
        }

        let label = record
            .get(target_idx)
            .unwrap_or_default()
            .parse::<Label>()
            .map_err(|e| PhishError::Dataset(format!("{}:{}: {}", path.display(), line, e)))?;

        rows.push(LabeledRow {
            url: url_idx
                .and_then(|i| record.get(i))
                .unwrap_or_default()
                .to_string(),
            values,
            label,
        });
    }

    debug!("Loaded {} rows from {}", rows.len(), path.display());
    FeatureTable::with_target(schema.clone(), target, rows)
}

/// Build the feature table from a raw CSV, split it, and write all three
/// CSVs under `datasets_dir`.
pub fn preprocess(
    raw_path: &Path,
    datasets_dir: &Path,
    schema: &FeatureSchema,
    train_fraction: f64,
    seed: u64,
) -> PhishResult<PreprocessSummary> {
    let records = load_raw(raw_path)?;
    let table = build_feature_table(&records, schema);
    if table.is_empty() {
        return Err(PhishError::Dataset(format!(
            "{}: no usable rows",
            raw_path.display()
        )));
    }

    std::fs::create_dir_all(datasets_dir)?;
    let transformed = datasets_dir.join(TRANSFORMED_FILE);
    let train_validation = datasets_dir.join(TRAIN_VALIDATION_FILE);
    let testing = datasets_dir.join(TESTING_FILE);

    write_feature_table(&table, &transformed)?;
    let (train, test) = stratified_split(&table, train_fraction, seed)?;
    write_feature_table(&train, &train_validation)?;
    write_feature_table(&test, &testing)?;

    info!(
        "Preprocessed {} rows: {} train/validation, {} testing",
        table.len(),
        train.len(),
        test.len()
    );

    Ok(PreprocessSummary {
        transformed,
        train_validation,
        testing,
        raw_rows: records.len(),
        kept_rows: table.len(),
        train_rows: train.len(),
        test_rows: test.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn records() -> Vec<RawRecord> {
        vec![
            RawRecord::new("https://www.google.com/", "legitimate"),
            RawRecord::new("ftp://files.example.com/", "legitimate"),
            RawRecord::new("http://paypal-login.tk/signin", "phishing"),
            RawRecord::new("http://example.com/", "unknown"),
        ]
    }

    #[test]
    fn test_build_skips_invalid_rows() {
        let table = build_feature_table(&records(), &FeatureSchema::reference());
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0].url, "https://www.google.com/");
        assert_eq!(table.rows()[1].label, Label::Phishing);
        assert_eq!(table.class_counts(), [1, 1]);
        assert!(table.rows().iter().all(|r| r.values.len() == 30));
    }

    #[test]
    fn test_table_rejects_wrong_width() {
        let row = LabeledRow {
            url: "http://a.com".into(),
            values: vec![1.0],
            label: Label::Legitimate,
        };
        assert!(FeatureTable::new(FeatureSchema::reference(), vec![row]).is_err());
    }

    #[test]
    fn test_write_then_load_feature_table() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("table.csv");
        let schema = FeatureSchema::reference();
        let table = build_feature_table(&records(), &schema);

        write_feature_table(&table, &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("url,ip,https_token,"));
        assert!(text.lines().next().unwrap().ends_with(",phish_hints,status"));

        let loaded = load_feature_table(&path, &schema, "status").unwrap();
        assert_eq!(loaded, table);
    }

    #[test]
    fn test_load_missing_column_is_dataset_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("t.csv");
        std::fs::write(&path, "url,ip,status\nhttp://a.com,0,phishing\n").unwrap();

        let schema = FeatureSchema::from_names(&["ip", "port"], &[]).unwrap();
        let err = load_feature_table(&path, &schema, "status").unwrap_err();
        assert!(matches!(err, PhishError::Dataset(ref m) if m.contains("port")));
    }

    #[test]
    fn test_load_custom_target_without_url() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("t.csv");
        std::fs::write(&path, "ip,label\n1,phishing\n0,legitimate\n").unwrap();

        let schema = FeatureSchema::from_names(&["ip"], &[]).unwrap();
        let table = load_feature_table(&path, &schema, "label").unwrap();
        assert_eq!(table.target(), "label");
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0].values, vec![1.0]);
        assert_eq!(table.rows()[0].url, "");
    }

    #[test]
    fn test_load_raw_requires_columns() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("raw.csv");
        std::fs::write(&path, "address,status\nhttp://a.com,phishing\n").unwrap();
        assert!(matches!(load_raw(&path), Err(PhishError::Dataset(_))));
    }

    #[test]
    fn test_preprocess_writes_three_files() {
        let dir = TempDir::new().unwrap();
        let raw = dir.path().join("raw.csv");
        let mut text = String::from("url,status\n");
        for i in 0..10 {
            text.push_str(&format!("https://site{i}.com/,legitimate\n"));
            text.push_str(&format!("http://login{i}.paypa1-verify.tk/wp,phishing\n"));
        }
        std::fs::write(&raw, text).unwrap();

        let out = dir.path().join("datasets");
        let summary = preprocess(&raw, &out, &FeatureSchema::reference(), 0.7, 0).unwrap();
        assert_eq!(summary.raw_rows, 20);
        assert_eq!(summary.kept_rows, 20);
        assert_eq!(summary.train_rows, 14);
        assert_eq!(summary.test_rows, 6);
        assert!(summary.transformed.exists());
        assert!(summary.train_validation.exists());
        assert!(summary.testing.exists());
    }
}
