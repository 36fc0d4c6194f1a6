//! GBDT model wrapper for URL classification
//!
//! Wraps the `gbdt` crate to provide:
//! - Training from a [`FeatureTable`] with default or tuned hyperparameters
//! - Single and batch inference on schema-tagged [`FeatureVector`]s
//! - A self-describing JSON model file that embeds the feature schema
//!
//! The model produces probabilities via the `LogLikelyhood` loss (binary
//! classification), with label 1.0 as phishing and -1.0 as legitimate.
//!
//! Note: the gbdt crate internally uses `f32` (`ValueType`), while feature
//! vectors store `f64`. Conversions happen at the crate boundary.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use gbdt::config::Config;
use gbdt::decision_tree::Data;
use gbdt::gradient_boost::GBDT;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::dataset::FeatureTable;
use crate::error::{PhishError, PhishResult};
use crate::extract::FeatureVector;
use crate::models::Label;
use crate::schema::{FeatureSchema, SCHEMA_VERSION};

/// Bumped when the model file layout changes.
pub const MODEL_FORMAT_VERSION: u32 = 1;

/// Probability at or above which a URL is labelled phishing.
pub const DECISION_THRESHOLD: f64 = 0.5;

#[inline]
fn values_to_f32(values: &[f64]) -> Vec<f32> {
    values.iter().map(|&v| v as f32).collect()
}

// ---------------------------------------------------------------------------
// Hyperparameters & provenance
// ---------------------------------------------------------------------------

/// Ensemble settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hyperparameters {
    /// Number of boosting iterations (trees).
    pub n_estimators: usize,
    /// Maximum depth of each tree.
    pub max_depth: u32,
    /// Shrinkage applied to each tree's contribution.
    pub learning_rate: f64,
}

impl Default for Hyperparameters {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: 6,
            learning_rate: 0.1,
        }
    }
}

/// Whether the hyperparameters came from a search or the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    Tuned,
    Untuned,
}

impl Provenance {
    /// File name used by [`TrainedModel::persist`].
    pub fn file_name(&self) -> &'static str {
        match self {
            Provenance::Tuned => "tuned_model.json",
            Provenance::Untuned => "untuned_model.json",
        }
    }
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provenance::Tuned => write!(f, "tuned"),
            Provenance::Untuned => write!(f, "untuned"),
        }
    }
}

// ---------------------------------------------------------------------------
// Prediction output
// ---------------------------------------------------------------------------

/// Result of running a single URL through the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prediction {
    pub label: Label,
    /// Probability that the URL is phishing (0.0..1.0).
    pub phishing_probability: f64,
}

impl Prediction {
    fn from_probability(p: f64) -> Self {
        let label = if p >= DECISION_THRESHOLD {
            Label::Phishing
        } else {
            Label::Legitimate
        };
        Self {
            label,
            phishing_probability: p,
        }
    }
}

// ---------------------------------------------------------------------------
// Model file
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct ModelFileRef<'a> {
    format_version: u32,
    provenance: Provenance,
    hyperparameters: &'a Hyperparameters,
    schema: &'a FeatureSchema,
    fingerprint: String,
    trained_at: DateTime<Utc>,
    model: &'a GBDT,
}

#[derive(Deserialize)]
struct ModelFile {
    format_version: u32,
    provenance: Provenance,
    hyperparameters: Hyperparameters,
    schema: FeatureSchema,
    fingerprint: String,
    trained_at: DateTime<Utc>,
    model: GBDT,
}

// ---------------------------------------------------------------------------
// Trained model
// ---------------------------------------------------------------------------

/// A fitted ensemble bound to the schema it was trained on.
pub struct TrainedModel {
    model: GBDT,
    schema: FeatureSchema,
    hyperparameters: Hyperparameters,
    provenance: Provenance,
    trained_at: DateTime<Utc>,
}

impl std::fmt::Debug for TrainedModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrainedModel")
            .field("schema", &self.schema.fingerprint())
            .field("hyperparameters", &self.hyperparameters)
            .field("provenance", &self.provenance)
            .field("trained_at", &self.trained_at)
            .finish_non_exhaustive()
    }
}

impl TrainedModel {
    /// Train on `table`. `None` uses the default hyperparameters and marks
    /// the model untuned.
    pub fn fit(table: &FeatureTable, hyperparameters: Option<Hyperparameters>) -> PhishResult<Self> {
        let (hp, provenance) = match hyperparameters {
            Some(hp) => (hp, Provenance::Tuned),
            None => (Hyperparameters::default(), Provenance::Untuned),
        };
        let model = train_gbdt(table, &hp)?;
        Ok(Self {
            model,
            schema: table.schema().clone(),
            hyperparameters: hp,
            provenance,
            trained_at: Utc::now(),
        })
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn hyperparameters(&self) -> &Hyperparameters {
        &self.hyperparameters
    }

    pub fn provenance(&self) -> Provenance {
        self.provenance
    }

    pub fn trained_at(&self) -> DateTime<Utc> {
        self.trained_at
    }

    fn check_fingerprint(&self, found: &str) -> PhishResult<()> {
        let expected = self.schema.fingerprint();
        if expected == found {
            Ok(())
        } else {
            Err(PhishError::SchemaMismatch {
                expected,
                found: found.to_string(),
            })
        }
    }

    /// Classify one vector. The vector must come from the model's schema.
    pub fn predict(&self, vector: &FeatureVector) -> PhishResult<Prediction> {
        self.check_fingerprint(vector.fingerprint())?;
        let data = vec![Data::new_test_data(values_to_f32(vector.values()), None)];
        let preds = self.model.predict(&data);
        let p = preds.first().copied().unwrap_or(0.5_f32) as f64;
        Ok(Prediction::from_probability(p))
    }

    /// Classify every row of a table built with the model's schema.
    pub fn predict_table(&self, table: &FeatureTable) -> PhishResult<Vec<Prediction>> {
        self.check_fingerprint(&table.schema().fingerprint())?;
        Ok(self.predict_rows(table))
    }

    /// Batch prediction without the schema check; callers guarantee the
    /// table layout.
    pub(crate) fn predict_rows(&self, table: &FeatureTable) -> Vec<Prediction> {
        if table.is_empty() {
            return Vec::new();
        }
        let data: Vec<Data> = table
            .rows()
            .iter()
            .map(|r| Data::new_test_data(values_to_f32(&r.values), None))
            .collect();
        self.model
            .predict(&data)
            .into_iter()
            .map(|p| Prediction::from_probability(p as f64))
            .collect()
    }

    /// Write the model file to `path`.
    pub fn save(&self, path: &Path) -> PhishResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = ModelFileRef {
            format_version: MODEL_FORMAT_VERSION,
            provenance: self.provenance,
            hyperparameters: &self.hyperparameters,
            schema: &self.schema,
            fingerprint: self.schema.fingerprint(),
            trained_at: self.trained_at,
            model: &self.model,
        };
        let json = serde_json::to_string(&file)?;
        std::fs::write(path, json)?;
        debug!("Saved {} model to {}", self.provenance, path.display());
        Ok(())
    }

    /// Save under `dir` as `tuned_model.json` or `untuned_model.json`.
    pub fn persist(&self, dir: &Path) -> PhishResult<PathBuf> {
        let path = dir.join(self.provenance.file_name());
        self.save(&path)?;
        info!("Model written to {}", path.display());
        Ok(path)
    }

    /// Load a model file, verifying its stored schema fingerprint.
    pub fn load(path: &Path) -> PhishResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Parse a model file from a string.
    pub fn from_json(json: &str) -> PhishResult<Self> {
        let file: ModelFile = serde_json::from_str(json)?;
        if file.format_version > MODEL_FORMAT_VERSION {
            return Err(PhishError::Model(format!(
                "model file format {} is newer than supported ({})",
                file.format_version, MODEL_FORMAT_VERSION
            )));
        }
        if file.schema.version() != SCHEMA_VERSION {
            return Err(PhishError::Model(format!(
                "model was trained on schema version {}, current is {}; retrain it",
                file.schema.version(),
                SCHEMA_VERSION
            )));
        }
        let computed = file.schema.fingerprint();
        if computed != file.fingerprint {
            return Err(PhishError::SchemaMismatch {
                expected: file.fingerprint,
                found: computed,
            });
        }
        Ok(Self {
            model: file.model,
            schema: file.schema,
            hyperparameters: file.hyperparameters,
            provenance: file.provenance,
            trained_at: file.trained_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Training helper
// ---------------------------------------------------------------------------

/// Train a GBDT ensemble on every row of `table`.
fn train_gbdt(table: &FeatureTable, hp: &Hyperparameters) -> PhishResult<GBDT> {
    if table.is_empty() {
        return Err(PhishError::Training("no training samples provided".into()));
    }
    let counts = table.class_counts();
    if counts.iter().any(|&c| c == 0) {
        return Err(PhishError::Training(format!(
            "training data needs both classes (legitimate: {}, phishing: {})",
            counts[0], counts[1]
        )));
    }
    if hp.n_estimators == 0 || hp.max_depth == 0 {
        return Err(PhishError::Training(format!(
            "n_estimators and max_depth must be positive, got {} and {}",
            hp.n_estimators, hp.max_depth
        )));
    }
    if table.schema().is_empty() {
        return Err(PhishError::Training("schema has no columns".into()));
    }

    let mut cfg = Config::new();
    cfg.set_feature_size(table.schema().len());
    cfg.set_max_depth(hp.max_depth);
    cfg.set_iterations(hp.n_estimators);
    cfg.set_shrinkage(hp.learning_rate as f32);
    cfg.set_loss("LogLikelyhood");
    cfg.set_debug(false);
    cfg.set_training_optimization_level(2);
    cfg.set_min_leaf_size(1);

    let mut gbdt = GBDT::new(&cfg);

    let mut training_data: Vec<Data> = table
        .rows()
        .iter()
        .map(|r| Data::new_training_data(values_to_f32(&r.values), 1.0_f32, r.label.target(), None))
        .collect();

    debug!(
        "Fitting {} trees (depth {}, lr {}) on {} rows",
        hp.n_estimators,
        hp.max_depth,
        hp.learning_rate,
        training_data.len()
    );
    gbdt.fit(&mut training_data);

    Ok(gbdt)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LabeledRow;

    fn small_hp() -> Hyperparameters {
        Hyperparameters {
            n_estimators: 10,
            max_depth: 3,
            learning_rate: 0.3,
        }
    }

    /// Two clusters on two columns: phishing rows have high values.
    fn make_table() -> FeatureTable {
        let schema = FeatureSchema::from_names(&["ip"], &["nb_dots"]).unwrap();
        let mut rows = Vec::new();
        for i in 0..20 {
            rows.push(LabeledRow {
                url: format!("http://bad{i}.example"),
                values: vec![1.0, 8.0 + (i % 4) as f64],
                label: Label::Phishing,
            });
            rows.push(LabeledRow {
                url: format!("http://good{i}.example"),
                values: vec![0.0, 1.0 + (i % 2) as f64],
                label: Label::Legitimate,
            });
        }
        FeatureTable::new(schema, rows).unwrap()
    }

    fn vector(table: &FeatureTable, values: Vec<f64>) -> FeatureVector {
        FeatureVector::from_parts(table.schema().fingerprint(), values)
    }

    #[test]
    fn test_prediction_threshold() {
        assert_eq!(Prediction::from_probability(0.85).label, Label::Phishing);
        assert_eq!(Prediction::from_probability(0.3).label, Label::Legitimate);
        // Edge case: exactly 0.5
        assert_eq!(Prediction::from_probability(0.5).label, Label::Phishing);
    }

    #[test]
    fn test_fit_defaults_are_untuned() {
        let table = make_table();
        let model = TrainedModel::fit(&table, None).unwrap();
        assert_eq!(model.provenance(), Provenance::Untuned);
        assert_eq!(*model.hyperparameters(), Hyperparameters::default());

        let tuned = TrainedModel::fit(&table, Some(small_hp())).unwrap();
        assert_eq!(tuned.provenance(), Provenance::Tuned);
    }

    #[test]
    fn test_train_and_predict() {
        let table = make_table();
        let model = TrainedModel::fit(&table, Some(small_hp())).unwrap();

        let bad = model.predict(&vector(&table, vec![1.0, 9.0])).unwrap();
        let good = model.predict(&vector(&table, vec![0.0, 1.0])).unwrap();

        assert!((0.0..=1.0).contains(&bad.phishing_probability));
        assert!((0.0..=1.0).contains(&good.phishing_probability));
        assert_eq!(bad.label, Label::Phishing);
        assert_eq!(good.label, Label::Legitimate);

        let batch = model.predict_table(&table).unwrap();
        assert_eq!(batch.len(), table.len());
    }

    #[test]
    fn test_predict_rejects_other_schema() {
        let table = make_table();
        let model = TrainedModel::fit(&table, Some(small_hp())).unwrap();

        let other = FeatureSchema::from_names(&["port"], &["nb_dots"]).unwrap();
        let v = FeatureVector::from_parts(other.fingerprint(), vec![1.0, 9.0]);
        let err = model.predict(&v).unwrap_err();
        assert!(matches!(err, PhishError::SchemaMismatch { .. }));
    }

    #[test]
    fn test_train_validation_errors() {
        let schema = FeatureSchema::from_names(&["ip"], &[]).unwrap();
        let empty = FeatureTable::new(schema.clone(), vec![]).unwrap();
        match TrainedModel::fit(&empty, None) {
            Err(PhishError::Training(m)) => assert!(m.contains("no training samples")),
            other => panic!("expected training error, got {other:?}"),
        }

        let one_class = FeatureTable::new(
            schema,
            vec![LabeledRow {
                url: String::new(),
                values: vec![1.0],
                label: Label::Phishing,
            }],
        )
        .unwrap();
        assert!(matches!(
            TrainedModel::fit(&one_class, None),
            Err(PhishError::Training(_))
        ));

        let zero_trees = Hyperparameters {
            n_estimators: 0,
            ..small_hp()
        };
        assert!(TrainedModel::fit(&make_table(), Some(zero_trees)).is_err());
    }

    #[test]
    fn test_persist_and_load_roundtrip() {
        let table = make_table();
        let model = TrainedModel::fit(&table, Some(small_hp())).unwrap();

        let dir = tempfile::TempDir::new().expect("create temp dir");
        let path = model.persist(dir.path()).expect("persist should succeed");
        assert_eq!(path.file_name().unwrap(), "tuned_model.json");

        let loaded = TrainedModel::load(&path).expect("load should succeed");
        assert_eq!(loaded.schema(), model.schema());
        assert_eq!(loaded.provenance(), Provenance::Tuned);
        assert_eq!(loaded.hyperparameters(), model.hyperparameters());

        let v = vector(&table, vec![1.0, 10.0]);
        let a = model.predict(&v).unwrap();
        let b = loaded.predict(&v).unwrap();
        assert!(
            (a.phishing_probability - b.phishing_probability).abs() < 1e-6,
            "loaded model predictions should match original: {} vs {}",
            a.phishing_probability,
            b.phishing_probability,
        );
    }

    #[test]
    fn test_load_detects_tampered_fingerprint() {
        let table = make_table();
        let model = TrainedModel::fit(&table, Some(small_hp())).unwrap();
        let dir = tempfile::TempDir::new().unwrap();
        let path = model.persist(dir.path()).unwrap();

        let mut json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        json["fingerprint"] = serde_json::Value::String("0000000000000000".into());
        let err = TrainedModel::from_json(&json.to_string()).unwrap_err();
        assert!(matches!(err, PhishError::SchemaMismatch { .. }));
    }

    #[test]
    fn test_model_file_layout() {
        let model = TrainedModel::fit(&make_table(), None).unwrap();
        let dir = tempfile::TempDir::new().unwrap();
        let path = model.persist(dir.path()).unwrap();
        assert_eq!(path.file_name().unwrap(), "untuned_model.json");

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        for key in [
            "format_version",
            "provenance",
            "hyperparameters",
            "schema",
            "fingerprint",
            "trained_at",
            "model",
        ] {
            assert!(json.get(key).is_some(), "missing key {key}");
        }
        assert_eq!(json["provenance"], "untuned");
    }
}
