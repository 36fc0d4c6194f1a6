//! `phishnet.toml` support
//!
//! Looked up, first match wins:
//! 1. the path given with `--config`
//! 2. `./phishnet.toml`
//! 3. `<user config dir>/phishnet/phishnet.toml`
//!
//! Environment variables `PHISHNET_MODELS_DIR`, `PHISHNET_DATASETS_DIR` and
//! `PHISHNET_SEED` override the file.
//!
//! # Configuration Format
//!
//! ```toml
//! [paths]
//! models_dir = "models"
//! datasets_dir = "datasets"
//! raw_dataset = "datasets/raw_dataset.csv"
//!
//! [split]
//! train_fraction = 0.7
//! seed = 0
//!
//! [search]
//! n_iter = 5
//! cv = 5
//! n_estimators = [5, 500]
//! max_depth = [1, 20]
//!
//! [probe]
//! request_timeout_ms = 5000
//! deadline_ms = 10000
//! workers = 8
//!
//! [schema]
//! structural = ["ip", "https_token"]
//! statistical = ["length_url", "phish_hints"]
//! target = "status"
//! positive_label = "phishing"
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::classifier::SearchConfig;
use crate::error::PhishResult;
use crate::models::Label;
use crate::probe::ProbeConfig;
use crate::schema::FeatureSchema;

/// File name searched for in the working and user config directories.
pub const CONFIG_FILE: &str = "phishnet.toml";

/// Where datasets and models live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub models_dir: PathBuf,
    pub datasets_dir: PathBuf,
    /// Raw `url,status` CSV consumed by `preprocess` and `probe`.
    pub raw_dataset: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            models_dir: PathBuf::from("models"),
            datasets_dir: PathBuf::from("datasets"),
            raw_dataset: PathBuf::from("datasets").join("raw_dataset.csv"),
        }
    }
}

/// Train/test split settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    pub train_fraction: f64,
    pub seed: u64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            train_fraction: 0.7,
            seed: 0,
        }
    }
}

/// Feature selection and target column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaConfig {
    /// Structural column names; the reference selection when unset.
    pub structural: Option<Vec<String>>,
    /// Statistical column names; the reference selection when unset.
    pub statistical: Option<Vec<String>>,
    pub target: String,
    pub positive_label: Label,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            structural: None,
            statistical: None,
            target: "status".to_string(),
            positive_label: Label::Phishing,
        }
    }
}

impl SchemaConfig {
    /// Resolve the configured selection into a schema.
    pub fn build(&self) -> PhishResult<FeatureSchema> {
        if self.structural.is_none() && self.statistical.is_none() {
            return Ok(FeatureSchema::reference());
        }
        let reference = FeatureSchema::reference();
        let structural = self.structural.clone().unwrap_or_else(|| {
            reference
                .structural()
                .iter()
                .map(|f| f.name().to_string())
                .collect()
        });
        let statistical = self.statistical.clone().unwrap_or_else(|| {
            reference
                .statistical()
                .iter()
                .map(|f| f.name().to_string())
                .collect()
        });
        FeatureSchema::from_names(&structural, &statistical)
    }
}

/// Everything configurable from `phishnet.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhishnetConfig {
    pub paths: PathsConfig,
    pub split: SplitConfig,
    pub search: SearchConfig,
    pub probe: ProbeConfig,
    pub schema: SchemaConfig,
    /// File the values were read from, if any.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl PhishnetConfig {
    /// Parse a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let mut config: PhishnetConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    /// Apply overrides from a variable lookup (normally the process
    /// environment).
    pub fn apply_overrides<F>(&mut self, get: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = get("PHISHNET_MODELS_DIR").filter(|v| !v.is_empty()) {
            self.paths.models_dir = PathBuf::from(dir);
        }
        if let Some(dir) = get("PHISHNET_DATASETS_DIR").filter(|v| !v.is_empty()) {
            self.paths.datasets_dir = PathBuf::from(dir);
        }
        if let Some(seed) = get("PHISHNET_SEED").filter(|v| !v.is_empty()) {
            let seed: u64 = seed
                .trim()
                .parse()
                .with_context(|| format!("PHISHNET_SEED is not an integer: {seed:?}"))?;
            self.split.seed = seed;
            self.search.seed = seed;
        }
        Ok(())
    }

    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("phishnet").join(CONFIG_FILE))
    }

    pub fn train_validation_path(&self) -> PathBuf {
        self.paths
            .datasets_dir
            .join(crate::dataset::TRAIN_VALIDATION_FILE)
    }

    pub fn testing_path(&self) -> PathBuf {
        self.paths.datasets_dir.join(crate::dataset::TESTING_FILE)
    }
}

/// Load configuration. An explicit path must exist and parse; discovered
/// files that fail to parse are skipped with a warning.
pub fn load_config(explicit: Option<&Path>) -> Result<PhishnetConfig> {
    let mut config = match explicit {
        Some(path) => PhishnetConfig::from_file(path)?,
        None => discover(),
    };
    config.apply_overrides(|k| std::env::var(k).ok())?;
    Ok(config)
}

fn discover() -> PhishnetConfig {
    let candidates = std::iter::once(PathBuf::from(CONFIG_FILE))
        .chain(PhishnetConfig::user_config_path());

    for path in candidates {
        if !path.exists() {
            continue;
        }
        match PhishnetConfig::from_file(&path) {
            Ok(config) => {
                debug!("Loaded config from {}", path.display());
                return config;
            }
            Err(e) => {
                warn!("{:#}", e);
            }
        }
    }
    PhishnetConfig::default()
}
