//! Randomized hyperparameter search
//!
//! Samples `n_iter` candidates from uniform integer ranges with a seeded
//! ChaCha RNG, scores each by mean accuracy over stratified k-fold
//! cross-validation and keeps the best. Candidates are scored in parallel;
//! ties go to the earliest sampled candidate.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::gbdt_model::{Hyperparameters, TrainedModel};
use super::metrics::accuracy;
use crate::dataset::{stratified_folds, FeatureTable};
use crate::error::{PhishError, PhishResult};
use crate::models::Label;

/// Search space and cross-validation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Number of sampled candidates.
    pub n_iter: usize,
    /// Number of cross-validation folds.
    pub cv: usize,
    pub seed: u64,
    /// Half-open range for the number of trees.
    pub n_estimators: (usize, usize),
    /// Half-open range for the tree depth.
    pub max_depth: (u32, u32),
    /// Held fixed across candidates.
    pub learning_rate: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            n_iter: 5,
            cv: 5,
            seed: 0,
            n_estimators: (5, 500),
            max_depth: (1, 20),
            learning_rate: 0.1,
        }
    }
}

impl SearchConfig {
    fn validate(&self) -> PhishResult<()> {
        if self.n_iter == 0 {
            return Err(PhishError::Training("n_iter must be at least 1".into()));
        }
        let (lo, hi) = self.n_estimators;
        if lo == 0 || lo >= hi {
            return Err(PhishError::Training(format!(
                "n_estimators range [{lo}, {hi}) is empty or starts at 0"
            )));
        }
        let (lo, hi) = self.max_depth;
        if lo == 0 || lo >= hi {
            return Err(PhishError::Training(format!(
                "max_depth range [{lo}, {hi}) is empty or starts at 0"
            )));
        }
        Ok(())
    }

    /// Draw the candidate list. Same seed, same candidates.
    pub fn sample(&self) -> Vec<Hyperparameters> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        (0..self.n_iter)
            .map(|_| Hyperparameters {
                n_estimators: rng.random_range(self.n_estimators.0..self.n_estimators.1),
                max_depth: rng.random_range(self.max_depth.0..self.max_depth.1),
                learning_rate: self.learning_rate,
            })
            .collect()
    }
}

/// Cross-validation result of one candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateScore {
    pub hyperparameters: Hyperparameters,
    pub fold_accuracies: Vec<f64>,
    pub mean_accuracy: f64,
}

/// Every scored candidate plus the winner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchOutcome {
    pub best: Hyperparameters,
    pub best_score: f64,
    pub candidates: Vec<CandidateScore>,
}

fn score_candidate(
    table: &FeatureTable,
    folds: &[Vec<usize>],
    hp: Hyperparameters,
) -> PhishResult<CandidateScore> {
    let mut fold_accuracies = Vec::with_capacity(folds.len());
    for (k, held_out) in folds.iter().enumerate() {
        let train_idx: Vec<usize> = folds
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != k)
            .flat_map(|(_, f)| f.iter().copied())
            .collect();
        let train = table.select(&train_idx);
        let test = table.select(held_out);

        let model = TrainedModel::fit(&train, Some(hp))?;
        let predicted: Vec<Label> = model.predict_rows(&test).iter().map(|p| p.label).collect();
        let truth: Vec<Label> = test.rows().iter().map(|r| r.label).collect();
        fold_accuracies.push(accuracy(&truth, &predicted));
    }

    let mean_accuracy = fold_accuracies.iter().sum::<f64>() / fold_accuracies.len() as f64;
    debug!(
        "n_estimators={} max_depth={} mean accuracy {:.4}",
        hp.n_estimators, hp.max_depth, mean_accuracy
    );
    Ok(CandidateScore {
        hyperparameters: hp,
        fold_accuracies,
        mean_accuracy,
    })
}

/// Run the randomized search over `table`.
pub fn search(table: &FeatureTable, config: &SearchConfig) -> PhishResult<SearchOutcome> {
    config.validate()?;
    let counts = table.class_counts();
    if counts.iter().any(|&c| c < config.cv) {
        return Err(PhishError::Training(format!(
            "{}-fold cross-validation needs at least {} rows per class (legitimate: {}, phishing: {})",
            config.cv, config.cv, counts[0], counts[1]
        )));
    }

    let folds = stratified_folds(table, config.cv, config.seed)?;
    let candidates = config.sample();
    info!(
        "Searching {} candidates with {}-fold cross-validation on {} rows",
        candidates.len(),
        config.cv,
        table.len()
    );

    let scored = candidates
        .into_par_iter()
        .map(|hp| score_candidate(table, &folds, hp))
        .collect::<PhishResult<Vec<_>>>()?;

    let mut best_idx = 0;
    for (i, c) in scored.iter().enumerate() {
        if c.mean_accuracy > scored[best_idx].mean_accuracy {
            best_idx = i;
        }
    }
    let best = &scored[best_idx];
    info!(
        "Best: n_estimators={} max_depth={} (mean accuracy {:.4})",
        best.hyperparameters.n_estimators, best.hyperparameters.max_depth, best.mean_accuracy
    );

    Ok(SearchOutcome {
        best: best.hyperparameters,
        best_score: best.mean_accuracy,
        candidates: scored,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LabeledRow;
    use crate::schema::FeatureSchema;

    fn table() -> FeatureTable {
        let schema = FeatureSchema::from_names(&["ip"], &["length_url"]).unwrap();
        let rows = (0..30)
            .map(|i| {
                let label = if i % 2 == 0 { Label::Phishing } else { Label::Legitimate };
                let x = if label == Label::Phishing { 1.0 } else { 0.0 };
                LabeledRow {
                    url: format!("http://h{i}.test"),
                    values: vec![x, 20.0 + x * 40.0 + (i % 5) as f64],
                    label,
                }
            })
            .collect();
        FeatureTable::new(schema, rows).unwrap()
    }

    fn small_config() -> SearchConfig {
        SearchConfig {
            n_iter: 3,
            cv: 3,
            seed: 11,
            n_estimators: (2, 8),
            max_depth: (1, 4),
            learning_rate: 0.3,
        }
    }

    #[test]
    fn test_sampling_is_seeded_and_in_range() {
        let cfg = SearchConfig::default();
        let a = cfg.sample();
        let b = cfg.sample();
        assert_eq!(a, b);
        assert_eq!(a.len(), 5);
        for hp in &a {
            assert!((5..500).contains(&hp.n_estimators));
            assert!((1..20).contains(&hp.max_depth));
        }
    }

    #[test]
    fn test_search_is_reproducible() {
        let t = table();
        let a = search(&t, &small_config()).unwrap();
        let b = search(&t, &small_config()).unwrap();
        assert_eq!(a.candidates.len(), 3);
        assert_eq!(a.best, b.best);
        assert_eq!(a.best_score, b.best_score);
        assert!(a.best_score > 0.9, "separable data should score high, got {}", a.best_score);
    }

    #[test]
    fn test_best_is_first_of_ties() {
        let t = table();
        let outcome = search(&t, &small_config()).unwrap();
        let first_best = outcome
            .candidates
            .iter()
            .find(|c| c.mean_accuracy == outcome.best_score)
            .unwrap();
        assert_eq!(first_best.hyperparameters, outcome.best);
    }

    #[test]
    fn test_search_rejects_bad_config() {
        let t = table();
        let mut cfg = small_config();
        cfg.n_iter = 0;
        assert!(search(&t, &cfg).is_err());

        let mut cfg = small_config();
        cfg.max_depth = (3, 3);
        assert!(search(&t, &cfg).is_err());

        let mut cfg = small_config();
        cfg.cv = 20;
        assert!(matches!(search(&t, &cfg), Err(PhishError::Training(_))));
    }
}
