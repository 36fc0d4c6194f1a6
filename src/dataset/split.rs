//! Class-stratified splitting
//!
//! Each class is shuffled independently with a seeded ChaCha RNG so the
//! same seed always yields the same partition.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::FeatureTable;
use crate::error::{PhishError, PhishResult};
use crate::models::Label;

fn class_indices(table: &FeatureTable, label: Label) -> Vec<usize> {
    table
        .rows()
        .iter()
        .enumerate()
        .filter(|(_, r)| r.label == label)
        .map(|(i, _)| i)
        .collect()
}

/// Split into (train, test), sampling `round(train_fraction * n)` rows of
/// each class into the training side.
pub fn stratified_split(
    table: &FeatureTable,
    train_fraction: f64,
    seed: u64,
) -> PhishResult<(FeatureTable, FeatureTable)> {
    if !(train_fraction > 0.0 && train_fraction < 1.0) {
        return Err(PhishError::Dataset(format!(
            "train fraction must be in (0, 1), got {train_fraction}"
        )));
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut train = Vec::new();
    let mut test = Vec::new();

    // Phishing first, then legitimate
    for label in [Label::Phishing, Label::Legitimate] {
        let mut indices = class_indices(table, label);
        indices.shuffle(&mut rng);
        let n_train = (train_fraction * indices.len() as f64).round() as usize;
        let (a, b) = indices.split_at(n_train.min(indices.len()));
        train.extend_from_slice(a);
        test.extend_from_slice(b);
    }

    Ok((table.select(&train), table.select(&test)))
}

/// Partition row indices into `k` folds with each class spread evenly.
pub fn stratified_folds(table: &FeatureTable, k: usize, seed: u64) -> PhishResult<Vec<Vec<usize>>> {
    if k < 2 {
        return Err(PhishError::Dataset(format!(
            "cross-validation needs at least 2 folds, got {k}"
        )));
    }
    if table.len() < k {
        return Err(PhishError::Dataset(format!(
            "cannot make {k} folds from {} rows",
            table.len()
        )));
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut folds = vec![Vec::new(); k];
    let mut next = 0usize;
    for label in Label::ALL {
        let mut indices = class_indices(table, label);
        indices.shuffle(&mut rng);
        for i in indices {
            folds[next % k].push(i);
            next += 1;
        }
    }
    Ok(folds)
}
