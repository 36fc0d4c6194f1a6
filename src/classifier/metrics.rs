//! Evaluation metrics
//!
//! Confusion matrix rows are the true label and columns the predicted
//! label, both in `[legitimate, phishing]` order.

use serde::Serialize;

use super::gbdt_model::TrainedModel;
use crate::dataset::FeatureTable;
use crate::error::PhishResult;
use crate::models::Label;

/// Scores of a model on a labelled table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EvaluationReport {
    pub positive_label: Label,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub confusion_matrix: [[usize; 2]; 2],
}

impl EvaluationReport {
    /// Score `predicted` against `truth`. Precision, recall and f1 are 0
    /// when their denominator is 0.
    pub fn from_labels(truth: &[Label], predicted: &[Label], positive_label: Label) -> Self {
        let mut matrix = [[0usize; 2]; 2];
        for (t, p) in truth.iter().zip(predicted) {
            matrix[t.index()][p.index()] += 1;
        }

        let total: usize = matrix.iter().flatten().sum();
        let correct = matrix[0][0] + matrix[1][1];

        let pos = positive_label.index();
        let neg = positive_label.other().index();
        let tp = matrix[pos][pos];
        let fp = matrix[neg][pos];
        let fn_ = matrix[pos][neg];

        let precision = ratio(tp, tp + fp);
        let recall = ratio(tp, tp + fn_);
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        Self {
            positive_label,
            accuracy: ratio(correct, total),
            precision,
            recall,
            f1,
            confusion_matrix: matrix,
        }
    }

    pub fn total(&self) -> usize {
        self.confusion_matrix.iter().flatten().sum()
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// Fraction of matching labels; 0 for empty input.
pub fn accuracy(truth: &[Label], predicted: &[Label]) -> f64 {
    let correct = truth.iter().zip(predicted).filter(|(t, p)| t == p).count();
    ratio(correct, truth.len().min(predicted.len()))
}

/// Evaluate `model` on `table`, treating `positive_label` as the positive
/// class for precision and recall.
pub fn evaluate(
    model: &TrainedModel,
    table: &FeatureTable,
    positive_label: Label,
) -> PhishResult<EvaluationReport> {
    let predictions = model.predict_table(table)?;
    let truth: Vec<Label> = table.rows().iter().map(|r| r.label).collect();
    let predicted: Vec<Label> = predictions.iter().map(|p| p.label).collect();
    Ok(EvaluationReport::from_labels(&truth, &predicted, positive_label))
}
