//! Core data models for phishnet
//!
//! Labels and labelled rows shared by the dataset pipeline and the
//! classifier.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PhishError;

/// Classification outcome for a URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Legitimate,
    Phishing,
}

impl Label {
    /// Both labels, in confusion-matrix order.
    pub const ALL: [Label; 2] = [Label::Legitimate, Label::Phishing];

    /// Value written to the `status` column of dataset CSVs.
    pub fn as_status(&self) -> &'static str {
        match self {
            Label::Legitimate => "legitimate",
            Label::Phishing => "phishing",
        }
    }

    /// GBDT target under the `LogLikelyhood` loss (+1 / -1).
    pub fn target(&self) -> f32 {
        match self {
            Label::Phishing => 1.0,
            Label::Legitimate => -1.0,
        }
    }

    /// Matrix index: legitimate = 0, phishing = 1.
    pub fn index(&self) -> usize {
        match self {
            Label::Legitimate => 0,
            Label::Phishing => 1,
        }
    }

    pub fn other(&self) -> Label {
        match self {
            Label::Legitimate => Label::Phishing,
            Label::Phishing => Label::Legitimate,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Legitimate => write!(f, "Legitimate"),
            Label::Phishing => write!(f, "Phishing"),
        }
    }
}

impl FromStr for Label {
    type Err = PhishError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "phishing" => Ok(Label::Phishing),
            "legitimate" => Ok(Label::Legitimate),
            other => Err(PhishError::Dataset(format!(
                "unknown status {other:?} (expected \"phishing\" or \"legitimate\")"
            ))),
        }
    }
}

/// One dataset row after feature extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledRow {
    pub url: String,
    pub values: Vec<f64>,
    pub label: Label,
}
