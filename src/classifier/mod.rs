//! Phishing URL classifier
//!
//! A gradient-boosted tree ensemble over the numeric feature vectors built
//! by [`crate::extract`]. Every model is bound to the [`FeatureSchema`] it
//! was trained on; vectors from any other schema are rejected.

pub mod gbdt_model;
pub mod metrics;
pub mod search;

pub use gbdt_model::{Hyperparameters, Prediction, Provenance, TrainedModel};
pub use metrics::{evaluate, EvaluationReport};
pub use search::{search, CandidateScore, SearchConfig, SearchOutcome};

use rayon::prelude::*;

use crate::error::{PhishError, PhishResult};
use crate::extract;
use crate::schema::FeatureSchema;

/// Classify one URL: validate the prefix, extract with `schema`, predict.
pub fn classify(model: &TrainedModel, schema: &FeatureSchema, url: &str) -> PhishResult<Prediction> {
    let vector = extract::extract(url, schema)?;
    model.predict(&vector)
}

/// Classify many URLs on the rayon pool. Results keep input order.
pub fn classify_batch<S: AsRef<str> + Sync>(
    model: &TrainedModel,
    schema: &FeatureSchema,
    urls: &[S],
) -> Vec<PhishResult<Prediction>> {
    urls.par_iter()
        .map(|u| classify(model, schema, u.as_ref()))
        .collect()
}

/// Whether an error is a bad URL rather than a model or schema problem.
pub fn is_invalid_input(err: &PhishError) -> bool {
    matches!(err, PhishError::InvalidInput { .. })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{build_feature_table, RawRecord};
    use crate::models::Label;

    fn model() -> (TrainedModel, FeatureSchema) {
        let schema = FeatureSchema::reference();
        let mut records = Vec::new();
        for i in 0..15 {
            records.push(RawRecord::new(format!("https://www.site{i}.com/"), "legitimate"));
            records.push(RawRecord::new(
                format!("http://192.168.{i}.1:8080/paypal/login/wp-admin"),
                "phishing",
            ));
        }
        let table = build_feature_table(&records, &schema);
        let hp = Hyperparameters {
            n_estimators: 10,
            max_depth: 3,
            learning_rate: 0.3,
        };
        (TrainedModel::fit(&table, Some(hp)).unwrap(), schema)
    }

    #[test]
    fn test_classify_rejects_non_http() {
        let (model, schema) = model();
        let err = classify(&model, &schema, "ftp://example.com").unwrap_err();
        assert!(is_invalid_input(&err));
    }

    #[test]
    fn test_classify_batch_keeps_order() {
        let (model, schema) = model();
        let urls = [
            "http://192.168.99.1:8080/paypal/login/wp-admin",
            "not a url",
            "https://www.site99.com/",
        ];
        let results = classify_batch(&model, &schema, &urls);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().label, Label::Phishing);
        assert!(results[1].is_err());
        assert_eq!(results[2].as_ref().unwrap().label, Label::Legitimate);
    }

    #[test]
    fn test_classify_with_other_schema_mismatches() {
        let (model, _) = model();
        let err = classify(&model, &FeatureSchema::full(), "http://a.com").unwrap_err();
        assert!(matches!(err, PhishError::SchemaMismatch { .. }));
    }
}
