//! URL feature extraction
//!
//! Turns a raw URL into an ordered numeric vector for a [`FeatureSchema`]:
//!
//! 1. [`components::decompose`] splits the URL (public-suffix aware)
//! 2. [`tokens::tokenize`] splits host and path into words
//! 3. [`structural`] and [`statistical`] compute the full catalog
//! 4. the schema projects the catalog into its own column order
//!
//! Extraction is pure and deterministic, so it is safe to call from any
//! number of threads.

pub mod components;
pub mod lists;
pub mod statistical;
pub mod structural;
pub mod tokens;

use serde::Serialize;

use crate::error::{PhishError, PhishResult};
use crate::schema::{FeatureSchema, FeatureSlot, StatisticalFeature, StructuralFeature};

pub use components::{decompose, UrlComponents};
pub use statistical::StatisticalFeatures;
pub use structural::StructuralFeatures;
pub use tokens::{tokenize, TokenSet};

/// Numeric features of one URL, tagged with the schema that produced them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureVector {
    fingerprint: String,
    values: Vec<f64>,
}

impl FeatureVector {
    pub(crate) fn from_parts(fingerprint: String, values: Vec<f64>) -> Self {
        Self {
            fingerprint,
            values,
        }
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_values(self) -> Vec<f64> {
        self.values
    }
}

/// One catalog slot with its value, for diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedFeature {
    pub name: &'static str,
    pub value: f64,
}

/// The full catalog for one URL.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureSet {
    pub structural: StructuralFeatures,
    pub statistical: StatisticalFeatures,
}

impl FeatureSet {
    /// Compute every catalog slot. The caller has validated the prefix.
    pub fn compute(url: &str) -> Self {
        let c = decompose(url);
        let t = tokenize(&c.subdomain, &c.registrable_domain, &c.path);
        Self {
            structural: StructuralFeatures::compute(url, &c, &t),
            statistical: StatisticalFeatures::compute(url, &c, &t),
        }
    }

    pub fn value(&self, slot: FeatureSlot) -> f64 {
        match slot {
            FeatureSlot::Structural(f) => f64::from(self.structural.get(f)),
            FeatureSlot::Statistical(f) => self.statistical.get(f),
        }
    }

    /// Values in `schema` column order.
    pub fn project(&self, schema: &FeatureSchema) -> FeatureVector {
        FeatureVector {
            fingerprint: schema.fingerprint(),
            values: schema.slots().map(|s| self.value(s)).collect(),
        }
    }
}

/// True when `url` starts with `http://` or `https://`, ignoring case.
pub fn has_http_prefix(url: &str) -> bool {
    let head: String = url.chars().take(8).collect::<String>().to_ascii_lowercase();
    head.starts_with("http://") || head.starts_with("https://")
}

fn validate(url: &str) -> PhishResult<()> {
    if has_http_prefix(url) {
        Ok(())
    } else {
        Err(PhishError::InvalidInput {
            url: url.to_string(),
        })
    }
}

/// Extract the feature vector of `url` for `schema`.
pub fn extract(url: &str, schema: &FeatureSchema) -> PhishResult<FeatureVector> {
    validate(url)?;
    Ok(FeatureSet::compute(url).project(schema))
}

/// Build a schema from two name lists, then extract.
pub fn assemble<S: AsRef<str>>(
    url: &str,
    structural_names: &[S],
    statistical_names: &[S],
) -> PhishResult<FeatureVector> {
    let schema = FeatureSchema::from_names(structural_names, statistical_names)?;
    extract(url, &schema)
}

/// Every catalog slot with its name, structural slots first.
pub fn named(url: &str) -> PhishResult<Vec<NamedFeature>> {
    validate(url)?;
    let set = FeatureSet::compute(url);
    let structural = StructuralFeature::ALL.iter().map(|&f| NamedFeature {
        name: f.name(),
        value: f64::from(set.structural.get(f)),
    });
    let statistical = StatisticalFeature::ALL.iter().map(|&f| NamedFeature {
        name: f.name(),
        value: set.statistical.get(f),
    });
    Ok(structural.chain(statistical).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashMap;

    #[test]
    fn test_prefix_check() {
        assert!(has_http_prefix("http://a.com"));
        assert!(has_http_prefix("HTTPS://a.com"));
        assert!(!has_http_prefix("ftp://a.com"));
        assert!(!has_http_prefix("www.a.com"));
        assert!(!has_http_prefix(""));
        assert!(!has_http_prefix("httpx://a.com"));
    }

    #[test]
    fn test_extract_rejects_non_http() {
        let err = extract("ftp://example.com", &FeatureSchema::reference()).unwrap_err();
        assert!(matches!(err, PhishError::InvalidInput { ref url } if url == "ftp://example.com"));
    }

    #[test]
    fn test_extract_is_deterministic() {
        let schema = FeatureSchema::full();
        let url = "http://login.paypa1.com.evil.tk/wp-admin/secure?id=1234";
        let a = extract(url, &schema).unwrap();
        let b = extract(url, &schema).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), schema.len());
        assert_eq!(a.fingerprint(), schema.fingerprint());
        assert!(a.values().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_assemble_follows_name_order() {
        // ip = 1, https_token = 0, nb_dots = 3
        let url = "http://192.168.1.1:8080/paypal/login";
        let a = assemble(url, &["ip", "https_token"], &["nb_dots", "length_url"]).unwrap();
        let b = assemble(url, &["https_token", "ip"], &["length_url", "nb_dots"]).unwrap();

        assert_eq!(a.values(), [1.0, 0.0, 3.0, url.len() as f64]);
        assert_eq!(b.values(), [0.0, 1.0, url.len() as f64, 3.0]);
        assert_ne!(a.fingerprint(), b.fingerprint());
    }

    fn catalog_names() -> (Vec<&'static str>, Vec<&'static str>) {
        (
            StructuralFeature::ALL.iter().map(|f| f.name()).collect(),
            StatisticalFeature::ALL.iter().map(|f| f.name()).collect(),
        )
    }

    /// Assemble with the given order and compare every column with the
    /// catalog value of the same name.
    fn assert_columns_match_names(url: &str, structural: &[&str], statistical: &[&str]) -> Vec<f64> {
        let vector = assemble(url, structural, statistical).unwrap();
        let by_name: HashMap<&str, f64> = named(url)
            .unwrap()
            .into_iter()
            .map(|f| (f.name, f.value))
            .collect();
        let order: Vec<&str> = structural.iter().chain(statistical).copied().collect();
        assert_eq!(vector.len(), order.len());
        for (name, value) in order.iter().zip(vector.values()) {
            assert_eq!(*value, by_name[name], "column {name}");
        }
        vector.into_values()
    }

    #[test]
    fn test_assemble_full_catalog_permutations() {
        let url = "http://paypa1-secure.login.example.co.uk:8080/wp-admin/https/index.php?id=123&x=y";
        let (mut structural, mut statistical) = catalog_names();
        let forward = assert_columns_match_names(url, &structural, &statistical);

        structural.reverse();
        statistical.reverse();
        let reversed = assert_columns_match_names(url, &structural, &statistical);
        assert_ne!(forward, reversed);

        for seed in 0..8 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            structural.shuffle(&mut rng);
            statistical.shuffle(&mut rng);
            let k = (seed as usize * 3) % structural.len() + 1;
            let j = (seed as usize * 7) % statistical.len() + 1;
            assert_columns_match_names(url, &structural, &statistical);
            assert_columns_match_names(url, &structural[..k], &statistical[..j]);
        }
    }

    #[test]
    fn test_assemble_unknown_name() {
        let err = assemble("http://a.com", &["ip"], &["not_a_feature"]).unwrap_err();
        assert!(matches!(err, PhishError::UnknownFeature(_)));
    }

    #[test]
    fn test_named_covers_catalog() {
        let all = named("https://www.example.com/").unwrap();
        assert_eq!(all.len(), FeatureSchema::full().len());
        assert_eq!(all[0].name, "ip");
        assert_eq!(all.last().map(|f| f.name), Some("phish_hints"));
    }

    #[test]
    fn test_malformed_host_is_tolerated() {
        let v = extract("http://", &FeatureSchema::reference()).unwrap();
        assert!(v.values().iter().all(|x| x.is_finite()));
    }
}
