//! Feature schema registry
//!
//! The catalog of every feature slot phishnet can compute, and the ordered
//! selections of it that models are trained against. A [`FeatureSchema`]
//! is defined once and passed explicitly to dataset construction and to
//! inference, so both sides always agree on column order.
//!
//! Catalog layout:
//!   14 structural slots (0/1 signals from URL syntax)
//!   38 statistical slots (counts, ratios, token statistics)

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use xxhash_rust::xxh3::xxh3_64;

use crate::error::{PhishError, PhishResult};

/// Bumped whenever a feature's computation changes meaning.
pub const SCHEMA_VERSION: u32 = 1;

/// Number of structural slots in the catalog.
pub const NUM_STRUCTURAL: usize = 14;

/// Number of statistical slots in the catalog.
pub const NUM_STATISTICAL: usize = 38;

/// Boolean signals derived from URL syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructuralFeature {
    Ip,
    HttpsToken,
    Punycode,
    Port,
    TldInPath,
    TldInSubdomain,
    AbnormalSubdomain,
    PrefixSuffix,
    ShorteningService,
    DomainInBrand,
    BrandInSubdomain,
    BrandInPath,
    SuspiciousTld,
    StatisticalReport,
}

impl StructuralFeature {
    /// Catalog order.
    pub const ALL: [StructuralFeature; NUM_STRUCTURAL] = [
        Self::Ip,
        Self::HttpsToken,
        Self::Punycode,
        Self::Port,
        Self::TldInPath,
        Self::TldInSubdomain,
        Self::AbnormalSubdomain,
        Self::PrefixSuffix,
        Self::ShorteningService,
        Self::DomainInBrand,
        Self::BrandInSubdomain,
        Self::BrandInPath,
        Self::SuspiciousTld,
        Self::StatisticalReport,
    ];

    /// Column name used in dataset CSVs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ip => "ip",
            Self::HttpsToken => "https_token",
            Self::Punycode => "punycode",
            Self::Port => "port",
            Self::TldInPath => "tld_in_path",
            Self::TldInSubdomain => "tld_in_subdomain",
            Self::AbnormalSubdomain => "abnormal_subdomain",
            Self::PrefixSuffix => "prefix_suffix",
            Self::ShorteningService => "shortening_service",
            Self::DomainInBrand => "domain_in_brand",
            Self::BrandInSubdomain => "brand_in_subdomain",
            Self::BrandInPath => "brand_in_path",
            Self::SuspiciousTld => "suspicious_tld",
            Self::StatisticalReport => "statistical_report",
        }
    }

    /// Position in the catalog (and in `StructuralFeatures::values`).
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.name() == name)
    }
}

/// Numeric signals derived from character counts and tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatisticalFeature {
    LengthUrl,
    LengthHostname,
    NbDots,
    NbHyphens,
    NbAt,
    NbQm,
    NbAnd,
    NbOr,
    NbEq,
    NbUnderscore,
    NbTilde,
    NbPercent,
    NbSlash,
    NbStar,
    NbColon,
    NbComma,
    NbSemicolon,
    NbDollar,
    NbSpace,
    NbWww,
    NbCom,
    NbDslash,
    HttpInPath,
    RatioDigitsUrl,
    RatioDigitsHost,
    NbSubdomains,
    LengthWordsRaw,
    CharRepeat,
    ShortestWordsRaw,
    ShortestWordHost,
    ShortestWordPath,
    LongestWordsRaw,
    LongestWordHost,
    LongestWordPath,
    AvgWordsRaw,
    AvgWordHost,
    AvgWordPath,
    PhishHints,
}

impl StatisticalFeature {
    /// Catalog order.
    pub const ALL: [StatisticalFeature; NUM_STATISTICAL] = [
        Self::LengthUrl,
        Self::LengthHostname,
        Self::NbDots,
        Self::NbHyphens,
        Self::NbAt,
        Self::NbQm,
        Self::NbAnd,
        Self::NbOr,
        Self::NbEq,
        Self::NbUnderscore,
        Self::NbTilde,
        Self::NbPercent,
        Self::NbSlash,
        Self::NbStar,
        Self::NbColon,
        Self::NbComma,
        Self::NbSemicolon,
        Self::NbDollar,
        Self::NbSpace,
        Self::NbWww,
        Self::NbCom,
        Self::NbDslash,
        Self::HttpInPath,
        Self::RatioDigitsUrl,
        Self::RatioDigitsHost,
        Self::NbSubdomains,
        Self::LengthWordsRaw,
        Self::CharRepeat,
        Self::ShortestWordsRaw,
        Self::ShortestWordHost,
        Self::ShortestWordPath,
        Self::LongestWordsRaw,
        Self::LongestWordHost,
        Self::LongestWordPath,
        Self::AvgWordsRaw,
        Self::AvgWordHost,
        Self::AvgWordPath,
        Self::PhishHints,
    ];

    /// Column name used in dataset CSVs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::LengthUrl => "length_url",
            Self::LengthHostname => "length_hostname",
            Self::NbDots => "nb_dots",
            Self::NbHyphens => "nb_hyphens",
            Self::NbAt => "nb_at",
            Self::NbQm => "nb_qm",
            Self::NbAnd => "nb_and",
            Self::NbOr => "nb_or",
            Self::NbEq => "nb_eq",
            Self::NbUnderscore => "nb_underscore",
            Self::NbTilde => "nb_tilde",
            Self::NbPercent => "nb_percent",
            Self::NbSlash => "nb_slash",
            Self::NbStar => "nb_star",
            Self::NbColon => "nb_colon",
            Self::NbComma => "nb_comma",
            Self::NbSemicolon => "nb_semicolon",
            Self::NbDollar => "nb_dollar",
            Self::NbSpace => "nb_space",
            Self::NbWww => "nb_www",
            Self::NbCom => "nb_com",
            Self::NbDslash => "nb_dslash",
            Self::HttpInPath => "http_in_path",
            Self::RatioDigitsUrl => "ratio_digits_url",
            Self::RatioDigitsHost => "ratio_digits_host",
            Self::NbSubdomains => "nb_subdomains",
            Self::LengthWordsRaw => "length_words_raw",
            Self::CharRepeat => "char_repeat",
            Self::ShortestWordsRaw => "shortest_words_raw",
            Self::ShortestWordHost => "shortest_word_host",
            Self::ShortestWordPath => "shortest_word_path",
            Self::LongestWordsRaw => "longest_words_raw",
            Self::LongestWordHost => "longest_word_host",
            Self::LongestWordPath => "longest_word_path",
            Self::AvgWordsRaw => "avg_words_raw",
            Self::AvgWordHost => "avg_word_host",
            Self::AvgWordPath => "avg_word_path",
            Self::PhishHints => "phish_hints",
        }
    }

    /// Position in the catalog (and in `StatisticalFeatures::values`).
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.name() == name)
    }
}

/// One column of a schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureSlot {
    Structural(StructuralFeature),
    Statistical(StatisticalFeature),
}

impl FeatureSlot {
    pub fn name(&self) -> &'static str {
        match self {
            FeatureSlot::Structural(f) => f.name(),
            FeatureSlot::Statistical(f) => f.name(),
        }
    }
}

/// Ordered selection of catalog slots a model is trained against.
///
/// Columns are the structural selection followed by the statistical
/// selection, each in the order given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSchema")]
pub struct FeatureSchema {
    version: u32,
    structural: Vec<StructuralFeature>,
    statistical: Vec<StatisticalFeature>,
}

/// Unchecked serde form; the stored version is kept so callers can reject
/// schemas from other versions.
#[derive(Deserialize)]
struct RawSchema {
    version: u32,
    structural: Vec<StructuralFeature>,
    statistical: Vec<StatisticalFeature>,
}

impl TryFrom<RawSchema> for FeatureSchema {
    type Error = PhishError;

    fn try_from(raw: RawSchema) -> PhishResult<Self> {
        check_unique(&raw.structural, &raw.statistical)?;
        Ok(Self {
            version: raw.version,
            structural: raw.structural,
            statistical: raw.statistical,
        })
    }
}

fn check_unique(
    structural: &[StructuralFeature],
    statistical: &[StatisticalFeature],
) -> PhishResult<()> {
    let mut seen = HashSet::new();
    for name in structural
        .iter()
        .map(|f| f.name())
        .chain(statistical.iter().map(|f| f.name()))
    {
        if !seen.insert(name) {
            return Err(PhishError::DuplicateFeature(name.to_string()));
        }
    }
    Ok(())
}

impl FeatureSchema {
    /// Build a schema, rejecting duplicate slots.
    pub fn new(
        structural: Vec<StructuralFeature>,
        statistical: Vec<StatisticalFeature>,
    ) -> PhishResult<Self> {
        check_unique(&structural, &statistical)?;
        Ok(Self {
            version: SCHEMA_VERSION,
            structural,
            statistical,
        })
    }

    /// Build a schema from two lists of column names.
    pub fn from_names<S: AsRef<str>>(structural: &[S], statistical: &[S]) -> PhishResult<Self> {
        let structural = structural
            .iter()
            .map(|n| {
                let n = n.as_ref().trim();
                StructuralFeature::from_name(n)
                    .ok_or_else(|| PhishError::UnknownFeature(n.to_string()))
            })
            .collect::<PhishResult<Vec<_>>>()?;
        let statistical = statistical
            .iter()
            .map(|n| {
                let n = n.as_ref().trim();
                StatisticalFeature::from_name(n)
                    .ok_or_else(|| PhishError::UnknownFeature(n.to_string()))
            })
            .collect::<PhishResult<Vec<_>>>()?;
        Self::new(structural, statistical)
    }

    /// Every catalog slot, in catalog order.
    pub fn full() -> Self {
        Self {
            version: SCHEMA_VERSION,
            structural: StructuralFeature::ALL.to_vec(),
            statistical: StatisticalFeature::ALL.to_vec(),
        }
    }

    /// The selection the shipped reference model is trained on.
    pub fn reference() -> Self {
        use StatisticalFeature::*;
        Self {
            version: SCHEMA_VERSION,
            structural: StructuralFeature::ALL.to_vec(),
            statistical: vec![
                LengthUrl,
                NbDots,
                NbHyphens,
                NbQm,
                NbAnd,
                NbEq,
                NbWww,
                RatioDigitsUrl,
                CharRepeat,
                ShortestWordHost,
                LongestWordsRaw,
                LongestWordPath,
                AvgWordsRaw,
                AvgWordHost,
                AvgWordPath,
                PhishHints,
            ],
        }
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn structural(&self) -> &[StructuralFeature] {
        &self.structural
    }

    pub fn statistical(&self) -> &[StatisticalFeature] {
        &self.statistical
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.structural.len() + self.statistical.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Columns in output order.
    pub fn slots(&self) -> impl Iterator<Item = FeatureSlot> + '_ {
        self.structural
            .iter()
            .map(|&f| FeatureSlot::Structural(f))
            .chain(self.statistical.iter().map(|&f| FeatureSlot::Statistical(f)))
    }

    /// Column names in output order.
    pub fn names(&self) -> Vec<&'static str> {
        self.slots().map(|s| s.name()).collect()
    }

    /// Stable identifier of version + column order.
    pub fn fingerprint(&self) -> String {
        let mut buf = format!("v{}", self.version);
        for name in self.names() {
            buf.push('\n');
            buf.push_str(name);
        }
        format!("{:016x}", xxh3_64(buf.as_bytes()))
    }
}

impl Default for FeatureSchema {
    fn default() -> Self {
        Self::reference()
    }
}
