//! Structural features: 0/1 signals read off URL syntax
//!
//! Each function is pure and tolerates empty input by returning 0.

use regex::Regex;
use std::net::IpAddr;
use std::sync::OnceLock;
use strsim::levenshtein;

use super::components::UrlComponents;
use super::lists::{
    BRANDS, REPORTED_HOSTS, REPORTED_IPS, SHORTENER_HOSTS, STANDARD_WEB_PORTS, SUSPICIOUS_TLDS,
};
use super::tokens::{split_words, TokenSet};
use crate::schema::{StructuralFeature, NUM_STRUCTURAL};

/// Brands shorter than this only match a token exactly.
const MIN_FUZZY_BRAND_LEN: usize = 5;

static ABNORMAL_SUBDOMAIN: OnceLock<Regex> = OnceLock::new();
static REPORTED_HOST_PATTERN: OnceLock<Regex> = OnceLock::new();

fn abnormal_subdomain_pattern() -> &'static Regex {
    ABNORMAL_SUBDOMAIN
        .get_or_init(|| Regex::new(r"(http[s]?://(w[w]?|\d))([w]?(\d|-))").expect("valid regex"))
}

fn reported_host_pattern() -> &'static Regex {
    REPORTED_HOST_PATTERN.get_or_init(|| {
        let alternation = REPORTED_HOSTS
            .iter()
            .map(|h| regex::escape(h))
            .collect::<Vec<_>>()
            .join("|");
        Regex::new(&alternation).expect("valid regex")
    })
}

/// Every structural slot for one URL, in catalog order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructuralFeatures {
    pub values: [u8; NUM_STRUCTURAL],
}

impl StructuralFeatures {
    pub fn compute(url: &str, c: &UrlComponents, tokens: &TokenSet) -> Self {
        let mut values = [0u8; NUM_STRUCTURAL];
        for feature in StructuralFeature::ALL {
            values[feature.index()] = match feature {
                StructuralFeature::Ip => ip(&c.hostname),
                StructuralFeature::HttpsToken => https_token(&c.scheme, url),
                StructuralFeature::Punycode => punycode(url),
                StructuralFeature::Port => port(c.port),
                StructuralFeature::TldInPath => tld_in_path(&c.suffix, &c.path),
                StructuralFeature::TldInSubdomain => tld_in_subdomain(&c.suffix, &c.subdomain),
                StructuralFeature::AbnormalSubdomain => abnormal_subdomain(url),
                StructuralFeature::PrefixSuffix => prefix_suffix(&c.registrable_domain),
                StructuralFeature::ShorteningService => shortening_service(&c.hostname),
                StructuralFeature::DomainInBrand => domain_in_brand(&c.registrable_domain),
                StructuralFeature::BrandInSubdomain => {
                    brand_in_words(&c.registrable_domain, &split_words(&c.subdomain))
                }
                StructuralFeature::BrandInPath => {
                    brand_in_words(&c.registrable_domain, &tokens.path_words)
                }
                StructuralFeature::SuspiciousTld => suspicious_tld(&c.suffix),
                StructuralFeature::StatisticalReport => statistical_report(url, &c.hostname),
            };
        }
        Self { values }
    }

    pub fn get(&self, feature: StructuralFeature) -> u8 {
        self.values[feature.index()]
    }
}

fn flag(b: bool) -> u8 {
    u8::from(b)
}

/// Hostname is an IP literal.
pub fn ip(hostname: &str) -> u8 {
    flag(hostname.parse::<IpAddr>().is_ok())
}

/// `https` appears after the leading `http://` / `https://` text. The raw
/// prefix is stripped, so URLs that fail to parse are handled the same way.
pub fn https_token(scheme: &str, url: &str) -> u8 {
    let lower = url.to_lowercase();
    let scheme_prefix = format!("{}://", scheme.to_lowercase());
    let rest = lower
        .strip_prefix("https://")
        .or_else(|| lower.strip_prefix("http://"))
        .or_else(|| lower.strip_prefix(scheme_prefix.as_str()))
        .unwrap_or(&lower);
    flag(rest.contains("https"))
}

pub fn punycode(url: &str) -> u8 {
    flag(url.to_lowercase().contains("xn--"))
}

/// Explicit port other than the standard web ports.
pub fn port(port: Option<u16>) -> u8 {
    flag(port.is_some_and(|p| !STANDARD_WEB_PORTS.contains(&p)))
}

/// The suffix labels (`co`, `uk`) occur as a contiguous run of words.
fn has_suffix_run(suffix: &str, text: &str) -> bool {
    let labels: Vec<String> = suffix
        .split('.')
        .filter(|l| !l.is_empty())
        .map(str::to_lowercase)
        .collect();
    if labels.is_empty() {
        return false;
    }
    split_words(text)
        .windows(labels.len())
        .any(|run| run == labels.as_slice())
}

pub fn tld_in_path(suffix: &str, path: &str) -> u8 {
    flag(has_suffix_run(suffix, path))
}

pub fn tld_in_subdomain(suffix: &str, subdomain: &str) -> u8 {
    flag(has_suffix_run(suffix, subdomain))
}

pub fn abnormal_subdomain(url: &str) -> u8 {
    flag(abnormal_subdomain_pattern().is_match(url))
}

/// Registrable label carries a dash (`paypal-secure`).
pub fn prefix_suffix(domain: &str) -> u8 {
    flag(domain.contains('-'))
}

pub fn shortening_service(hostname: &str) -> u8 {
    let host = hostname.to_lowercase();
    flag(!host.is_empty()
        && SHORTENER_HOSTS.iter().any(|s| {
            host == *s
                || host
                    .strip_suffix(s)
                    .is_some_and(|prefix| prefix.ends_with('.'))
        }))
}

fn near_brand(token: &str, brand: &str) -> bool {
    if brand.chars().count() < MIN_FUZZY_BRAND_LEN {
        token == brand
    } else {
        levenshtein(token, brand) <= 1
    }
}

/// Registrable label contains a brand without being it: either the whole
/// label is one edit away from a brand (`paypai`), or one of its
/// dash-separated parts is close to one (`paypal-secure`).
pub fn domain_in_brand(domain: &str) -> u8 {
    let domain = domain.to_lowercase();
    if domain.is_empty() || BRANDS.contains(&domain.as_str()) {
        return 0;
    }
    let typosquat = BRANDS
        .iter()
        .any(|b| b.chars().count() >= MIN_FUZZY_BRAND_LEN && levenshtein(&domain, b) == 1);
    let parts: Vec<&str> = domain.split('-').filter(|p| !p.is_empty()).collect();
    let in_part = parts.len() > 1
        && BRANDS
            .iter()
            .any(|b| parts.iter().any(|p| near_brand(p, b)));
    flag(typosquat || in_part)
}

/// Any path token is close to `brand`.
pub fn brand_in_path(brand: &str, path: &str) -> u8 {
    let brand = brand.to_lowercase();
    flag(!brand.is_empty() && split_words(path).iter().any(|w| near_brand(w, &brand)))
}

/// Any word is close to a brand that is not the site's own label.
fn brand_in_words(domain: &str, words: &[String]) -> u8 {
    let domain = domain.to_lowercase();
    flag(BRANDS
        .iter()
        .filter(|b| **b != domain)
        .any(|b| words.iter().any(|w| near_brand(w, b))))
}

pub fn suspicious_tld(suffix: &str) -> u8 {
    flag(!suffix.is_empty() && SUSPICIOUS_TLDS.contains(&suffix))
}

/// Matches a reported free-hosting domain, or the host is a reported IP.
/// No DNS resolution is done.
pub fn statistical_report(url: &str, hostname: &str) -> u8 {
    flag(reported_host_pattern().is_match(url) || REPORTED_IPS.contains(&hostname))
}
