//! Statistical features: character counts, ratios and word statistics

use super::components::UrlComponents;
use super::lists::PHISH_HINTS;
use super::tokens::TokenSet;
use crate::schema::{StatisticalFeature, NUM_STATISTICAL};

/// Every statistical slot for one URL, in catalog order. All values are finite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatisticalFeatures {
    pub values: [f64; NUM_STATISTICAL],
}

impl StatisticalFeatures {
    pub fn compute(url: &str, c: &UrlComponents, tokens: &TokenSet) -> Self {
        use StatisticalFeature::*;

        let mut values = [0.0f64; NUM_STATISTICAL];
        for feature in StatisticalFeature::ALL {
            let v = match feature {
                LengthUrl => url.chars().count() as f64,
                LengthHostname => c.hostname.chars().count() as f64,
                NbDots => count_char(url, '.'),
                NbHyphens => count_char(url, '-'),
                NbAt => count_char(url, '@'),
                NbQm => count_char(url, '?'),
                NbAnd => count_char(url, '&'),
                NbOr => count_char(url, '|'),
                NbEq => count_char(url, '='),
                NbUnderscore => count_char(url, '_'),
                NbTilde => count_char(url, '~'),
                NbPercent => count_char(url, '%'),
                NbSlash => count_char(url, '/'),
                NbStar => count_char(url, '*'),
                NbColon => count_char(url, ':'),
                NbComma => count_char(url, ','),
                NbSemicolon => count_char(url, ';'),
                NbDollar => count_char(url, '$'),
                NbSpace => nb_space(url),
                NbWww => words_containing(&tokens.raw_words, "www"),
                NbCom => words_containing(&tokens.raw_words, "com"),
                NbDslash => nb_dslash(url),
                HttpInPath => f64::from(u8::from(c.path.to_lowercase().contains("http"))),
                RatioDigitsUrl => ratio_digits(url),
                RatioDigitsHost => ratio_digits(&c.hostname),
                NbSubdomains => nb_subdomains(&c.hostname),
                LengthWordsRaw => tokens.raw_words.len() as f64,
                CharRepeat => char_repeat(&tokens.raw_words),
                ShortestWordsRaw => WordStats::of(&tokens.raw_words).shortest,
                ShortestWordHost => WordStats::of(&tokens.host_words).shortest,
                ShortestWordPath => WordStats::of(&tokens.path_words).shortest,
                LongestWordsRaw => WordStats::of(&tokens.raw_words).longest,
                LongestWordHost => WordStats::of(&tokens.host_words).longest,
                LongestWordPath => WordStats::of(&tokens.path_words).longest,
                AvgWordsRaw => WordStats::of(&tokens.raw_words).average,
                AvgWordHost => WordStats::of(&tokens.host_words).average,
                AvgWordPath => WordStats::of(&tokens.path_words).average,
                PhishHints => phish_hints(url),
            };
            values[feature.index()] = v;
        }
        Self { values }
    }

    pub fn get(&self, feature: StatisticalFeature) -> f64 {
        self.values[feature.index()]
    }
}

fn count_char(s: &str, c: char) -> f64 {
    s.chars().filter(|&x| x == c).count() as f64
}

/// Literal spaces plus `%20` escapes.
pub fn nb_space(url: &str) -> f64 {
    (url.matches(' ').count() + url.matches("%20").count()) as f64
}

fn words_containing(words: &[String], needle: &str) -> f64 {
    words.iter().filter(|w| w.contains(needle)).count() as f64
}

/// `//` occurrences past the scheme separator.
pub fn nb_dslash(url: &str) -> f64 {
    url.match_indices("//").filter(|(i, _)| *i > 6).count() as f64
}

/// Share of characters that are ASCII digits; 0 for empty input.
pub fn ratio_digits(s: &str) -> f64 {
    let total = s.chars().count();
    if total == 0 {
        return 0.0;
    }
    let digits = s.chars().filter(|c| c.is_ascii_digit()).count();
    digits as f64 / total as f64
}

pub fn nb_subdomains(hostname: &str) -> f64 {
    hostname.matches('.').count().saturating_sub(1) as f64
}

/// Windows of length 2..=5 inside each word made of a single repeated char.
pub fn char_repeat(words: &[String]) -> f64 {
    let mut total = 0usize;
    for word in words {
        let chars: Vec<char> = word.chars().collect();
        for width in 2..=5 {
            if chars.len() < width {
                break;
            }
            total += chars
                .windows(width)
                .filter(|w| w.iter().all(|c| *c == w[0]))
                .count();
        }
    }
    total as f64
}

/// Total occurrences of every hint keyword in the lowercased URL.
pub fn phish_hints(url: &str) -> f64 {
    let lower = url.to_lowercase();
    PHISH_HINTS
        .iter()
        .map(|h| lower.matches(h).count())
        .sum::<usize>() as f64
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct WordStats {
    shortest: f64,
    longest: f64,
    average: f64,
}

impl WordStats {
    fn of(words: &[String]) -> Self {
        if words.is_empty() {
            return Self::default();
        }
        let lens: Vec<usize> = words.iter().map(|w| w.chars().count()).collect();
        let sum: usize = lens.iter().sum();
        Self {
            shortest: lens.iter().copied().min().unwrap_or(0) as f64,
            longest: lens.iter().copied().max().unwrap_or(0) as f64,
            average: sum as f64 / lens.len() as f64,
        }
    }
}
