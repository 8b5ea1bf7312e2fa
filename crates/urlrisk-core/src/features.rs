//! Feature extraction.
//!
//! Each URL string → fixed vector of 15 signals, in this order:
//! - Lexical: length, digit ratio, special-char ratio, `@` presence,
//!   hyphen count, dot count
//! - Structural: scheme presence, https, host parse failure, IP-literal
//!   host, subdomain depth, path depth, query-parameter count
//! - Semantic: high-risk TLD membership, high-risk keyword hits
//!
//! Extraction is pure, deterministic, and total: malformed input (the empty
//! string included) produces a vector, never an error. The field order is a
//! contract with the classifier artifact and must not be reordered.

use ndarray::Array1;

use crate::config::Lexicon;
use crate::parts::UrlParts;

/// Characters counted toward the special-character ratio.
pub const SPECIAL_CHARS: [char; 9] = ['$', '%', '&', '?', '-', '_', '!', '=', '@'];

/// Named signals extracted from a single URL.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    pub length: usize,
    pub digit_ratio: f32,
    pub special_char_ratio: f32,
    pub has_at_symbol: bool,
    pub hyphen_count: usize,
    pub dot_count: usize,
    pub has_scheme: bool,
    pub is_https: bool,
    pub host_parse_failed: bool,
    pub has_ip_host: bool,
    pub subdomain_depth: usize,
    pub path_depth: usize,
    pub query_param_count: usize,
    pub suspicious_tld: bool,
    pub risk_keyword_hits: usize,
}

impl FeatureVector {
    pub const LEN: usize = 15;

    /// Field names in vector order. Classifier artifacts declare the same
    /// list; any divergence is rejected at load time.
    pub const NAMES: [&'static str; Self::LEN] = [
        "length",
        "digit_ratio",
        "special_char_ratio",
        "has_at_symbol",
        "hyphen_count",
        "dot_count",
        "has_scheme",
        "is_https",
        "host_parse_failed",
        "has_ip_host",
        "subdomain_depth",
        "path_depth",
        "query_param_count",
        "suspicious_tld",
        "risk_keyword_hits",
    ];

    /// Numeric view in the contractual order of [`Self::NAMES`].
    pub fn to_array(&self) -> Array1<f32> {
        let flag = |b: bool| if b { 1.0 } else { 0.0 };
        Array1::from(vec![
            self.length as f32,
            self.digit_ratio,
            self.special_char_ratio,
            flag(self.has_at_symbol),
            self.hyphen_count as f32,
            self.dot_count as f32,
            flag(self.has_scheme),
            flag(self.is_https),
            flag(self.host_parse_failed),
            flag(self.has_ip_host),
            self.subdomain_depth as f32,
            self.path_depth as f32,
            self.query_param_count as f32,
            flag(self.suspicious_tld),
            self.risk_keyword_hits as f32,
        ])
    }
}

/// Extract the feature vector for `url`.
pub fn extract_features(url: &str, lexicon: &Lexicon) -> FeatureVector {
    let url = url.trim();
    let parts = UrlParts::parse(url);

    let length = url.chars().count();
    let digit_count = url.chars().filter(char::is_ascii_digit).count();
    let special_count = url.chars().filter(|c| SPECIAL_CHARS.contains(c)).count();
    let ratio = |count: usize| {
        if length == 0 {
            0.0
        } else {
            count as f32 / length as f32
        }
    };

    let suspicious_tld = parts
        .tld()
        .map(|tld| lexicon.has_suspicious_tld(tld))
        .unwrap_or(false);

    FeatureVector {
        length,
        digit_ratio: ratio(digit_count),
        special_char_ratio: ratio(special_count),
        has_at_symbol: url.contains('@'),
        hyphen_count: url.matches('-').count(),
        dot_count: url.matches('.').count(),
        has_scheme: parts.has_scheme,
        is_https: parts.scheme.as_deref() == Some("https"),
        host_parse_failed: parts.parse_failed,
        has_ip_host: parts.is_ip_host,
        subdomain_depth: parts.subdomain_depth(),
        path_depth: parts.path_depth(),
        query_param_count: parts.query_param_count(),
        suspicious_tld,
        risk_keyword_hits: lexicon.keyword_hits(url).len(),
    }
}
