//! Engine configuration: artifact paths, the rule table, and the lexicon of
//! high-risk TLDs, keywords, and impersonated brand names.
//!
//! Rules and lexicon are data, loaded once at startup and immutable for the
//! process lifetime. The built-in defaults carry the tuned production sets;
//! deployments override them with a JSON file.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::rules::{Predicate, RuleDef};

/// Paths and the threshold an [`crate::engine::Engine`] is built from.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Path to the frozen classifier artifact (JSON tree ensemble).
    pub model_path: PathBuf,
    /// Path to the rule configuration; `None` uses the built-in defaults.
    pub rules_path: Option<PathBuf>,
    /// Probability cutoff applied to the model score.
    pub threshold: f32,
}

/// Word lists shared by the rule engine and the feature extractor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lexicon {
    /// TLDs (without the leading dot) treated as high risk.
    pub high_risk_tlds: Vec<String>,
    /// Substrings whose presence in a URL counts as a risk signal.
    pub high_risk_keywords: Vec<String>,
    /// Brand names commonly impersonated by lookalike domains.
    pub brands: Vec<String>,
}

impl Lexicon {
    pub fn has_suspicious_tld(&self, tld: &str) -> bool {
        self.high_risk_tlds
            .iter()
            .any(|t| t.trim_start_matches('.').eq_ignore_ascii_case(tld))
    }

    /// Configured keywords contained in `url`, case-insensitive. Each
    /// keyword counts once no matter how often it appears.
    pub fn keyword_hits<'a>(&'a self, url: &str) -> Vec<&'a str> {
        let lowered = url.to_lowercase();
        self.high_risk_keywords
            .iter()
            .filter(|k| !k.is_empty() && lowered.contains(&k.to_lowercase()))
            .map(String::as_str)
            .collect()
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        let list = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        Self {
            high_risk_tlds: list(&["tk", "ru", "biz", "cf", "xyz"]),
            high_risk_keywords: list(&[
                "login", "verify", "signin", "update", "secure", "account", "bank", "offer",
                "free", "win", "bonus", "gift", "prize", "lottery", "reward", "deal",
            ]),
            brands: list(&[
                "paypal",
                "google",
                "amazon",
                "apple",
                "microsoft",
                "netflix",
                "facebook",
                "instagram",
            ]),
        }
    }
}

/// Ordered rule table plus the lexicon its predicates consult.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleConfig {
    pub rules: Vec<RuleDef>,
    #[serde(default)]
    pub lexicon: Lexicon,
}

impl RuleConfig {
    /// Load a rule configuration from a JSON file.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path).map_err(|source| ConfigError::RulesRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self =
            serde_json::from_str(&data).map_err(|source| ConfigError::RulesParse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject rule tables that would be ambiguous to report on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for rule in &self.rules {
            if rule.id.trim().is_empty() {
                return Err(ConfigError::RulesInvalid(
                    "rule with an empty id".to_string(),
                ));
            }
            if !seen.insert(rule.id.as_str()) {
                return Err(ConfigError::RulesInvalid(format!(
                    "duplicate rule id {:?}",
                    rule.id
                )));
            }
        }
        Ok(())
    }
}

impl Default for RuleConfig {
    fn default() -> Self {
        let rule = |id: &str, predicate: Predicate, reason: &str| RuleDef {
            id: id.to_string(),
            predicate,
            reason: reason.to_string(),
        };
        // Priority order is significant: evaluation stops at the first hit.
        Self {
            rules: vec![
                rule(
                    "ip-literal-host",
                    Predicate::IpLiteralHost,
                    "IP address used as host",
                ),
                rule(
                    "high-risk-tld",
                    Predicate::HighRiskTld,
                    "high-risk top-level domain .{}",
                ),
                rule(
                    "excessive-subdomains",
                    Predicate::ExcessiveSubdomains { max_depth: 3 },
                    "excessive subdomain nesting ({} levels)",
                ),
                rule(
                    "brand-lookalike",
                    Predicate::BrandLookalike {
                        max_edit_distance: 1,
                    },
                    "domain imitates the {} brand",
                ),
                rule(
                    "keyword-cluster",
                    Predicate::KeywordCluster { min_hits: 2 },
                    "multiple high-risk keywords ({})",
                ),
            ],
            lexicon: Lexicon::default(),
        }
    }
}
