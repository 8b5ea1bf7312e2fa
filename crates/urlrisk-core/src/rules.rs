//! Explicit heuristic rules.
//!
//! Rules are configuration data: an ordered table of named predicates, each
//! either firing with a reason or abstaining. Evaluation is strictly in
//! table order and stops at the first hit — when two rules would both match,
//! the earlier one is the verdict. A fired rule is authoritative; the
//! statistical path is only consulted when every rule abstains.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Lexicon;
use crate::parts::UrlParts;

/// Which rule fired, and the rendered reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleHit {
    pub rule_id: String,
    pub reason: String,
}

/// One entry of the rule table. `reason` is a template; a `{}` slot, when
/// present, receives the predicate's detail (matched TLD, brand, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleDef {
    pub id: String,
    pub predicate: Predicate,
    pub reason: String,
}

/// Scam indicators a rule can test for.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Predicate {
    /// Host is a raw IPv4/IPv6 literal instead of a domain name.
    IpLiteralHost,
    /// Final host label is in the configured high-risk TLD set.
    HighRiskTld,
    /// Subdomain depth strictly greater than `max_depth`.
    ExcessiveSubdomains { max_depth: usize },
    /// A host label (or hyphen-separated token of one) is a non-exact
    /// substring or edit-distance match of a configured brand name.
    BrandLookalike { max_edit_distance: usize },
    /// At least `min_hits` distinct configured keywords appear in the URL.
    KeywordCluster { min_hits: usize },
}

impl Predicate {
    /// `Some(detail)` when the indicator is present, `None` to abstain.
    fn check(&self, url: &str, parts: &UrlParts, lexicon: &Lexicon) -> Option<String> {
        match self {
            Predicate::IpLiteralHost => {
                if parts.is_ip_host {
                    parts.host.clone()
                } else {
                    None
                }
            }
            Predicate::HighRiskTld => parts
                .tld()
                .filter(|tld| lexicon.has_suspicious_tld(tld))
                .map(str::to_string),
            Predicate::ExcessiveSubdomains { max_depth } => {
                let depth = parts.subdomain_depth();
                if depth > *max_depth {
                    Some(depth.to_string())
                } else {
                    None
                }
            }
            Predicate::BrandLookalike { max_edit_distance } => {
                brand_lookalike(parts, lexicon, *max_edit_distance)
            }
            Predicate::KeywordCluster { min_hits } => {
                let hits = lexicon.keyword_hits(url);
                if hits.len() >= *min_hits {
                    Some(hits.join(", "))
                } else {
                    None
                }
            }
        }
    }
}

/// Find a configured brand the host imitates. An exact label match is the
/// brand itself and never fires; only lookalikes do.
fn brand_lookalike(parts: &UrlParts, lexicon: &Lexicon, max_edit_distance: usize) -> Option<String> {
    for label in parts.host_labels() {
        for brand in &lexicon.brands {
            let brand_lower = brand.to_lowercase();
            if label != brand_lower && label.contains(&brand_lower) {
                return Some(brand.clone());
            }
            for token in label.split('-') {
                if token.is_empty() || token == brand_lower {
                    continue;
                }
                if strsim::levenshtein(token, &brand_lower) <= max_edit_distance {
                    return Some(brand.clone());
                }
            }
        }
    }
    None
}

fn render_reason(template: &str, detail: &str) -> String {
    if template.contains("{}") {
        template.replacen("{}", detail, 1)
    } else {
        template.to_string()
    }
}

/// The ordered rule table.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<RuleDef>,
}

impl RuleSet {
    pub fn new(rules: Vec<RuleDef>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[RuleDef] {
        &self.rules
    }

    /// Evaluate rules in priority order; short-circuits at the first hit.
    pub fn evaluate(&self, url: &str, parts: &UrlParts, lexicon: &Lexicon) -> Option<RuleHit> {
        for rule in &self.rules {
            if let Some(detail) = rule.predicate.check(url, parts, lexicon) {
                debug!(rule = %rule.id, detail = %detail, "rule fired");
                return Some(RuleHit {
                    rule_id: rule.id.clone(),
                    reason: render_reason(&rule.reason, &detail),
                });
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuleConfig;

    fn default_set() -> (RuleSet, Lexicon) {
        let RuleConfig { rules, lexicon } = RuleConfig::default();
        (RuleSet::new(rules), lexicon)
    }

    fn evaluate(url: &str) -> Option<RuleHit> {
        let (set, lexicon) = default_set();
        set.evaluate(url, &UrlParts::parse(url), &lexicon)
    }

    #[test]
    fn ip_literal_host_fires_with_exact_reason() {
        let hit = evaluate("http://192.168.1.5/login-verify").unwrap();
        assert_eq!(hit.rule_id, "ip-literal-host");
        assert_eq!(hit.reason, "IP address used as host");
    }

    #[test]
    fn high_risk_tld_fires_before_brand_lookalike() {
        // Both the TLD and the brand-lookalike indicators are present; the
        // earlier rule is reported.
        let hit = evaluate("http://secure-paypa1-login.tk/verify").unwrap();
        assert_eq!(hit.rule_id, "high-risk-tld");
        assert_eq!(hit.reason, "high-risk top-level domain .tk");
    }

    #[test]
    fn excessive_subdomains_fires() {
        let hit = evaluate("http://a.b.c.d.example.com/").unwrap();
        assert_eq!(hit.rule_id, "excessive-subdomains");
        assert_eq!(hit.reason, "excessive subdomain nesting (4 levels)");
    }

    #[test]
    fn brand_lookalike_catches_edit_distance_one() {
        let hit = evaluate("http://paypa1.com/").unwrap();
        assert_eq!(hit.rule_id, "brand-lookalike");
        assert_eq!(hit.reason, "domain imitates the paypal brand");
    }

    #[test]
    fn brand_lookalike_catches_embedded_brand() {
        let hit = evaluate("http://paypal-billing.com/").unwrap();
        assert_eq!(hit.rule_id, "brand-lookalike");
    }

    #[test]
    fn exact_brand_domain_does_not_fire() {
        assert_eq!(evaluate("https://www.google.com/search?q=cats"), None);
        assert_eq!(evaluate("https://paypal.com/"), None);
    }

    #[test]
    fn keyword_cluster_needs_min_hits() {
        let hit = evaluate("http://example.com/login-verify").unwrap();
        assert_eq!(hit.rule_id, "keyword-cluster");
        assert!(hit.reason.contains("login"));
        assert!(hit.reason.contains("verify"));

        assert_eq!(evaluate("http://example.com/login"), None);
    }

    #[test]
    fn no_rule_fires_on_benign_url() {
        assert_eq!(evaluate("https://en.wikipedia.org/wiki/Rust"), None);
    }

    #[test]
    fn empty_string_abstains() {
        assert_eq!(evaluate(""), None);
    }

    #[test]
    fn rule_order_is_configuration_not_code() {
        // Reversing the table flips which of two matching rules reports.
        let RuleConfig { mut rules, lexicon } = RuleConfig::default();
        rules.reverse();
        let set = RuleSet::new(rules);

        let url = "http://secure-paypa1-login.tk/verify";
        let hit = set.evaluate(url, &UrlParts::parse(url), &lexicon).unwrap();
        assert_eq!(hit.rule_id, "keyword-cluster");
    }

    #[test]
    fn custom_rule_table_round_trips_through_serde() {
        let def = RuleDef {
            id: "only-tld".to_string(),
            predicate: Predicate::HighRiskTld,
            reason: "bad tld .{}".to_string(),
        };
        let json = serde_json::to_string(&def).unwrap();
        assert!(json.contains("\"high-risk-tld\""));

        let back: RuleDef = serde_json::from_str(&json).unwrap();
        let lexicon = Lexicon::default();
        let url = "http://example.xyz/";
        let hit = RuleSet::new(vec![back])
            .evaluate(url, &UrlParts::parse(url), &lexicon)
            .unwrap();
        assert_eq!(hit.reason, "bad tld .xyz");
    }
}
