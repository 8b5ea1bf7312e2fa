//! Verdict fusion.
//!
//! Combines the rule engine's verdict with the classifier score. A fired
//! rule always wins; otherwise the score is thresholded. The threshold is
//! the one tunable knob of the whole engine and lives here as a single
//! named constant.

use std::fmt;

use serde::Serialize;

use crate::error::AssessError;
use crate::rules::RuleHit;

/// Probability cutoff separating "legitimate" from "scam" when only the
/// classifier decides.
pub const DEFAULT_THRESHOLD: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Scam,
    Legitimate,
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Scam => write!(f, "scam"),
            Label::Legitimate => write!(f, "legitimate"),
        }
    }
}

/// Which half of the engine produced the verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Rule,
    Model,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Rule => write!(f, "rule"),
            Source::Model => write!(f, "model"),
        }
    }
}

/// Final engine output for one URL.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    pub label: Label,
    pub reason: String,
    pub source: Source,
    /// Classifier score, present for model-sourced verdicts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

/// Fuse a rule verdict and a model score into the final verdict.
///
/// Reaching this with neither a fired rule nor a score is a broken pipeline
/// invariant and surfaces as an error, never as a guessed label.
pub fn decide(
    rule_verdict: Option<RuleHit>,
    model_score: Option<f32>,
    threshold: f32,
) -> Result<Verdict, AssessError> {
    if let Some(hit) = rule_verdict {
        return Ok(Verdict {
            label: Label::Scam,
            reason: hit.reason,
            source: Source::Rule,
            score: None,
        });
    }

    let score = model_score.ok_or(AssessError::MissingModelScore)?;
    // Inclusive boundary: a score exactly at the threshold is a scam.
    let label = if score >= threshold {
        Label::Scam
    } else {
        Label::Legitimate
    };
    Ok(Verdict {
        label,
        reason: format!("classifier confidence {score:.4}"),
        source: Source::Model,
        score: Some(score),
    })
}
