//! Assessment pipeline.
//!
//! An [`Engine`] is built once at startup from validated artifacts and is
//! immutable afterwards: assessment is a pure function of the input URL and
//! the frozen rule table + model, so a shared engine serves any number of
//! threads without coordination.

use tracing::debug;

use crate::config::{EngineConfig, Lexicon, RuleConfig};
use crate::decision::{decide, Verdict};
use crate::error::{AssessError, ConfigError};
use crate::features::{extract_features, FeatureVector};
use crate::model::{Classifier, ForestModel};
use crate::parts::UrlParts;
use crate::rules::RuleSet;

pub struct Engine {
    rules: RuleSet,
    lexicon: Lexicon,
    model: Box<dyn Classifier>,
    threshold: f32,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("rules", &self.rules)
            .field("lexicon", &self.lexicon)
            .field("model", &format_args!("<dyn Classifier>"))
            .field("threshold", &self.threshold)
            .finish()
    }
}

impl Engine {
    /// Assemble an engine from already-loaded parts. Fails fast on a
    /// threshold outside [0, 1], an invalid rule table, or a model whose
    /// input dimensionality disagrees with the extractor.
    pub fn new(
        rule_config: RuleConfig,
        model: Box<dyn Classifier>,
        threshold: f32,
    ) -> Result<Self, ConfigError> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ConfigError::InvalidThreshold(threshold));
        }
        if model.n_features() != FeatureVector::LEN {
            return Err(ConfigError::DimensionMismatch {
                model: model.n_features(),
                extractor: FeatureVector::LEN,
            });
        }
        rule_config.validate()?;

        let RuleConfig { rules, lexicon } = rule_config;
        Ok(Self {
            rules: RuleSet::new(rules),
            lexicon,
            model,
            threshold,
        })
    }

    /// Load artifacts from disk and assemble the engine. Any failure here
    /// must keep the process from serving.
    pub fn from_config(config: &EngineConfig) -> Result<Self, ConfigError> {
        let model = ForestModel::load(&config.model_path)?;
        let rule_config = match &config.rules_path {
            Some(path) => RuleConfig::from_path(path)?,
            None => RuleConfig::default(),
        };
        Self::new(rule_config, Box::new(model), config.threshold)
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Assess one URL: rules first, the statistical path only when every
    /// rule abstains. Stateless per call.
    pub fn assess(&self, raw_url: &str) -> Result<Verdict, AssessError> {
        let url = raw_url.trim();
        let parts = UrlParts::parse(url);

        if let Some(hit) = self.rules.evaluate(url, &parts, &self.lexicon) {
            debug!(url, rule = %hit.rule_id, "rule verdict");
            return decide(Some(hit), None, self.threshold);
        }

        let features = extract_features(url, &self.lexicon);
        let score = self.model.score(&features.to_array())?;
        debug!(url, score, "model verdict");
        decide(None, Some(score), self.threshold)
    }
}
