//! Error types for urlrisk-core.
//!
//! Two kinds with different lifetimes: `ConfigError` is fatal and only
//! produced while loading artifacts at startup; `AssessError` is a per-call
//! invariant violation. Malformed URLs are neither — they are captured as
//! feature values.

use std::path::PathBuf;

use thiserror::Error;

/// Startup-time configuration errors. Any of these must prevent the process
/// from entering a serving state.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read model artifact {path}: {source}")]
    ModelRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot parse model artifact {path}: {source}")]
    ModelParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("unsupported model schema version {found} (supported: {supported})")]
    UnsupportedSchemaVersion { found: u32, supported: u32 },

    #[error("invalid model artifact: {0}")]
    ModelInvalid(String),

    #[error("model expects {model} features but the extractor produces {extractor}")]
    DimensionMismatch { model: usize, extractor: usize },

    #[error("feature schema mismatch at position {index}: model names it {found:?}, extractor produces {expected:?}")]
    SchemaMismatch {
        index: usize,
        expected: String,
        found: String,
    },

    #[error("cannot read rule config {path}: {source}")]
    RulesRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot parse rule config {path}: {source}")]
    RulesParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("invalid rule config: {0}")]
    RulesInvalid(String),

    #[error("threshold must be within [0.0, 1.0], got {0}")]
    InvalidThreshold(f32),
}

/// Per-assessment errors. These indicate a broken invariant and must surface
/// to the caller instead of being coerced into a guessed verdict.
#[derive(Error, Debug)]
pub enum AssessError {
    #[error("feature vector length {actual} does not match model input length {expected}")]
    FeatureDimension { expected: usize, actual: usize },

    #[error("no rule fired and no model score was supplied")]
    MissingModelScore,
}
