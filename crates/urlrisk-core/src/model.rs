//! Frozen classifier loading and inference.
//!
//! The artifact is a JSON tree ensemble: every tree votes by routing the
//! feature vector from node 0 to a leaf, and the final score is the mean of
//! the leaf probabilities. The artifact is loaded once at startup, validated
//! against the extractor's feature schema, and never mutated afterwards, so
//! it can be shared freely across threads.

use std::fs;
use std::path::Path;

use ndarray::Array1;
use serde::Deserialize;
use tracing::info;

use crate::error::{AssessError, ConfigError};
use crate::features::FeatureVector;

/// Artifact format revision this build understands.
pub const SCHEMA_VERSION: u32 = 1;

/// The one capability the engine needs from a classifier: score a feature
/// vector. Concrete model families live behind this seam.
pub trait Classifier: Send + Sync {
    /// Input dimensionality the model was trained for.
    fn n_features(&self) -> usize;

    /// Scam probability in [0.0, 1.0] for one feature vector.
    fn score(&self, features: &Array1<f32>) -> Result<f32, AssessError>;
}

#[derive(Debug, Deserialize)]
struct ForestArtifact {
    schema_version: u32,
    feature_names: Vec<String>,
    trees: Vec<Tree>,
}

#[derive(Debug, Deserialize)]
struct Tree {
    nodes: Vec<Node>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Node {
    Split {
        feature: usize,
        threshold: f32,
        left: usize,
        right: usize,
    },
    Leaf {
        probability: f32,
    },
}

/// A frozen ensemble of decision trees.
#[derive(Debug)]
pub struct ForestModel {
    trees: Vec<Tree>,
    n_features: usize,
}

impl ForestModel {
    /// Load and validate an artifact. Any defect is a fatal
    /// [`ConfigError`]; a model that cannot be proven sound must not serve.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path).map_err(|source| ConfigError::ModelRead {
            path: path.to_path_buf(),
            source,
        })?;
        let artifact: ForestArtifact =
            serde_json::from_str(&data).map_err(|source| ConfigError::ModelParse {
                path: path.to_path_buf(),
                source,
            })?;

        let model = Self::from_artifact(artifact)?;
        info!(
            path = %path.display(),
            trees = model.trees.len(),
            features = model.n_features,
            "loaded classifier artifact"
        );
        Ok(model)
    }

    fn from_artifact(artifact: ForestArtifact) -> Result<Self, ConfigError> {
        if artifact.schema_version != SCHEMA_VERSION {
            return Err(ConfigError::UnsupportedSchemaVersion {
                found: artifact.schema_version,
                supported: SCHEMA_VERSION,
            });
        }

        if artifact.feature_names.len() != FeatureVector::LEN {
            return Err(ConfigError::DimensionMismatch {
                model: artifact.feature_names.len(),
                extractor: FeatureVector::LEN,
            });
        }
        for (index, (found, expected)) in artifact
            .feature_names
            .iter()
            .zip(FeatureVector::NAMES)
            .enumerate()
        {
            if found != expected {
                return Err(ConfigError::SchemaMismatch {
                    index,
                    expected: expected.to_string(),
                    found: found.clone(),
                });
            }
        }

        if artifact.trees.is_empty() {
            return Err(ConfigError::ModelInvalid(
                "artifact contains no trees".to_string(),
            ));
        }
        for (t, tree) in artifact.trees.iter().enumerate() {
            if tree.nodes.is_empty() {
                return Err(ConfigError::ModelInvalid(format!("tree {t} has no nodes")));
            }
            for (n, node) in tree.nodes.iter().enumerate() {
                match node {
                    Node::Split {
                        feature,
                        threshold,
                        left,
                        right,
                    } => {
                        if *feature >= FeatureVector::LEN {
                            return Err(ConfigError::ModelInvalid(format!(
                                "tree {t} node {n} references feature {feature} out of range"
                            )));
                        }
                        if !threshold.is_finite() {
                            return Err(ConfigError::ModelInvalid(format!(
                                "tree {t} node {n} has a non-finite threshold"
                            )));
                        }
                        // Children must point strictly forward; this bounds
                        // every walk and rules out cycles.
                        let in_range = |child: usize| child > n && child < tree.nodes.len();
                        if !in_range(*left) || !in_range(*right) {
                            return Err(ConfigError::ModelInvalid(format!(
                                "tree {t} node {n} has a non-forward child index"
                            )));
                        }
                    }
                    Node::Leaf { probability } => {
                        if !probability.is_finite() || !(0.0..=1.0).contains(probability) {
                            return Err(ConfigError::ModelInvalid(format!(
                                "tree {t} node {n} has probability outside [0, 1]"
                            )));
                        }
                    }
                }
            }
        }

        Ok(Self {
            n_features: artifact.feature_names.len(),
            trees: artifact.trees,
        })
    }
}

impl Classifier for ForestModel {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn score(&self, features: &Array1<f32>) -> Result<f32, AssessError> {
        if features.len() != self.n_features {
            return Err(AssessError::FeatureDimension {
                expected: self.n_features,
                actual: features.len(),
            });
        }

        let mut total = 0.0f32;
        for tree in &self.trees {
            let mut idx = 0;
            loop {
                // Indices were validated strictly forward at load time.
                match &tree.nodes[idx] {
                    Node::Split {
                        feature,
                        threshold,
                        left,
                        right,
                    } => {
                        idx = if features[*feature] <= *threshold {
                            *left
                        } else {
                            *right
                        };
                    }
                    Node::Leaf { probability } => {
                        total += probability;
                        break;
                    }
                }
            }
        }

        Ok(total / self.trees.len() as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn names_json() -> serde_json::Value {
        serde_json::json!(FeatureVector::NAMES)
    }

    fn write_artifact(value: &serde_json::Value) -> tempfile::NamedTempFile {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(value.to_string().as_bytes()).unwrap();
        tmp.flush().unwrap();
        tmp
    }

    fn single_split_artifact() -> serde_json::Value {
        // Routes on has_ip_host (index 9): 0.2 without, 0.9 with.
        serde_json::json!({
            "schema_version": 1,
            "feature_names": names_json(),
            "trees": [
                { "nodes": [
                    { "kind": "split", "feature": 9, "threshold": 0.5, "left": 1, "right": 2 },
                    { "kind": "leaf", "probability": 0.2 },
                    { "kind": "leaf", "probability": 0.9 }
                ]}
            ]
        })
    }

    fn vector_with(index: usize, value: f32) -> Array1<f32> {
        let mut v = Array1::zeros(FeatureVector::LEN);
        v[index] = value;
        v
    }

    #[test]
    fn routes_to_the_correct_leaf() {
        let tmp = write_artifact(&single_split_artifact());
        let model = ForestModel::load(tmp.path()).unwrap();

        let benign = model.score(&Array1::zeros(FeatureVector::LEN)).unwrap();
        assert_eq!(benign, 0.2);

        let ip = model.score(&vector_with(9, 1.0)).unwrap();
        assert_eq!(ip, 0.9);
    }

    #[test]
    fn score_is_the_mean_over_trees() {
        let artifact = serde_json::json!({
            "schema_version": 1,
            "feature_names": names_json(),
            "trees": [
                { "nodes": [ { "kind": "leaf", "probability": 0.25 } ] },
                { "nodes": [ { "kind": "leaf", "probability": 0.75 } ] }
            ]
        });
        let tmp = write_artifact(&artifact);
        let model = ForestModel::load(tmp.path()).unwrap();

        let score = model.score(&Array1::zeros(FeatureVector::LEN)).unwrap();
        assert_eq!(score, 0.5);
    }

    #[test]
    fn split_boundary_goes_left_on_equality() {
        let tmp = write_artifact(&single_split_artifact());
        let model = ForestModel::load(tmp.path()).unwrap();

        let score = model.score(&vector_with(9, 0.5)).unwrap();
        assert_eq!(score, 0.2);
    }

    #[test]
    fn wrong_feature_count_is_a_dimension_mismatch() {
        let mut names: Vec<&str> = FeatureVector::NAMES.to_vec();
        names.pop();
        let artifact = serde_json::json!({
            "schema_version": 1,
            "feature_names": names,
            "trees": [ { "nodes": [ { "kind": "leaf", "probability": 0.1 } ] } ]
        });
        let tmp = write_artifact(&artifact);
        let err = ForestModel::load(tmp.path()).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::DimensionMismatch {
                model: 14,
                extractor: 15
            }
        ));
    }

    #[test]
    fn renamed_feature_is_a_schema_mismatch() {
        let mut names: Vec<String> = FeatureVector::NAMES.iter().map(|s| s.to_string()).collect();
        names[3] = "at_sign".to_string();
        let artifact = serde_json::json!({
            "schema_version": 1,
            "feature_names": names,
            "trees": [ { "nodes": [ { "kind": "leaf", "probability": 0.1 } ] } ]
        });
        let tmp = write_artifact(&artifact);
        let err = ForestModel::load(tmp.path()).unwrap_err();
        assert!(matches!(err, ConfigError::SchemaMismatch { index: 3, .. }));
    }

    #[test]
    fn empty_forest_is_invalid() {
        let artifact = serde_json::json!({
            "schema_version": 1,
            "feature_names": names_json(),
            "trees": []
        });
        let tmp = write_artifact(&artifact);
        assert!(matches!(
            ForestModel::load(tmp.path()).unwrap_err(),
            ConfigError::ModelInvalid(_)
        ));
    }

    #[test]
    fn backward_child_index_is_invalid() {
        let artifact = serde_json::json!({
            "schema_version": 1,
            "feature_names": names_json(),
            "trees": [
                { "nodes": [
                    { "kind": "split", "feature": 0, "threshold": 1.0, "left": 0, "right": 1 },
                    { "kind": "leaf", "probability": 0.5 }
                ]}
            ]
        });
        let tmp = write_artifact(&artifact);
        assert!(matches!(
            ForestModel::load(tmp.path()).unwrap_err(),
            ConfigError::ModelInvalid(_)
        ));
    }

    #[test]
    fn out_of_range_probability_is_invalid() {
        let artifact = serde_json::json!({
            "schema_version": 1,
            "feature_names": names_json(),
            "trees": [ { "nodes": [ { "kind": "leaf", "probability": 1.5 } ] } ]
        });
        let tmp = write_artifact(&artifact);
        assert!(matches!(
            ForestModel::load(tmp.path()).unwrap_err(),
            ConfigError::ModelInvalid(_)
        ));
    }

    #[test]
    fn unsupported_schema_version_is_rejected() {
        let artifact = serde_json::json!({
            "schema_version": 99,
            "feature_names": names_json(),
            "trees": [ { "nodes": [ { "kind": "leaf", "probability": 0.1 } ] } ]
        });
        let tmp = write_artifact(&artifact);
        assert!(matches!(
            ForestModel::load(tmp.path()).unwrap_err(),
            ConfigError::UnsupportedSchemaVersion { found: 99, .. }
        ));
    }

    #[test]
    fn missing_artifact_is_a_read_error() {
        let err = ForestModel::load(Path::new("/nonexistent/model.json")).unwrap_err();
        assert!(matches!(err, ConfigError::ModelRead { .. }));
    }

    #[test]
    fn short_vector_fails_loudly_at_call_time() {
        let tmp = write_artifact(&single_split_artifact());
        let model = ForestModel::load(tmp.path()).unwrap();

        let err = model.score(&Array1::zeros(3)).unwrap_err();
        assert!(matches!(
            err,
            AssessError::FeatureDimension {
                expected: 15,
                actual: 3
            }
        ));
    }
}
