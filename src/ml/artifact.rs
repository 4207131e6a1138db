//! Persisted Model Artifact: the fitted ensemble plus its feature schema.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::dataset::FeatureSchema;
use crate::error::{ArtifactLoadError, PipelineError};
use crate::fs_ops;

use super::BinaryClassifier;
use super::gbdt::GbdtModel;

/// Current on-disk format version.
pub const ARTIFACT_FORMAT_VERSION: i64 = 1;

/// Hyperparameters and held-out results recorded at training time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub n_estimators: usize,
    pub learning_rate: f32,
    pub max_depth: usize,
    pub bins: usize,
    pub l2_regularization: f32,
    pub min_child_weight: f32,
    pub seed: u64,
    pub test_fraction: f64,
    pub train_rows: usize,
    pub test_rows: usize,
    pub test_accuracy: f32,
    /// Absent when the held-out partition had a single class.
    pub test_roc_auc: Option<f64>,
}

/// Fitted classifier as written by the trainer and read by the reporter and
/// explainer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: i64,
    /// RFC 3339 UTC creation time.
    pub created_at: String,
    pub feature_names: FeatureSchema,
    pub training: TrainingSummary,
    pub model: GbdtModel,
}

impl ModelArtifact {
    /// Read and validate an artifact.
    pub fn load(path: &Path) -> Result<Self, ArtifactLoadError> {
        let bytes = std::fs::read(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ArtifactLoadError::Missing {
                    path: path.to_path_buf(),
                }
            } else {
                ArtifactLoadError::Read {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        let artifact: Self =
            serde_json::from_slice(&bytes).map_err(|source| ArtifactLoadError::Corrupt {
                path: path.to_path_buf(),
                source,
            })?;
        if artifact.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(ArtifactLoadError::UnsupportedVersion {
                path: path.to_path_buf(),
                found: artifact.format_version,
                expected: ARTIFACT_FORMAT_VERSION,
            });
        }
        artifact
            .validate()
            .map_err(|reason| ArtifactLoadError::Invalid {
                path: path.to_path_buf(),
                reason,
            })?;
        tracing::info!(
            path = %path.display(),
            trees = artifact.model.trees.len(),
            features = artifact.feature_names.len(),
            created_at = %artifact.created_at,
            "Loaded model artifact"
        );
        Ok(artifact)
    }

    /// Write the artifact atomically, replacing any previous file.
    pub fn save(&self, path: &Path) -> Result<(), PipelineError> {
        let bytes = serde_json::to_vec_pretty(self).map_err(|err| PipelineError::Render {
            what: "model artifact",
            reason: err.to_string(),
        })?;
        fs_ops::atomic_write(path, &bytes).map_err(|source| PipelineError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), bytes = bytes.len(), "Saved model artifact");
        Ok(())
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.feature_names.len() != self.model.feature_len {
            return Err(format!(
                "schema lists {} features but the model expects {}",
                self.feature_names.len(),
                self.model.feature_len
            ));
        }
        self.model.validate()
    }
}

impl BinaryClassifier for ModelArtifact {
    fn schema(&self) -> &FeatureSchema {
        &self.feature_names
    }

    fn predict_class(&self, features: &[f32]) -> u8 {
        self.model.predict_class(features)
    }

    fn predict_proba(&self, features: &[f32]) -> f64 {
        self.model.predict_proba(features) as f64
    }
}
