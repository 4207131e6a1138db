//! Machine learning building blocks: the boosted-tree learner, evaluation
//! metrics and the persisted Model Artifact.

pub mod artifact;
pub mod gbdt;
pub mod metrics;

pub use artifact::{ARTIFACT_FORMAT_VERSION, ModelArtifact, TrainingSummary};

use crate::dataset::FeatureSchema;

/// A fitted binary classifier as seen by the reporter.
///
/// Rows passed in are ordered like [`BinaryClassifier::schema`].
pub trait BinaryClassifier: Send + Sync {
    /// Feature columns the classifier expects, in input order.
    fn schema(&self) -> &FeatureSchema;
    /// Hard label: `0` healthy, `1` distressed.
    fn predict_class(&self, features: &[f32]) -> u8;
    /// Probability of the distressed class in `[0, 1]`.
    fn predict_proba(&self, features: &[f32]) -> f64;
}
