//! Batch inference over validated uploads.

mod results;
mod session;

use std::sync::Arc;

use crate::dataset::UploadBatch;
use crate::ml::BinaryClassifier;

pub use results::{HealthStatus, PredictionResult, ReportSummary, risk_percent, summarize};
pub use session::{BatchReport, ReportSession};

/// Applies an injected classifier to upload batches.
#[derive(Clone)]
pub struct Predictor {
    classifier: Arc<dyn BinaryClassifier>,
}

impl Predictor {
    pub fn new(classifier: Arc<dyn BinaryClassifier>) -> Self {
        Self { classifier }
    }

    pub fn classifier(&self) -> &Arc<dyn BinaryClassifier> {
        &self.classifier
    }

    /// One result per row, in upload order.
    ///
    /// Status comes from the classifier's hard label; risk from its
    /// probability.
    pub fn predict_batch(&self, batch: &UploadBatch) -> Vec<PredictionResult> {
        batch
            .rows
            .iter()
            .enumerate()
            .map(|(index, row)| PredictionResult {
                company: batch.company_label(index),
                status: HealthStatus::from_label(self.classifier.predict_class(row)),
                risk_probability: risk_percent(self.classifier.predict_proba(row)),
            })
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::dataset::FeatureSchema;
    use crate::ml::BinaryClassifier;

    /// Classifier that replays fixed outputs keyed by the first feature,
    /// which tests set to the row index.
    pub(crate) struct ScriptedClassifier {
        pub schema: FeatureSchema,
        pub classes: Vec<u8>,
        pub probabilities: Vec<f64>,
    }

    impl ScriptedClassifier {
        pub(crate) fn new(classes: Vec<u8>, probabilities: Vec<f64>) -> Self {
            Self {
                schema: FeatureSchema::new(vec!["Row".into(), "Debt_Ratio".into()])
                    .expect("valid schema"),
                classes,
                probabilities,
            }
        }
    }

    impl BinaryClassifier for ScriptedClassifier {
        fn schema(&self) -> &FeatureSchema {
            &self.schema
        }

        fn predict_class(&self, features: &[f32]) -> u8 {
            self.classes[features[0] as usize]
        }

        fn predict_proba(&self, features: &[f32]) -> f64 {
            self.probabilities[features[0] as usize]
        }
    }
}
