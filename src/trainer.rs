//! Trainer: Feature Table in, evaluated and persisted Model Artifact out.

use std::path::Path;

use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::config::TrainingSettings;
use crate::dataset::{FeatureTable, train_test_split};
use crate::error::PipelineError;
use crate::ml::gbdt::{TrainDataset, TrainError, TrainOptions, train_gbdt};
use crate::ml::metrics::{ClassificationReport, ConfusionMatrix, roc_auc};
use crate::ml::{ARTIFACT_FORMAT_VERSION, ModelArtifact, TrainingSummary};

/// Class names used in the classification report, indexed by label.
pub const CLASS_NAMES: [&str; 2] = ["0", "1"];

/// Result of a training run.
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub artifact: ModelArtifact,
    /// Held-out classification report.
    pub report: ClassificationReport,
    /// Held-out ROC-AUC; absent when the test partition has one class.
    pub roc_auc: Option<f64>,
}

impl From<&TrainingSettings> for TrainOptions {
    fn from(settings: &TrainingSettings) -> Self {
        Self {
            n_estimators: settings.n_estimators,
            learning_rate: settings.learning_rate,
            max_depth: settings.max_depth,
            bins: settings.bins,
            l2_regularization: settings.l2_regularization,
            min_child_weight: settings.min_child_weight,
        }
    }
}

/// Split, fit and evaluate a model on `table`. Nothing is written to disk.
pub fn train(table: &FeatureTable, settings: &TrainingSettings) -> Result<TrainingOutcome, PipelineError> {
    let [healthy, distressed] = table.class_counts();
    if healthy == 0 || distressed == 0 {
        return Err(PipelineError::InsufficientData(format!(
            "feature table has {healthy} healthy and {distressed} distressed rows; both classes are required"
        )));
    }

    let split = train_test_split(table.len(), settings.test_fraction, settings.seed);
    if split.train.is_empty() || split.test.is_empty() {
        return Err(PipelineError::InsufficientData(format!(
            "{} rows cannot be split into non-empty train/test partitions",
            table.len()
        )));
    }
    let train_set = subset(table, &split.train);
    let test_set = subset(table, &split.test);
    tracing::info!(
        train_rows = train_set.x.len(),
        test_rows = test_set.x.len(),
        seed = settings.seed,
        "Split feature table"
    );

    let options = TrainOptions::from(settings);
    let model = train_gbdt(&train_set, &options).map_err(|err| match err {
        TrainError::SingleClass(label) => PipelineError::InsufficientData(format!(
            "training partition contains only class {label}; ROC-AUC is undefined"
        )),
        other => PipelineError::InsufficientData(other.to_string()),
    })?;
    tracing::info!(trees = model.trees.len(), "Fitted boosted ensemble");

    let mut cm = ConfusionMatrix::new(CLASS_NAMES.len());
    let mut scores = Vec::with_capacity(test_set.x.len());
    for (row, &truth) in test_set.x.iter().zip(&test_set.y) {
        cm.add(truth as usize, model.predict_class(row) as usize);
        scores.push(model.predict_proba(row) as f64);
    }
    let report = ClassificationReport::from_confusion(
        &cm,
        CLASS_NAMES.iter().map(|name| name.to_string()).collect(),
    );
    let auc = roc_auc(&test_set.y, &scores);
    if auc.is_none() {
        tracing::warn!("Test partition contains a single class; ROC-AUC is undefined");
    }

    let artifact = ModelArtifact {
        format_version: ARTIFACT_FORMAT_VERSION,
        created_at: OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_else(|_| String::from("unknown")),
        feature_names: table.schema.clone(),
        training: TrainingSummary {
            n_estimators: options.n_estimators,
            learning_rate: options.learning_rate,
            max_depth: options.max_depth,
            bins: options.bins,
            l2_regularization: options.l2_regularization,
            min_child_weight: options.min_child_weight,
            seed: settings.seed,
            test_fraction: settings.test_fraction,
            train_rows: train_set.x.len(),
            test_rows: test_set.x.len(),
            test_accuracy: report.accuracy,
            test_roc_auc: auc,
        },
        model,
    };
    Ok(TrainingOutcome {
        artifact,
        report,
        roc_auc: auc,
    })
}

/// Load the table at `table_path`, train, and write the artifact to
/// `artifact_path`.
pub fn run(
    table_path: &Path,
    artifact_path: &Path,
    settings: &TrainingSettings,
) -> Result<TrainingOutcome, PipelineError> {
    let table = FeatureTable::load(table_path)?;
    let outcome = train(&table, settings)?;
    outcome.artifact.save(artifact_path)?;
    Ok(outcome)
}

fn subset(table: &FeatureTable, indices: &[usize]) -> TrainDataset {
    TrainDataset {
        feature_len: table.schema.len(),
        x: indices
            .iter()
            .map(|&i| table.records[i].features.clone())
            .collect(),
        y: indices.iter().map(|&i| table.records[i].status).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::FinancialRecord;
    use crate::dataset::FeatureSchema;

    fn table(statuses: &[u8]) -> FeatureTable {
        FeatureTable {
            schema: FeatureSchema::new(vec!["Debt_Ratio".into(), "Current_Ratio".into()]).unwrap(),
            records: statuses
                .iter()
                .enumerate()
                .map(|(i, &status)| FinancialRecord {
                    company: format!("C{i}"),
                    category: "Retail".into(),
                    year: 2020,
                    status,
                    features: vec![
                        status as f32 * 0.5 + (i % 5) as f32 * 0.05,
                        2.0 - status as f32,
                    ],
                })
                .collect(),
        }
    }

    fn quick_settings() -> TrainingSettings {
        TrainingSettings {
            n_estimators: 20,
            ..TrainingSettings::default()
        }
    }

    #[test]
    fn single_class_table_is_insufficient() {
        let err = train(&table(&[0; 10]), &quick_settings()).unwrap_err();
        assert!(matches!(err, PipelineError::InsufficientData(_)));
    }

    #[test]
    fn too_few_rows_to_split_is_insufficient() {
        let err = train(&table(&[0, 1]), &TrainingSettings {
            test_fraction: 0.99,
            ..quick_settings()
        })
        .unwrap_err();
        assert!(matches!(err, PipelineError::InsufficientData(_)));
    }

    #[test]
    fn trains_and_records_summary() {
        let statuses: Vec<u8> = (0..40).map(|i| u8::from(i % 3 == 0)).collect();
        let outcome = train(&table(&statuses), &quick_settings()).unwrap();
        let summary = &outcome.artifact.training;
        assert_eq!(summary.test_rows, 8);
        assert_eq!(summary.train_rows, 32);
        assert_eq!(summary.n_estimators, 20);
        assert_eq!(summary.seed, 42);
        assert_eq!(outcome.artifact.model.trees.len(), 20);
        assert_eq!(outcome.report.macro_avg.support, 8);
        assert!(outcome.report.accuracy > 0.99);
        assert!(outcome.artifact.validate().is_ok());
    }
}
