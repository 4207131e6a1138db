//! Explainer: per-feature attributions over the Feature Table.

mod plot;

use std::path::Path;
use std::sync::Arc;

use crate::dataset::FeatureTable;
use crate::error::{ArtifactLoadError, PipelineError};
use crate::ml::ModelArtifact;

pub use plot::{render_summary_plot, write_summary_plot};

/// Global importance of one feature.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureImportance {
    pub name: String,
    /// Column index in model order.
    pub index: usize,
    /// Mean absolute attribution over all rows.
    pub mean_abs: f64,
}

/// Attributions for every row of a table, in model feature order.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributionSummary {
    pub feature_names: Vec<String>,
    /// `values[row][feature]`, in raw-margin (log-odds) units.
    pub values: Vec<Vec<f64>>,
    /// Input values aligned with `values`.
    pub feature_values: Vec<Vec<f32>>,
    /// Model output before any feature is known.
    pub expected_value: f64,
    /// Sorted by descending `mean_abs`; ties keep model order.
    pub importance: Vec<FeatureImportance>,
}

impl AttributionSummary {
    pub fn rows(&self) -> usize {
        self.values.len()
    }

    /// The `n` most important features.
    pub fn top(&self, n: usize) -> &[FeatureImportance] {
        &self.importance[..n.min(self.importance.len())]
    }
}

pub struct Explainer {
    artifact: Arc<ModelArtifact>,
}

impl Explainer {
    pub fn new(artifact: Arc<ModelArtifact>) -> Self {
        Self { artifact }
    }

    pub fn open(path: &Path) -> Result<Self, ArtifactLoadError> {
        Ok(Self::new(Arc::new(ModelArtifact::load(path)?)))
    }

    pub fn artifact(&self) -> &ModelArtifact {
        &self.artifact
    }

    /// Attribute every row of `table`.
    ///
    /// The table's feature columns must match the artifact's schema by name;
    /// they are reordered into model order before scoring.
    pub fn explain(&self, table: &FeatureTable) -> Result<AttributionSummary, PipelineError> {
        let permutation = self.artifact.feature_names.permutation_from(&table.schema)?;
        if table.is_empty() {
            return Err(PipelineError::InsufficientData(
                "feature table has no rows to explain".to_string(),
            ));
        }
        let model = &self.artifact.model;
        let feature_values: Vec<Vec<f32>> = table
            .records
            .iter()
            .map(|record| permutation.iter().map(|&pos| record.features[pos]).collect())
            .collect();
        let values: Vec<Vec<f64>> = feature_values
            .iter()
            .map(|row| model.attributions(row))
            .collect();

        let feature_names = self.artifact.feature_names.names().to_vec();
        let n = values.len() as f64;
        let mut importance: Vec<FeatureImportance> = feature_names
            .iter()
            .enumerate()
            .map(|(index, name)| FeatureImportance {
                name: name.clone(),
                index,
                mean_abs: values.iter().map(|row| row[index].abs()).sum::<f64>() / n,
            })
            .collect();
        importance.sort_by(|a, b| b.mean_abs.total_cmp(&a.mean_abs));

        tracing::info!(
            rows = values.len(),
            features = feature_names.len(),
            top = importance.first().map(|f| f.name.as_str()).unwrap_or(""),
            "Computed attributions"
        );
        Ok(AttributionSummary {
            feature_names,
            values,
            feature_values,
            expected_value: model.expected_value(),
            importance,
        })
    }
}
