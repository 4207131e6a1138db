use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Full pipeline configuration loaded from `config.toml`.
///
/// Config sections (TOML): `paths`, `training`, `explain`, `report`, `sample`.
/// Missing sections and keys fall back to defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinguardConfig {
    #[serde(default)]
    pub paths: PathSettings,
    #[serde(default)]
    pub training: TrainingSettings,
    #[serde(default)]
    pub explain: ExplainSettings,
    #[serde(default)]
    pub report: ReportSettings,
    #[serde(default)]
    pub sample: SampleSettings,
}

impl FinguardConfig {
    /// Check ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.training;
        if !(t.test_fraction > 0.0 && t.test_fraction < 1.0) {
            return Err(invalid("training.test_fraction", "must be in (0, 1)"));
        }
        if t.n_estimators == 0 {
            return Err(invalid("training.n_estimators", "must be at least 1"));
        }
        if !(t.learning_rate.is_finite() && t.learning_rate > 0.0) {
            return Err(invalid("training.learning_rate", "must be positive"));
        }
        if !(1..=16).contains(&t.max_depth) {
            return Err(invalid("training.max_depth", "must be in 1..=16"));
        }
        if !(2..=256).contains(&t.bins) {
            return Err(invalid("training.bins", "must be in 2..=256"));
        }
        if !(t.l2_regularization.is_finite() && t.l2_regularization >= 0.0) {
            return Err(invalid("training.l2_regularization", "must be >= 0"));
        }
        if !(t.min_child_weight.is_finite() && t.min_child_weight >= 0.0) {
            return Err(invalid("training.min_child_weight", "must be >= 0"));
        }
        if self.explain.max_display == 0 {
            return Err(invalid("explain.max_display", "must be at least 1"));
        }
        if self.sample.rows == 0 {
            return Err(invalid("sample.rows", "must be at least 1"));
        }
        Ok(())
    }
}

fn invalid(key: &'static str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key,
        reason: reason.to_string(),
    }
}

/// File locations used by the jobs. Relative paths resolve against the
/// working directory of the job.
///
/// Config keys: `feature_table`, `model_artifact`, `attribution_output`, `report_dir`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathSettings {
    pub feature_table: PathBuf,
    pub model_artifact: PathBuf,
    pub attribution_output: PathBuf,
    /// Directory receiving CSV/PDF exports and the health-score chart.
    pub report_dir: PathBuf,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            feature_table: PathBuf::from("data/Engineered_Financial_Statements.csv"),
            model_artifact: PathBuf::from("models/financial_health_gbdt.json"),
            attribution_output: PathBuf::from("reports/attribution_summary.svg"),
            report_dir: PathBuf::from("reports"),
        }
    }
}

/// Split and boosting hyperparameters.
///
/// Config keys: `seed`, `test_fraction`, `n_estimators`, `learning_rate`,
/// `max_depth`, `bins`, `l2_regularization`, `min_child_weight`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingSettings {
    pub seed: u64,
    pub test_fraction: f64,
    pub n_estimators: usize,
    pub learning_rate: f32,
    pub max_depth: usize,
    pub bins: usize,
    pub l2_regularization: f32,
    pub min_child_weight: f32,
}

impl Default for TrainingSettings {
    fn default() -> Self {
        Self {
            seed: 42,
            test_fraction: 0.2,
            n_estimators: 200,
            learning_rate: 0.1,
            max_depth: 4,
            bins: 32,
            l2_regularization: 1.0,
            min_child_weight: 1.0,
        }
    }
}

/// Config keys: `max_display`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplainSettings {
    /// Number of features shown in the summary plot.
    pub max_display: usize,
}

impl Default for ExplainSettings {
    fn default() -> Self {
        Self { max_display: 20 }
    }
}

/// Report branding and export file names.
///
/// Config keys: `title`, `footer`, `csv_file_name`, `pdf_file_name`, `chart_file_name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    pub title: String,
    /// Footer text; `\n` separates lines.
    pub footer: String,
    pub csv_file_name: String,
    pub pdf_file_name: String,
    pub chart_file_name: String,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            title: "FinGuard AI - Financial Health Report".to_string(),
            footer: "Generated by FinGuard AI\nEmpowering Smarter Financial Decisions.".to_string(),
            csv_file_name: "FinGuard_Predictions.csv".to_string(),
            pdf_file_name: "FinGuard_Report.pdf".to_string(),
            chart_file_name: "FinGuard_HealthScores.svg".to_string(),
        }
    }
}

/// Config keys: `rows`, `seed`, `output`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleSettings {
    pub rows: usize,
    /// Fixed seed for reproducible samples; random when unset.
    pub seed: Option<u64>,
    pub output: PathBuf,
}

impl Default for SampleSettings {
    fn default() -> Self {
        Self {
            rows: 5,
            seed: None,
            output: PathBuf::from("data/test_company.csv"),
        }
    }
}
