//! Error taxonomy shared by the trainer, explainer and reporter.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

/// Column-level contract violations between a table and the feature schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error("unexpected columns not known to the model: {}", .0.join(", "))]
    UnexpectedColumns(Vec<String>),
    #[error("duplicate column `{0}`")]
    DuplicateColumn(String),
    #[error("table has no feature columns")]
    EmptyFeatureSet,
}

/// Input that could not be read as the expected tabular data.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataFormatError {
    #[error("input is empty (no header row)")]
    Empty,
    #[error("malformed CSV{}: {message}", line_suffix(.line))]
    Csv { line: Option<u64>, message: String },
    #[error("line {line}: column `{column}` has non-numeric value `{value}`")]
    InvalidNumber {
        line: u64,
        column: String,
        value: String,
    },
    #[error("line {line}: Financial_Status must be 0 or 1, got `{value}`")]
    InvalidLabel { line: u64, value: String },
    #[error("line {line}: Year must be an integer, got `{value}`")]
    InvalidYear { line: u64, value: String },
}

fn line_suffix(line: &Option<u64>) -> String {
    line.map(|line| format!(" at line {line}")).unwrap_or_default()
}

impl From<csv::Error> for DataFormatError {
    fn from(err: csv::Error) -> Self {
        let line = err.position().map(|pos| pos.line());
        DataFormatError::Csv {
            line,
            message: err.to_string(),
        }
    }
}

/// A model artifact that is missing, unreadable or structurally invalid.
#[derive(Debug, Error)]
pub enum ArtifactLoadError {
    #[error("model artifact not found at {path}")]
    Missing { path: PathBuf },
    #[error("failed to read model artifact {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("model artifact {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("model artifact {path} has format version {found} (expected {expected})")]
    UnsupportedVersion {
        path: PathBuf,
        found: i64,
        expected: i64,
    },
    #[error("model artifact {path} is invalid: {reason}")]
    Invalid { path: PathBuf, reason: String },
}

/// Top-level error returned by pipeline entry points.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),
    #[error("data format error: {0}")]
    DataFormat(#[from] DataFormatError),
    #[error("artifact load error: {0}")]
    ArtifactLoad(#[from] ArtifactLoadError),
    #[error("insufficient data: {0}")]
    InsufficientData(String),
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to render {what}: {reason}")]
    Render { what: &'static str, reason: String },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors a report session surfaces inline for a single upload.
///
/// The session stays usable after any of these.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UploadError {
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),
    #[error("data format error: {0}")]
    DataFormat(#[from] DataFormatError),
}

impl From<UploadError> for PipelineError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::Schema(err) => PipelineError::Schema(err),
            UploadError::DataFormat(err) => PipelineError::DataFormat(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_errors_name_the_columns() {
        let err = SchemaError::MissingColumns(vec!["Debt_Ratio".into(), "ROA".into()]);
        assert_eq!(err.to_string(), "missing required columns: Debt_Ratio, ROA");
    }

    #[test]
    fn csv_error_message_includes_line_when_known() {
        let err = DataFormatError::Csv {
            line: Some(4),
            message: "found record with 2 fields".into(),
        };
        assert_eq!(
            err.to_string(),
            "malformed CSV at line 4: found record with 2 fields"
        );
        let err = DataFormatError::Csv {
            line: None,
            message: "bad".into(),
        };
        assert_eq!(err.to_string(), "malformed CSV: bad");
    }
}
