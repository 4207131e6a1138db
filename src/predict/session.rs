use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::dataset::parse_upload;
use crate::error::{ArtifactLoadError, UploadError};
use crate::ml::{BinaryClassifier, ModelArtifact};

use super::{PredictionResult, Predictor, ReportSummary, summarize};

/// Results of one processed upload.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport {
    pub results: Vec<PredictionResult>,
    pub summary: ReportSummary,
}

/// Long-lived reporter state: a loaded classifier reused across uploads.
///
/// Upload failures are returned per call and leave the session usable.
pub struct ReportSession {
    predictor: Predictor,
    artifact_path: Option<PathBuf>,
}

impl ReportSession {
    /// Load the artifact at `path`. Fails before any upload is read.
    pub fn open(path: &Path) -> Result<Self, ArtifactLoadError> {
        let artifact = ModelArtifact::load(path)?;
        Ok(Self {
            predictor: Predictor::new(Arc::new(artifact)),
            artifact_path: Some(path.to_path_buf()),
        })
    }

    /// Session over an already constructed classifier; [`Self::reload`] is a
    /// no-op for these.
    pub fn with_classifier(classifier: Arc<dyn BinaryClassifier>) -> Self {
        Self {
            predictor: Predictor::new(classifier),
            artifact_path: None,
        }
    }

    pub fn artifact_path(&self) -> Option<&Path> {
        self.artifact_path.as_deref()
    }

    /// Re-read the artifact from its path. On failure the current model stays
    /// in place.
    pub fn reload(&mut self) -> Result<(), ArtifactLoadError> {
        let Some(path) = self.artifact_path.as_deref() else {
            return Ok(());
        };
        let artifact = ModelArtifact::load(path)?;
        self.predictor = Predictor::new(Arc::new(artifact));
        tracing::info!(path = %path.display(), "Reloaded model artifact");
        Ok(())
    }

    /// Validate, predict and aggregate one uploaded CSV.
    pub fn process_upload(&self, bytes: &[u8]) -> Result<BatchReport, UploadError> {
        let batch = parse_upload(bytes, self.predictor.classifier().schema())?;
        let results = self.predictor.predict_batch(&batch);
        let summary = summarize(&results);
        tracing::info!(
            rows = results.len(),
            healthy = summary.healthy_count,
            distressed = summary.distressed_count,
            "Processed upload"
        );
        Ok(BatchReport { results, summary })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DataFormatError, SchemaError};
    use crate::predict::HealthStatus;
    use crate::predict::test_support::ScriptedClassifier;
    use tempfile::tempdir;

    fn session() -> ReportSession {
        ReportSession::with_classifier(Arc::new(ScriptedClassifier::new(
            vec![0, 1, 0],
            vec![0.1, 0.8, 0.45],
        )))
    }

    #[test]
    fn processes_upload_in_order() {
        let csv = "Company,Debt_Ratio,Row\nAcme,0.2,0\nBeta,0.9,1\nGamma,0.4,2\n";
        let report = session().process_upload(csv.as_bytes()).unwrap();
        assert_eq!(report.results.len(), 3);
        assert_eq!(report.results[1].company, "Beta");
        assert_eq!(report.results[1].status, HealthStatus::Distressed);
        assert_eq!(report.summary.average_health_score, Some(55.0));
    }

    #[test]
    fn errors_are_inline_and_session_survives() {
        let session = session();
        let err = session
            .process_upload(b"Company,Debt_Ratio\nAcme,0.2\n")
            .unwrap_err();
        assert_eq!(
            err,
            UploadError::Schema(SchemaError::MissingColumns(vec!["Row".into()]))
        );
        let err = session.process_upload(b"").unwrap_err();
        assert_eq!(err, UploadError::DataFormat(DataFormatError::Empty));

        let report = session.process_upload(b"Row,Debt_Ratio\n0,0.1\n").unwrap();
        assert_eq!(report.results[0].company, "Company 1");
    }

    #[test]
    fn header_only_upload_is_an_empty_report() {
        let report = session().process_upload(b"Row,Debt_Ratio\n").unwrap();
        assert!(report.results.is_empty());
        assert_eq!(report.summary.average_health_score, None);
    }

    #[test]
    fn missing_artifact_fails_at_open() {
        let dir = tempdir().unwrap();
        let result = ReportSession::open(&dir.path().join("missing.json"));
        assert!(matches!(result, Err(ArtifactLoadError::Missing { .. })));
    }
}
