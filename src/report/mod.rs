//! Rendering and export of a processed upload.
//!
//! Everything here is a pure function of a finished [`BatchReport`]; the
//! exports are built once per batch after the per-row entries are rendered.

mod chart;
mod csv_export;
mod document;

use std::path::{Path, PathBuf};

use crate::config::ReportSettings;
use crate::error::PipelineError;
use crate::fs_ops;
use crate::predict::{BatchReport, PredictionResult};

pub use chart::health_score_chart;
pub use csv_export::{CSV_HEADER, parse_csv, to_csv};
pub use document::render_pdf;

/// In-memory export artifacts for one batch.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportExports {
    pub csv: Vec<u8>,
    pub pdf: Vec<u8>,
    pub chart_svg: String,
}

/// Files written by [`write_exports`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPaths {
    pub csv: PathBuf,
    pub pdf: PathBuf,
    pub chart: PathBuf,
}

/// `Company: Status - Risk Probability: 12.50%`
pub fn render_entry(result: &PredictionResult) -> String {
    format!(
        "{}: {} - Risk Probability: {:.2}%",
        result.company, result.status, result.risk_probability
    )
}

/// One labeled line per result, in upload order.
pub fn render_entries(report: &BatchReport) -> Vec<String> {
    report.results.iter().map(render_entry).collect()
}

/// Headline lines shown above the entries.
pub fn render_summary(report: &BatchReport) -> Vec<String> {
    vec![document::summary_line(report), document::average_line(report)]
}

/// Build the CSV, PDF and chart for a finished batch.
pub fn build_exports(report: &BatchReport, settings: &ReportSettings) -> Result<ReportExports, PipelineError> {
    Ok(ReportExports {
        csv: to_csv(&report.results)?,
        pdf: render_pdf(report, settings)?,
        chart_svg: health_score_chart(&report.results)?,
    })
}

/// Write exports into `dir` under the configured file names.
pub fn write_exports(
    exports: &ReportExports,
    dir: &Path,
    settings: &ReportSettings,
) -> Result<ExportPaths, PipelineError> {
    let paths = ExportPaths {
        csv: dir.join(&settings.csv_file_name),
        pdf: dir.join(&settings.pdf_file_name),
        chart: dir.join(&settings.chart_file_name),
    };
    for (path, bytes) in [
        (&paths.csv, exports.csv.as_slice()),
        (&paths.pdf, exports.pdf.as_slice()),
        (&paths.chart, exports.chart_svg.as_bytes()),
    ] {
        fs_ops::atomic_write(path, bytes).map_err(|source| PipelineError::Write {
            path: path.clone(),
            source,
        })?;
    }
    tracing::info!(dir = %dir.display(), "Wrote report exports");
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predict::{HealthStatus, summarize};
    use tempfile::tempdir;

    fn report() -> BatchReport {
        let results = vec![
            PredictionResult {
                company: "Acme".into(),
                status: HealthStatus::Healthy,
                risk_probability: 10.0,
            },
            PredictionResult {
                company: "Beta".into(),
                status: HealthStatus::Distressed,
                risk_probability: 80.5,
            },
        ];
        let summary = summarize(&results);
        BatchReport { results, summary }
    }

    #[test]
    fn entries_follow_upload_order() {
        assert_eq!(
            render_entries(&report()),
            vec![
                "Acme: Healthy - Risk Probability: 10.00%".to_string(),
                "Beta: Distressed - Risk Probability: 80.50%".to_string(),
            ]
        );
        assert_eq!(
            render_summary(&report()),
            vec![
                "Summary: 1 Healthy | 1 At Risk".to_string(),
                "Average Health Score: 54.75%".to_string(),
            ]
        );
    }

    #[test]
    fn writes_all_exports() {
        let dir = tempdir().unwrap();
        let settings = ReportSettings::default();
        let exports = build_exports(&report(), &settings).unwrap();
        let paths = write_exports(&exports, &dir.path().join("out"), &settings).unwrap();
        assert_eq!(std::fs::read(&paths.csv).unwrap(), exports.csv);
        assert!(std::fs::read(&paths.pdf).unwrap().starts_with(b"%PDF-"));
        assert!(paths.chart.ends_with("FinGuard_HealthScores.svg"));
        assert!(paths.chart.is_file());
    }
}
