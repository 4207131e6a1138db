use crate::error::{DataFormatError, PipelineError};
use crate::predict::{HealthStatus, PredictionResult};

/// Header row of the predictions export.
pub const CSV_HEADER: [&str; 4] = [
    "Company",
    "Predicted Status",
    "Risk Probability (%)",
    "Financial Health Score (0-100)",
];

/// Serialize results as UTF-8 CSV with [`CSV_HEADER`].
pub fn to_csv(results: &[PredictionResult]) -> Result<Vec<u8>, PipelineError> {
    let render_err = |err: csv::Error| PipelineError::Render {
        what: "predictions CSV",
        reason: err.to_string(),
    };
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER).map_err(render_err)?;
    for result in results {
        let risk = format!("{:.2}", result.risk_probability);
        let health = format!("{:.2}", result.health_score());
        writer
            .write_record([
                result.company.as_str(),
                result.status.as_str(),
                risk.as_str(),
                health.as_str(),
            ])
            .map_err(render_err)?;
    }
    writer.into_inner().map_err(|err| PipelineError::Render {
        what: "predictions CSV",
        reason: err.to_string(),
    })
}

/// Read a predictions export back into results.
pub fn parse_csv(bytes: &[u8]) -> Result<Vec<PredictionResult>, DataFormatError> {
    let mut reader = csv::Reader::from_reader(bytes);
    let mut results = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = record.position().map(|pos| pos.line()).unwrap_or(0);
        let status = match record.get(1).unwrap_or("") {
            "Healthy" => HealthStatus::Healthy,
            "Distressed" => HealthStatus::Distressed,
            other => {
                return Err(DataFormatError::InvalidLabel {
                    line,
                    value: other.to_string(),
                });
            }
        };
        let raw_risk = record.get(2).unwrap_or("");
        let risk_probability =
            raw_risk
                .parse::<f64>()
                .map_err(|_| DataFormatError::InvalidNumber {
                    line,
                    column: CSV_HEADER[2].to_string(),
                    value: raw_risk.to_string(),
                })?;
        results.push(PredictionResult {
            company: record.get(0).unwrap_or("").to_string(),
            status,
            risk_probability,
        });
    }
    Ok(results)
}
