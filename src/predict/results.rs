use std::fmt;

/// Predicted financial condition of one company-year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    Distressed,
}

impl HealthStatus {
    /// Map the classifier's hard label (`0` healthy, anything else distressed).
    pub fn from_label(label: u8) -> Self {
        if label == 0 {
            HealthStatus::Healthy
        } else {
            HealthStatus::Distressed
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HealthStatus::Healthy => "Healthy",
            HealthStatus::Distressed => "Distressed",
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Prediction for one uploaded row.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    pub company: String,
    pub status: HealthStatus,
    /// Distressed-class probability as a percentage, rounded to 2 decimals.
    pub risk_probability: f64,
}

impl PredictionResult {
    /// `100 - risk_probability`.
    pub fn health_score(&self) -> f64 {
        100.0 - self.risk_probability
    }
}

/// Convert a probability in `[0, 1]` to a percentage rounded to 2 decimals.
pub fn risk_percent(probability: f64) -> f64 {
    let clamped = probability.clamp(0.0, 1.0);
    (clamped * 100.0 * 100.0).round() / 100.0
}

/// Batch-level aggregates.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSummary {
    pub healthy_count: usize,
    pub distressed_count: usize,
    /// `100 - mean(risk)`; `None` for an empty batch.
    pub average_health_score: Option<f64>,
}

impl ReportSummary {
    pub fn total(&self) -> usize {
        self.healthy_count + self.distressed_count
    }
}

pub fn summarize(results: &[PredictionResult]) -> ReportSummary {
    let healthy_count = results
        .iter()
        .filter(|r| r.status == HealthStatus::Healthy)
        .count();
    let average_health_score = (!results.is_empty()).then(|| {
        let mean_risk =
            results.iter().map(|r| r.risk_probability).sum::<f64>() / results.len() as f64;
        100.0 - mean_risk
    });
    ReportSummary {
        healthy_count,
        distressed_count: results.len() - healthy_count,
        average_health_score,
    }
}
