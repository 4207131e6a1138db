//! Health-score bar chart keyed by company.

use plotters::prelude::*;

use crate::error::PipelineError;
use crate::predict::{HealthStatus, PredictionResult};

const CHART_SIZE: (u32, u32) = (900, 540);
const HEALTHY_BAR: RGBColor = RGBColor(0, 150, 0);
const DISTRESSED_BAR: RGBColor = RGBColor(220, 0, 0);

/// Render one bar per result (height = financial health score) as SVG.
pub fn health_score_chart(results: &[PredictionResult]) -> Result<String, PipelineError> {
    let mut svg = String::new();
    draw_chart(results, &mut svg).map_err(|err| PipelineError::Render {
        what: "health score chart",
        reason: err.to_string(),
    })?;
    Ok(svg)
}

fn draw_chart(results: &[PredictionResult], svg: &mut String) -> Result<(), Box<dyn std::error::Error>> {
    let root = SVGBackend::with_string(svg, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let slots = results.len().max(1);
    let label = |value: &SegmentValue<usize>| match value {
        SegmentValue::CenterOf(index) => results
            .get(*index)
            .map(|result| result.company.clone())
            .unwrap_or_default(),
        _ => String::new(),
    };
    let mut chart = ChartBuilder::on(&root)
        .caption("Financial Health Score by Company", ("sans-serif", 20).into_font())
        .margin(10)
        .x_label_area_size(60)
        .y_label_area_size(50)
        .build_cartesian_2d((0usize..slots).into_segmented(), 0f64..100f64)?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(slots)
        .x_label_formatter(&label)
        .x_desc("Company")
        .y_desc("Financial Health Score (0-100)")
        .draw()?;
    chart.draw_series(results.iter().enumerate().map(|(index, result)| {
        let color = match result.status {
            HealthStatus::Healthy => HEALTHY_BAR,
            HealthStatus::Distressed => DISTRESSED_BAR,
        };
        let mut bar = Rectangle::new(
            [
                (SegmentValue::Exact(index), 0.0),
                (SegmentValue::Exact(index + 1), result.health_score()),
            ],
            color.mix(0.8).filled(),
        );
        bar.set_margin(0, 0, 6, 6);
        bar
    }))?;
    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_one_bar_per_company() {
        let results = vec![
            PredictionResult {
                company: "Acme".into(),
                status: HealthStatus::Healthy,
                risk_probability: 10.0,
            },
            PredictionResult {
                company: "Beta".into(),
                status: HealthStatus::Distressed,
                risk_probability: 80.0,
            },
        ];
        let svg = health_score_chart(&results).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Acme"));
        assert!(svg.contains("Beta"));
        assert!(svg.contains("Financial Health Score by Company"));
    }

    #[test]
    fn renders_an_empty_chart_for_no_rows() {
        let svg = health_score_chart(&[]).unwrap();
        assert!(svg.contains("</svg>"));
    }
}
