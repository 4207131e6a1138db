//! Beeswarm summary plot of attributions.

use std::path::Path;

use plotters::prelude::*;

use crate::error::PipelineError;
use crate::fs_ops;

use super::AttributionSummary;

const PLOT_WIDTH: u32 = 900;
const ROW_HEIGHT_PX: u32 = 34;
const MIN_HEIGHT: u32 = 240;
/// Points closer than this share a swarm bin (fraction of the x range).
const SWARM_BIN: f64 = 0.01;
const SWARM_STEP: f64 = 0.06;
const SWARM_SPREAD: f64 = 0.4;
const LOW_COLOR: (f64, f64, f64) = (0.0, 138.0, 230.0);
const HIGH_COLOR: (f64, f64, f64) = (255.0, 0.0, 82.0);

/// Render the top `max_display` features as an SVG beeswarm.
///
/// The most important feature is drawn at the top. Each row's point sits at
/// its attribution value, colored by the feature's normalized value (blue
/// low, red high).
pub fn render_summary_plot(summary: &AttributionSummary, max_display: usize) -> Result<String, PipelineError> {
    let mut svg = String::new();
    draw(summary, max_display, &mut svg).map_err(|err| PipelineError::Render {
        what: "attribution summary plot",
        reason: err.to_string(),
    })?;
    Ok(svg)
}

/// Render and atomically write the summary plot to `path`.
pub fn write_summary_plot(
    summary: &AttributionSummary,
    max_display: usize,
    path: &Path,
) -> Result<(), PipelineError> {
    let svg = render_summary_plot(summary, max_display)?;
    fs_ops::atomic_write(path, svg.as_bytes()).map_err(|source| PipelineError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), "Wrote attribution summary plot");
    Ok(())
}

fn draw(summary: &AttributionSummary, max_display: usize, svg: &mut String) -> Result<(), Box<dyn std::error::Error>> {
    let shown = summary.top(max_display);
    let lanes = shown.len().max(1);
    let height = (ROW_HEIGHT_PX * lanes as u32 + 120).max(MIN_HEIGHT);

    let (mut x_min, mut x_max) = summary
        .values
        .iter()
        .flat_map(|row| shown.iter().map(move |f| row[f.index]))
        .fold((0f64, 0f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let pad = ((x_max - x_min) * 0.05).max(1e-3);
    x_min -= pad;
    x_max += pad;

    let root = SVGBackend::with_string(svg, (PLOT_WIDTH, height)).into_drawing_area();
    root.fill(&WHITE)?;
    // lane 0 is the bottom of the chart; the top feature gets the last lane
    let lane_of = |rank: usize| (lanes - 1 - rank) as f64;
    let label = |y: &f64| {
        let rounded = y.round();
        if (y - rounded).abs() > 1e-6 || rounded < 0.0 {
            return String::new();
        }
        let rank = lanes as i64 - 1 - rounded as i64;
        usize::try_from(rank)
            .ok()
            .and_then(|rank| shown.get(rank))
            .map(|f| f.name.clone())
            .unwrap_or_default()
    };
    let mut chart = ChartBuilder::on(&root)
        .caption(
            "Feature attributions (color: feature value, blue low / red high)",
            ("sans-serif", 18).into_font(),
        )
        .margin(10)
        .x_label_area_size(45)
        .y_label_area_size(180)
        .build_cartesian_2d(x_min..x_max, -0.5f64..(lanes as f64 - 0.5))?;
    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(lanes)
        .y_label_formatter(&label)
        .x_desc("Attribution (impact on log-odds of distress)")
        .draw()?;
    chart.draw_series(LineSeries::new(
        [(0.0, -0.5), (0.0, lanes as f64 - 0.5)],
        BLACK.mix(0.4),
    ))?;

    let x_span = x_max - x_min;
    for (rank, feature) in shown.iter().enumerate() {
        let column: Vec<(f64, f32)> = summary
            .values
            .iter()
            .zip(&summary.feature_values)
            .map(|(phi, values)| (phi[feature.index], values[feature.index]))
            .collect();
        let (lo, hi) = column
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &(_, v)| (lo.min(v), hi.max(v)));
        let offsets = swarm_offsets(&column.iter().map(|&(phi, _)| phi).collect::<Vec<_>>(), x_span);
        let lane = lane_of(rank);
        chart.draw_series(column.iter().zip(offsets).map(|(&(phi, value), offset)| {
            let t = if hi > lo { ((value - lo) / (hi - lo)) as f64 } else { 0.5 };
            Circle::new((phi, lane + offset), 3, value_color(t).filled())
        }))?;
    }
    root.present()?;
    Ok(())
}

/// Vertical offsets that spread points sharing an x bin, alternating above
/// and below the lane center.
fn swarm_offsets(xs: &[f64], x_span: f64) -> Vec<f64> {
    let bin_width = (x_span * SWARM_BIN).max(f64::MIN_POSITIVE);
    let mut seen: std::collections::HashMap<i64, usize> = std::collections::HashMap::new();
    xs.iter()
        .map(|&x| {
            let count = seen.entry((x / bin_width).floor() as i64).or_insert(0);
            let k = *count;
            *count += 1;
            let magnitude = (((k + 1) / 2) as f64 * SWARM_STEP).min(SWARM_SPREAD);
            if k % 2 == 1 { magnitude } else { -magnitude }
        })
        .collect()
}

fn value_color(t: f64) -> RGBColor {
    let t = t.clamp(0.0, 1.0);
    let mix = |a: f64, b: f64| (a + (b - a) * t).round() as u8;
    RGBColor(
        mix(LOW_COLOR.0, HIGH_COLOR.0),
        mix(LOW_COLOR.1, HIGH_COLOR.1),
        mix(LOW_COLOR.2, HIGH_COLOR.2),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::explain::FeatureImportance;
    use tempfile::tempdir;

    fn summary() -> AttributionSummary {
        AttributionSummary {
            feature_names: vec!["Debt_Ratio".into(), "ROA".into(), "Quick_Ratio".into()],
            values: vec![vec![0.8, -0.1, 0.0], vec![-0.6, 0.2, 0.01], vec![0.7, 0.05, 0.0]],
            feature_values: vec![vec![0.9, 0.1, 1.0], vec![0.2, 0.3, 1.0], vec![0.8, 0.2, 1.0]],
            expected_value: -0.4,
            importance: vec![
                FeatureImportance {
                    name: "Debt_Ratio".into(),
                    index: 0,
                    mean_abs: 0.7,
                },
                FeatureImportance {
                    name: "ROA".into(),
                    index: 1,
                    mean_abs: 0.1167,
                },
                FeatureImportance {
                    name: "Quick_Ratio".into(),
                    index: 2,
                    mean_abs: 0.0033,
                },
            ],
        }
    }

    #[test]
    fn shows_only_the_top_features() {
        let svg = render_summary_plot(&summary(), 2).unwrap();
        assert!(svg.contains("Debt_Ratio"));
        assert!(svg.contains("ROA"));
        assert!(!svg.contains("Quick_Ratio"));
    }

    #[test]
    fn writes_svg_to_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("reports").join("summary.svg");
        write_summary_plot(&summary(), 20, &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("</svg>"));
        assert!(text.contains("Quick_Ratio"));
    }

    #[test]
    fn swarm_spreads_colliding_points() {
        let offsets = swarm_offsets(&[0.5, 0.5, 0.5, 2.0], 10.0);
        assert_eq!(offsets[0], 0.0);
        assert!(offsets[1] > 0.0);
        assert!(offsets[2] < 0.0);
        assert_eq!(offsets[3], 0.0);
    }

    #[test]
    fn colors_run_from_blue_to_red() {
        assert_eq!(value_color(0.0), RGBColor(0, 138, 230));
        assert_eq!(value_color(1.0), RGBColor(255, 0, 82));
    }
}
