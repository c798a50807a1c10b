//! Signal chart rendering.

use plotters::prelude::*;
use pulse_core::{ms_to_datetime, Error, Result, TimestampMs, WindowAggregate};
use std::path::Path;

const CHART_SIZE: (u32, u32) = (1320, 480);

/// Down-sample a long series for drawing.
///
/// When `points` exceeds `max_points`, consecutive points are grouped in
/// strides and each group is replaced by its minimum and maximum, both placed
/// at the group's first x. Peaks survive; the output holds at most about
/// `max_points` points.
pub fn adaptive_sample(
    points: &[(TimestampMs, f64)],
    max_points: usize,
) -> Vec<(TimestampMs, f64)> {
    if points.len() <= max_points || max_points < 2 {
        return points.to_vec();
    }
    let stride = (points.len() / (max_points / 2)).max(1);
    let mut out = Vec::with_capacity(2 * points.len().div_ceil(stride));
    for chunk in points.chunks(stride) {
        let x = chunk[0].0;
        let (lo, hi) = chunk
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(_, y)| {
                (lo.min(y), hi.max(y))
            });
        out.push((x, lo));
        out.push((x, hi));
    }
    out
}

fn plot_err<E: std::fmt::Display>(e: E) -> Error {
    Error::plot(e.to_string())
}

fn time_label(ms: &f64) -> String {
    ms_to_datetime(*ms as TimestampMs)
        .map(|t| t.format("%m-%d %H:%M").to_string())
        .unwrap_or_default()
}

/// Render the window means as an SVG line chart.
///
/// Returns the number of points drawn; an empty series draws nothing.
pub fn render_signal_chart(
    windows: &[WindowAggregate],
    path: &Path,
    title: &str,
    max_points: usize,
) -> Result<usize> {
    let series: Vec<(TimestampMs, f64)> = windows
        .iter()
        .filter(|w| w.mean_signal.is_finite())
        .map(|w| (w.start_ms(), w.mean_signal))
        .collect();
    if series.is_empty() {
        return Ok(0);
    }
    let points = adaptive_sample(&series, max_points);

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let (x_min, x_max) = (points[0].0 as f64, points[points.len() - 1].0 as f64);
    let x_max = if x_max > x_min { x_max } else { x_min + 60_000.0 };
    let (y_min, y_max) = points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(_, y)| {
            (lo.min(y), hi.max(y))
        });
    let pad = ((y_max - y_min) * 0.05).max(0.1);

    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 22))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, (y_min - pad)..(y_max + pad))
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .x_desc("Time (UTC)")
        .y_desc("Signal")
        .x_labels(8)
        .x_label_formatter(&time_label)
        .draw()
        .map_err(plot_err)?;

    chart
        .draw_series(LineSeries::new(
            points.iter().map(|&(x, y)| (x as f64, y)),
            &BLUE,
        ))
        .map_err(plot_err)?;

    root.present().map_err(plot_err)?;
    Ok(points.len())
}
