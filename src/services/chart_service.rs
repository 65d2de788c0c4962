use std::fs;
use std::path::PathBuf;

use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use thiserror::Error;
use tracing::debug;

use crate::models::{ChartConfig, LineColor};

/// Most x-axis labels drawn before ticks start skipping dates
const MAX_X_LABELS: usize = 12;

/// Chart rendering errors
#[derive(Debug, Error)]
pub enum ChartError {
    #[error("Failed to render chart: {0}")]
    Render(String),
    #[error("Failed to read chart file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Chart task failed: {0}")]
    Task(String),
}

fn render_err<E: std::fmt::Display>(e: E) -> ChartError {
    ChartError::Render(e.to_string())
}

fn line_color(color: LineColor) -> RGBColor {
    match color {
        LineColor::Blue => BLUE,
        LineColor::Green => GREEN,
    }
}

/// Present points of a dataset as (index, price) pairs
fn points(data: &[Option<f64>]) -> Vec<(f64, f64)> {
    data.iter()
        .enumerate()
        .filter_map(|(i, value)| value.map(|price| (i as f64, price)))
        .collect()
}

/// Number of slots on the x-axis
fn x_extent(config: &ChartConfig) -> usize {
    config
        .datasets
        .iter()
        .map(|d| d.data.len())
        .chain(std::iter::once(config.labels.len()))
        .max()
        .unwrap_or(0)
        .max(1)
}

/// Padded price range over every present point
pub fn y_range(config: &ChartConfig) -> (f64, f64) {
    let values = config.datasets.iter().flat_map(|d| d.data.iter().flatten().copied());

    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }

    let span = max - min;
    let padding = if span > f64::EPSILON {
        span * 0.1
    } else {
        (max.abs() * 0.05).max(1.0)
    };
    let lower = if min >= 0.0 { (min - padding).max(0.0) } else { min - padding };

    (lower, max + padding)
}

/// Axis label for an x coordinate; blank between categories
pub fn label_at(labels: &[String], x: f64) -> String {
    let nearest = x.round();
    if (x - nearest).abs() > 0.25 || nearest < 0.0 {
        return String::new();
    }
    labels.get(nearest as usize).cloned().unwrap_or_default()
}

/// Render a line chart to PNG bytes
pub fn render_png(config: &ChartConfig, width: u32, height: u32) -> Result<Vec<u8>, ChartError> {
    let temp_file: PathBuf =
        std::env::temp_dir().join(format!("prediction_chart_{}.png", uuid::Uuid::new_v4()));

    let drawn = draw(config, &temp_file, width, height);
    let image_data = drawn.and_then(|_| fs::read(&temp_file).map_err(ChartError::from));

    // Clean up temporary file
    let _ = fs::remove_file(&temp_file);

    let image_data = image_data?;
    debug!("Rendered '{}' ({} bytes)", config.title, image_data.len());
    Ok(image_data)
}

/// Render on the blocking pool
pub async fn render_png_blocking(config: ChartConfig, width: u32, height: u32) -> Result<Vec<u8>, ChartError> {
    tokio::task::spawn_blocking(move || render_png(&config, width, height))
        .await
        .map_err(|e| ChartError::Task(e.to_string()))?
}

fn draw(config: &ChartConfig, path: &PathBuf, width: u32, height: u32) -> Result<(), ChartError> {
    let backend = BitMapBackend::new(path, (width, height));
    let root = backend.into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    let extent = x_extent(config);
    let (y_min, y_max) = y_range(config);

    let mut chart = ChartBuilder::on(&root)
        .caption(&config.title, ("sans-serif", 32.0).into_font())
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(-0.5f64..(extent as f64 - 0.5), y_min..y_max)
        .map_err(render_err)?;

    let labels = &config.labels;
    let x_formatter = |x: &f64| label_at(labels, *x);
    let y_formatter = |y: &f64| format!("{:.2}", y);

    chart
        .configure_mesh()
        .x_desc(config.x_title.as_str())
        .y_desc(config.y_title.as_str())
        .x_labels(extent.min(MAX_X_LABELS))
        .x_label_formatter(&x_formatter)
        .y_label_formatter(&y_formatter)
        .draw()
        .map_err(render_err)?;

    for dataset in &config.datasets {
        let data = points(&dataset.data);
        if data.is_empty() {
            continue;
        }

        let color = line_color(dataset.color);
        if dataset.fill {
            chart
                .draw_series(AreaSeries::new(data.clone(), y_min, &color.mix(0.2)))
                .map_err(render_err)?;
        }

        let style = color.stroke_width(2);
        let series = match dataset.dash {
            Some((dash, gap)) => chart.draw_series(DashedLineSeries::new(data, dash, gap, style)),
            None => chart.draw_series(LineSeries::new(data, style)),
        }
        .map_err(render_err)?;

        series
            .label(dataset.label.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], style));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(render_err)?;

    root.present().map_err(render_err)?;
    Ok(())
}
