//! Chart generation models

use crate::api::predictor::{PredictionResponse, SeriesPair};

pub const HISTORY_LABEL: &str = "Historical Price";
pub const FORECAST_LABEL: &str = "Forecasted Price";
pub const X_AXIS_TITLE: &str = "Date";
pub const Y_AXIS_TITLE: &str = "Price";

/// Dash pattern of the forecast line: (dash, gap) in pixels
pub const FORECAST_DASH: (u32, u32) = (5, 5);

/// Series colors understood by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineColor {
    Blue,
    Green,
}

/// Label axis plus the two overlaid series.
///
/// The forecast is left-padded with `None` so it starts where history ends.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub historical: Vec<Option<f64>>,
    pub forecast: Vec<Option<f64>>,
}

impl ChartSeries {
    pub fn new(history: &SeriesPair, forecast: &SeriesPair) -> Self {
        let labels = history.dates.iter().chain(forecast.dates.iter()).cloned().collect();

        let historical = history.prices.iter().copied().map(Some).collect();

        let forecast_points = std::iter::repeat(None)
            .take(history.prices.len())
            .chain(forecast.prices.iter().copied().map(Some))
            .collect();

        Self { labels, historical, forecast: forecast_points }
    }

    /// True when a date list and its price list disagree in length
    pub fn is_misaligned(history: &SeriesPair, forecast: &SeriesPair) -> bool {
        history.dates.len() != history.prices.len() || forecast.dates.len() != forecast.prices.len()
    }
}

/// One line on the chart
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub label: String,
    pub data: Vec<Option<f64>>,
    pub color: LineColor,
    pub dash: Option<(u32, u32)>,
    pub fill: bool,
}

/// Declarative line chart description handed to a chart surface
#[derive(Debug, Clone, PartialEq)]
pub struct ChartConfig {
    pub title: String,
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
    pub x_title: String,
    pub y_title: String,
}

impl ChartConfig {
    /// Build the prediction chart for `symbol`
    pub fn prediction(symbol: &str, response: &PredictionResponse) -> Self {
        let series = ChartSeries::new(&response.history, &response.forecast);

        Self {
            title: format!("Stock Price Prediction for {}", symbol.to_uppercase()),
            labels: series.labels,
            datasets: vec![
                Dataset {
                    label: HISTORY_LABEL.to_string(),
                    data: series.historical,
                    color: LineColor::Blue,
                    dash: None,
                    fill: false,
                },
                Dataset {
                    label: FORECAST_LABEL.to_string(),
                    data: series.forecast,
                    color: LineColor::Green,
                    dash: Some(FORECAST_DASH),
                    fill: false,
                },
            ],
            x_title: X_AXIS_TITLE.to_string(),
            y_title: Y_AXIS_TITLE.to_string(),
        }
    }
}
