//! Prediction form controller
//!
//! Drives one submission from raw input to a rendered chart: validation,
//! busy state, the backend call, result displays and the chart slot. The
//! surface (buttons, text fields, chart canvas) sits behind [`PredictionView`]
//! and the backend behind [`PredictionSource`].

use serenity::async_trait;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::api::predictor::{ApiError, PredictionResponse};
use crate::models::{display_text, normalize_symbol, ChartConfig, ChartSeries};
use crate::services::chart_service::ChartError;

pub const SUBMIT_LABEL: &str = "PREDICT THE FUTURE";
pub const BUSY_LABEL: &str = "Analyzing...";
pub const LOADING_TEXT: &str = "Loading...";
pub const ERROR_TEXT: &str = "Error";
pub const EMPTY_SYMBOL_ALERT: &str = "Please enter a stock symbol.";

/// Backend that turns a symbol into a prediction
#[async_trait]
pub trait PredictionSource: Send + Sync {
    async fn predict(&self, symbol: &str) -> Result<PredictionResponse, ApiError>;
}

/// Surface errors
#[derive(Debug, Error)]
pub enum ViewError {
    #[error(transparent)]
    Chart(#[from] ChartError),
    #[error("Surface error: {0}")]
    Surface(String),
}

/// The form and result widgets the controller drives
#[async_trait]
pub trait PredictionView: Send {
    /// Handle to a drawn chart, released through `destroy_chart`
    type Chart: Send;

    async fn set_submit_control(&mut self, label: &str, enabled: bool) -> Result<(), ViewError>;
    async fn set_results(&mut self, prediction: &str, sentiment: &str) -> Result<(), ViewError>;
    async fn alert(&mut self, message: &str) -> Result<(), ViewError>;
    async fn draw_chart(&mut self, config: &ChartConfig) -> Result<Self::Chart, ViewError>;
    async fn destroy_chart(&mut self, chart: Self::Chart) -> Result<(), ViewError>;
}

/// How a submission ended
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Empty input, nothing was sent
    Rejected,
    Rendered { symbol: String },
    Failed { symbol: String, message: String },
}

#[derive(Debug, Error)]
enum SubmitError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    View(#[from] ViewError),
}

/// Owns the prediction source and the single live chart
pub struct PredictionController<S, H> {
    source: S,
    chart: Option<H>,
}

impl<S, H> PredictionController<S, H>
where
    S: PredictionSource,
    H: Send,
{
    pub fn new(source: S) -> Self {
        Self { source, chart: None }
    }

    /// Handle one form submission.
    ///
    /// The submit control is restored on every path that gets past validation.
    pub async fn submit<V>(&mut self, view: &mut V, input: &str) -> Outcome
    where
        V: PredictionView<Chart = H>,
    {
        let Some(symbol) = normalize_symbol(input) else {
            info!("Rejected prediction request with empty symbol");
            if let Err(e) = view.alert(EMPTY_SYMBOL_ALERT).await {
                warn!("Failed to show validation alert: {}", e);
            }
            return Outcome::Rejected;
        };

        info!("🔮 Predicting {}", symbol);
        let outcome = match self.run(view, &symbol).await {
            Ok(()) => {
                info!("✓ Prediction for {} rendered", symbol);
                Outcome::Rendered { symbol }
            }
            Err(e) => {
                let message = e.to_string();
                warn!("Prediction for {} failed: {}", symbol, message);

                if let Err(e) = view.set_results(ERROR_TEXT, ERROR_TEXT).await {
                    warn!("Failed to show error state: {}", e);
                }
                if let Err(e) = view.alert(&message).await {
                    warn!("Failed to show error alert: {}", e);
                }
                Outcome::Failed { symbol, message }
            }
        };

        if let Err(e) = view.set_submit_control(SUBMIT_LABEL, true).await {
            warn!("Failed to restore submit control: {}", e);
        }

        outcome
    }

    async fn run<V>(&mut self, view: &mut V, symbol: &str) -> Result<(), SubmitError>
    where
        V: PredictionView<Chart = H>,
    {
        // The busy state is cosmetic; the request goes out regardless
        if let Err(e) = view.set_submit_control(BUSY_LABEL, false).await {
            warn!("Failed to show busy control: {}", e);
        }
        if let Err(e) = view.set_results(LOADING_TEXT, LOADING_TEXT).await {
            warn!("Failed to show loading state: {}", e);
        }

        let response = self.source.predict(symbol).await?;
        debug!(
            "Received {} history and {} forecast points for {}",
            response.history.prices.len(),
            response.forecast.prices.len(),
            symbol
        );

        self.update_ui(view, symbol, &response).await?;
        Ok(())
    }

    async fn update_ui<V>(
        &mut self,
        view: &mut V,
        symbol: &str,
        response: &PredictionResponse,
    ) -> Result<(), ViewError>
    where
        V: PredictionView<Chart = H>,
    {
        view.set_results(
            display_text(response.prediction_trend.as_deref()),
            display_text(response.sentiment_score.as_deref()),
        )
        .await?;

        if ChartSeries::is_misaligned(&response.history, &response.forecast) {
            warn!(
                "Series length mismatch for {}: history {}/{}, forecast {}/{}",
                symbol,
                response.history.dates.len(),
                response.history.prices.len(),
                response.forecast.dates.len(),
                response.forecast.prices.len()
            );
        }

        // Release the previous chart before drawing its replacement
        if let Some(previous) = self.chart.take() {
            view.destroy_chart(previous).await?;
        }

        let config = ChartConfig::prediction(symbol, response);
        self.chart = Some(view.draw_chart(&config).await?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::predictor::SeriesPair;
    use std::sync::Mutex;

    struct FakeSource {
        result: Result<PredictionResponse, ApiError>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeSource {
        fn returning(result: Result<PredictionResponse, ApiError>) -> Self {
            Self { result, calls: Mutex::new(Vec::new()) }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PredictionSource for FakeSource {
        async fn predict(&self, symbol: &str) -> Result<PredictionResponse, ApiError> {
            self.calls.lock().unwrap().push(symbol.to_string());
            self.result.clone()
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Control(String, bool),
        Results(String, String),
        Alert(String),
        Draw(u32, ChartConfig),
        Destroy(u32),
    }

    #[derive(Default)]
    struct FakeView {
        events: Vec<Event>,
        next_chart: u32,
        fail_draw: bool,
        fail_alert: bool,
        fail_panel: bool,
    }

    impl FakeView {
        fn panel_result(&self) -> Result<(), ViewError> {
            if self.fail_panel {
                return Err(ViewError::Surface("Failed to update panel: Unknown Message".to_string()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl PredictionView for FakeView {
        type Chart = u32;

        async fn set_submit_control(&mut self, label: &str, enabled: bool) -> Result<(), ViewError> {
            self.events.push(Event::Control(label.to_string(), enabled));
            self.panel_result()
        }

        async fn set_results(&mut self, prediction: &str, sentiment: &str) -> Result<(), ViewError> {
            self.events.push(Event::Results(prediction.to_string(), sentiment.to_string()));
            self.panel_result()
        }

        async fn alert(&mut self, message: &str) -> Result<(), ViewError> {
            self.events.push(Event::Alert(message.to_string()));
            if self.fail_alert {
                return Err(ViewError::Surface("alert dropped".to_string()));
            }
            Ok(())
        }

        async fn draw_chart(&mut self, config: &ChartConfig) -> Result<u32, ViewError> {
            if self.fail_draw {
                return Err(ViewError::Surface("canvas gone".to_string()));
            }
            self.next_chart += 1;
            self.events.push(Event::Draw(self.next_chart, config.clone()));
            Ok(self.next_chart)
        }

        async fn destroy_chart(&mut self, chart: u32) -> Result<(), ViewError> {
            self.events.push(Event::Destroy(chart));
            Ok(())
        }
    }

    fn pair(dates: &[&str], prices: &[f64]) -> SeriesPair {
        SeriesPair {
            dates: dates.iter().map(|d| d.to_string()).collect(),
            prices: prices.to_vec(),
        }
    }

    fn sample_response() -> PredictionResponse {
        PredictionResponse {
            prediction_trend: Some("Up".to_string()),
            sentiment_score: Some("Positive (0.93)".to_string()),
            history: pair(&["d1", "d2"], &[10.0, 20.0]),
            forecast: pair(&["d3"], &[30.0]),
        }
    }

    fn restored(events: &[Event]) -> bool {
        events.last() == Some(&Event::Control(SUBMIT_LABEL.to_string(), true))
    }

    #[tokio::test]
    async fn test_empty_symbol_is_rejected() {
        for input in ["", "   ", "\t\n"] {
            let mut controller = PredictionController::new(FakeSource::returning(Ok(sample_response())));
            let mut view = FakeView::default();

            let outcome = controller.submit(&mut view, input).await;

            assert_eq!(outcome, Outcome::Rejected);
            assert!(controller.source.calls().is_empty());
            assert_eq!(view.events, vec![Event::Alert(EMPTY_SYMBOL_ALERT.to_string())]);
        }
    }

    #[tokio::test]
    async fn test_successful_prediction() {
        let mut controller = PredictionController::new(FakeSource::returning(Ok(sample_response())));
        let mut view = FakeView::default();

        let outcome = controller.submit(&mut view, "aapl").await;

        assert_eq!(outcome, Outcome::Rendered { symbol: "AAPL".to_string() });
        assert_eq!(controller.source.calls(), vec!["AAPL"]);
        assert!(controller.chart.is_some());

        let expected_chart = ChartConfig::prediction("AAPL", &sample_response());
        assert_eq!(
            view.events,
            vec![
                Event::Control(BUSY_LABEL.to_string(), false),
                Event::Results(LOADING_TEXT.to_string(), LOADING_TEXT.to_string()),
                Event::Results("Up".to_string(), "Positive (0.93)".to_string()),
                Event::Draw(1, expected_chart.clone()),
                Event::Control(SUBMIT_LABEL.to_string(), true),
            ]
        );
        assert_eq!(expected_chart.labels, vec!["d1", "d2", "d3"]);
        assert_eq!(expected_chart.datasets[0].data, vec![Some(10.0), Some(20.0)]);
        assert_eq!(expected_chart.datasets[1].data, vec![None, None, Some(30.0)]);
        assert_eq!(expected_chart.title, "Stock Price Prediction for AAPL");
    }

    #[tokio::test]
    async fn test_missing_labels_show_placeholder() {
        let response = PredictionResponse {
            prediction_trend: None,
            sentiment_score: Some(String::new()),
            ..sample_response()
        };
        let mut controller = PredictionController::new(FakeSource::returning(Ok(response)));
        let mut view = FakeView::default();

        controller.submit(&mut view, "msft").await;

        assert!(view.events.contains(&Event::Results("N/A".to_string(), "N/A".to_string())));
    }

    #[tokio::test]
    async fn test_http_error_shows_error_state() {
        let error = ApiError::from_status(400, r#"{"error":"bad symbol"}"#);
        let mut controller = PredictionController::<_, u32>::new(FakeSource::returning(Err(error)));
        let mut view = FakeView::default();

        let outcome = controller.submit(&mut view, "zzzz").await;

        assert_eq!(
            outcome,
            Outcome::Failed { symbol: "ZZZZ".to_string(), message: "bad symbol".to_string() }
        );
        assert!(view.events.contains(&Event::Results(ERROR_TEXT.to_string(), ERROR_TEXT.to_string())));
        assert!(view.events.contains(&Event::Alert("bad symbol".to_string())));
        assert!(!view.events.iter().any(|e| matches!(e, Event::Draw(..))));
        assert!(restored(&view.events));
        assert!(!controller.chart.is_some());
    }

    #[tokio::test]
    async fn test_status_only_error_mentions_status() {
        let error = ApiError::from_status(503, "");
        let mut controller = PredictionController::<_, u32>::new(FakeSource::returning(Err(error)));
        let mut view = FakeView::default();

        match controller.submit(&mut view, "AAPL").await {
            Outcome::Failed { message, .. } => assert!(message.contains("503")),
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert!(restored(&view.events));
    }

    #[tokio::test]
    async fn test_second_prediction_replaces_chart() {
        let mut controller = PredictionController::new(FakeSource::returning(Ok(sample_response())));
        let mut view = FakeView::default();

        controller.submit(&mut view, "AAPL").await;
        view.events.clear();
        controller.submit(&mut view, "AAPL").await;

        let destroy = view.events.iter().position(|e| *e == Event::Destroy(1));
        let draw = view.events.iter().position(|e| matches!(e, Event::Draw(2, _)));
        assert!(destroy.is_some() && draw.is_some());
        assert!(destroy < draw);
        assert_eq!(view.events.iter().filter(|e| matches!(e, Event::Draw(..))).count(), 1);
        assert!(restored(&view.events));
    }

    #[tokio::test]
    async fn test_render_failure_funnels_into_error_path() {
        let mut controller = PredictionController::new(FakeSource::returning(Ok(sample_response())));
        let mut view = FakeView { fail_draw: true, ..Default::default() };

        let outcome = controller.submit(&mut view, "AAPL").await;

        assert!(matches!(outcome, Outcome::Failed { .. }));
        assert!(view.events.contains(&Event::Results(ERROR_TEXT.to_string(), ERROR_TEXT.to_string())));
        assert!(restored(&view.events));
        assert!(!controller.chart.is_some());
    }

    #[tokio::test]
    async fn test_control_restored_when_alert_fails() {
        let error = ApiError::Request("connection refused".to_string());
        let mut controller = PredictionController::<_, u32>::new(FakeSource::returning(Err(error)));
        let mut view = FakeView { fail_alert: true, ..Default::default() };

        let outcome = controller.submit(&mut view, "AAPL").await;

        assert_eq!(
            outcome,
            Outcome::Failed {
                symbol: "AAPL".to_string(),
                message: "Request failed: connection refused".to_string(),
            }
        );
        assert!(restored(&view.events));
    }

    #[tokio::test]
    async fn test_unreachable_panel_still_sends_request() {
        let mut controller = PredictionController::new(FakeSource::returning(Ok(sample_response())));
        let mut view = FakeView { fail_panel: true, ..Default::default() };

        let outcome = controller.submit(&mut view, "aapl").await;

        assert_eq!(controller.source.calls(), vec!["AAPL"]);
        assert_eq!(view.events[0], Event::Control(BUSY_LABEL.to_string(), false));
        assert_eq!(view.events[1], Event::Results(LOADING_TEXT.to_string(), LOADING_TEXT.to_string()));
        assert_eq!(
            outcome,
            Outcome::Failed {
                symbol: "AAPL".to_string(),
                message: "Surface error: Failed to update panel: Unknown Message".to_string(),
            }
        );
        assert!(restored(&view.events));
    }
}
