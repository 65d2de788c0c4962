use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Request body for POST /predict
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictionRequest {
    pub symbol: String,
}

/// Parallel date/price sequences
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SeriesPair {
    #[serde(default)]
    pub dates: Vec<String>,
    #[serde(default)]
    pub prices: Vec<f64>,
}

/// Success response from POST /predict
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PredictionResponse {
    #[serde(default)]
    pub prediction_trend: Option<String>,
    #[serde(default)]
    pub sentiment_score: Option<String>,
    #[serde(default)]
    pub history: SeriesPair,
    #[serde(default)]
    pub forecast: SeriesPair,
}

/// Error body returned with non-2xx statuses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: Option<String>,
}

/// Errors from the prediction endpoint.
///
/// `Http` displays as its bare message, which is what users get to see.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// Non-2xx status
    #[error("{message}")]
    Http { status: u16, message: String },
    /// Network/request error
    #[error("Request failed: {0}")]
    Request(String),
    /// Deserialization error
    #[error("Failed to parse response: {0}")]
    Deserialization(String),
}

impl ApiError {
    /// Build an `Http` error from a non-2xx status and its raw body
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorResponse>(body)
            .ok()
            .and_then(|e| e.error)
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| format!("HTTP error! Status: {}", status));
        ApiError::Http { status, message }
    }
}
