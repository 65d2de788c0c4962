use std::time::Duration;

use reqwest::Client as HttpClient;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serenity::async_trait;
use tracing::{debug, warn};

use super::models::{ApiError, PredictionRequest, PredictionResponse};
use crate::services::prediction_service::PredictionSource;

/// Client for the stock prediction backend
#[derive(Debug, Clone)]
pub struct PredictorClient {
    http_client: HttpClient,
    endpoint: String,
}

impl PredictorClient {
    /// Create a client posting to `endpoint`, giving up after `timeout`
    pub fn new(endpoint: String, timeout: Duration) -> Result<Self, ApiError> {
        let http_client = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Request(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { http_client, endpoint })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn create_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }

    /// POST /predict
    ///
    /// Sends `{"symbol": ...}` and returns the parsed prediction.
    ///
    /// # Returns
    /// * `Ok(PredictionResponse)` - History, forecast and sentiment labels
    /// * `Err(ApiError::Http)` - Non-2xx status, message taken from the `error` field
    /// * `Err(ApiError::Request | ApiError::Deserialization)` - Transport or parse failure
    pub async fn predict(&self, symbol: &str) -> Result<PredictionResponse, ApiError> {
        let body = PredictionRequest { symbol: symbol.to_string() };
        debug!("POST {} for {}", self.endpoint, symbol);

        let response = self.http_client
            .post(&self.endpoint)
            .headers(Self::create_headers())
            .json(&body)
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            warn!("Prediction endpoint returned {} for {}", status.as_u16(), symbol);
            return Err(ApiError::from_status(status.as_u16(), &body_text));
        }

        response
            .json::<PredictionResponse>()
            .await
            .map_err(|e| ApiError::Deserialization(e.to_string()))
    }
}

#[async_trait]
impl PredictionSource for PredictorClient {
    async fn predict(&self, symbol: &str) -> Result<PredictionResponse, ApiError> {
        PredictorClient::predict(self, symbol).await
    }
}
