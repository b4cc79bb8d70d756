use crate::error::AppError;
use crate::models::api_types::{ErrorBody, HistoryEntry, HistoryResponse, PredictRequest, PredictResponse, Stats};
use crate::models::session_types::ClassificationResult;
use serde::de::DeserializeOwned;
use tracing::debug;

/// Client for the prediction service's JSON endpoints.
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, AppError> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn predict(&self, message: &str) -> Result<ClassificationResult, AppError> {
        debug!(chars = message.chars().count(), "POST /api/predict");
        let response = self
            .client
            .post(self.url("/api/predict"))
            .json(&PredictRequest { message })
            .send()
            .await?;
        let body: PredictResponse = decode(response).await?;
        Ok(ClassificationResult {
            label: body.prediction,
            confidence: body.confidence,
        })
    }

    pub async fn stats(&self) -> Result<Stats, AppError> {
        let response = self.client.get(self.url("/api/stats")).send().await?;
        decode(response).await
    }

    pub async fn history(&self) -> Result<Vec<HistoryEntry>, AppError> {
        let response = self.client.get(self.url("/api/history")).send().await?;
        let body: HistoryResponse = decode(response).await?;
        Ok(body.history)
    }

    pub async fn clear(&self) -> Result<(), AppError> {
        let response = self.client.delete(self.url("/api/clear")).send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        if let Ok(err) = serde_json::from_slice::<ErrorBody>(&body) {
            return Err(AppError::server(err.error));
        }
        if !status.is_success() {
            return Err(AppError::network(format!("DELETE /api/clear: HTTP {}", status)));
        }
        Ok(())
    }
}

/// The service answers failures with `{"error": "..."}`, sometimes under a
/// 200, sometimes under a 4xx/5xx. Check for that shape before anything else.
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, AppError> {
    let status = response.status();
    let url = response.url().path().to_string();
    let body = response.bytes().await?;

    if let Ok(err) = serde_json::from_slice::<ErrorBody>(&body) {
        return Err(AppError::server(err.error));
    }
    if !status.is_success() {
        return Err(AppError::network(format!("{}: HTTP {}", url, status)));
    }
    Ok(serde_json::from_slice(&body)?)
}
