use crate::models::session_types::Label;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct PredictRequest<'a> {
    pub message: &'a str,
}

/// Successful `/api/predict` body. Error bodies are caught before this is
/// decoded.
#[derive(Debug, Deserialize)]
pub struct PredictResponse {
    pub prediction: Label,
    pub confidence: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub total: u64,
    pub spam: u64,
    pub ham: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_confidence: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(default)]
    pub id: Option<i64>,
    pub message: String,
    /// Kept as the service sent it so one odd row doesn't fail the whole
    /// history fetch.
    pub prediction: String,
    pub confidence: f64,
    pub timestamp: String,
}

#[derive(Debug, Deserialize)]
pub struct HistoryResponse {
    pub history: Vec<HistoryEntry>,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
