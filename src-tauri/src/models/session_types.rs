use crate::models::api_types::{HistoryEntry, Stats};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    #[default]
    Text,
    Image,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Spam,
    Ham,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Spam => "spam",
            Label::Ham => "ham",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationResult {
    pub label: Label,
    /// 0..=100
    pub confidence: f64,
}

/// An uploaded image that passed validation and has a displayable preview.
#[derive(Debug, Clone)]
pub struct StagedImage {
    pub file_name: String,
    pub media_type: String,
    pub bytes: Arc<[u8]>,
    pub width: u32,
    pub height: u32,
    /// `data:` URL handed to the webview.
    pub preview: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrProgress {
    pub status: String,
    /// 0.0..=1.0 as reported by the engine.
    pub progress: f32,
}

#[derive(Debug, Clone, Default)]
pub enum PipelineStage {
    #[default]
    Empty,
    Staged {
        image: StagedImage,
    },
    Extracting {
        image: StagedImage,
        progress: Option<OcrProgress>,
    },
    ExtractedOk {
        image: StagedImage,
        text: String,
    },
    ExtractedEmpty {
        image: StagedImage,
    },
    ExtractedFailed {
        image: StagedImage,
        #[allow(dead_code)]
        reason: String,
    },
}

impl PipelineStage {
    pub fn image(&self) -> Option<&StagedImage> {
        match self {
            PipelineStage::Empty => None,
            PipelineStage::Staged { image }
            | PipelineStage::Extracting { image, .. }
            | PipelineStage::ExtractedOk { image, .. }
            | PipelineStage::ExtractedEmpty { image }
            | PipelineStage::ExtractedFailed { image, .. } => Some(image),
        }
    }

    pub fn extracted_text(&self) -> Option<&str> {
        match self {
            PipelineStage::ExtractedOk { text, .. } => Some(text),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PipelineStage::Empty => "empty",
            PipelineStage::Staged { .. } => "staged",
            PipelineStage::Extracting { .. } => "extracting",
            PipelineStage::ExtractedOk { .. } => "extracted_ok",
            PipelineStage::ExtractedEmpty { .. } => "extracted_empty",
            PipelineStage::ExtractedFailed { .. } => "extracted_failed",
        }
    }
}

/// Last stats/history snapshot fetched from the prediction service.
#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    pub stats: Stats,
    pub history: Vec<HistoryEntry>,
}
