use crate::models::api_types::Stats;
use crate::models::session_types::InputMode;
use serde::Serialize;

/// Everything the webview needs to paint one frame.
#[derive(Debug, Clone, Serialize)]
pub struct View {
    /// Store revision this frame was rendered from. The webview ignores any
    /// frame older than the last one it painted.
    pub revision: u64,
    pub mode: InputMode,
    pub text_panel_visible: bool,
    pub image_panel_visible: bool,
    pub message_text: String,
    pub upload_area_visible: bool,
    pub preview: Option<PreviewView>,
    pub extraction: Option<ExtractionView>,
    pub pipeline_stage: &'static str,
    pub loading: bool,
    pub result: Option<ResultView>,
    pub stats: Stats,
    pub history_html: String,
    pub can_classify: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PreviewView {
    pub src: String,
    pub file_name: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Pending,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractionView {
    pub tone: Tone,
    pub heading: String,
    pub body: Option<String>,
    pub html: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResultView {
    pub class_name: String,
    pub icon: &'static str,
    pub heading: &'static str,
    pub subheading: &'static str,
    pub confidence_width: String,
    pub confidence_label: String,
    pub html: String,
}
