use crate::models::api_types::HistoryEntry;
use crate::models::session_types::{ClassificationResult, InputMode, Label, PipelineStage};
use crate::models::view_types::{ExtractionView, PreviewView, ResultView, Tone, View};
use crate::services::session::Session;

const HISTORY_PREVIEW_CHARS: usize = 80;
const SCANNING_STATUS: &str = "recognizing text";
const EMPTY_HISTORY_ROW: &str = r#"<tr><td colspan="4" class="history-empty">No emails analyzed yet. Start by entering an email above!</td></tr>"#;

/// Projects a session onto what the webview should display.
pub fn project(session: &Session) -> View {
    let mode = session.mode();
    let stage = session.stage();

    let preview = stage.image().map(|image| PreviewView {
        src: image.preview.clone(),
        file_name: image.file_name.clone(),
        width: image.width,
        height: image.height,
    });

    let can_classify = !session.is_loading() && session.resolve_message().is_ok();

    View {
        revision: 0,
        mode,
        text_panel_visible: mode == InputMode::Text,
        image_panel_visible: mode == InputMode::Image,
        message_text: session.draft().to_string(),
        upload_area_visible: preview.is_none(),
        preview,
        extraction: extraction_view(stage),
        pipeline_stage: stage.name(),
        loading: session.is_loading(),
        result: session.result().map(result_view),
        stats: session.dashboard().stats.clone(),
        history_html: history_rows(&session.dashboard().history),
        can_classify,
    }
}

fn extraction_view(stage: &PipelineStage) -> Option<ExtractionView> {
    let (tone, heading, body) = match stage {
        PipelineStage::Empty => return None,
        PipelineStage::Staged { .. } | PipelineStage::Extracting { progress: None, .. } => (
            Tone::Pending,
            "Scanning email with OCR technology...".to_string(),
            None,
        ),
        PipelineStage::Extracting {
            progress: Some(progress),
            ..
        } => {
            let heading = if progress.status == SCANNING_STATUS {
                format!("Scanning... {}%", percent(progress.progress))
            } else {
                "Scanning email with OCR technology...".to_string()
            };
            (Tone::Pending, heading, None)
        }
        PipelineStage::ExtractedOk { text, .. } => (
            Tone::Success,
            "✅ Text Extracted Successfully".to_string(),
            Some(text.clone()),
        ),
        PipelineStage::ExtractedEmpty { .. } => (
            Tone::Warning,
            "⚠️ No text detected".to_string(),
            Some("Please upload a clearer image with visible text.".to_string()),
        ),
        PipelineStage::ExtractedFailed { .. } => (
            Tone::Error,
            "❌ Extraction Failed".to_string(),
            Some("Unable to extract text. Please try another image.".to_string()),
        ),
    };

    let html = match (&tone, &body) {
        (Tone::Pending, _) => format!(
            r#"<div class="scanner-status"><div class="spinner-small"></div> {}</div>"#,
            html_escape(&heading)
        ),
        (tone, body) => format!(
            r#"<div class="extraction-{}"><h5>{}</h5><p>{}</p></div>"#,
            tone_class(*tone),
            html_escape(&heading),
            html_escape(body.as_deref().unwrap_or_default())
        ),
    };

    Some(ExtractionView {
        tone,
        heading,
        body,
        html,
    })
}

fn percent(progress: f32) -> u32 {
    (progress.clamp(0.0, 1.0) * 100.0).round() as u32
}

fn tone_class(tone: Tone) -> &'static str {
    match tone {
        Tone::Pending => "pending",
        Tone::Success => "success",
        Tone::Warning => "warning",
        Tone::Error => "error",
    }
}

pub fn result_view(result: &ClassificationResult) -> ResultView {
    let is_spam = result.label == Label::Spam;
    let (icon, heading, subheading) = if is_spam {
        ("⚠️", "SPAM EMAIL DETECTED", "This email appears to be spam")
    } else {
        ("✅", "SAFE EMAIL", "This email appears to be legitimate")
    };
    let confidence_width = format!("{}%", result.confidence.clamp(0.0, 100.0));
    let confidence_label = format!("{}% Confidence", fixed1(result.confidence));
    let class_name = format!("result {}", result.label.as_str());

    let html = format!(
        r#"<div class="result-header"><div class="result-icon">{icon}</div><div class="result-text"><h3>{heading}</h3><p>{subheading}</p></div></div><div class="confidence-bar"><div class="confidence-fill" style="width: {confidence_width}">{confidence_label}</div></div>"#
    );

    ResultView {
        class_name,
        icon,
        heading,
        subheading,
        confidence_width,
        confidence_label,
        html,
    }
}

pub fn history_rows(history: &[HistoryEntry]) -> String {
    if history.is_empty() {
        return EMPTY_HISTORY_ROW.to_string();
    }

    history
        .iter()
        .map(|item| {
            format!(
                r#"<tr><td>{}</td><td><span class="badge {}">{}</span></td><td>{}%</td><td>{}</td></tr>"#,
                html_escape(&truncate_message(&item.message)),
                html_escape(&item.prediction),
                html_escape(&item.prediction.to_uppercase()),
                fixed1(item.confidence),
                html_escape(&item.timestamp)
            )
        })
        .collect()
}

/// One decimal place the way JavaScript's `toFixed(1)` does it. `{:.1}`
/// sends exact ties such as 62.25 to the even digit; these go up instead.
fn fixed1(value: f64) -> String {
    let quarters = value * 4.0;
    if quarters.fract() == 0.0 && quarters % 2.0 != 0.0 {
        return format!("{:.1}", (value * 10.0).round() / 10.0);
    }
    format!("{:.1}", value)
}

fn truncate_message(message: &str) -> String {
    let mut chars = message.chars();
    let head: String = chars.by_ref().take(HISTORY_PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
