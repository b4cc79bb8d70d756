//! Pure session state for the classifier window.
//!
//! A [`Session`] is a value: every transition consumes it and hands back the
//! next one, so the rendering layer can treat it as a snapshot. The only
//! shared handle is [`SessionStore`], which swaps whole sessions under a lock.

use crate::error::AppError;
use crate::models::api_types::{HistoryEntry, Stats};
use crate::models::session_types::{
    ClassificationResult, Dashboard, InputMode, OcrProgress, PipelineStage, StagedImage,
};
use crate::models::view_types::View;
use crate::services::render;
use std::sync::{Arc, Mutex, PoisonError};

pub const EMPTY_TEXT_PROMPT: &str = "Please enter an email to analyze!";
pub const MISSING_EXTRACTION_PROMPT: &str =
    "Please upload an email screenshot and wait for text extraction!";

#[derive(Debug, Clone, Default)]
pub struct Session {
    mode: InputMode,
    draft: String,
    stage: PipelineStage,
    /// Bumped on every upload and removal. OCR callbacks carry the value they
    /// were started with and are dropped once it no longer matches.
    generation: u64,
    result: Option<ClassificationResult>,
    /// Bumped whenever the visible result is invalidated, so a prediction
    /// that lands after the input changed is not shown.
    result_epoch: u64,
    loading: bool,
    dashboard: Dashboard,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn stage(&self) -> &PipelineStage {
        &self.stage
    }

    #[allow(dead_code)]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn result(&self) -> Option<&ClassificationResult> {
        self.result.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    pub fn extracted_text(&self) -> Option<&str> {
        self.stage.extracted_text()
    }

    /// True while OCR for `generation` is still the one the user is waiting on.
    pub fn is_extracting(&self, generation: u64) -> bool {
        generation == self.generation && matches!(self.stage, PipelineStage::Extracting { .. })
    }

    fn hide_result(mut self) -> Self {
        self.result = None;
        self.result_epoch += 1;
        self
    }

    pub fn select_mode(self, mode: InputMode) -> Self {
        let mut next = self.hide_result();
        next.mode = mode;
        next
    }

    pub fn set_draft(mut self, text: impl Into<String>) -> Self {
        self.draft = text.into();
        self
    }

    pub fn use_sample(self, text: impl Into<String>) -> Self {
        self.set_draft(text).select_mode(InputMode::Text)
    }

    pub fn clear_input(self) -> Self {
        let mut next = self.hide_result();
        next.draft.clear();
        next
    }

    /// Replaces whatever image was staged. Prior extracted text goes away in
    /// the same step because the whole stage is overwritten.
    pub fn stage_image(self, image: StagedImage) -> Self {
        let mut next = self.hide_result();
        next.generation += 1;
        next.stage = PipelineStage::Staged { image };
        next
    }

    pub fn begin_extraction(mut self, generation: u64) -> Self {
        if generation != self.generation {
            return self;
        }
        self.stage = match std::mem::take(&mut self.stage) {
            PipelineStage::Staged { image } => PipelineStage::Extracting {
                image,
                progress: None,
            },
            other => other,
        };
        self
    }

    /// Stages `image` and moves straight to `Extracting`. Returns the
    /// generation the OCR run must report back with.
    pub fn stage_and_extract(self, image: StagedImage) -> (Self, u64) {
        let staged = self.stage_image(image);
        let generation = staged.generation;
        (staged.begin_extraction(generation), generation)
    }

    pub fn record_progress(mut self, generation: u64, update: OcrProgress) -> Self {
        if generation != self.generation {
            return self;
        }
        if let PipelineStage::Extracting { progress, .. } = &mut self.stage {
            *progress = Some(update);
        }
        self
    }

    pub fn complete_extraction(mut self, generation: u64, outcome: Result<String, AppError>) -> Self {
        if !self.is_extracting(generation) {
            return self;
        }
        let image = match std::mem::take(&mut self.stage) {
            PipelineStage::Extracting { image, .. } => image,
            other => {
                self.stage = other;
                return self;
            }
        };
        self.stage = match outcome {
            Ok(raw) => {
                let text = raw.trim();
                if text.is_empty() {
                    PipelineStage::ExtractedEmpty { image }
                } else {
                    PipelineStage::ExtractedOk {
                        image,
                        text: text.to_string(),
                    }
                }
            }
            Err(err) => PipelineStage::ExtractedFailed {
                image,
                reason: err.message,
            },
        };
        self
    }

    pub fn remove_image(self) -> Self {
        let mut next = self.hide_result();
        next.generation += 1;
        next.stage = PipelineStage::Empty;
        next
    }

    /// The message a classification request would send right now.
    pub fn resolve_message(&self) -> Result<String, AppError> {
        match self.mode {
            InputMode::Text => {
                let message = self.draft.trim();
                if message.is_empty() {
                    return Err(AppError::validation(EMPTY_TEXT_PROMPT));
                }
                Ok(message.to_string())
            }
            InputMode::Image => self
                .extracted_text()
                .map(str::to_string)
                .ok_or_else(|| AppError::validation(MISSING_EXTRACTION_PROMPT)),
        }
    }

    /// Shows the loading indicator and returns the ticket the response must
    /// present to be displayed.
    pub fn begin_classification(self) -> (Self, u64) {
        let mut next = self.hide_result();
        next.loading = true;
        let ticket = next.result_epoch;
        (next, ticket)
    }

    pub fn finish_classification(mut self, ticket: u64, result: ClassificationResult) -> Self {
        self.loading = false;
        if ticket == self.result_epoch {
            self.result = Some(result);
        }
        self
    }

    pub fn fail_classification(mut self) -> Self {
        self.loading = false;
        self
    }

    pub fn with_stats(mut self, stats: Stats) -> Self {
        self.dashboard.stats = stats;
        self
    }

    pub fn with_history(mut self, history: Vec<HistoryEntry>) -> Self {
        self.dashboard.history = history;
        self
    }
}

/// Shared handle used by commands and background OCR tasks.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<Mutex<Slot>>,
}

#[derive(Default)]
struct Slot {
    session: Session,
    /// Bumped on every `update`, whether or not the transition changed
    /// anything. Stamped onto each rendered `View`.
    revision: u64,
}

impl Slot {
    fn render(&self) -> View {
        let mut view = render::project(&self.session);
        view.revision = self.revision;
        view
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> View {
        let guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        guard.render()
    }

    pub fn read<R>(&self, f: impl FnOnce(&Session) -> R) -> R {
        let guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&guard.session)
    }

    /// Runs one transition and returns the projected view of the result.
    pub fn apply(&self, f: impl FnOnce(Session) -> Session) -> View {
        self.update(|session| (f(session), ())).0
    }

    /// Like [`apply`](Self::apply) but lets the transition hand a value back
    /// computed under the same lock.
    pub fn update<R>(&self, f: impl FnOnce(Session) -> (Session, R)) -> (View, R) {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let current = std::mem::take(&mut guard.session);
        let (next, out) = f(current);
        guard.session = next;
        guard.revision += 1;
        (guard.render(), out)
    }
}
