use crate::models::session_types::OcrProgress;
use crate::models::view_types::View;
use crate::services::ocr::OcrEngine;
use crate::services::session::SessionStore;
use std::sync::Arc;
use tracing::{info, warn};

pub type ViewSink = Arc<dyn Fn(View) + Send + Sync>;

/// Runs OCR for the image staged under `generation` and folds the outcome
/// back into the session. `on_change` only sees updates that were applied;
/// anything arriving after a newer upload or a removal is dropped.
pub async fn run_extraction(
    store: SessionStore,
    engine: Arc<dyn OcrEngine>,
    image: Arc<[u8]>,
    generation: u64,
    language: String,
    on_change: ViewSink,
) {
    let progress_store = store.clone();
    let progress_sink = on_change.clone();
    let report = move |progress: OcrProgress| {
        let (view, applied) = progress_store.update(|session| {
            let applied = session.is_extracting(generation);
            (session.record_progress(generation, progress), applied)
        });
        if applied {
            progress_sink(view);
        }
    };

    let outcome = engine.recognize(&image, &language, &report).await;
    if let Err(e) = &outcome {
        warn!(generation, "OCR failed: {}", e);
    }

    let (view, applied) = store.update(|session| {
        let applied = session.is_extracting(generation);
        (session.complete_extraction(generation, outcome), applied)
    });

    if applied {
        info!(generation, stage = view.pipeline_stage, "Extraction finished");
        on_change(view);
    } else {
        info!(generation, "Discarding OCR result for a replaced image");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::session_types::{PipelineStage, StagedImage};
    use crate::services::ocr::ProgressCallback;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tokio::sync::Notify;

    struct ScriptedEngine {
        text: Result<String, AppError>,
        progress: Vec<f32>,
        gate: Option<Arc<Notify>>,
    }

    #[async_trait]
    impl OcrEngine for ScriptedEngine {
        async fn recognize(
            &self,
            _image: &[u8],
            language: &str,
            progress: ProgressCallback<'_>,
        ) -> Result<String, AppError> {
            assert_eq!(language, "eng");
            for p in &self.progress {
                progress(OcrProgress {
                    status: "recognizing text".to_string(),
                    progress: *p,
                });
            }
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            self.text.clone()
        }
    }

    fn image(name: &str) -> StagedImage {
        StagedImage {
            file_name: name.to_string(),
            media_type: "image/png".to_string(),
            bytes: Arc::from(vec![0u8; 8]),
            width: 2,
            height: 2,
            preview: "data:image/png;base64,AA==".to_string(),
        }
    }

    fn recording_sink() -> (ViewSink, Arc<Mutex<Vec<View>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink_seen = seen.clone();
        (Arc::new(move |view: View| sink_seen.lock().unwrap().push(view)), seen)
    }

    async fn run(store: &SessionStore, engine: ScriptedEngine, generation: u64, sink: ViewSink) {
        run_extraction(
            store.clone(),
            Arc::new(engine),
            Arc::from(vec![0u8; 8]),
            generation,
            "eng".to_string(),
            sink,
        )
        .await;
    }

    #[tokio::test]
    async fn successful_run_emits_progress_then_result() {
        let store = SessionStore::new();
        let (_, generation) = store.update(|s| s.stage_and_extract(image("a")));
        let (sink, seen) = recording_sink();

        let engine = ScriptedEngine {
            text: Ok("  Your account is locked \n".to_string()),
            progress: vec![0.25, 0.75],
            gate: None,
        };
        run(&store, engine, generation, sink).await;

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0].extraction.as_ref().unwrap().heading, "Scanning... 25%");
        assert_eq!(seen[1].extraction.as_ref().unwrap().heading, "Scanning... 75%");
        assert_eq!(seen[2].pipeline_stage, "extracted_ok");
        assert_eq!(
            store.read(|s| s.extracted_text().map(str::to_string)),
            Some("Your account is locked".to_string())
        );
    }

    #[tokio::test]
    async fn engine_failure_ends_in_failed_stage() {
        let store = SessionStore::new();
        let (staged, generation) = store.update(|s| s.stage_and_extract(image("a")));
        let (sink, seen) = recording_sink();

        let engine = ScriptedEngine {
            text: Err(AppError::extraction("boom")),
            progress: vec![],
            gate: None,
        };
        run(&store, engine, generation, sink).await;

        // The failure can reach the webview before the staging response does;
        // its higher revision is what keeps it on screen.
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].revision > staged.revision);
        assert!(store.read(|s| matches!(s.stage(), PipelineStage::ExtractedFailed { .. })));
    }

    #[tokio::test]
    async fn late_result_for_replaced_image_is_dropped() {
        let store = SessionStore::new();
        let (_, first) = store.update(|s| s.stage_and_extract(image("a")));
        let gate = Arc::new(Notify::new());
        let (sink, seen) = recording_sink();

        let slow = ScriptedEngine {
            text: Ok("text from a".to_string()),
            progress: vec![],
            gate: Some(gate.clone()),
        };
        let task = tokio::spawn({
            let store = store.clone();
            let sink = sink.clone();
            async move { run(&store, slow, first, sink).await }
        });

        let (_, second) = store.update(|s| s.stage_and_extract(image("b")));
        let fast = ScriptedEngine {
            text: Ok("text from b".to_string()),
            progress: vec![],
            gate: None,
        };
        run(&store, fast, second, sink).await;

        gate.notify_one();
        task.await.unwrap();

        assert_eq!(seen.lock().unwrap().len(), 1);
        assert_eq!(
            store.read(|s| s.extracted_text().map(str::to_string)),
            Some("text from b".to_string())
        );
    }
}
