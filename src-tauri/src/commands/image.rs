use crate::error::AppError;
use crate::models::view_types::View;
use crate::services::extraction::{self, ViewSink};
use crate::services::ocr::OcrService;
use crate::services::session::SessionStore;
use crate::services::upload;
use std::path::PathBuf;
use std::sync::Arc;
use tauri::{AppHandle, Emitter, State};
use tracing::warn;

pub const SESSION_UPDATED: &str = "session-updated";

/// Image handed over by the webview, from the file picker or a drop.
/// `data` is base64 or a `data:` URL.
#[tauri::command]
pub async fn stage_image(
    app: AppHandle,
    session: State<'_, SessionStore>,
    ocr: State<'_, OcrService>,
    file_name: String,
    media_type: String,
    data: String,
) -> Result<View, AppError> {
    let prepared = tokio::task::spawn_blocking(move || {
        let bytes = upload::decode_payload(&data)?;
        upload::prepare_upload(&file_name, &media_type, bytes)
    })
    .await
    .map_err(|e| AppError::from(format!("Task join failed: {}", e)))?;

    let staged = upload::stage_upload(session.inner(), prepared)?;
    Ok(start_extraction(app, session.inner().clone(), ocr.inner(), staged))
}

/// Image chosen through the native file dialog.
#[tauri::command]
pub async fn stage_image_file(
    app: AppHandle,
    session: State<'_, SessionStore>,
    ocr: State<'_, OcrService>,
    path: String,
) -> Result<View, AppError> {
    let prepared = tokio::task::spawn_blocking(move || upload::prepare_upload_from_path(&PathBuf::from(path)))
        .await
        .map_err(|e| AppError::from(format!("Task join failed: {}", e)))?;

    let staged = upload::stage_upload(session.inner(), prepared)?;
    Ok(start_extraction(app, session.inner().clone(), ocr.inner(), staged))
}

#[tauri::command]
pub fn remove_image(session: State<'_, SessionStore>) -> View {
    session.apply(|s| s.remove_image())
}

fn start_extraction(
    app: AppHandle,
    store: SessionStore,
    ocr: &OcrService,
    (view, bytes, generation): (View, Arc<[u8]>, u64),
) -> View {
    let sink: ViewSink = Arc::new(move |view: View| {
        if let Err(e) = app.emit(SESSION_UPDATED, view) {
            warn!("Failed to emit {}: {}", SESSION_UPDATED, e);
        }
    });
    tauri::async_runtime::spawn(extraction::run_extraction(
        store,
        ocr.engine.clone(),
        bytes,
        generation,
        ocr.language.clone(),
        sink,
    ));

    view
}
