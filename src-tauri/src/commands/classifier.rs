use crate::commands::image::SESSION_UPDATED;
use crate::error::AppError;
use crate::models::view_types::View;
use crate::services::api_client::ApiClient;
use crate::services::classification;
use crate::services::session::SessionStore;
use tauri::{AppHandle, Emitter, State};
use tracing::warn;

#[tauri::command]
pub async fn classify(
    app: AppHandle,
    session: State<'_, SessionStore>,
    api: State<'_, ApiClient>,
) -> Result<View, AppError> {
    classification::classify(session.inner(), api.inner(), |view| {
        if let Err(e) = app.emit(SESSION_UPDATED, view) {
            warn!("Failed to emit {}: {}", SESSION_UPDATED, e);
        }
    })
    .await
}

#[tauri::command]
pub async fn refresh_dashboard(
    session: State<'_, SessionStore>,
    api: State<'_, ApiClient>,
) -> Result<View, AppError> {
    Ok(classification::refresh_dashboard(session.inner(), api.inner()).await)
}

#[tauri::command]
pub async fn clear_history(
    session: State<'_, SessionStore>,
    api: State<'_, ApiClient>,
) -> Result<View, AppError> {
    classification::clear_history(session.inner(), api.inner()).await
}
