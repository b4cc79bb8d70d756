use crate::models::session_types::InputMode;
use crate::models::view_types::View;
use crate::services::session::SessionStore;
use tauri::State;

#[tauri::command]
pub fn get_view(session: State<'_, SessionStore>) -> View {
    session.view()
}

#[tauri::command]
pub fn select_mode(session: State<'_, SessionStore>, mode: InputMode) -> View {
    session.apply(|s| s.select_mode(mode))
}

#[tauri::command]
pub fn set_message_text(session: State<'_, SessionStore>, text: String) -> View {
    session.apply(|s| s.set_draft(text))
}

#[tauri::command]
pub fn use_sample(session: State<'_, SessionStore>, text: String) -> View {
    session.apply(|s| s.use_sample(text))
}

#[tauri::command]
pub fn clear_input(session: State<'_, SessionStore>) -> View {
    session.apply(|s| s.clear_input())
}
