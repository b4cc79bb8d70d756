mod commands;
mod config;
mod error;
mod logging;
mod models;
mod services;

use config::AppConfig;
use services::api_client::ApiClient;
use services::ocr::{OcrService, TesseractEngine};
use services::session::SessionStore;
use std::sync::Arc;
use tauri::Manager;
use tracing::{info, warn};

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .plugin(tauri_plugin_window_state::Builder::default().build())
        .setup(|app| {
            let config_dir = app.path().app_config_dir()?;
            let log_dir = app.path().app_log_dir()?;
            std::fs::create_dir_all(&log_dir)?;

            let config = AppConfig::load(&config_dir)?;
            logging::init_tracing(&log_dir, &config.log_level);
            info!(api = %config.api_base_url, lang = %config.ocr_language, "Starting spam-lens");

            let engine = TesseractEngine::new(&config.tesseract_path);
            if !engine.is_available() {
                warn!(
                    "OCR binary {:?} not found; screenshot extraction will fail until tesseract-ocr is installed",
                    config.tesseract_path
                );
            }

            app.manage(SessionStore::new());
            app.manage(ApiClient::new(&config.api_base_url)?);
            app.manage(OcrService::new(Arc::new(engine), config.ocr_language.clone()));

            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::session::get_view,
            commands::session::select_mode,
            commands::session::set_message_text,
            commands::session::use_sample,
            commands::session::clear_input,
            commands::image::stage_image,
            commands::image::stage_image_file,
            commands::image::remove_image,
            commands::classifier::classify,
            commands::classifier::refresh_dashboard,
            commands::classifier::clear_history,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
