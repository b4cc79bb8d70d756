use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const SETTINGS_FILE: &str = "settings.json";

const ENV_API_URL: &str = "SPAM_LENS_API_URL";
const ENV_OCR_LANG: &str = "SPAM_LENS_OCR_LANG";
const ENV_TESSERACT: &str = "SPAM_LENS_TESSERACT";
const ENV_LOG: &str = "SPAM_LENS_LOG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Where `/api/predict` and friends live.
    pub api_base_url: String,
    /// Tesseract language code.
    pub ocr_language: String,
    pub tesseract_path: String,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8080".to_string(),
            ocr_language: crate::services::ocr::DEFAULT_LANGUAGE.to_string(),
            tesseract_path: "tesseract".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Reads `settings.json` from `config_dir` (defaults when absent), then
    /// applies `SPAM_LENS_*` environment overrides.
    pub fn load(config_dir: &Path) -> Result<Self, AppError> {
        Self::load_with(config_dir, std::env::vars())
    }

    pub fn load_with(
        config_dir: &Path,
        vars: impl IntoIterator<Item = (String, String)>,
    ) -> Result<Self, AppError> {
        let path = config_dir.join(SETTINGS_FILE);
        let base = if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|e| {
                AppError::from(format!("Failed to read config file {}: {}", path.display(), e))
            })?;
            serde_json::from_str(&content).map_err(|e| {
                AppError::from(format!("Failed to parse config file {}: {}", path.display(), e))
            })?
        } else {
            AppConfig::default()
        };

        let config = base.with_overrides(vars);
        config.validate()?;
        Ok(config)
    }

    fn with_overrides(mut self, vars: impl IntoIterator<Item = (String, String)>) -> Self {
        for (key, value) in vars {
            if value.trim().is_empty() {
                continue;
            }
            match key.as_str() {
                ENV_API_URL => self.api_base_url = value,
                ENV_OCR_LANG => self.ocr_language = value,
                ENV_TESSERACT => self.tesseract_path = value,
                ENV_LOG => self.log_level = value,
                _ => {}
            }
        }
        self
    }

    pub fn validate(&self) -> Result<(), AppError> {
        let url = reqwest::Url::parse(&self.api_base_url)
            .map_err(|e| AppError::from(format!("Invalid api_base_url {:?}: {}", self.api_base_url, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(format!("api_base_url must be http or https, got {}", url.scheme()).into());
        }
        if self.ocr_language.trim().is_empty() {
            return Err("ocr_language must not be empty".into());
        }
        Ok(())
    }
}
