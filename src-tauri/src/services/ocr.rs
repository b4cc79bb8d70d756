//! Text recognition for uploaded screenshots.
//!
//! The pipeline only needs "bytes in, text out, maybe some progress on the
//! way", so engines sit behind [`OcrEngine`]. The shipped engine shells out to
//! the `tesseract` binary.

use crate::error::AppError;
use crate::models::session_types::OcrProgress;
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

pub const DEFAULT_LANGUAGE: &str = "eng";
pub const RECOGNIZING_TEXT: &str = "recognizing text";

pub type ProgressCallback<'a> = &'a (dyn Fn(OcrProgress) + Send + Sync);

#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Returns the raw recognized text. Trimming is the caller's business.
    async fn recognize(
        &self,
        image: &[u8],
        language: &str,
        progress: ProgressCallback<'_>,
    ) -> Result<String, AppError>;
}

/// The engine plus the language every recognition runs with.
#[derive(Clone)]
pub struct OcrService {
    pub engine: Arc<dyn OcrEngine>,
    pub language: String,
}

impl OcrService {
    pub fn new(engine: Arc<dyn OcrEngine>, language: impl Into<String>) -> Self {
        Self {
            engine,
            language: language.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TesseractEngine {
    binary: PathBuf,
}

impl TesseractEngine {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn is_available(&self) -> bool {
        let found = std::process::Command::new(&self.binary)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok();
        if !found {
            debug!("{} not found - install tesseract-ocr for screenshot support", self.binary.display());
        }
        found
    }
}

#[async_trait]
impl OcrEngine for TesseractEngine {
    async fn recognize(
        &self,
        image: &[u8],
        language: &str,
        progress: ProgressCallback<'_>,
    ) -> Result<String, AppError> {
        progress(OcrProgress {
            status: RECOGNIZING_TEXT.to_string(),
            progress: 0.0,
        });

        let mut child = Command::new(&self.binary)
            .arg("stdin")
            .arg("stdout")
            .arg("-l")
            .arg(language)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| AppError::extraction(format!("Failed to run {}: {}", self.binary.display(), e)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| AppError::extraction("tesseract stdin unavailable"))?;
        let input = image.to_vec();
        // Feed stdin concurrently so a chatty stderr can't deadlock the pipe.
        let writer = tokio::spawn(async move {
            stdin.write_all(&input).await?;
            stdin.shutdown().await
        });

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| AppError::extraction(format!("tesseract did not finish: {}", e)))?;

        match writer.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("Failed to stream image to tesseract: {}", e),
            Err(e) => warn!("tesseract writer task failed: {}", e),
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AppError::extraction(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        progress(OcrProgress {
            status: RECOGNIZING_TEXT.to_string(),
            progress: 1.0,
        });

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[tokio::test]
    async fn missing_binary_is_an_extraction_error() {
        let engine = TesseractEngine::new("/nonexistent/tesseract-binary");
        assert!(!engine.is_available());

        let seen = Mutex::new(Vec::new());
        let report = |p: OcrProgress| seen.lock().unwrap().push(p.progress);
        let err = engine.recognize(b"png", DEFAULT_LANGUAGE, &report).await.unwrap_err();

        assert_eq!(err.kind, crate::error::ErrorKind::Extraction);
        assert_eq!(*seen.lock().unwrap(), vec![0.0]);
    }
}
