use crate::error::AppError;
use crate::models::session_types::StagedImage;
use crate::models::view_types::View;
use crate::services::session::SessionStore;
use base64::Engine;
use image::ImageReader;
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

const INVALID_TYPE_PROMPT: &str = "Please upload a valid image file (JPG, PNG, JPEG)";
const TOO_LARGE_PROMPT: &str = "File size must be less than 5MB";

const IMAGE_MEDIA_TYPES: &[(&str, &str)] = &[
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("gif", "image/gif"),
    ("bmp", "image/bmp"),
    ("webp", "image/webp"),
    ("tiff", "image/tiff"),
    ("tif", "image/tiff"),
];

/// Checks the declared media type and size of an incoming file. Nothing is
/// decoded here.
pub fn validate_upload(media_type: &str, size: u64) -> Result<(), AppError> {
    if !media_type.starts_with("image/") {
        return Err(AppError::validation(INVALID_TYPE_PROMPT));
    }
    if size > MAX_UPLOAD_BYTES {
        return Err(AppError::validation(TOO_LARGE_PROMPT));
    }
    Ok(())
}

/// Media type for a file picked from disk, judged by extension.
pub fn media_type_for_path(path: &Path) -> &'static str {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(|ext| {
            let ext = ext.to_lowercase();
            IMAGE_MEDIA_TYPES
                .iter()
                .find(|(known, _)| *known == ext)
                .map(|(_, media_type)| *media_type)
        })
        .unwrap_or("application/octet-stream")
}

/// Accepts either a bare base64 payload or a full `data:` URL as produced by
/// `FileReader.readAsDataURL`.
pub fn decode_payload(payload: &str) -> Result<Vec<u8>, AppError> {
    let encoded = match payload.split_once(";base64,") {
        Some((prefix, data)) if prefix.starts_with("data:") => data,
        _ => payload,
    };
    Ok(base64::engine::general_purpose::STANDARD.decode(encoded.trim())?)
}

/// Reads the image header to get its dimensions and builds a `data:` URL for
/// display. Content that is not a decodable image is rejected.
pub fn build_preview(bytes: &[u8], media_type: &str) -> Result<(u32, u32, String), AppError> {
    let (width, height) = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|_| AppError::validation(INVALID_TYPE_PROMPT))?
        .into_dimensions()
        .map_err(|_| AppError::validation(INVALID_TYPE_PROMPT))?;

    let b64 = base64::engine::general_purpose::STANDARD.encode(bytes);
    Ok((width, height, format!("data:{};base64,{}", media_type, b64)))
}

pub fn prepare_upload(file_name: &str, media_type: &str, bytes: Vec<u8>) -> Result<StagedImage, AppError> {
    validate_upload(media_type, bytes.len() as u64)?;
    let (width, height, preview) = build_preview(&bytes, media_type)?;
    Ok(StagedImage {
        file_name: file_name.to_string(),
        media_type: media_type.to_string(),
        bytes: Arc::from(bytes),
        width,
        height,
        preview,
    })
}

/// Loads a file chosen through the native dialog. Size and type are checked
/// before the file is read.
pub fn prepare_upload_from_path(path: &Path) -> Result<StagedImage, AppError> {
    let media_type = media_type_for_path(path);
    let size = std::fs::metadata(path)
        .map_err(|e| AppError::validation(format!("Cannot read {}: {}", path.display(), e)))?
        .len();
    validate_upload(media_type, size)?;

    let bytes = std::fs::read(path)?;
    let file_name = path
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();
    prepare_upload(&file_name, media_type, bytes)
}

/// Puts a prepared upload into the session and moves it to `Extracting`.
/// Returns the view, the bytes to recognize and the generation the OCR run
/// reports back with. A rejected upload never touches the session.
pub fn stage_upload(
    store: &SessionStore,
    upload: Result<StagedImage, AppError>,
) -> Result<(View, Arc<[u8]>, u64), AppError> {
    let image = upload.inspect_err(|e| warn!("Rejected upload: {}", e))?;
    let bytes = image.bytes.clone();
    info!(
        file = %image.file_name,
        media_type = %image.media_type,
        size = bytes.len(),
        width = image.width,
        height = image.height,
        "Image staged"
    );
    let (view, generation) = store.update(|s| s.stage_and_extract(image));
    Ok((view, bytes, generation))
}
