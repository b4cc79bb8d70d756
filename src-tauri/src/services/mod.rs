pub mod api_client;
pub mod classification;
pub mod extraction;
pub mod ocr;
pub mod render;
pub mod session;
pub mod upload;
