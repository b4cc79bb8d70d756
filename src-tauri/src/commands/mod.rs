pub mod classifier;
pub mod image;
pub mod session;
