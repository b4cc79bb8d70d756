pub mod api_types;
pub mod session_types;
pub mod view_types;
