// Library entry point for tests and the binary

pub mod api_docs;
pub mod app;
pub mod config;
pub mod handlers;
pub mod logging;
pub mod routes;
pub mod version;

// Re-export commonly used types
pub use app::{create_app, AppState};
