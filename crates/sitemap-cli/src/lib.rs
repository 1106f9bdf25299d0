//! Sitemap CLI — render sitemap documents from a content export.

pub mod commands;
pub mod config;
pub mod content;

pub use commands::load_manager;
pub use config::{load_config, resolve_content_path};
pub use content::ContentExport;
