//! # Storage Layer
//!
//! Everything that touches the filesystem.
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Settings | TOML | `.taskmark.toml` (project) or `config.toml` (global) |
//! | Documents | Markdown + optional YAML frontmatter | anywhere |
//!
//! Document writes are atomic (temp file + rename).

mod config;
mod document;

pub use config::{
    Config, ConfigError, EditorSettings, ProgressSettings, Settings, StatusSettings, SwitcherSettings,
    VisibilitySettings,
};
pub use document::{Document, DocumentError};
