//! Markdown documents on disk
//!
//! A [`Document`] pairs a file path with a [`LineBuffer`] of its contents.
//! Frontmatter is YAML between leading `---` lines; it only matters here for
//! deciding whether a document's progress should be shown.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_yaml::{Mapping, Value};
use thiserror::Error;

use super::config::VisibilitySettings;
use crate::domain::{match_task_in, LineBuffer, SyntaxContext, TaskLine, TextBuffer, Transaction};

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Line {line} is out of range (document has {count} lines)")]
    LineOutOfRange { line: usize, count: usize },

    #[error("Line {0} is not a task")]
    NotATask(usize),

    #[error("Edit does not apply to the current document")]
    Conflict,

    #[error("Invalid frontmatter: {0}")]
    Frontmatter(String),
}

#[derive(Debug, Clone)]
pub struct Document {
    path: PathBuf,
    buffer: LineBuffer,
}

impl Document {
    /// Reads a document from disk
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read document: {}", path.display()))?;
        Ok(Self::from_text(path, text))
    }

    pub fn from_text(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            buffer: LineBuffer::new(text),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn buffer(&self) -> &LineBuffer {
        &self.buffer
    }

    pub fn text(&self) -> &str {
        self.buffer.text()
    }

    /// Returns the task at a 0-based line index
    pub fn task(&self, line: usize) -> Result<TaskLine, DocumentError> {
        let text = self.buffer.line(line).ok_or(DocumentError::LineOutOfRange {
            line: line + 1,
            count: self.buffer.line_count(),
        })?;
        match_task_in(text, self.buffer.context(line)).ok_or(DocumentError::NotATask(line + 1))
    }

    /// Applies a transaction to the in-memory contents
    pub fn apply(&mut self, tx: &Transaction) -> Result<(), DocumentError> {
        let text = tx.apply(self.buffer.text()).ok_or(DocumentError::Conflict)?;
        self.buffer = LineBuffer::new(text);
        Ok(())
    }

    /// Writes the document atomically (temp file + rename)
    pub fn save(&self) -> Result<()> {
        let temp_path = self.path.with_extension("md.tmp");

        fs::write(&temp_path, self.buffer.text())
            .with_context(|| format!("Failed to write temp file: {}", temp_path.display()))?;

        fs::rename(&temp_path, &self.path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                temp_path.display(),
                self.path.display()
            )
        })?;

        tracing::info!(path = %self.path.display(), "saved document");
        Ok(())
    }

    /// Parses the YAML frontmatter, if the document has any
    pub fn frontmatter(&self) -> Result<Option<Mapping>, DocumentError> {
        let yaml: Vec<&str> = (1..self.buffer.line_count())
            .take_while(|i| self.buffer.context(*i) == SyntaxContext::Frontmatter)
            .filter_map(|i| self.buffer.line(i))
            .collect();

        // The closing delimiter is part of the frontmatter region
        let Some((_, body)) = yaml.split_last() else {
            return Ok(None);
        };
        if body.is_empty() {
            return Ok(None);
        }

        match serde_yaml::from_str::<Value>(&body.join("\n")) {
            Ok(Value::Mapping(mapping)) => Ok(Some(mapping)),
            Ok(Value::Null) => Ok(None),
            Ok(_) => Err(DocumentError::Frontmatter("expected a mapping".to_string())),
            Err(e) => Err(DocumentError::Frontmatter(e.to_string())),
        }
    }

    /// Tags from the frontmatter and inline `#tags` in the body, without `#`
    pub fn tags(&self) -> Result<Vec<String>, DocumentError> {
        let mut tags = self
            .frontmatter()?
            .as_ref()
            .map(frontmatter_tags)
            .unwrap_or_default();
        tags.extend(self.inline_tags());
        Ok(tags)
    }

    fn inline_tags(&self) -> Vec<String> {
        let mut tags = Vec::new();
        for (index, line) in self.buffer.lines().enumerate() {
            if self.buffer.context(index) != SyntaxContext::Text {
                continue;
            }
            tags.extend(
                line.split_whitespace()
                    .filter_map(|word| word.strip_prefix('#'))
                    .filter(|tag| !tag.is_empty() && !tag.starts_with('#'))
                    .map(str::to_string),
            );
        }
        tags
    }

    /// Returns true if the visibility rules hide this document's progress.
    ///
    /// Nothing is hidden unless `hide_based_on_conditions` is set. Folder
    /// rules match against the document path relative to `root` when it
    /// lies under it. Unreadable frontmatter is logged and treated as absent.
    pub fn is_progress_hidden(&self, visibility: &VisibilitySettings, root: &Path) -> bool {
        if !visibility.hide_based_on_conditions {
            return false;
        }

        let relative = self.path.strip_prefix(root).unwrap_or(&self.path);
        if visibility
            .hide_folders
            .iter()
            .map(|folder| folder.trim().trim_matches('/'))
            .filter(|folder| !folder.is_empty())
            .any(|folder| relative.starts_with(folder))
        {
            return true;
        }

        let frontmatter = self.frontmatter().unwrap_or_else(|e| {
            tracing::warn!(path = %self.path.display(), "ignoring frontmatter: {}", e);
            None
        });
        if let Some(value) = frontmatter
            .as_ref()
            .and_then(|fm| fm.get(visibility.hide_metadata_key.as_str()))
        {
            if is_truthy(value) {
                return true;
            }
        }

        let mut tags = frontmatter.as_ref().map(frontmatter_tags).unwrap_or_default();
        tags.extend(self.inline_tags());
        visibility.hide_tags.iter().any(|hidden| {
            let hidden = hidden.trim_start_matches('#');
            tags.iter().any(|tag| tag == hidden)
        })
    }
}

fn frontmatter_tags(frontmatter: &Mapping) -> Vec<String> {
    match frontmatter.get("tags") {
        Some(Value::String(s)) => s
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
            .map(|t| t.trim_start_matches('#').to_string())
            .collect(),
        Some(Value::Sequence(seq)) => seq
            .iter()
            .filter_map(Value::as_str)
            .map(|t| t.trim_start_matches('#').to_string())
            .collect(),
        _ => Vec::new(),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty() && s != "false",
        _ => true,
    }
}
