//! Live progress for a single document
//!
//! Watches the document's directory and re-renders progress after each
//! debounced burst of changes to the file.

use std::path::Path;
use std::sync::mpsc;
use std::time::Duration;

use anyhow::{Context as _, Result};
use notify::RecursiveMode;
use notify_debouncer_mini::new_debouncer;

use super::app::Context;
use super::output::Output;
use super::progress::{print_report, report};

pub fn run(output: &Output, ctx: &Context, path: &Path, debounce_ms: u64) -> Result<()> {
    let path = path
        .canonicalize()
        .with_context(|| format!("Failed to resolve document: {}", path.display()))?;
    let dir = path
        .parent()
        .ok_or_else(|| anyhow::anyhow!("Document has no parent directory: {}", path.display()))?;

    print_report(output, &report(ctx, &path, false, false)?);

    let (tx, rx) = mpsc::channel();
    let mut debouncer = new_debouncer(Duration::from_millis(debounce_ms), tx)?;
    debouncer.watcher().watch(dir, RecursiveMode::NonRecursive)?;

    tracing::info!(path = %path.display(), debounce_ms, "watching for changes");

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                if !events.iter().any(|event| is_document(&event.path, &path)) {
                    continue;
                }
                match report(ctx, &path, false, false) {
                    Ok(report) => print_report(output, &report),
                    // The file may be mid-replace; the next event will catch up
                    Err(e) => tracing::warn!("failed to read document: {:#}", e),
                }
            }
            Ok(Err(error)) => {
                tracing::warn!("watch error: {:?}", error);
            }
            Err(e) => {
                tracing::debug!("watch channel closed: {}", e);
                break;
            }
        }
    }

    Ok(())
}

/// Returns true if an event path refers to the watched document.
///
/// Only the document's own directory is watched, so the file name decides.
fn is_document(event_path: &Path, document: &Path) -> bool {
    event_path.file_name() == document.file_name()
}
