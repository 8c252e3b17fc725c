//! Marker editing commands
//!
//! `edit` replays a keystroke through the full pipeline (detection, cycling,
//! parent propagation). `cycle` and `set` are explicit commands: they write
//! the marker directly and only propagate to the parent.

use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use super::app::Context;
use super::output::Output;
use crate::domain::{
    cycle_line, set_status, toggle_extreme, Direction, EditProposal, LineBuffer, TextBuffer, Transaction,
};
use crate::storage::Document;

/// How `cycle` moves through the status list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Forward,
    Backward,
    Extreme,
}

#[derive(Debug, Serialize)]
struct LineChange {
    line: usize,
    before: String,
    after: String,
}

/// Types `mark` over the marker of the task at `line`
pub fn type_mark(output: &Output, ctx: &Context, path: &Path, line: usize, mark: char, write: bool) -> Result<()> {
    let mut doc = Document::load(path)?;
    let before = doc.buffer().clone();

    let task = doc.task(line)?;
    let start = before.line_start(line).unwrap_or_default();
    let range = task.marker_range();
    let tx = Transaction::user([(start + range.start..start + range.end, mark.to_string())]);

    let resolution = ctx.engine().process(&before, &tx);
    if !resolution.is_unchanged(&tx) {
        tracing::debug!(follow_up = resolution.follow_up.is_some(), "edit was rewritten");
    }

    doc.apply(&resolution.primary)?;
    if let Some(follow_up) = &resolution.follow_up {
        doc.apply(follow_up)?;
    }

    finish(output, &before, &doc, write)
}

pub fn cycle(output: &Output, ctx: &Context, path: &Path, line: usize, step: Step, write: bool) -> Result<()> {
    let mut doc = Document::load(path)?;
    let before = doc.buffer().clone();
    doc.task(line)?;

    let proposal = match step {
        Step::Forward => cycle_line(&before, line, &ctx.status, Direction::Forward),
        Step::Backward => cycle_line(&before, line, &ctx.status, Direction::Backward),
        Step::Extreme => toggle_extreme(&before, line, &ctx.status),
    };
    apply_explicit(ctx, &mut doc, line, proposal)?;

    finish(output, &before, &doc, write)
}

pub fn set(output: &Output, ctx: &Context, path: &Path, line: usize, status: &str, write: bool) -> Result<()> {
    let cycle = ctx.status.cycle();
    if !cycle.iter().any(|s| s == status) {
        anyhow::bail!("Unknown status: {} (expected one of: {})", status, cycle.join(", "));
    }

    let mut doc = Document::load(path)?;
    let before = doc.buffer().clone();
    doc.task(line)?;

    let proposal = set_status(&before, line, &ctx.status, status);
    apply_explicit(ctx, &mut doc, line, proposal)?;

    finish(output, &before, &doc, write)
}

/// Applies a marker proposal and then the parent update it causes
fn apply_explicit(ctx: &Context, doc: &mut Document, line: usize, proposal: Option<EditProposal>) -> Result<()> {
    let Some(proposal) = proposal else {
        return Ok(());
    };
    doc.apply(&Transaction::system([proposal]))?;

    if ctx.settings.behavior.auto_complete_parent {
        if let Some(follow_up) = ctx.engine().propagate(doc.buffer(), [line]) {
            doc.apply(&follow_up)?;
        }
    }
    Ok(())
}

fn changed_lines(before: &LineBuffer, after: &LineBuffer) -> Vec<LineChange> {
    before
        .lines()
        .zip(after.lines())
        .enumerate()
        .filter(|(_, (old, new))| old != new)
        .map(|(index, (old, new))| LineChange {
            line: index + 1,
            before: old.to_string(),
            after: new.to_string(),
        })
        .collect()
}

fn finish(output: &Output, before: &LineBuffer, doc: &Document, write: bool) -> Result<()> {
    let changes = changed_lines(before, doc.buffer());
    let written = write && !changes.is_empty();
    if written {
        doc.save()?;
    }

    if output.is_json() {
        output.data(&serde_json::json!({
            "file": doc.path().display().to_string(),
            "written": written,
            "changes": changes,
        }));
        return Ok(());
    }

    if changes.is_empty() {
        println!("No changes");
        return Ok(());
    }
    for change in &changes {
        println!("{:>5}  {}", change.line, change.after);
    }
    if written {
        output.success(&format!("Saved {}", doc.path().display()));
    } else {
        println!("(dry run; pass --write to save)");
    }
    Ok(())
}
