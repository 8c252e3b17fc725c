//! Marker change detection
//!
//! Turns the raw spans of a transaction into the task markers they touched.
//! Each span is judged on its own, in position order:
//!
//! 1. a single character typed into the brackets of a task line
//! 2. inserted text that itself starts a task bullet (`- [x] buy milk`)
//! 3. a multi-character paste carrying both brackets onto a task line
//!
//! When the inserted text holds a newline followed by a task bullet, the
//! change is attributed to the line after that newline.

use serde::Serialize;

use super::buffer::{EditSpan, TextBuffer, Transaction};
use super::line::{has_tasks_plugin_signs, match_task_in, starts_with_task, task_after_newline};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    SingleCharEdit,
    FullTaskInsertion,
    PastedWithMarker,
}

impl ChangeKind {
    /// Returns true for kinds that bring in a whole task rather than a
    /// single keystroke
    pub fn is_insertion(&self) -> bool {
        !matches!(self, ChangeKind::SingleCharEdit)
    }
}

/// A task marker touched by a transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkerChange {
    /// Line index in the new document
    pub line: usize,
    pub marker: char,
    /// Absolute byte offset of the marker in the new document
    pub marker_offset: usize,
    /// The marker that sat at the same position before the edit
    pub previous_marker: Option<char>,
    pub kind: ChangeKind,
    /// The span rewrote the whole line and carries Tasks plugin signs
    pub decorated: bool,
}

/// Detects the marker changes a transaction makes.
///
/// `before` and `after` are the documents on either side of `tx`. System
/// transactions are the pipeline's own output and yield nothing.
pub fn detect<B: TextBuffer + ?Sized>(before: &B, after: &B, tx: &Transaction) -> Vec<MarkerChange> {
    if tx.is_system() {
        return Vec::new();
    }

    let mut changes: Vec<MarkerChange> = tx
        .spans
        .iter()
        .filter_map(|span| detect_span(before, after, span))
        .collect();

    changes.sort_by_key(|change| change.marker_offset);
    changes.dedup_by_key(|change| change.line);
    changes
}

fn detect_span<B: TextBuffer + ?Sized>(before: &B, after: &B, span: &EditSpan) -> Option<MarkerChange> {
    let inserted = span.inserted.as_str();
    let mut chars = inserted.chars();
    let first = chars.next()?;

    if chars.next().is_none() {
        return single_char(before, after, span, first);
    }

    let (offset, via_newline) = match task_after_newline(inserted) {
        Some(skip) => (span.after.start + skip, true),
        None => (span.after.start, false),
    };

    let line = after.line_at(offset)?;
    let text = after.line(line)?;
    let task = match_task_in(text, after.context(line))?;
    let line_start = after.line_start(line)?;

    let kind = if via_newline || starts_with_task(inserted.trim_start()) {
        ChangeKind::FullTaskInsertion
    } else if inserted.contains('[') && inserted.contains(']') && inserted != "[]" {
        ChangeKind::PastedWithMarker
    } else {
        return None;
    };

    Some(MarkerChange {
        line,
        marker: task.marker,
        marker_offset: line_start + task.marker_offset,
        previous_marker: if via_newline {
            None
        } else {
            marker_at_line(before, span.before.start)
        },
        kind,
        decorated: text == inserted && has_tasks_plugin_signs(inserted),
    })
}

fn single_char<B: TextBuffer + ?Sized>(
    before: &B,
    after: &B,
    span: &EditSpan,
    typed: char,
) -> Option<MarkerChange> {
    if typed == '[' || typed == '\n' {
        return None;
    }

    let line = after.line_at(span.after.start)?;
    let task = match_task_in(after.line(line)?, after.context(line))?;
    let marker_offset = after.line_start(line)? + task.marker_offset;
    if marker_offset != span.after.start {
        return None;
    }

    Some(MarkerChange {
        line,
        marker: task.marker,
        marker_offset,
        previous_marker: marker_exactly_at(before, span.before.start),
        kind: ChangeKind::SingleCharEdit,
        decorated: false,
    })
}

/// The marker of the task line containing `offset`
fn marker_at_line<B: TextBuffer + ?Sized>(buffer: &B, offset: usize) -> Option<char> {
    let line = buffer.line_at(offset)?;
    match_task_in(buffer.line(line)?, buffer.context(line)).map(|task| task.marker)
}

/// The marker sitting exactly at `offset`, if `offset` is a marker position
fn marker_exactly_at<B: TextBuffer + ?Sized>(buffer: &B, offset: usize) -> Option<char> {
    let line = buffer.line_at(offset)?;
    let task = match_task_in(buffer.line(line)?, buffer.context(line))?;
    (buffer.line_start(line)? + task.marker_offset == offset).then_some(task.marker)
}
