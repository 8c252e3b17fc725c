//! Task line grammar
//!
//! The single place that decides what a task line is, how far it is
//! indented, and where its marker sits. Everything else (change detection,
//! parent lookup, counting) goes through [`match_task`].
//!
//! Grammar: optional leading spaces/tabs, a bullet (`-`, `*`, `+`) or an
//! ordered marker (`12.`), one space, `[`, exactly one character, `]`.

use std::sync::LazyLock;

use regex::Regex;

use super::buffer::SyntaxContext;

static TASK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([ \t]*)(?:[-*+]|\d+\.)[ \t]\[(.)\]").expect("task grammar is a valid regex")
});

static TASK_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[ \t]*(?:[-*+]|\d+\.)\s+\[.\]?").expect("task prefix is a valid regex")
});

static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})[ \t]").expect("heading grammar is a valid regex"));

/// Markers the Tasks plugin appends when it rewrites a task line
const TASKS_PLUGIN_SIGNS: [char; 4] = ['\u{2705}', '\u{274c}', '\u{1f6eb}', '\u{1f4c5}'];

/// Leading whitespace of a line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Indent {
    pub tabs: usize,
    pub spaces: usize,
}

impl Indent {
    /// Measures the leading whitespace of `line`
    pub fn of(line: &str) -> Self {
        let mut indent = Indent::default();
        for c in line.chars() {
            match c {
                '\t' => indent.tabs += 1,
                ' ' => indent.spaces += 1,
                _ => break,
            }
        }
        indent
    }

    /// Raw width, tabs and spaces counting one column each
    pub fn width(&self) -> usize {
        self.tabs + self.spaces
    }

    /// Logical nesting level given the editor's tab size
    pub fn level(&self, tab_size: usize) -> usize {
        self.tabs + self.spaces / tab_size.max(1)
    }

    /// Returns true if the two indents use different whitespace kinds.
    ///
    /// Only meaningful when both are indented; unindented lines are
    /// compatible with everything.
    pub fn mismatches(&self, other: &Indent) -> bool {
        if self.width() == 0 || other.width() == 0 {
            return false;
        }
        (self.spaces > 0 && other.spaces == 0) || (self.tabs > 0 && other.tabs == 0)
    }
}

/// A line recognised as a task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskLine {
    /// The character inside the brackets
    pub marker: char,
    /// Byte offset of the marker within the line
    pub marker_offset: usize,
    pub indent: Indent,
}

impl TaskLine {
    /// Byte range of the marker within the line
    pub fn marker_range(&self) -> std::ops::Range<usize> {
        self.marker_offset..self.marker_offset + self.marker.len_utf8()
    }
}

/// Matches the task grammar against one line of text.
///
/// Malformed lines (missing bracket, more than one character inside)
/// are simply not tasks.
pub fn match_task(line: &str) -> Option<TaskLine> {
    let caps = TASK_RE.captures(line)?;
    let marker_match = caps.get(2)?;
    let marker = marker_match.as_str().chars().next()?;

    Some(TaskLine {
        marker,
        marker_offset: marker_match.start(),
        indent: Indent::of(line),
    })
}

/// Like [`match_task`], but rejects lines the host flags as code or frontmatter
pub fn match_task_in(line: &str, context: SyntaxContext) -> Option<TaskLine> {
    if context != SyntaxContext::Text {
        return None;
    }
    match_task(line)
}

/// Returns true if `text` begins with a task bullet, tolerating a missing
/// closing bracket (as when the user types `- [x` before the `]`)
pub fn starts_with_task(text: &str) -> bool {
    TASK_PREFIX_RE.is_match(text)
}

/// Finds the first newline in `text` that is followed by a task bullet and
/// returns the byte offset just past that newline
pub fn task_after_newline(text: &str) -> Option<usize> {
    text.match_indices('\n')
        .map(|(index, _)| index + 1)
        .find(|start| match_task(next_line(&text[*start..])).is_some())
}

fn next_line(text: &str) -> &str {
    text.split('\n').next().unwrap_or(text)
}

/// Returns the heading level (1-6) if the line is an ATX heading
pub fn heading_level(line: &str) -> Option<usize> {
    HEADING_RE.captures(line).map(|caps| caps[1].len())
}

/// Returns true for lines that contain other blocks without breaking a
/// task hierarchy: headings and blockquotes
pub fn is_structural(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with('#') || trimmed.starts_with('>')
}

/// Returns true for whitespace-only lines
pub fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Returns true if the text carries the Tasks plugin's date or done signs
pub fn has_tasks_plugin_signs(text: &str) -> bool {
    text.contains(TASKS_PLUGIN_SIGNS.as_slice())
}
