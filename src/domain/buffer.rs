//! Host boundary types
//!
//! The core never owns a document. It reads one through [`TextBuffer`] and
//! describes changes as [`Transaction`]s: ordered edit spans plus an
//! [`EditSource`] tag. The tag is how the pipeline recognises its own output
//! when that output is fed back in.

use std::ops::Range;

use serde::Serialize;

use super::line;

/// Syntax context of a line, as reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyntaxContext {
    #[default]
    Text,
    CodeBlock,
    Frontmatter,
}

/// A line-indexed, read-only view of a text document.
///
/// Line indices are 0-based. Every lookup fails closed with `None` when the
/// index or offset is out of range.
pub trait TextBuffer {
    /// Number of lines (an empty document has one empty line)
    fn line_count(&self) -> usize;

    /// Text of a line without its line terminator
    fn line(&self, index: usize) -> Option<&str>;

    /// Byte offset of the first character of a line
    fn line_start(&self, index: usize) -> Option<usize>;

    /// Total length in bytes
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Syntax context of a line; hosts without syntax awareness report text
    fn context(&self, _index: usize) -> SyntaxContext {
        SyntaxContext::Text
    }

    /// Index of the line containing `offset`
    fn line_at(&self, offset: usize) -> Option<usize> {
        if offset > self.len() {
            return None;
        }
        let (mut low, mut high) = (0, self.line_count());
        while low + 1 < high {
            let mid = (low + high) / 2;
            match self.line_start(mid) {
                Some(start) if start <= offset => low = mid,
                Some(_) => high = mid,
                None => return None,
            }
        }
        Some(low)
    }
}

/// An owned buffer that splits text into lines and tracks fenced code and
/// frontmatter regions
#[derive(Debug, Clone)]
pub struct LineBuffer {
    text: String,
    starts: Vec<usize>,
    contexts: Vec<SyntaxContext>,
}

impl LineBuffer {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let mut starts = vec![0];
        starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));

        let mut buffer = Self {
            text,
            starts,
            contexts: Vec::new(),
        };
        buffer.contexts = scan_contexts(&buffer);
        buffer
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Iterates over all lines
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        (0..self.line_count()).filter_map(move |i| self.line(i))
    }
}

impl TextBuffer for LineBuffer {
    fn line_count(&self) -> usize {
        self.starts.len()
    }

    fn line(&self, index: usize) -> Option<&str> {
        let start = *self.starts.get(index)?;
        let end = match self.starts.get(index + 1) {
            Some(next) => next - 1,
            None => self.text.len(),
        };
        let line = self.text.get(start..end)?;
        Some(line.strip_suffix('\r').unwrap_or(line))
    }

    fn line_start(&self, index: usize) -> Option<usize> {
        self.starts.get(index).copied()
    }

    fn len(&self) -> usize {
        self.text.len()
    }

    fn context(&self, index: usize) -> SyntaxContext {
        self.contexts.get(index).copied().unwrap_or_default()
    }
}

/// Marks frontmatter (a leading `---` block) and fenced code blocks
fn scan_contexts(buffer: &LineBuffer) -> Vec<SyntaxContext> {
    let count = buffer.line_count();
    let mut contexts = vec![SyntaxContext::Text; count];
    let mut index = 0;

    if buffer.line(0).map(str::trim_end) == Some("---") {
        let close = (1..count).find(|i| buffer.line(*i).map(str::trim_end) == Some("---"));
        if let Some(close) = close {
            for context in &mut contexts[..=close] {
                *context = SyntaxContext::Frontmatter;
            }
            index = close + 1;
        }
    }

    let mut fence: Option<&str> = None;
    while index < count {
        let trimmed = buffer.line(index).unwrap_or("").trim_start();
        match fence {
            Some(open) => {
                contexts[index] = SyntaxContext::CodeBlock;
                if trimmed.starts_with(open) {
                    fence = None;
                }
            }
            None => {
                if trimmed.starts_with("```") {
                    fence = Some("```");
                    contexts[index] = SyntaxContext::CodeBlock;
                } else if trimmed.starts_with("~~~") {
                    fence = Some("~~~");
                    contexts[index] = SyntaxContext::CodeBlock;
                }
            }
        }
        index += 1;
    }

    contexts
}

/// Who produced an edit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EditSource {
    #[default]
    User,
    /// Emitted by this pipeline; never re-processed
    System,
}

/// One contiguous change: `before` in the prior document is replaced by
/// `inserted`, which occupies `after` in the new document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditSpan {
    pub before: Range<usize>,
    pub after: Range<usize>,
    pub inserted: String,
}

/// A minimal substitution proposed by the core
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditProposal {
    pub range: Range<usize>,
    pub replacement: String,
}

impl EditProposal {
    pub fn new(range: Range<usize>, replacement: impl Into<String>) -> Self {
        Self {
            range,
            replacement: replacement.into(),
        }
    }

    /// Replaces the marker of a task line starting at `line_start`
    pub fn marker(line_start: usize, task: &line::TaskLine, mark: char) -> Self {
        let range = task.marker_range();
        Self::new(line_start + range.start..line_start + range.end, mark.to_string())
    }
}

/// An atomic set of edit spans ordered by position
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Transaction {
    pub spans: Vec<EditSpan>,
    pub source: EditSource,
}

impl Transaction {
    /// Builds a user transaction from replacements against the prior text
    pub fn user(changes: impl IntoIterator<Item = (Range<usize>, String)>) -> Self {
        Self::build(changes, EditSource::User)
    }

    /// Wraps proposals as a system transaction
    pub fn system(proposals: impl IntoIterator<Item = EditProposal>) -> Self {
        Self::build(
            proposals.into_iter().map(|p| (p.range, p.replacement)),
            EditSource::System,
        )
    }

    fn build(changes: impl IntoIterator<Item = (Range<usize>, String)>, source: EditSource) -> Self {
        let mut changes: Vec<_> = changes.into_iter().collect();
        changes.sort_by_key(|(range, _)| (range.start, range.end));

        let mut delta: isize = 0;
        let spans = changes
            .into_iter()
            .map(|(before, inserted)| {
                let start = before.start.saturating_add_signed(delta);
                let after = start..start + inserted.len();
                delta += inserted.len() as isize - before.len() as isize;
                EditSpan {
                    before,
                    after,
                    inserted,
                }
            })
            .collect();

        Self { spans, source }
    }

    pub fn is_system(&self) -> bool {
        self.source == EditSource::System
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Folds proposals expressed against the transaction's output back into
    /// the transaction, yielding a single system transaction against the
    /// original text.
    ///
    /// A proposal inside an inserted span edits that span's text; one in an
    /// untouched region becomes a span of its own. Returns `None` if a
    /// proposal straddles a span boundary.
    pub fn with_rewrites(&self, proposals: &[EditProposal]) -> Option<Transaction> {
        let mut changes: Vec<(Range<usize>, String)> = self
            .spans
            .iter()
            .map(|span| (span.before.clone(), span.inserted.clone()))
            .collect();

        let mut extra = Vec::new();
        for proposal in proposals {
            let range = &proposal.range;
            match self.spans.iter().position(|span| span.after.end > range.start) {
                Some(index) if self.spans[index].after.start <= range.start => {
                    let span = &self.spans[index];
                    if range.end > span.after.end {
                        return None;
                    }
                    let local = range.start - span.after.start..range.end - span.after.start;
                    let inserted = &mut changes[index].1;
                    inserted.get(local.clone())?;
                    inserted.replace_range(local, &proposal.replacement);
                }
                following => {
                    if let Some(index) = following {
                        if range.end > self.spans[index].after.start {
                            return None;
                        }
                    }
                    let delta: isize = self
                        .spans
                        .iter()
                        .take_while(|span| span.after.end <= range.start)
                        .map(|span| span.inserted.len() as isize - span.before.len() as isize)
                        .sum();
                    let start = range.start.checked_add_signed(-delta)?;
                    extra.push((start..start + range.len(), proposal.replacement.clone()));
                }
            }
        }

        changes.extend(extra);
        Some(Self::build(changes, EditSource::System))
    }

    /// Applies the transaction to `text`.
    ///
    /// Returns `None` if a span is out of range, overlaps the previous one,
    /// or does not fall on character boundaries.
    pub fn apply(&self, text: &str) -> Option<String> {
        let mut result = String::with_capacity(text.len());
        let mut cursor = 0;

        for span in &self.spans {
            if span.before.start < cursor || span.before.start > span.before.end {
                return None;
            }
            result.push_str(text.get(cursor..span.before.start)?);
            text.get(span.before.clone())?;
            result.push_str(&span.inserted);
            cursor = span.before.end;
        }

        result.push_str(text.get(cursor..)?);
        Some(result)
    }
}
