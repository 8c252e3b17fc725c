//! Structure recovered from indentation
//!
//! Markdown task lists have no explicit tree. A task's parent is the nearest
//! task above it with strictly less indentation; its children are the lines
//! below it that are indented further. Headings scope by level instead.
//!
//! Both scans stop at the first line that leaves the local subtree, so their
//! cost is bounded by the subtree, not the document.

use std::ops::Range;

use serde::Serialize;

use super::buffer::{SyntaxContext, TextBuffer};
use super::line::{heading_level, is_blank, is_structural, match_task_in, Indent, TaskLine};

/// The parent task of a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentTask {
    pub line: usize,
    pub indent: Indent,
    pub task: TaskLine,
}

/// What anchors a child block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "level")]
pub enum BlockKind {
    Bullet,
    Heading(usize),
}

/// The lines logically nested under a task or heading
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildBlock {
    pub anchor: usize,
    pub anchor_indent: Indent,
    pub kind: BlockKind,
    pub lines: Range<usize>,
}

impl ChildBlock {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Finds the parent task of the line at `index`.
///
/// Scans upward, skipping blank lines, sibling lines at equal or deeper
/// indentation, and lines indented with a different whitespace kind. The
/// first task with strictly smaller indentation is the parent. Headings and
/// blockquotes are passed over; any other less-indented line ends the search.
pub fn find_parent<B: TextBuffer + ?Sized>(buffer: &B, index: usize) -> Option<ParentTask> {
    let indent = Indent::of(buffer.line(index)?);
    if indent.width() == 0 {
        return None;
    }

    for candidate_index in (0..index).rev() {
        let candidate = buffer.line(candidate_index)?;
        if is_blank(candidate) {
            continue;
        }

        let candidate_indent = Indent::of(candidate);
        if candidate_indent.mismatches(&indent) {
            continue;
        }
        if candidate_indent.width() >= indent.width() {
            continue;
        }

        if let Some(task) = match_task_in(candidate, buffer.context(candidate_index)) {
            return Some(ParentTask {
                line: candidate_index,
                indent: candidate_indent,
                task,
            });
        }

        if !is_structural(candidate) {
            return None;
        }
    }

    None
}

/// Returns the lines indented deeper than `anchor_indent` that follow
/// `anchor`, ignoring blank lines. Trailing blank lines are not included.
pub fn child_lines<B: TextBuffer + ?Sized>(
    buffer: &B,
    anchor: usize,
    anchor_indent: Indent,
) -> Range<usize> {
    let start = anchor.saturating_add(1);
    let mut end = start;

    for index in start..buffer.line_count() {
        let Some(text) = buffer.line(index) else {
            break;
        };
        if is_blank(text) {
            continue;
        }
        if Indent::of(text).width() <= anchor_indent.width() {
            break;
        }
        end = index + 1;
    }

    start..end
}

/// Returns the section under a heading: everything up to the next heading
/// of the same or a higher level
pub fn heading_lines<B: TextBuffer + ?Sized>(buffer: &B, anchor: usize) -> Option<Range<usize>> {
    let level = heading_at(buffer, anchor)?;
    let start = anchor + 1;
    let mut end = start;

    for index in start..buffer.line_count() {
        let Some(text) = buffer.line(index) else {
            break;
        };
        if heading_at(buffer, index).is_some_and(|l| l <= level) {
            break;
        }
        if !is_blank(text) {
            end = index + 1;
        }
    }

    Some(start..end)
}

fn heading_at<B: TextBuffer + ?Sized>(buffer: &B, index: usize) -> Option<usize> {
    if buffer.context(index) != SyntaxContext::Text {
        return None;
    }
    heading_level(buffer.line(index)?)
}

/// Builds the child block for a task line or heading.
///
/// Returns `None` if the line is neither.
pub fn block_at<B: TextBuffer + ?Sized>(buffer: &B, anchor: usize) -> Option<ChildBlock> {
    let text = buffer.line(anchor)?;

    if let Some(level) = heading_at(buffer, anchor) {
        return Some(ChildBlock {
            anchor,
            anchor_indent: Indent::default(),
            kind: BlockKind::Heading(level),
            lines: heading_lines(buffer, anchor)?,
        });
    }

    let task = match_task_in(text, buffer.context(anchor))?;
    Some(ChildBlock {
        anchor,
        anchor_indent: task.indent,
        kind: BlockKind::Bullet,
        lines: child_lines(buffer, anchor, task.indent),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::buffer::LineBuffer;
    use proptest::prelude::*;

    #[test]
    fn top_level_task_has_no_parent() {
        let buffer = LineBuffer::new("- [x] Solo task\n");
        assert_eq!(find_parent(&buffer, 0), None);
    }

    #[test]
    fn finds_nearest_less_indented_task() {
        let buffer = LineBuffer::new("- [ ] Parent\n  - [x] Child A\n\n  - [ ] Child B\n    - [ ] Grandchild");

        assert_eq!(find_parent(&buffer, 1).map(|p| p.line), Some(0));
        assert_eq!(find_parent(&buffer, 3).map(|p| p.line), Some(0));
        assert_eq!(find_parent(&buffer, 4).map(|p| p.line), Some(3));
    }

    #[test]
    fn headings_and_quotes_do_not_break_the_chain() {
        let buffer = LineBuffer::new("- [ ] Parent\n# Heading\n  - [ ] Child");
        assert_eq!(find_parent(&buffer, 2).map(|p| p.line), Some(0));

        let buffer = LineBuffer::new("- [ ] Parent\n> note\n  - [ ] Child");
        assert_eq!(find_parent(&buffer, 2).map(|p| p.line), Some(0));
    }

    #[test]
    fn prose_breaks_the_chain() {
        let buffer = LineBuffer::new("- [ ] Parent\nSome prose\n  - [ ] Child");
        assert_eq!(find_parent(&buffer, 2), None);
    }

    #[test]
    fn plain_bullet_parent_breaks_the_chain() {
        let buffer = LineBuffer::new("- [ ] Task\n  - plain bullet\n    - [ ] Child");
        assert_eq!(find_parent(&buffer, 2), None);
    }

    #[test]
    fn mismatched_indent_kind_is_skipped() {
        let buffer = LineBuffer::new("- [ ] Root\n\t- [ ] Tabbed\n    - [ ] Spaced");
        // The tab-indented line has fewer columns but a different whitespace
        // kind, so the search continues to the root
        assert_eq!(find_parent(&buffer, 2).map(|p| p.line), Some(0));
    }

    #[test]
    fn out_of_range_fails_closed() {
        let buffer = LineBuffer::new("- [ ] a");
        assert_eq!(find_parent(&buffer, 5), None);
        assert_eq!(block_at(&buffer, 5), None);
    }

    #[test]
    fn child_block_stops_at_shallower_line() {
        let buffer = LineBuffer::new("- [ ] A\n  - [ ] A1\n  notes\n\n    - [ ] A1a\n\n- [ ] B\n  - [ ] B1");
        let block = block_at(&buffer, 0).unwrap();

        assert_eq!(block.kind, BlockKind::Bullet);
        assert_eq!(block.lines, 1..5);
    }

    #[test]
    fn child_block_of_leaf_is_empty() {
        let buffer = LineBuffer::new("- [ ] A\n- [ ] B");
        assert!(block_at(&buffer, 0).unwrap().is_empty());
    }

    #[test]
    fn heading_block_uses_levels() {
        let buffer = LineBuffer::new("# Top\n- [ ] a\n## Sub\n- [ ] b\n\n# Next\n- [ ] c");

        let top = block_at(&buffer, 0).unwrap();
        assert_eq!(top.kind, BlockKind::Heading(1));
        assert_eq!(top.lines, 1..4);

        let sub = block_at(&buffer, 2).unwrap();
        assert_eq!(sub.lines, 3..4);
    }

    #[test]
    fn headings_in_code_blocks_are_ignored() {
        let buffer = LineBuffer::new("# Top\n```\n# not a heading\n```\n- [ ] a");
        assert_eq!(block_at(&buffer, 0).unwrap().lines, 1..5);
        assert_eq!(block_at(&buffer, 2), None);
    }

    proptest! {
        #[test]
        fn find_parent_terminates(lines in prop::collection::vec("[ \t]{0,4}(- \\[[ x]\\] t|t|# h|)", 1..40), pick in 0usize..40) {
            let buffer = LineBuffer::new(lines.join("\n"));
            let index = pick % buffer.line_count();
            if let Some(parent) = find_parent(&buffer, index) {
                prop_assert!(parent.line < index);
                prop_assert!(parent.indent.width() < Indent::of(buffer.line(index).unwrap()).width());
            }
        }
    }
}
