//! Task counting
//!
//! Aggregation is a pure function of the buffer: callers may recompute as
//! often as they like (including coalescing bursts of file events) without
//! any state carried between calls.

use serde::Serialize;

use super::buffer::{SyntaxContext, TextBuffer};
use super::line::{is_blank, match_task_in, Indent};
use super::status::{Category, StatusConfig};
use super::structure::{block_at, BlockKind, ChildBlock};

/// Per-category task counts for a scope.
///
/// `not_started` is always the remainder, so the five categories sum to
/// `total` exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Aggregate {
    pub completed: usize,
    pub in_progress: usize,
    pub abandoned: usize,
    pub planned: usize,
    pub not_started: usize,
    pub total: usize,
}

impl Aggregate {
    /// Clamps raw category counts against `total`, in category order, and
    /// derives `not_started` as the remainder
    fn reconcile(total: usize, completed: usize, in_progress: usize, abandoned: usize, planned: usize) -> Self {
        let completed = completed.min(total);
        let in_progress = in_progress.min(total - completed);
        let abandoned = abandoned.min(total - completed - in_progress);
        let planned = planned.min(total - completed - in_progress - abandoned);

        Self {
            completed,
            in_progress,
            abandoned,
            planned,
            not_started: total - completed - in_progress - abandoned - planned,
            total,
        }
    }

    /// Returns true if there is at least one task and all are completed
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.completed == self.total
    }

    /// Number of tasks in any state other than not started
    pub fn started(&self) -> usize {
        self.total - self.not_started
    }

    pub fn count(&self, category: Category) -> usize {
        match category {
            Category::Completed => self.completed,
            Category::InProgress => self.in_progress,
            Category::Abandoned => self.abandoned,
            Category::Planned => self.planned,
            Category::NotStarted => self.not_started,
        }
    }
}

/// Which lines of a block are examined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CountScope {
    /// Only tasks one level below the anchor
    #[default]
    DirectChildren,
    /// Every task in the block regardless of depth
    AllDescendants,
}

/// What kind of anchor the block belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CountMode {
    #[default]
    Bullet,
    Heading,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AggregateOptions {
    pub scope: CountScope,
    pub mode: CountMode,
    /// Columns one nesting level adds under a task. Without it, direct
    /// children sit at the block's shallowest indentation.
    pub indent_unit: Option<usize>,
}

impl AggregateOptions {
    /// Options for a block, counting all descendants when `sub_levels` is set
    pub fn for_block(block: &ChildBlock, sub_levels: bool) -> Self {
        Self {
            scope: if sub_levels {
                CountScope::AllDescendants
            } else {
                CountScope::DirectChildren
            },
            mode: match block.kind {
                BlockKind::Bullet => CountMode::Bullet,
                BlockKind::Heading(_) => CountMode::Heading,
            },
            indent_unit: None,
        }
    }

    pub fn with_indent_unit(mut self, unit: Option<usize>) -> Self {
        self.indent_unit = unit.map(|unit| unit.max(1));
        self
    }
}

/// Counts the tasks of a child block.
///
/// With [`CountScope::DirectChildren`], only lines one indent unit below the
/// anchor are examined and deeper lines are skipped entirely: a grandchild
/// only affects this count through its own parent's marker. When no task
/// sits exactly one unit deeper (or no unit is given), the block's
/// shallowest indentation is used instead.
pub fn aggregate<B: TextBuffer + ?Sized>(
    buffer: &B,
    block: &ChildBlock,
    config: &StatusConfig,
    options: AggregateOptions,
) -> Aggregate {
    let lines: Vec<(usize, &str)> = block
        .lines
        .clone()
        .filter_map(|index| buffer.line(index).map(|text| (index, text)))
        .filter(|(_, text)| !is_blank(text))
        .collect();

    let Some((_, first)) = lines.first() else {
        return Aggregate::default();
    };

    if options.mode == CountMode::Bullet && Indent::of(first).width() <= block.anchor_indent.width() {
        // Not actually nested: the block starts at the anchor's own level
        return Aggregate::default();
    }

    let child_width = match options.mode {
        CountMode::Bullet => {
            let unit_width = options
                .indent_unit
                .map(|unit| block.anchor_indent.width() + unit)
                .filter(|width| {
                    lines
                        .iter()
                        .filter_map(|(index, text)| match_task_in(text, buffer.context(*index)))
                        .any(|task| task.indent.width() == *width)
                });
            unit_width.or_else(|| lines.iter().map(|(_, text)| Indent::of(text).width()).min())
        }
        CountMode::Heading => lines
            .iter()
            .filter_map(|(index, text)| match_task_in(text, buffer.context(*index)))
            .map(|task| task.indent.width())
            .min(),
    };

    let mut total = 0;
    let mut counts = [0usize; 4];

    for (index, text) in &lines {
        if buffer.context(*index) != SyntaxContext::Text {
            continue;
        }
        let Some(task) = match_task_in(text, SyntaxContext::Text) else {
            continue;
        };
        if options.scope == CountScope::DirectChildren && Some(task.indent.width()) != child_width {
            continue;
        }
        if config.is_excluded(task.marker) {
            continue;
        }

        total += 1;
        match config.classify(task.marker) {
            Category::Completed => counts[0] += 1,
            Category::InProgress => counts[1] += 1,
            Category::Abandoned => counts[2] += 1,
            Category::Planned => counts[3] += 1,
            Category::NotStarted => {}
        }
    }

    Aggregate::reconcile(total, counts[0], counts[1], counts[2], counts[3])
}

/// Counts the direct child tasks of the task at `line`
pub fn direct_children<B: TextBuffer + ?Sized>(
    buffer: &B,
    line: usize,
    config: &StatusConfig,
    indent_unit: Option<usize>,
) -> Option<Aggregate> {
    let block = block_at(buffer, line)?;
    let options = AggregateOptions::for_block(&block, false).with_indent_unit(indent_unit);
    Some(aggregate(buffer, &block, config, options))
}

/// Settings for a whole-document progress listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgressOptions {
    /// Count all descendants instead of direct children only
    pub count_sub_levels: bool,
    /// Also report heading sections
    pub headings: bool,
    /// See [`AggregateOptions::indent_unit`]
    pub indent_unit: Option<usize>,
}

/// Progress of one task or heading
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressEntry {
    pub line: usize,
    #[serde(flatten)]
    pub kind: BlockKind,
    pub aggregate: Aggregate,
}

/// Lists the progress of every task (and optionally heading) that has
/// countable children
pub fn collect_progress<B: TextBuffer + ?Sized>(
    buffer: &B,
    config: &StatusConfig,
    options: ProgressOptions,
) -> Vec<ProgressEntry> {
    (0..buffer.line_count())
        .filter_map(|index| block_at(buffer, index))
        .filter(|block| options.headings || block.kind == BlockKind::Bullet)
        .filter_map(|block| {
            let aggregate = aggregate(
                buffer,
                &block,
                config,
                AggregateOptions::for_block(&block, options.count_sub_levels)
                    .with_indent_unit(options.indent_unit),
            );
            (aggregate.total > 0).then_some(ProgressEntry {
                line: block.anchor,
                kind: block.kind,
                aggregate,
            })
        })
        .collect()
}
