//! Parent marker transitions
//!
//! A parent's state is never stored. It is recomputed from its direct
//! children each time one of them changes:
//!
//! | children                      | parent       | result                  |
//! |-------------------------------|--------------|-------------------------|
//! | all completed                 | not complete | completed mark          |
//! | not all completed             | completed    | in-progress mark (opt)  |
//! | some started                  | not started  | in-progress mark (opt)  |
//! | anything else                 |              | no edit                 |
//!
//! "opt" rows only fire when partial-completion marking is enabled. A parent
//! whose marker already matches its children produces nothing.

use super::aggregate::direct_children;
use super::buffer::{EditProposal, TextBuffer};
use super::engine::Behavior;
use super::line::match_task_in;
use super::status::{Category, StatusConfig};

/// Decides the marker edit, if any, for the parent task at `parent_line`.
///
/// `indent_unit` is the column count of one nesting level; see
/// [`direct_children`].
pub fn decide<B: TextBuffer + ?Sized>(
    buffer: &B,
    parent_line: usize,
    config: &StatusConfig,
    behavior: &Behavior,
    indent_unit: Option<usize>,
) -> Option<EditProposal> {
    let task = match_task_in(buffer.line(parent_line)?, buffer.context(parent_line))?;
    let children = direct_children(buffer, parent_line, config, indent_unit)?;
    if children.total == 0 {
        return None;
    }

    let current = config.classify(task.marker);
    let partial = behavior.mark_parent_in_progress_when_partially_complete;

    let target = if children.is_complete() {
        (current != Category::Completed).then(|| config.completed_mark())
    } else if current == Category::Completed {
        partial.then(|| config.in_progress_mark())
    } else if partial && children.started() > 0 && current != Category::InProgress {
        Some(config.in_progress_mark())
    } else {
        None
    };

    let target = target.filter(|mark| *mark != task.marker)?;

    tracing::debug!(line = parent_line, from = %task.marker, to = %target, "parent transition");
    Some(EditProposal::marker(buffer.line_start(parent_line)?, &task, target))
}
