//! Marker cycling
//!
//! Explicit commands (`cycle_line`, `set_status`, `toggle_extreme`) produce
//! proposals against the current document. [`cycle_detected`] reacts to
//! markers the user just changed and produces proposals against the edited
//! document, to be folded back into the user's transaction.

use super::buffer::{EditProposal, TextBuffer};
use super::change::MarkerChange;
use super::engine::Behavior;
use super::line::{match_task_in, TaskLine};
use super::status::{Direction, StatusConfig};

fn task_at<B: TextBuffer + ?Sized>(buffer: &B, line: usize) -> Option<(usize, TaskLine)> {
    let task = match_task_in(buffer.line(line)?, buffer.context(line))?;
    Some((buffer.line_start(line)?, task))
}

fn rewrite(line_start: usize, task: &TaskLine, mark: char) -> Option<EditProposal> {
    (mark != task.marker).then(|| EditProposal::marker(line_start, task, mark))
}

/// Moves the task at `line` one step through the cycle
pub fn cycle_line<B: TextBuffer + ?Sized>(
    buffer: &B,
    line: usize,
    config: &StatusConfig,
    direction: Direction,
) -> Option<EditProposal> {
    let (start, task) = task_at(buffer, line)?;
    let next = config.next_mark(task.marker, direction)?;
    rewrite(start, &task, next)
}

/// Jumps the task at `line` straight to `status`, even one excluded from
/// cycling
pub fn set_status<B: TextBuffer + ?Sized>(
    buffer: &B,
    line: usize,
    config: &StatusConfig,
    status: &str,
) -> Option<EditProposal> {
    if !config.cycle().iter().any(|s| s == status) {
        return None;
    }
    let (start, task) = task_at(buffer, line)?;
    rewrite(start, &task, config.mark_for(status))
}

/// Jumps to the last status of the cycle, or back to the first when the task
/// is already there
pub fn toggle_extreme<B: TextBuffer + ?Sized>(
    buffer: &B,
    line: usize,
    config: &StatusConfig,
) -> Option<EditProposal> {
    let first = config.mark_for(config.cycle().first()?);
    let last = config.mark_for(config.cycle().last()?);
    let (start, task) = task_at(buffer, line)?;

    let target = if task.marker == last { first } else { last };
    rewrite(start, &task, target)
}

/// Computes the cycled replacement for each detected marker change.
///
/// `after` is the document the changes were detected in; the proposals are
/// expressed against it.
///
/// A typed marker advances the marker it replaced. A freshly inserted task,
/// or a marker typed into empty brackets, keeps a recognised marker unless
/// `always_cycle_new_tasks` is set. When a Tasks plugin rewrite would land
/// on a done or blank mark, the plugin's own line is kept as written.
pub fn cycle_detected<B: TextBuffer + ?Sized>(
    after: &B,
    changes: &[MarkerChange],
    config: &StatusConfig,
    behavior: &Behavior,
) -> Vec<EditProposal> {
    changes
        .iter()
        .filter_map(|change| {
            let current = match change.previous_marker {
                Some(previous) if !change.kind.is_insertion() => previous,
                _ => {
                    if config.known_status(change.marker).is_some() && !behavior.always_cycle_new_tasks {
                        return None;
                    }
                    change.marker
                }
            };

            let next = config.next_mark(current, Direction::Forward)?;
            if next == current {
                return None;
            }
            if change.decorated && matches!(next, 'x' | 'X' | ' ') {
                return None;
            }

            let task = match_task_in(after.line(change.line)?, after.context(change.line))?;
            let proposal = rewrite(after.line_start(change.line)?, &task, next)?;
            tracing::debug!(line = change.line, from = %current, to = %next, "cycled marker");
            Some(proposal)
        })
        .collect()
}
