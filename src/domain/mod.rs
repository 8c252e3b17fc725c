//! # Core
//!
//! Pure task-status logic with no I/O. Every operation takes the document
//! through [`TextBuffer`] and an immutable [`StatusConfig`], and reports
//! absence as `None` rather than failing.
//!
//! ## Pipeline
//!
//! ```text
//! Transaction ──► change::detect ──► cycle::cycle_detected ──► primary
//!                        │
//!                        └──► structure::find_parent ──► transition::decide ──► follow_up
//! ```
//!
//! [`TaskEngine`] wires these together; system-tagged transactions are
//! never re-processed.

mod aggregate;
mod buffer;
mod change;
mod cycle;
mod engine;
mod line;
mod status;
mod structure;
mod themes;
mod transition;

pub use aggregate::{
    aggregate, collect_progress, direct_children, Aggregate, AggregateOptions, CountMode, CountScope,
    ProgressEntry, ProgressOptions,
};
pub use buffer::{
    EditProposal, EditSource, EditSpan, LineBuffer, SyntaxContext, TextBuffer, Transaction,
};
pub use change::{detect, ChangeKind, MarkerChange};
pub use cycle::{cycle_detected, cycle_line, set_status, toggle_extreme};
pub use engine::{Behavior, Resolution, TaskEngine};
pub use line::{
    heading_level, is_blank, match_task, match_task_in, starts_with_task, Indent, TaskLine,
};
pub use status::{parse_marks, Category, CategoryMarks, Direction, StatusConfig};
pub use structure::{block_at, child_lines, find_parent, heading_lines, BlockKind, ChildBlock, ParentTask};
pub use themes::{StatusEntry, Theme};
pub use transition::decide as decide_parent;
