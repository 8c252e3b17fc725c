//! Transaction pipeline
//!
//! [`TaskEngine::process`] takes the document before an edit and the user's
//! transaction and returns what should actually be applied: the user's edit
//! (possibly with cycled markers) and, when a parent needs updating, a
//! follow-up system transaction against the result.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::buffer::{LineBuffer, TextBuffer, Transaction};
use super::change::detect;
use super::cycle::cycle_detected;
use super::status::StatusConfig;
use super::structure::find_parent;
use super::transition;

/// Feature switches for the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Behavior {
    /// Complete a parent once all its direct children are complete
    pub auto_complete_parent: bool,
    /// Move parents to in progress when only some children are done
    pub mark_parent_in_progress_when_partially_complete: bool,
    /// Advance typed markers through the status cycle
    pub cycle_complete_status: bool,
    /// Cycle inserted tasks even when their marker is a known status
    pub always_cycle_new_tasks: bool,
}

impl Default for Behavior {
    fn default() -> Self {
        Self {
            auto_complete_parent: false,
            mark_parent_in_progress_when_partially_complete: false,
            cycle_complete_status: true,
            always_cycle_new_tasks: false,
        }
    }
}

/// The outcome of processing one transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    /// Applied to the prior document in place of the user's transaction
    pub primary: Transaction,
    /// Applied to the result of `primary`
    pub follow_up: Option<Transaction>,
}

impl Resolution {
    fn pass_through(tx: &Transaction) -> Self {
        Self {
            primary: tx.clone(),
            follow_up: None,
        }
    }

    /// Returns true if the user's transaction is applied unchanged and
    /// nothing follows it
    pub fn is_unchanged(&self, original: &Transaction) -> bool {
        self.follow_up.is_none() && &self.primary == original
    }

    /// Applies both transactions to `before`
    pub fn apply(&self, before: &str) -> Option<String> {
        let text = self.primary.apply(before)?;
        match &self.follow_up {
            Some(follow_up) => follow_up.apply(&text),
            None => Some(text),
        }
    }
}

/// Runs change detection, cycling and parent propagation for a
/// configuration
#[derive(Debug, Clone)]
pub struct TaskEngine {
    config: StatusConfig,
    behavior: Behavior,
    indent_unit: Option<usize>,
}

impl TaskEngine {
    pub fn new(config: StatusConfig, behavior: Behavior) -> Self {
        if behavior.cycle_complete_status && config.remaining_cycle().is_empty() {
            tracing::warn!("status cycle is empty; marker cycling is disabled");
        }
        Self {
            config,
            behavior,
            indent_unit: None,
        }
    }

    /// Sets the columns per nesting level used to find direct children
    pub fn with_indent_unit(mut self, tab_size: usize) -> Self {
        self.indent_unit = Some(tab_size.max(1));
        self
    }

    pub fn config(&self) -> &StatusConfig {
        &self.config
    }

    pub fn behavior(&self) -> &Behavior {
        &self.behavior
    }

    /// Resolves a transaction against the document it applies to.
    ///
    /// System transactions, and any transaction that cannot be applied to
    /// `before`, pass through untouched.
    pub fn process(&self, before: &LineBuffer, tx: &Transaction) -> Resolution {
        if tx.is_system() || tx.is_empty() {
            return Resolution::pass_through(tx);
        }

        let Some(after_text) = tx.apply(before.text()) else {
            tracing::warn!("transaction does not apply to the document; passing through");
            return Resolution::pass_through(tx);
        };
        let after = LineBuffer::new(after_text);

        let changes = detect(before, &after, tx);
        if changes.is_empty() {
            return Resolution::pass_through(tx);
        }
        tracing::debug!(count = changes.len(), "detected marker changes");

        let mut primary = tx.clone();
        let mut current = after;

        if self.behavior.cycle_complete_status {
            let proposals = cycle_detected(&current, &changes, &self.config, &self.behavior);
            let rewritten = (!proposals.is_empty())
                .then(|| tx.with_rewrites(&proposals))
                .flatten()
                .and_then(|rewritten| {
                    let text = rewritten.apply(before.text())?;
                    Some((rewritten, text))
                });
            if let Some((rewritten, text)) = rewritten {
                primary = rewritten;
                current = LineBuffer::new(text);
            }
        }

        let follow_up = if self.behavior.auto_complete_parent {
            self.propagate(&current, changes.iter().map(|change| change.line))
        } else {
            None
        };

        Resolution { primary, follow_up }
    }

    /// Recomputes the parent of each given line, one level up.
    ///
    /// Returns a system transaction with the parent marker edits, or `None`
    /// if every parent already reflects its children.
    pub fn propagate<B: TextBuffer + ?Sized>(
        &self,
        buffer: &B,
        lines: impl IntoIterator<Item = usize>,
    ) -> Option<Transaction> {
        let parents: BTreeSet<usize> = lines
            .into_iter()
            .filter_map(|line| find_parent(buffer, line))
            .map(|parent| parent.line)
            .collect();

        let proposals: Vec<_> = parents
            .into_iter()
            .filter_map(|parent| {
                transition::decide(buffer, parent, &self.config, &self.behavior, self.indent_unit)
            })
            .collect();

        if proposals.is_empty() {
            return None;
        }
        tracing::debug!(count = proposals.len(), "parent updates");
        Some(Transaction::system(proposals))
    }
}

impl Default for TaskEngine {
    fn default() -> Self {
        Self::new(StatusConfig::default(), Behavior::default())
    }
}
