//! Task status configuration
//!
//! A [`StatusConfig`] maps the single character inside `[ ]` to one of five
//! semantic [`Category`] values and defines the ordered cycle a marker
//! advances through when toggled.
//!
//! Classification precedence is fixed:
//!
//! 1. `only_count_marks` (when set) decides what counts at all
//! 2. `exclude_marks` removes markers from counting
//! 3. category lookup (completed, in progress, abandoned, planned, not started)
//! 4. the configured fallback category

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Coarse semantic category of a task marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Completed,
    InProgress,
    Abandoned,
    Planned,
    #[default]
    NotStarted,
}

impl Category {
    /// All categories in lookup order
    pub const ALL: [Category; 5] = [
        Category::Completed,
        Category::InProgress,
        Category::Abandoned,
        Category::Planned,
        Category::NotStarted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Completed => "completed",
            Category::InProgress => "in_progress",
            Category::Abandoned => "abandoned",
            Category::Planned => "planned",
            Category::NotStarted => "not_started",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    /// Accepts both `in_progress` and `inProgress` spellings
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "completed" => Ok(Category::Completed),
            "inprogress" => Ok(Category::InProgress),
            "abandoned" => Ok(Category::Abandoned),
            "planned" => Ok(Category::Planned),
            "notstarted" => Ok(Category::NotStarted),
            _ => Err(format!("unknown status category: {}", s)),
        }
    }
}

/// Direction to move through the status cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

/// Marker characters belonging to each category
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CategoryMarks {
    pub completed: Vec<char>,
    pub in_progress: Vec<char>,
    pub abandoned: Vec<char>,
    pub planned: Vec<char>,
    pub not_started: Vec<char>,
}

impl CategoryMarks {
    /// The classic defaults: `x|X`, `>|/`, `-`, `?` and a blank box
    pub fn classic() -> Self {
        Self {
            completed: vec!['x', 'X'],
            in_progress: vec!['>', '/'],
            abandoned: vec!['-'],
            planned: vec!['?'],
            not_started: vec![' '],
        }
    }

    /// Builds category marks from pipe-delimited strings such as `"x|X"`
    pub fn from_strings(
        completed: &str,
        in_progress: &str,
        abandoned: &str,
        planned: &str,
        not_started: &str,
    ) -> Self {
        Self {
            completed: parse_marks(completed),
            in_progress: parse_marks(in_progress),
            abandoned: parse_marks(abandoned),
            planned: parse_marks(planned),
            not_started: parse_marks(not_started),
        }
    }

    pub fn get(&self, category: Category) -> &[char] {
        match category {
            Category::Completed => &self.completed,
            Category::InProgress => &self.in_progress,
            Category::Abandoned => &self.abandoned,
            Category::Planned => &self.planned,
            Category::NotStarted => &self.not_started,
        }
    }

    pub fn get_mut(&mut self, category: Category) -> &mut Vec<char> {
        match category {
            Category::Completed => &mut self.completed,
            Category::InProgress => &mut self.in_progress,
            Category::Abandoned => &mut self.abandoned,
            Category::Planned => &mut self.planned,
            Category::NotStarted => &mut self.not_started,
        }
    }

    /// Returns the first category listing `mark`, in [`Category::ALL`] order
    pub fn lookup(&self, mark: char) -> Option<Category> {
        Category::ALL
            .into_iter()
            .find(|category| self.get(*category).contains(&mark))
    }
}

/// Parses a mark list such as `"x|X"` or `"?!"` into characters.
///
/// Pipes separate entries; every character of an entry is a mark, so both
/// the pipe-delimited and the run-together spellings work. Whitespace is
/// significant because a blank box is a valid mark.
pub fn parse_marks(s: &str) -> Vec<char> {
    let mut marks = Vec::new();
    for piece in s.split('|') {
        for c in piece.chars() {
            if !marks.contains(&c) {
                marks.push(c);
            }
        }
    }
    marks
}

/// Immutable status configuration passed to every core operation
#[derive(Debug, Clone, PartialEq)]
pub struct StatusConfig {
    cycle: Vec<String>,
    marks: Vec<(String, char)>,
    excluded_from_cycle: Vec<String>,
    categories: CategoryMarks,
    only_count_marks: Option<Vec<char>>,
    exclude_marks: Vec<char>,
    fallback: Category,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self::new(CategoryMarks::classic()).with_cycle(
            ["TODO", "DOING", "IN-PROGRESS", "DONE"],
            [("TODO", ' '), ("DOING", '-'), ("IN-PROGRESS", '>'), ("DONE", 'x')],
        )
    }
}

impl StatusConfig {
    /// Creates a configuration from independent category mark lists
    /// with an empty cycle
    pub fn new(categories: CategoryMarks) -> Self {
        Self {
            cycle: Vec::new(),
            marks: Vec::new(),
            excluded_from_cycle: Vec::new(),
            categories,
            only_count_marks: None,
            exclude_marks: Vec::new(),
            fallback: Category::NotStarted,
        }
    }

    /// Creates a configuration whose categories are derived from the cycle:
    /// the first status is not started, the last is completed, everything
    /// in between is in progress.
    pub fn from_cycle<S, N>(
        cycle: impl IntoIterator<Item = S>,
        marks: impl IntoIterator<Item = (N, char)>,
    ) -> Self
    where
        S: Into<String>,
        N: Into<String>,
    {
        let mut config = Self::new(CategoryMarks::default()).with_cycle(cycle, marks);

        let count = config.cycle.len();
        let mut categories = CategoryMarks::default();
        for (index, status) in config.cycle.iter().enumerate() {
            let Some(mark) = config.mark_of(status) else {
                continue;
            };
            let category = if index == 0 {
                Category::NotStarted
            } else if index + 1 == count {
                Category::Completed
            } else {
                Category::InProgress
            };
            let list = categories.get_mut(category);
            if !list.contains(&mark) {
                list.push(mark);
            }
        }
        config.categories = categories;
        config
    }

    /// Sets the status cycle and the mark for each status
    pub fn with_cycle<S, N>(
        mut self,
        cycle: impl IntoIterator<Item = S>,
        marks: impl IntoIterator<Item = (N, char)>,
    ) -> Self
    where
        S: Into<String>,
        N: Into<String>,
    {
        self.cycle = Vec::new();
        for status in cycle {
            let status = status.into();
            if !self.cycle.contains(&status) {
                self.cycle.push(status);
            }
        }
        self.marks = marks.into_iter().map(|(n, m)| (n.into(), m)).collect();
        self
    }

    /// Sets the statuses skipped when cycling
    pub fn with_excluded_from_cycle<S: Into<String>>(
        mut self,
        excluded: impl IntoIterator<Item = S>,
    ) -> Self {
        self.excluded_from_cycle = excluded.into_iter().map(Into::into).collect();
        self
    }

    /// Restricts counting to the given marks (plus the blank box)
    pub fn with_only_count_marks(mut self, marks: Option<Vec<char>>) -> Self {
        self.only_count_marks = marks;
        self
    }

    /// Sets marks that are never counted
    pub fn with_exclude_marks(mut self, marks: Vec<char>) -> Self {
        self.exclude_marks = marks;
        self
    }

    /// Sets the category for marks no category lists
    pub fn with_fallback(mut self, fallback: Category) -> Self {
        self.fallback = fallback;
        self
    }

    /// Replaces the category mark table
    pub fn with_categories(mut self, categories: CategoryMarks) -> Self {
        self.categories = categories;
        self
    }

    pub fn cycle(&self) -> &[String] {
        &self.cycle
    }

    pub fn categories(&self) -> &CategoryMarks {
        &self.categories
    }

    pub fn fallback(&self) -> Category {
        self.fallback
    }

    pub fn exclude_marks(&self) -> &[char] {
        &self.exclude_marks
    }

    pub fn only_count_marks(&self) -> Option<&[char]> {
        self.only_count_marks.as_deref()
    }

    /// Returns true if the marker is ignored entirely when counting
    pub fn is_excluded(&self, mark: char) -> bool {
        match &self.only_count_marks {
            // An empty list counts nothing at all
            Some(only) if only.is_empty() => true,
            // The blank box still counts toward the total so that
            // progress is measured against unfinished work.
            Some(only) => !(only.contains(&mark) || mark == ' '),
            None => self.exclude_marks.contains(&mark),
        }
    }

    /// Returns true if the marker counts toward a total
    pub fn counts(&self, mark: char) -> bool {
        !self.is_excluded(mark)
    }

    /// Classifies a marker into exactly one category
    pub fn classify(&self, mark: char) -> Category {
        if let Some(only) = &self.only_count_marks {
            if only.contains(&mark) {
                return Category::Completed;
            }
            return self.non_completed_category(mark);
        }

        if self.exclude_marks.contains(&mark) {
            return Category::NotStarted;
        }

        self.categories.lookup(mark).unwrap_or(self.fallback)
    }

    /// Returns true if the marker counts and classifies as completed
    pub fn is_completed(&self, mark: char) -> bool {
        self.counts(mark) && self.classify(mark) == Category::Completed
    }

    fn non_completed_category(&self, mark: char) -> Category {
        [Category::InProgress, Category::Abandoned, Category::Planned]
            .into_iter()
            .find(|category| self.categories.get(*category).contains(&mark))
            .unwrap_or(match self.fallback {
                Category::Completed => Category::NotStarted,
                other => other,
            })
    }

    /// The cycle with excluded statuses removed
    pub fn remaining_cycle(&self) -> Vec<&str> {
        self.cycle
            .iter()
            .filter(|status| !self.excluded_from_cycle.contains(status))
            .map(String::as_str)
            .collect()
    }

    fn mark_of(&self, status: &str) -> Option<char> {
        self.marks
            .iter()
            .find(|(name, _)| name == status)
            .map(|(_, mark)| *mark)
    }

    /// Returns the mark for a status, or a blank box when unmapped
    pub fn mark_for(&self, status: &str) -> char {
        self.mark_of(status).unwrap_or(' ')
    }

    /// Returns the first cycle status using `mark`, if any
    pub fn known_status(&self, mark: char) -> Option<&str> {
        self.cycle
            .iter()
            .find(|status| self.mark_of(status) == Some(mark))
            .map(String::as_str)
    }

    /// Returns the status for a mark, falling back to the first cycle entry
    pub fn status_for_mark(&self, mark: char) -> Option<&str> {
        self.known_status(mark)
            .or_else(|| self.cycle.first().map(String::as_str))
    }

    /// Returns the status after `current` in the remaining cycle.
    ///
    /// A status not in the remaining cycle is treated as its first entry.
    pub fn next_in_cycle(&self, current: &str, direction: Direction) -> Option<&str> {
        let remaining = self.remaining_cycle();
        let index = remaining.iter().position(|s| *s == current).unwrap_or(0);
        step(&remaining, index, direction)
    }

    /// Returns the mark after `mark` in the remaining cycle.
    ///
    /// Unrecognized marks are treated as sitting on the first entry.
    pub fn next_mark(&self, mark: char, direction: Direction) -> Option<char> {
        let remaining = self.remaining_cycle();
        let index = remaining
            .iter()
            .position(|status| self.mark_of(status) == Some(mark))
            .unwrap_or(0);
        step(&remaining, index, direction).map(|status| self.mark_for(status))
    }

    /// The mark written when a parent becomes completed
    pub fn completed_mark(&self) -> char {
        self.categories
            .completed
            .first()
            .copied()
            .or_else(|| self.cycle.last().and_then(|s| self.mark_of(s)))
            .unwrap_or('x')
    }

    /// The mark written when a parent becomes in progress
    pub fn in_progress_mark(&self) -> char {
        self.categories.in_progress.first().copied().unwrap_or('/')
    }
}

fn step<'a>(remaining: &[&'a str], index: usize, direction: Direction) -> Option<&'a str> {
    if remaining.is_empty() {
        return None;
    }
    let len = remaining.len();
    let next = match direction {
        Direction::Forward => (index + 1) % len,
        Direction::Backward => (index + len - 1) % len,
    };
    Some(remaining[next])
}
