//! Predefined status collections
//!
//! Each theme is a fixed table of `(mark, name, category)` entries matching
//! the custom checkbox styles shipped by popular Markdown themes. The set is
//! closed, so lookup is an ordinary `match`.

use std::fmt;
use std::str::FromStr;

use super::status::{Category, CategoryMarks};

use Category::{Abandoned as AB, Completed as CO, InProgress as IP, NotStarted as NS, Planned as PL};

/// A single theme entry: marker, display name, category
pub type StatusEntry = (char, &'static str, Category);

/// Known status themes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Theme {
    AnuPpuccin,
    Aura,
    Border,
    Ebullientworks,
    Its,
    LytMode,
    Minimal,
    Things,
}

impl Theme {
    pub fn all() -> &'static [Theme] {
        &[
            Theme::AnuPpuccin,
            Theme::Aura,
            Theme::Border,
            Theme::Ebullientworks,
            Theme::Its,
            Theme::LytMode,
            Theme::Minimal,
            Theme::Things,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Theme::AnuPpuccin => "AnuPpuccin",
            Theme::Aura => "Aura",
            Theme::Border => "Border",
            Theme::Ebullientworks => "Ebullientworks",
            Theme::Its => "ITS",
            Theme::LytMode => "LYTMode",
            Theme::Minimal => "Minimal",
            Theme::Things => "Things",
        }
    }

    /// Returns the theme's status table
    pub fn statuses(&self) -> &'static [StatusEntry] {
        match self {
            Theme::AnuPpuccin => ANUPPUCCIN,
            Theme::Aura => AURA,
            Theme::Border => BORDER,
            Theme::Ebullientworks => EBULLIENTWORKS,
            Theme::Its => ITS,
            Theme::LytMode => LYT_MODE,
            // Things ships the same checkbox set as Minimal
            Theme::Minimal | Theme::Things => MINIMAL,
        }
    }

    /// Overwrites each category the theme defines with the theme's marks.
    ///
    /// Categories the theme has no entries for keep their current marks.
    pub fn apply(&self, categories: &mut CategoryMarks) {
        for category in Category::ALL {
            let marks: Vec<char> = self
                .statuses()
                .iter()
                .filter(|(_, _, c)| *c == category)
                .map(|(mark, _, _)| *mark)
                .collect();
            if !marks.is_empty() {
                *categories.get_mut(category) = marks;
            }
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Theme::all()
            .iter()
            .find(|theme| theme.name().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or_else(|| format!("unknown theme: {}", s))
    }
}

const ANUPPUCCIN: &[StatusEntry] = &[
    (' ', "Unchecked", NS),
    ('x', "Checked", CO),
    ('>', "Rescheduled", PL),
    ('<', "Scheduled", PL),
    ('!', "Important", NS),
    ('-', "Cancelled", AB),
    ('/', "In Progress", IP),
    ('?', "Question", NS),
    ('*', "Star", NS),
    ('n', "Note", NS),
    ('l', "Location", NS),
    ('i', "Information", NS),
    ('I', "Idea", NS),
    ('S', "Amount", NS),
    ('p', "Pro", NS),
    ('c', "Con", NS),
    ('b', "Bookmark", NS),
    ('"', "Quote", NS),
    ('0', "Speech bubble 0", NS),
    ('1', "Speech bubble 1", NS),
    ('2', "Speech bubble 2", NS),
    ('3', "Speech bubble 3", NS),
    ('4', "Speech bubble 4", NS),
    ('5', "Speech bubble 5", NS),
    ('6', "Speech bubble 6", NS),
    ('7', "Speech bubble 7", NS),
    ('8', "Speech bubble 8", NS),
    ('9', "Speech bubble 9", NS),
];

const AURA: &[StatusEntry] = &[
    (' ', "incomplete", NS),
    ('x', "complete / done", CO),
    ('-', "cancelled", AB),
    ('>', "deferred", PL),
    ('/', "in progress, or half-done", IP),
    ('!', "Important", NS),
    ('?', "question", NS),
    ('R', "review", NS),
    ('+', "Inbox / task that should be processed later", NS),
    ('b', "bookmark", NS),
    ('B', "brainstorm", NS),
    ('D', "deferred or scheduled", PL),
    ('I', "Info", NS),
    ('i', "idea", NS),
    ('N', "note", NS),
    ('Q', "quote", NS),
    ('W', "win / success / reward", NS),
    ('P', "pro", NS),
    ('C', "con", NS),
];

const BORDER: &[StatusEntry] = &[
    (' ', "To Do", NS),
    ('/', "In Progress", IP),
    ('x', "Done", CO),
    ('-', "Cancelled", AB),
    ('>', "Rescheduled", PL),
    ('<', "Scheduled", PL),
    ('!', "Important", NS),
    ('?', "Question", NS),
    ('i', "Infomation", NS),
    ('S', "Amount", NS),
    ('*', "Star", NS),
    ('b', "Bookmark", NS),
    ('\u{201c}', "Quote", NS),
    ('n', "Note", NS),
    ('l', "Location", NS),
    ('I', "Idea", NS),
    ('p', "Pro", NS),
    ('c', "Con", NS),
    ('u', "Up", NS),
    ('d', "Down", NS),
];

const EBULLIENTWORKS: &[StatusEntry] = &[
    (' ', "Unchecked", NS),
    ('x', "Checked", CO),
    ('-', "Cancelled", AB),
    ('/', "In Progress", IP),
    ('>', "Deferred", PL),
    ('!', "Important", NS),
    ('?', "Question", PL),
    ('r', "Review", NS),
];

const ITS: &[StatusEntry] = &[
    (' ', "Unchecked", NS),
    ('x', "Regular", CO),
    ('X', "Checked", CO),
    ('-', "Dropped", AB),
    ('>', "Forward", PL),
    ('D', "Date", NS),
    ('?', "Question", PL),
    ('/', "Half Done", IP),
    ('+', "Add", NS),
    ('R', "Research", NS),
    ('!', "Important", NS),
    ('i', "Idea", NS),
    ('B', "Brainstorm", NS),
    ('P', "Pro", NS),
    ('C', "Con", NS),
    ('Q', "Quote", NS),
    ('N', "Note", NS),
    ('b', "Bookmark", NS),
    ('I', "Information", NS),
    ('p', "Paraphrase", NS),
    ('L', "Location", NS),
    ('E', "Example", NS),
    ('A', "Answer", NS),
    ('r', "Reward", NS),
    ('c', "Choice", NS),
    ('d', "Doing", IP),
    ('T', "Time", NS),
    ('@', "Character / Person", NS),
    ('t', "Talk", NS),
    ('O', "Outline / Plot", NS),
    ('~', "Conflict", NS),
    ('W', "World", NS),
    ('f', "Clue / Find", NS),
    ('F', "Foreshadow", NS),
    ('H', "Favorite / Health", NS),
    ('&', "Symbolism", NS),
    ('s', "Secret", NS),
];

const LYT_MODE: &[StatusEntry] = &[
    (' ', "Unchecked", NS),
    ('x', "Checked", CO),
    ('>', "Rescheduled", PL),
    ('<', "Scheduled", PL),
    ('!', "Important", NS),
    ('-', "Cancelled", AB),
    ('/', "In Progress", IP),
    ('?', "Question", NS),
    ('*', "Star", NS),
    ('n', "Note", NS),
    ('l', "Location", NS),
    ('i', "Information", NS),
    ('I', "Idea", NS),
    ('S', "Amount", NS),
    ('p', "Pro", NS),
    ('c', "Con", NS),
    ('b', "Bookmark", NS),
    ('f', "Fire", NS),
    ('k', "Key", NS),
    ('w', "Win", NS),
    ('u', "Up", NS),
    ('d', "Down", NS),
];

const MINIMAL: &[StatusEntry] = &[
    (' ', "to-do", NS),
    ('/', "incomplete", IP),
    ('x', "done", CO),
    ('-', "canceled", AB),
    ('>', "forwarded", PL),
    ('<', "scheduling", PL),
    ('?', "question", NS),
    ('*', "star", NS),
    ('"', "quote", NS),
    ('l', "location", NS),
    ('b', "bookmark", NS),
    ('i', "information", NS),
    ('S', "savings", NS),
    ('I', "idea", NS),
    ('p', "pros", NS),
    ('c', "cons", NS),
    ('f', "fire", NS),
    ('k', "key", NS),
    ('w', "win", NS),
    ('u', "up", NS),
    ('d', "down", NS),
];
