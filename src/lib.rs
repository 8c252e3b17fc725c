//! taskmark - Markdown task progress and status propagation
//!
//! Markdown task lists (`- [ ]`, `- [x]`, ...) carry a single-character
//! marker per task. taskmark classifies those markers into semantic
//! categories, counts progress under tasks and headings, cycles markers
//! through a configurable status sequence, and keeps parent tasks in step
//! with their children.
//!
//! The [`domain`] module is the pure core; [`storage`] and [`cli`] drive it
//! against files on disk.

pub mod cli;
pub mod domain;
pub mod storage;

pub use domain::{Aggregate, Behavior, Category, LineBuffer, StatusConfig, TaskEngine, Transaction};
