//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! ## Command Groups
//!
//! | Group | Purpose | Examples |
//! |-------|---------|----------|
//! | Progress | Counting and classification | `progress`, `inspect` |
//! | Editing | Marker changes with parent propagation | `edit`, `cycle`, `set` |
//! | Live | Re-render on file changes | `watch` |
//! | Settings | Configuration and themes | `init`, `config`, `themes` |
//!
//! Line numbers on the command line are 1-based.
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug output on stderr; `RUST_LOG`
//! overrides the filter:
//! ```bash
//! taskmark --verbose progress notes.md
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod output;
mod progress;
mod edit;
mod watch;
mod config_cmd;
mod themes_cmd;

pub use app::{Cli, Commands, Context, run};
pub use output::{Output, OutputFormat};
