//! Main CLI application structure

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use super::output::{Output, OutputFormat};
use super::{config_cmd, edit, progress, themes_cmd, watch};
use crate::domain::{StatusConfig, TaskEngine};
use crate::storage::{Config, Settings};

#[derive(Parser)]
#[command(name = "taskmark")]
#[command(author, version, about = "Task progress and status propagation for Markdown files")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Settings file (defaults to .taskmark.toml, then the global config)
    #[arg(long, short = 'c', global = true, env = "TASKMARK_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default .taskmark.toml
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Show task progress for a document
    Progress {
        /// Markdown file
        file: PathBuf,

        /// Count all descendants, not just direct children
        #[arg(long)]
        all_levels: bool,

        /// Include heading sections
        #[arg(long)]
        headings: bool,
    },

    /// Explain how a single line is classified
    Inspect {
        /// Markdown file
        file: PathBuf,

        /// Line number (1-based)
        #[arg(long, short = 'l')]
        line: usize,
    },

    /// Type a marker into a task, as an editor would
    Edit {
        /// Markdown file
        file: PathBuf,

        /// Line number (1-based)
        #[arg(long, short = 'l')]
        line: usize,

        /// The character typed between the brackets
        #[arg(long, short = 'm')]
        mark: char,

        /// Save the result instead of only reporting it
        #[arg(long, short = 'w')]
        write: bool,
    },

    /// Advance a task to the next status in the cycle
    Cycle {
        /// Markdown file
        file: PathBuf,

        /// Line number (1-based)
        #[arg(long, short = 'l')]
        line: usize,

        /// Step backward instead of forward
        #[arg(long, conflicts_with = "extreme")]
        backward: bool,

        /// Jump to the final status (or back to the first)
        #[arg(long)]
        extreme: bool,

        /// Save the result instead of only reporting it
        #[arg(long, short = 'w')]
        write: bool,
    },

    /// Set a task to a named status
    Set {
        /// Markdown file
        file: PathBuf,

        /// Line number (1-based)
        #[arg(long, short = 'l')]
        line: usize,

        /// Status name from the cycle (e.g. DONE)
        #[arg(long, short = 's')]
        status: String,

        /// Save the result instead of only reporting it
        #[arg(long, short = 'w')]
        write: bool,
    },

    /// Re-print progress whenever the document changes
    Watch {
        /// Markdown file
        file: PathBuf,

        /// Debounce delay in milliseconds
        #[arg(long, default_value = "300")]
        debounce_ms: u64,
    },

    /// List status themes, or show one
    Themes {
        /// Theme name
        name: Option<String>,
    },

    /// Show the effective settings
    Config,
}

/// Settings resolved for one invocation
pub struct Context {
    pub settings: Settings,
    pub source: Option<PathBuf>,
    pub status: StatusConfig,
}

impl Context {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = Config::load(path)?;
        let status = config.settings.status_config()?;
        Ok(Self {
            settings: config.settings,
            source: config.source,
            status,
        })
    }

    pub fn engine(&self) -> TaskEngine {
        TaskEngine::new(self.status.clone(), self.settings.behavior)
            .with_indent_unit(self.settings.editor.tab_size)
    }
}

/// Converts a 1-based line argument to a 0-based index
pub fn line_index(line: usize) -> Result<usize> {
    if line == 0 {
        anyhow::bail!("Line numbers start at 1");
    }
    Ok(line - 1)
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "taskmark=debug,info" } else { "taskmark=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // Keeps any subscriber already installed
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let output = Output::new(cli.format);
    let config = cli.config.as_deref();

    tracing::debug!("taskmark starting");

    match cli.command {
        Commands::Init { path } => config_cmd::init(&output, &path)?,
        Commands::Config => config_cmd::show(&output, &Context::load(config)?)?,
        Commands::Themes { name } => themes_cmd::run(&output, name.as_deref())?,

        Commands::Progress { file, all_levels, headings } => {
            let ctx = Context::load(config)?;
            progress::show(&output, &ctx, &file, all_levels, headings)?
        }
        Commands::Inspect { file, line } => {
            progress::inspect(&output, &Context::load(config)?, &file, line_index(line)?)?
        }

        Commands::Edit { file, line, mark, write } => {
            let ctx = Context::load(config)?;
            edit::type_mark(&output, &ctx, &file, line_index(line)?, mark, write)?
        }
        Commands::Cycle { file, line, backward, extreme, write } => {
            let ctx = Context::load(config)?;
            let step = if extreme {
                edit::Step::Extreme
            } else if backward {
                edit::Step::Backward
            } else {
                edit::Step::Forward
            };
            edit::cycle(&output, &ctx, &file, line_index(line)?, step, write)?
        }
        Commands::Set { file, line, status, write } => {
            let ctx = Context::load(config)?;
            edit::set(&output, &ctx, &file, line_index(line)?, &status, write)?
        }

        Commands::Watch { file, debounce_ms } => {
            let ctx = Context::load(config)?;
            watch::run(&output, &ctx, &file, debounce_ms)?
        }
    }

    tracing::debug!("command completed");
    Ok(())
}
