//! Progress and inspection commands

use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use super::app::Context;
use super::output::{fraction, Output};
use crate::domain::{
    aggregate, block_at, collect_progress, find_parent, match_task_in, Aggregate, BlockKind, Direction,
    SyntaxContext, TextBuffer,
};
use crate::storage::{Document, DocumentError};

#[derive(Debug, Serialize)]
pub(super) struct ProgressRow {
    /// 1-based
    pub line: usize,
    #[serde(flatten)]
    pub kind: BlockKind,
    pub label: String,
    #[serde(flatten)]
    pub aggregate: Aggregate,
}

#[derive(Debug, Serialize)]
pub(super) struct ProgressReport {
    pub file: String,
    pub hidden: bool,
    pub entries: Vec<ProgressRow>,
}

/// Computes the progress listing for a document, honoring visibility rules
pub(super) fn report(ctx: &Context, path: &Path, all_levels: bool, headings: bool) -> Result<ProgressReport> {
    let doc = Document::load(path)?;
    let root = std::env::current_dir()?;

    if doc.is_progress_hidden(&ctx.settings.visibility, &root) {
        tracing::debug!(path = %path.display(), "progress hidden by visibility settings");
        return Ok(ProgressReport {
            file: path.display().to_string(),
            hidden: true,
            entries: Vec::new(),
        });
    }

    let options = ctx.settings.progress_options(all_levels, headings);
    let buffer = doc.buffer();
    let entries = collect_progress(buffer, &ctx.status, options)
        .into_iter()
        .map(|entry| ProgressRow {
            line: entry.line + 1,
            kind: entry.kind,
            label: buffer.line(entry.line).map(label).unwrap_or_default(),
            aggregate: entry.aggregate,
        })
        .collect();

    Ok(ProgressReport {
        file: path.display().to_string(),
        hidden: false,
        entries,
    })
}

pub(super) fn print_report(output: &Output, report: &ProgressReport) {
    if output.is_json() {
        output.data(report);
        return;
    }

    if report.hidden {
        println!("Progress is hidden for {}", report.file);
    } else if report.entries.is_empty() {
        println!("No tasks with subtasks in {}", report.file);
    } else {
        println!("{:>5}  {:<12} TITLE", "LINE", "DONE");
        println!("{}", "-".repeat(60));
        for row in &report.entries {
            let title = match row.kind {
                BlockKind::Heading(level) => format!("{} {}", "#".repeat(level), row.label),
                BlockKind::Bullet => row.label.clone(),
            };
            println!(
                "{:>5}  {:<12} {}",
                row.line,
                fraction(row.aggregate.completed, row.aggregate.total),
                title
            );
        }
    }
}

pub fn show(output: &Output, ctx: &Context, path: &Path, all_levels: bool, headings: bool) -> Result<()> {
    let report = report(ctx, path, all_levels, headings)?;
    print_report(output, &report);
    Ok(())
}

/// The readable text of a task or heading line
fn label(line: &str) -> String {
    if let Some(task) = match_task_in(line, SyntaxContext::Text) {
        // Skip the marker and its closing bracket
        let rest = task.marker_offset + task.marker.len_utf8() + 1;
        return line.get(rest..).unwrap_or_default().trim().to_string();
    }
    line.trim_start_matches('#').trim().to_string()
}

#[derive(Debug, Serialize)]
struct TaskDetails {
    marker: char,
    category: String,
    counted: bool,
    status: Option<String>,
    next_mark: Option<char>,
    indent_level: usize,
}

#[derive(Debug, Serialize)]
struct Inspection {
    line: usize,
    text: String,
    context: SyntaxContext,
    task: Option<TaskDetails>,
    parent: Option<usize>,
    children: Option<Aggregate>,
}

pub fn inspect(output: &Output, ctx: &Context, path: &Path, line: usize) -> Result<()> {
    let doc = Document::load(path)?;
    let buffer = doc.buffer();
    let text = buffer.line(line).ok_or(DocumentError::LineOutOfRange {
        line: line + 1,
        count: buffer.line_count(),
    })?;
    let context = buffer.context(line);
    let config = &ctx.status;

    let task = match_task_in(text, context).map(|task| TaskDetails {
        marker: task.marker,
        category: config.classify(task.marker).to_string(),
        counted: config.counts(task.marker),
        status: config.known_status(task.marker).map(str::to_string),
        next_mark: config.next_mark(task.marker, Direction::Forward),
        indent_level: task.indent.level(ctx.settings.editor.tab_size),
    });
    let children = block_at(buffer, line)
        .map(|block| aggregate(buffer, &block, config, ctx.settings.aggregate_options(&block)))
        .filter(|agg| agg.total > 0);

    let inspection = Inspection {
        line: line + 1,
        text: text.to_string(),
        context,
        task,
        parent: find_parent(buffer, line).map(|parent| parent.line + 1),
        children,
    };

    if output.is_json() {
        output.data(&inspection);
        return Ok(());
    }

    println!("Line {}: {}", inspection.line, inspection.text);
    if inspection.context != SyntaxContext::Text {
        println!("Context: {:?}", inspection.context);
    }
    match &inspection.task {
        Some(task) => {
            println!("Marker: [{}]", task.marker);
            if task.counted {
                println!("Category: {}", task.category);
            } else {
                println!("Category: {} (not counted)", task.category);
            }
            println!("Status: {}", task.status.as_deref().unwrap_or("(not in cycle)"));
            if let Some(next) = task.next_mark {
                println!("Next: [{}]", next);
            }
            println!("Level: {}", task.indent_level);
        }
        None => println!("Not a task"),
    }
    if let Some(parent) = inspection.parent {
        println!("Parent: line {}", parent);
    }
    if let Some(children) = &inspection.children {
        println!("Children: {}", fraction(children.completed, children.total));
    }

    Ok(())
}
