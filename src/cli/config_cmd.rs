//! Settings commands

use std::path::Path;

use anyhow::Result;

use super::app::Context;
use super::output::Output;
use crate::storage::Config;

pub fn init(output: &Output, dir: &Path) -> Result<()> {
    let path = Config::init(dir)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "path": path.display().to_string(),
        }));
    } else {
        output.success(&format!("Wrote {}", path.display()));
    }
    Ok(())
}

/// Prints the effective settings and the cycle they resolve to
pub fn show(output: &Output, ctx: &Context) -> Result<()> {
    let source = ctx.source.as_ref().map(|path| path.display().to_string());
    let cycle: Vec<_> = ctx
        .status
        .cycle()
        .iter()
        .map(|status| {
            serde_json::json!({
                "status": status,
                "mark": ctx.status.mark_for(status).to_string(),
                "category": ctx.status.classify(ctx.status.mark_for(status)),
            })
        })
        .collect();

    if output.is_json() {
        output.data(&serde_json::json!({
            "source": source,
            "settings": ctx.settings,
            "cycle": cycle,
        }));
        return Ok(());
    }

    match &source {
        Some(path) => println!("# Loaded from {}", path),
        None => println!("# Built-in defaults"),
    }
    print!("{}", ctx.settings.to_toml()?);

    println!("\n# Cycle");
    let remaining = ctx.status.remaining_cycle();
    for status in ctx.status.cycle() {
        let mark = ctx.status.mark_for(status);
        let note = if remaining.contains(&status.as_str()) { "" } else { " (skipped)" };
        println!("# [{}] {} -> {}{}", mark, status, ctx.status.classify(mark), note);
    }
    Ok(())
}
