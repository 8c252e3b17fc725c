//! Status theme listing

use anyhow::Result;

use super::output::Output;
use crate::domain::Theme;

pub fn run(output: &Output, name: Option<&str>) -> Result<()> {
    match name {
        Some(name) => show_theme(output, name.parse().map_err(anyhow::Error::msg)?),
        None => {
            list_themes(output);
            Ok(())
        }
    }
}

fn list_themes(output: &Output) {
    if output.is_json() {
        let items: Vec<_> = Theme::all()
            .iter()
            .map(|theme| {
                serde_json::json!({
                    "name": theme.name(),
                    "statuses": theme.statuses().len(),
                })
            })
            .collect();
        output.data(&items);
        return;
    }

    for theme in Theme::all() {
        let count = format!("{} statuses", theme.statuses().len());
        output.row(&[theme.name(), count.as_str()]);
    }
}

fn show_theme(output: &Output, theme: Theme) -> Result<()> {
    if output.is_json() {
        let statuses: Vec<_> = theme
            .statuses()
            .iter()
            .map(|(mark, name, category)| {
                serde_json::json!({
                    "mark": mark.to_string(),
                    "name": name,
                    "category": category,
                })
            })
            .collect();
        output.data(&serde_json::json!({
            "name": theme.name(),
            "statuses": statuses,
        }));
        return Ok(());
    }

    println!("{}", theme.name());
    println!("{}", "-".repeat(40));
    for (mark, name, category) in theme.statuses() {
        println!("[{}]  {:<16} {}", mark, name, category);
    }
    Ok(())
}
