//! Output formatting utilities for the CLI.

use comfy_table::{presets, Cell, CellAlignment, ContentArrangement, Table};
use console::{style, StyledObject};
use serde::Serialize;

use crate::domain::models::{CompletionBand, Goal, DATE_FORMAT};

pub trait CommandOutput: Serialize {
    fn to_human(&self) -> String;
    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub fn output<T: CommandOutput>(result: &T, json_mode: bool) {
    if json_mode {
        println!("{}", serde_json::to_string_pretty(&result.to_json()).unwrap_or_default());
    } else {
        println!("{}", result.to_human());
    }
}

/// Truncate a string to at most `max_chars` characters, appending "..." if truncated.
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

/// First eight characters of an id, enough to resolve it again.
pub fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

/// Completion percentage coloured by progress band.
pub fn styled_completion(completion: u8) -> StyledObject<String> {
    let text = format!("{completion:>3}%");
    match CompletionBand::from_completion(completion) {
        CompletionBand::Low => style(text).red(),
        CompletionBand::LowerMiddle => style(text).yellow(),
        CompletionBand::UpperMiddle => style(text).cyan(),
        CompletionBand::High => style(text).green(),
        CompletionBand::Complete => style(text).green().bold(),
    }
}

pub fn format_deadline(goal: &Goal) -> String {
    goal.deadline.map(|d| d.format(DATE_FORMAT).to_string()).unwrap_or_else(|| "-".to_string())
}

/// Create a standard borderless list table with the given headers.
pub fn list_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers.iter().map(|h| Cell::new(h.to_uppercase()).set_alignment(CellAlignment::Left)));
    table
}

/// Render the table below a count line.
pub fn render_list(entity_name: &str, table: &Table, total: usize) -> String {
    if total == 0 {
        return format!("No {entity_name}s found.");
    }
    let noun = if total == 1 { entity_name.to_string() } else { format!("{entity_name}s") };
    format!("{} {noun}:\n{table}", style(total).bold())
}
