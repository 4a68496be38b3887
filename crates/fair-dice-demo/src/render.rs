//! Plain-text rendering of dice and probability tables.

use fair_dice_core::{estimator::ProbabilityTable, game::DiceCollection};

pub fn dice_at(dice: &DiceCollection, index: usize) -> String {
    dice.get(index).map(|d| d.to_string()).unwrap_or_default()
}

/// Rows are the user's dice, columns the opponent's
pub fn table(table: &ProbabilityTable, dice: &DiceCollection) -> String {
    let labels: Vec<String> = dice.iter().map(|(_, d)| d.to_string()).collect();
    let header = "User dice v";
    let width = labels.iter().map(String::len).chain([header.len(), 6]).max().unwrap_or(6);

    let mut out = String::new();
    let separator = format!("+{}\n", format!("{}+", "-".repeat(width + 2)).repeat(labels.len() + 1));

    out.push_str(&separator);
    out.push_str(&format!("| {:<width$} |", header, width = width));
    for label in &labels {
        out.push_str(&format!(" {:<width$} |", label, width = width));
    }
    out.push('\n');
    out.push_str(&separator);

    for (i, label) in labels.iter().enumerate() {
        out.push_str(&format!("| {:<width$} |", label, width = width));
        for j in 0..labels.len() {
            out.push_str(&format!(" {:<width$} |", table.formatted(i, j), width = width));
        }
        out.push('\n');
    }
    out.push_str(&separator);
    out
}
