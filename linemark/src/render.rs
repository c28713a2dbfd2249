//! Text rendering for CLI output

use console::Style;
use linemarklib::{Decoration, DecorationColor, StatsTable};
use serde::Serialize;

/// Width of the label column in stats tables
const NAME_WIDTH: usize = 20;

/// Width of each numeric column in stats tables
const CELL_WIDTH: usize = 12;

/// Width reserved for the badge column
const BADGE_WIDTH: usize = 4;

/// One decorated path, as printed or serialized
#[derive(Debug, Serialize)]
pub struct DecoratedPath {
    pub path: String,
    /// `None` when the path gets no decoration
    pub decoration: Option<Decoration>,
}

/// Style for a color band
fn style_for(color: DecorationColor) -> Style {
    match color {
        DecorationColor::Default => Style::new().dim(),
        DecorationColor::Low => Style::new().green(),
        DecorationColor::Medium => Style::new().yellow(),
        DecorationColor::High => Style::new().red().bold(),
    }
}

/// Truncate a name to fit within max_len, adding ".." prefix if needed
fn truncate_name(name: &str, max_len: usize) -> String {
    let len = name.chars().count();
    if len > max_len {
        let tail: String = name.chars().skip(len - max_len + 2).collect();
        format!("..{}", tail)
    } else {
        name.to_string()
    }
}

/// Render decorations: badge column, path, then the tooltip indented below.
pub fn render_decorations(paths: &[DecoratedPath]) -> String {
    let mut output = String::new();
    let indent = " ".repeat(BADGE_WIDTH + 2);

    for entry in paths {
        match &entry.decoration {
            Some(decoration) => {
                let badge = format!("{:>width$}", decoration.badge, width = BADGE_WIDTH);
                output.push_str(&format!(
                    "{}  {}\n",
                    style_for(decoration.color).apply_to(badge),
                    entry.path
                ));
                for line in decoration.tooltip.lines() {
                    output.push_str(&format!("{}{}\n", indent, line));
                }
            }
            None => {
                let badge = format!("{:>width$}", "-", width = BADGE_WIDTH);
                output.push_str(&format!(
                    "{}  {}\n",
                    Style::new().dim().apply_to(badge),
                    entry.path
                ));
            }
        }
    }

    output
}

fn render_row(label: &str, values: &[String]) -> String {
    let mut line = format!(
        "{:<width$}",
        truncate_name(label, NAME_WIDTH - 2),
        width = NAME_WIDTH
    );
    for value in values {
        line.push_str(&format!(" {:>width$}", value, width = CELL_WIDTH));
    }
    line
}

/// Render a stats table as aligned text.
pub fn render_stats_table(table: &StatsTable) -> String {
    let bold = Style::new().bold();
    let columns = table.headers.len().saturating_sub(1);
    let separator = "-".repeat(NAME_WIDTH + (CELL_WIDTH + 1) * columns);
    let mut output = String::new();

    if let Some(title) = &table.title {
        output.push_str(&format!("{}\n\n", bold.apply_to(title)));
    }

    let (label_header, value_headers) = match table.headers.split_first() {
        Some((first, rest)) => (first.as_str(), rest),
        None => ("", &[][..]),
    };
    output.push_str(&format!(
        "{}\n",
        bold.apply_to(render_row(label_header, value_headers))
    ));
    output.push_str(&separator);
    output.push('\n');

    for row in &table.rows {
        output.push_str(&render_row(&row.label, &row.values));
        output.push('\n');
    }

    output.push_str(&separator);
    output.push('\n');
    output.push_str(&format!(
        "{}\n",
        bold.apply_to(render_row(&table.footer.label, &table.footer.values))
    ));
    output
}
