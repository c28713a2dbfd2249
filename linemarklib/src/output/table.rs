//! Table-ready data structures for scan output.
//!
//! `StatsTable` is a presentation-ready structure that can be rendered as
//! text or serialized to JSON. It only formats values into strings; the
//! numbers come from a [`ScanSummary`].

use serde::{Deserialize, Serialize};

use crate::data::scan::{ScanSummary, Totals, NO_EXTENSION};
use crate::output::format::{format_exact, format_file_size};

/// A single row in the table (data row or footer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
    /// Row label (extension, "Total (N files)")
    pub label: String,
    /// Values for each numeric column, ready for display
    pub values: Vec<String>,
}

/// Table-ready scan statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsTable {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Column headers: [label_header, Files, Lines, Size]
    pub headers: Vec<String>,
    pub rows: Vec<TableRow>,
    pub footer: TableRow,
}

impl StatsTable {
    /// One row per extension, largest line count first.
    pub fn from_summary(summary: &ScanSummary) -> Self {
        let mut entries: Vec<(&String, &Totals)> = summary.by_extension.iter().collect();
        entries.sort_by(|a, b| b.1.lines.cmp(&a.1.lines).then_with(|| a.0.cmp(b.0)));

        let rows = entries
            .into_iter()
            .map(|(ext, totals)| TableRow {
                label: extension_label(ext),
                values: format_totals(totals),
            })
            .collect();

        StatsTable {
            title: None,
            headers: ["Extension", "Files", "Lines", "Size"]
                .into_iter()
                .map(String::from)
                .collect(),
            rows,
            footer: TableRow {
                label: format!("Total ({} files)", summary.total_files),
                values: format_totals(&summary.totals()),
            },
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

fn extension_label(ext: &str) -> String {
    if ext == NO_EXTENSION {
        ext.to_string()
    } else {
        format!(".{}", ext)
    }
}

fn format_totals(totals: &Totals) -> Vec<String> {
    vec![
        format_exact(totals.files),
        format_exact(totals.lines),
        format_file_size(totals.bytes),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_summary() -> ScanSummary {
        let mut summary = ScanSummary::new();
        summary.add_file("rs", 120, 4096);
        summary.add_file("rs", 30, 1024);
        summary.add_file("md", 2000, 50_000);
        summary.add_file(NO_EXTENSION, 5, 40);
        summary
    }

    #[test]
    fn test_headers() {
        let table = StatsTable::from_summary(&sample_summary());
        assert_eq!(table.headers, vec!["Extension", "Files", "Lines", "Size"]);
        assert!(table.title.is_none());
    }

    #[test]
    fn test_rows_sorted_by_lines_descending() {
        let table = StatsTable::from_summary(&sample_summary());
        let labels: Vec<&str> = table.rows.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec![".md", ".rs", "(none)"]);
        assert_eq!(table.rows[1].values, vec!["2", "150", "5 KB"]);
    }

    #[test]
    fn test_footer() {
        let table = StatsTable::from_summary(&sample_summary());
        assert_eq!(table.footer.label, "Total (4 files)");
        assert_eq!(table.footer.values[1], "2,155");
    }

    #[test]
    fn test_empty_summary() {
        let table = StatsTable::from_summary(&ScanSummary::new()).with_title("Workspace");
        assert!(table.rows.is_empty());
        assert_eq!(table.footer.label, "Total (0 files)");
        assert_eq!(table.footer.values, vec!["0", "0", "0 B"]);
        assert_eq!(table.title.as_deref(), Some("Workspace"));
    }

    #[test]
    fn test_serializes_without_empty_title() {
        let table = StatsTable::from_summary(&sample_summary());
        let json = serde_json::to_string(&table).unwrap();
        assert!(!json.contains("title"));
        assert!(json.contains("\"footer\""));
    }
}
