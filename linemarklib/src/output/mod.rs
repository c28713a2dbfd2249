//! Output: badges, tooltips and tables.
//!
//! - **format**: bounded-width number and size formatting
//! - **decoration**: the badge/tooltip/color triple for one entry (`Decorator`)
//! - **table**: `StatsTable`, a display-ready view of a scan
//!
//! Formatting is pure; the only I/O here goes through the `Decorator`'s
//! collaborators.

pub mod decoration;
pub mod format;
pub mod table;

pub use decoration::{color_for, Decoration, DecorationColor, Decorator};
pub use format::{
    format_compact_number, format_directory_badge, format_exact, format_file_size,
    format_size_badge, AGGREGATE_MARKER, SATURATED,
};
pub use table::{StatsTable, TableRow};
