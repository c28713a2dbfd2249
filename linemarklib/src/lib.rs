//! # linemarklib
//!
//! Line-count badges for file trees.
//!
//! ## Overview
//!
//! Given a file or directory and a configuration snapshot, this library
//! produces a tiny badge (at most two characters), a tooltip with exact
//! numbers and a color band. It is built from small, separately usable parts:
//!
//! - **Line counter**: streams a file in chunks and counts physical lines
//! - **SLOC classifier**: source lines excluding blanks and comments, per language
//! - **Formatters**: compact counts (`1H`, `2k`, `k+`) and human file sizes
//! - **Ignore matcher**: glob patterns and extension lists
//! - **Cache**: per-file results validated by modification time
//! - **Directory aggregator**: recursive totals below a directory
//! - **Workspace scan**: cancellable statistics with a per-extension breakdown
//!
//! The host owns the UI, configuration storage and file watching. It passes an
//! immutable [`Settings`] snapshot into every call and reports edits through
//! [`Decorator::invalidate`].
//!
//! ## Example
//!
//! ```rust
//! use linemarklib::{count_text_lines, format_compact_number, Decorator, FileIdentity, LocalFs, Settings};
//! use std::fs;
//! use std::sync::Arc;
//! use tempfile::tempdir;
//!
//! let dir = tempdir().unwrap();
//! let file_path = dir.path().join("main.rs");
//! fs::write(&file_path, "fn main() {\n    println!(\"Hi\");\n}").unwrap();
//!
//! assert_eq!(count_text_lines("a\nb\nc"), 3);
//! assert_eq!(format_compact_number(1500), "2k");
//!
//! let decorator = Decorator::new(Arc::new(LocalFs));
//! let decoration = decorator
//!     .decorate(&FileIdentity::file(&file_path), &Settings::default())
//!     .unwrap();
//! assert_eq!(decoration.badge, "3");
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod output;
pub mod source;

pub use config::{ColorThresholds, Config, ConfigStore, DisplayMode, LanguageOverride, Settings};
pub use data::{
    count_file, count_lines, count_sloc, count_text_lines, scan_tree, CacheEntry, CommentPatterns,
    CountedFile, DirectoryAggregator, Language, LineCache, ScanSummary, Totals,
    DEFAULT_SIZE_LIMIT,
};
pub use error::LinemarkError;
pub use output::{
    color_for, format_compact_number, format_directory_badge, format_exact, format_file_size,
    format_size_badge, Decoration, DecorationColor, Decorator, StatsTable, TableRow,
};
pub use source::{
    DiffSummary, DirEntry, FileIdentity, FileStat, FileSystem, GitDiffProvider, IgnoreFilter,
    LocalFs, NoVcs, VcsProvider,
};

/// Result type for linemarklib operations
pub type Result<T> = std::result::Result<T, LinemarkError>;
