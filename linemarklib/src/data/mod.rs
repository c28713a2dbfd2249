//! Data collection: count files and aggregate statistics.
//!
//! - **Counting**: streaming physical line counts (`count_lines`, `count_file`)
//! - **SLOC**: comment-aware source line classification (`count_sloc`)
//! - **Cache**: modification-time validated per-file results (`LineCache`)
//! - **Aggregation**: recursive directory totals (`DirectoryAggregator`)
//! - **Scanning**: cancellable workspace statistics (`scan_tree`)
//!
//! ## Example
//!
//! ```rust,ignore
//! use linemarklib::data::{scan_tree, LineCache};
//!
//! let summary = scan_tree(&LocalFs, &roots, &settings, |_, _| {}, || false)?;
//! println!("{} lines in {} files", summary.total_lines, summary.total_files);
//! ```

pub mod aggregate;
pub mod cache;
pub mod counter;
pub mod scan;
pub mod sloc;

pub use aggregate::DirectoryAggregator;
pub use cache::{CacheEntry, LineCache, SlocCacheEntry};
pub use counter::{
    count_file, count_lines, count_text_lines, read_text, CountedFile, DEFAULT_SIZE_LIMIT,
};
pub use scan::{extension_key, scan_tree, ScanSummary, Totals, NO_EXTENSION};
pub use sloc::{
    count_sloc, count_sloc_for_key, count_sloc_for_path, patterns_for, CommentPatterns, Language,
};
