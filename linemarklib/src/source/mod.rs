//! Source collaborators: where bytes, listings and change counts come from.
//!
//! This module handles the first stage of the pipeline. It provides:
//!
//! - **Filesystem access**: [`FileSystem`] trait, [`LocalFs`], [`FileIdentity`]
//! - **Ignore rules**: glob patterns, ignored extensions, fixed directory skips
//! - **Version control**: [`VcsProvider`] with a git-backed implementation
//!
//! ## Example
//!
//! ```rust,ignore
//! use linemarklib::source::{FileIdentity, FileSystem, IgnoreFilter, LocalFs};
//!
//! let filter = IgnoreFilter::new().pattern("**/node_modules/**")?;
//! let stat = LocalFs.stat(&FileIdentity::file("src/lib.rs"))?;
//! ```

pub mod fs;
pub mod ignore;
pub mod vcs;

pub use fs::{DirEntry, FileIdentity, FileStat, FileSystem, LocalFs};
pub use ignore::{glob_matches, should_skip_dir, IgnoreFilter};
pub use vcs::{DiffSummary, GitDiffProvider, NoVcs, VcsProvider};
