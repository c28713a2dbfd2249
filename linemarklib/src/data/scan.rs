//! Workspace-wide statistics.
//!
//! [`scan_tree`] walks one or more roots with the same rules the directory
//! aggregator uses, reports each counted file through a callback and returns
//! totals broken down by extension. The cancellation check runs before every
//! entry; a cancelled scan returns [`LinemarkError::Cancelled`] and no
//! partial summary.

use std::collections::BTreeMap;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::data::counter::count_file;
use crate::error::LinemarkError;
use crate::source::fs::{FileIdentity, FileSystem};
use crate::source::ignore::should_skip_dir;
use crate::Result;

/// Key used for files without an extension.
pub const NO_EXTENSION: &str = "(none)";

/// File, line and byte totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub files: u64,
    pub lines: u64,
    pub bytes: u64,
}

impl Totals {
    /// Totals for a single file.
    pub fn file(lines: u64, bytes: u64) -> Self {
        Self {
            files: 1,
            lines,
            bytes,
        }
    }
}

impl Add for Totals {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            files: self.files + other.files,
            lines: self.lines + other.lines,
            bytes: self.bytes + other.bytes,
        }
    }
}

impl AddAssign for Totals {
    fn add_assign(&mut self, other: Self) {
        self.files += other.files;
        self.lines += other.lines;
        self.bytes += other.bytes;
    }
}

/// Result of a workspace scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSummary {
    pub total_files: u64,
    pub total_lines: u64,
    pub total_bytes: u64,
    /// Keyed by lower-case extension without the dot
    pub by_extension: BTreeMap<String, Totals>,
}

impl ScanSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one counted file.
    pub fn add_file(&mut self, extension: &str, lines: u64, bytes: u64) {
        let totals = Totals::file(lines, bytes);
        self.total_files += totals.files;
        self.total_lines += totals.lines;
        self.total_bytes += totals.bytes;
        *self.by_extension.entry(extension.to_string()).or_default() += totals;
    }

    pub fn totals(&self) -> Totals {
        Totals {
            files: self.total_files,
            lines: self.total_lines,
            bytes: self.total_bytes,
        }
    }
}

/// Extension key for the per-extension breakdown.
pub fn extension_key(id: &FileIdentity) -> String {
    id.path()
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_else(|| NO_EXTENSION.to_string())
}

/// Scan `roots` and total every countable file.
///
/// Roots that do not exist are skipped; if none exists the scan fails with
/// [`LinemarkError::NoWorkspaceRoot`]. A root may also be a single file.
pub fn scan_tree<F, C>(
    fs: &dyn FileSystem,
    roots: &[FileIdentity],
    settings: &Settings,
    mut on_file_counted: F,
    is_cancelled: C,
) -> Result<ScanSummary>
where
    F: FnMut(&FileIdentity, u64),
    C: Fn() -> bool,
{
    let existing: Vec<(&FileIdentity, bool)> = roots
        .iter()
        .filter_map(|root| fs.stat(root).ok().map(|stat| (root, stat.is_dir)))
        .collect();
    if existing.is_empty() {
        return Err(LinemarkError::NoWorkspaceRoot);
    }

    let mut scanner = Scanner {
        fs,
        settings,
        summary: ScanSummary::new(),
        on_file_counted: &mut on_file_counted,
        is_cancelled: &is_cancelled,
    };

    for (root, is_dir) in existing {
        if is_dir {
            scanner.visit_dir(root)?;
        } else {
            scanner.visit_file(root)?;
        }
    }

    let summary = scanner.summary;
    tracing::info!(
        files = summary.total_files,
        lines = summary.total_lines,
        bytes = summary.total_bytes,
        "workspace scan finished"
    );
    Ok(summary)
}

struct Scanner<'a> {
    fs: &'a dyn FileSystem,
    settings: &'a Settings,
    summary: ScanSummary,
    on_file_counted: &'a mut dyn FnMut(&FileIdentity, u64),
    is_cancelled: &'a dyn Fn() -> bool,
}

impl Scanner<'_> {
    fn check_cancelled(&self) -> Result<()> {
        if (self.is_cancelled)() {
            Err(LinemarkError::Cancelled)
        } else {
            Ok(())
        }
    }

    fn visit_dir(&mut self, dir: &FileIdentity) -> Result<()> {
        self.check_cancelled()?;
        let entries = match self.fs.list_dir(dir) {
            Ok(entries) => entries,
            Err(err) => {
                tracing::debug!(dir = %dir, error = %err, "cannot list directory");
                return Ok(());
            }
        };

        for entry in entries {
            let child = dir.join(&entry.name);
            if entry.is_dir {
                if should_skip_dir(&entry.name)
                    || self.settings.filter().is_path_ignored(child.path())
                {
                    continue;
                }
                self.visit_dir(&child)?;
            } else {
                self.visit_file(&child)?;
            }
        }
        Ok(())
    }

    fn visit_file(&mut self, id: &FileIdentity) -> Result<()> {
        self.check_cancelled()?;
        if self.settings.filter().is_ignored(id.path()) {
            return Ok(());
        }

        match count_file(self.fs, id, self.settings.config().size_limit) {
            Ok(counted) => {
                self.summary
                    .add_file(&extension_key(id), counted.lines, counted.size);
                (self.on_file_counted)(id, counted.lines);
            }
            Err(err) if err.is_entry_failure() => {
                tracing::trace!(file = %id, error = %err, "file skipped");
            }
            Err(err) => {
                tracing::debug!(file = %id, error = %err, "unexpected failure, file skipped");
            }
        }
        Ok(())
    }
}
