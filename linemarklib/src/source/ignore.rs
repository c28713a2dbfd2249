//! Ignore rules: glob patterns, ignored extensions and the fixed directory
//! fast-path.
//!
//! Patterns are matched case-insensitively against the whole path:
//!
//! - `*` matches any run of characters except a path separator
//! - `**` matches any run of characters including separators (possibly empty);
//!   a `**/` prefix also matches no directory at all
//! - `?` matches a single character
//!
//! Every other character, brackets included, matches itself. A path is
//! ignored when any pattern matches its workspace-relative form or its
//! absolute form.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use regex::{Regex, RegexBuilder};

use crate::error::LinemarkError;
use crate::Result;

/// Directory name that is always skipped during traversal.
pub const DEPENDENCY_DIR: &str = "node_modules";

/// Test a single path against a single glob pattern.
///
/// A pattern that cannot be compiled never matches.
pub fn glob_matches(path: &str, pattern: &str) -> bool {
    match compile(pattern) {
        Ok(re) => re.is_match(&normalize(path)),
        Err(_) => false,
    }
}

/// Check if a directory should be skipped during traversal, regardless of
/// the configured patterns.
pub fn should_skip_dir(name: &str) -> bool {
    name.starts_with('.') || name == DEPENDENCY_DIR
}

/// Anchored regex source for a glob pattern.
fn translate(pattern: &str) -> String {
    let pattern = normalize(pattern);
    let mut out = String::with_capacity(pattern.len() * 2 + 2);
    out.push('^');

    let mut chars = pattern.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '*' if chars.peek() == Some(&'*') => {
                chars.next();
                if chars.peek() == Some(&'/') {
                    chars.next();
                    out.push_str("(?:.*/)?");
                } else {
                    out.push_str(".*");
                }
            }
            '*' => out.push_str("[^/]*"),
            '?' => out.push('.'),
            _ => {
                let mut buf = [0u8; 4];
                out.push_str(&regex::escape(ch.encode_utf8(&mut buf)));
            }
        }
    }

    out.push('$');
    out
}

fn compile(pattern: &str) -> Result<Regex> {
    RegexBuilder::new(&translate(pattern))
        .case_insensitive(true)
        .build()
        .map_err(|e| LinemarkError::InvalidGlob {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })
}

fn normalize(path: &str) -> String {
    path.replace('\\', "/")
}

/// Compiled ignore configuration.
#[derive(Debug, Clone, Default)]
pub struct IgnoreFilter {
    patterns: Vec<Regex>,
    /// Lower-case, without leading dot
    extensions: BTreeSet<String>,
    roots: Vec<PathBuf>,
}

impl IgnoreFilter {
    /// Create an empty filter (ignores nothing).
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an ignore pattern.
    pub fn pattern(mut self, pattern: &str) -> Result<Self> {
        self.patterns.push(compile(pattern)?);
        Ok(self)
    }

    /// Add multiple ignore patterns.
    pub fn patterns<S: AsRef<str>>(mut self, patterns: &[S]) -> Result<Self> {
        for pattern in patterns {
            self = self.pattern(pattern.as_ref())?;
        }
        Ok(self)
    }

    /// Add an ignored extension (`"png"` and `".png"` are equivalent).
    pub fn extension(mut self, ext: &str) -> Self {
        let ext = ext.trim().trim_start_matches('.').to_lowercase();
        if !ext.is_empty() {
            self.extensions.insert(ext);
        }
        self
    }

    /// Add multiple ignored extensions.
    pub fn extensions<S: AsRef<str>>(mut self, exts: &[S]) -> Self {
        for ext in exts {
            self = self.extension(ext.as_ref());
        }
        self
    }

    /// Add a workspace root used to derive the relative form of a path.
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.roots.push(root.into());
        self
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Whether any pattern matches the path's relative or absolute form.
    pub fn is_path_ignored(&self, path: &Path) -> bool {
        if self.patterns.is_empty() {
            return false;
        }

        let absolute = normalize(&path.to_string_lossy());
        let relative = self
            .roots
            .iter()
            .find_map(|root| path.strip_prefix(root).ok())
            .map(|rel| normalize(&rel.to_string_lossy()));

        self.patterns.iter().any(|pattern| {
            relative
                .as_deref()
                .is_some_and(|rel| pattern.is_match(rel))
                || pattern.is_match(&absolute)
        })
    }

    /// Whether the file name ends in one of the ignored extensions.
    ///
    /// Multi-part entries such as `min.js` work too.
    pub fn is_extension_ignored(&self, path: &Path) -> bool {
        if self.extensions.is_empty() {
            return false;
        }
        let Some(name) = path.file_name().map(|n| n.to_string_lossy().to_lowercase()) else {
            return false;
        };
        self.extensions.iter().any(|ext| {
            name.len() > ext.len() + 1
                && name.ends_with(ext.as_str())
                && name.as_bytes()[name.len() - ext.len() - 1] == b'.'
        })
    }

    /// Pattern or extension match.
    pub fn is_ignored(&self, path: &Path) -> bool {
        self.is_path_ignored(path) || self.is_extension_ignored(path)
    }
}
