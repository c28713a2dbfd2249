//! Version-control collaborator: added/removed line counts for one file.
//!
//! [`GitDiffProvider`] compares the working-tree content of a file with the
//! blob recorded for it in `HEAD`. The delta is a line-multiset difference:
//! a line counts as added when the working copy holds more occurrences of it
//! than `HEAD` does, and as removed in the opposite case. Reordered lines are
//! therefore not reported, which keeps the tooltip cheap to compute.
//!
//! Absence of a repository, an untracked file or an unchanged file all yield
//! `None`. Failures are logged, never surfaced.

use std::collections::HashMap;
use std::path::{Component, Path};

use serde::{Deserialize, Serialize};

use crate::error::LinemarkError;
use crate::Result;

use super::fs::FileIdentity;

/// Added/removed line counts for one file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSummary {
    pub added: u64,
    pub removed: u64,
}

impl DiffSummary {
    pub fn is_empty(&self) -> bool {
        self.added == 0 && self.removed == 0
    }
}

/// Source of per-file change counts.
pub trait VcsProvider: Send + Sync {
    fn diff_summary(&self, id: &FileIdentity) -> Option<DiffSummary>;
}

/// Provider for hosts without version control.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoVcs;

impl VcsProvider for NoVcs {
    fn diff_summary(&self, _id: &FileIdentity) -> Option<DiffSummary> {
        None
    }
}

/// Git-backed provider.
#[derive(Debug, Clone, Copy, Default)]
pub struct GitDiffProvider;

impl GitDiffProvider {
    pub fn new() -> Self {
        Self
    }

    fn summarize(&self, path: &Path) -> Result<Option<DiffSummary>> {
        let start = path.parent().unwrap_or(path);
        let repo = match gix::discover(start) {
            Ok(repo) => repo,
            // Not inside a repository
            Err(_) => return Ok(None),
        };

        let repo_root = repo
            .work_dir()
            .ok_or_else(|| LinemarkError::GitError("Repository has no work directory".to_string()))?
            .to_path_buf();
        let repo_root = repo_root.canonicalize().unwrap_or(repo_root);
        let abs_path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        let Ok(rel_path) = abs_path.strip_prefix(&repo_root) else {
            return Ok(None);
        };

        let head_commit = match repo.head_commit() {
            Ok(commit) => commit,
            // Unborn branch: nothing committed yet
            Err(_) => return Ok(None),
        };
        let head_tree = head_commit
            .tree()
            .map_err(|e| LinemarkError::GitError(format!("Failed to get HEAD tree: {}", e)))?;

        let Some(head_oid) = find_blob(&repo, head_tree, rel_path)? else {
            return Ok(None);
        };

        let old_content = read_blob(&repo, head_oid)?;
        let new_content = std::fs::read(&abs_path)
            .map_err(|e| LinemarkError::from_io(&abs_path, e))
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())?;

        let summary = line_delta(&old_content, &new_content);
        Ok((!summary.is_empty()).then_some(summary))
    }
}

impl VcsProvider for GitDiffProvider {
    fn diff_summary(&self, id: &FileIdentity) -> Option<DiffSummary> {
        if !id.is_local() {
            return None;
        }
        match self.summarize(id.path()) {
            Ok(summary) => summary,
            Err(err) => {
                tracing::debug!(file = %id, error = %err, "git delta unavailable");
                None
            }
        }
    }
}

/// Walk `tree` component by component to the blob at `rel_path`.
fn find_blob<'repo>(
    repo: &'repo gix::Repository,
    tree: gix::Tree<'repo>,
    rel_path: &Path,
) -> Result<Option<gix::ObjectId>> {
    let components: Vec<String> = rel_path
        .components()
        .filter_map(|c| match c {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    let Some((file_name, dirs)) = components.split_last() else {
        return Ok(None);
    };

    let mut current = tree;
    for dir in dirs {
        let Some(oid) = find_entry(&current, dir, false)? else {
            return Ok(None);
        };
        current = repo
            .find_object(oid)
            .map_err(|e| LinemarkError::GitError(format!("Failed to find tree: {}", e)))?
            .try_into_tree()
            .map_err(|_| LinemarkError::GitError("Object is not a tree".to_string()))?;
    }

    find_entry(&current, file_name, true)
}

fn find_entry(tree: &gix::Tree<'_>, name: &str, want_blob: bool) -> Result<Option<gix::ObjectId>> {
    for entry in tree.iter() {
        let entry = entry
            .map_err(|e| LinemarkError::GitError(format!("Failed to read tree entry: {}", e)))?;

        if gix::path::from_bstr(entry.filename()).as_ref() != Path::new(name) {
            continue;
        }
        let mode = entry.mode();
        let kind_matches = if want_blob {
            mode.is_blob()
        } else {
            mode.is_tree()
        };
        return Ok(kind_matches.then(|| entry.oid().to_owned()));
    }
    Ok(None)
}

/// Read a blob's content as a UTF-8 string
fn read_blob(repo: &gix::Repository, oid: gix::ObjectId) -> Result<String> {
    let object = repo
        .find_object(oid)
        .map_err(|e| LinemarkError::GitError(format!("Failed to find object {}: {}", oid, e)))?;

    let blob = object
        .try_into_blob()
        .map_err(|_| LinemarkError::GitError(format!("Object {} is not a blob", oid)))?;

    Ok(String::from_utf8_lossy(&blob.data).into_owned())
}

/// Line-multiset difference between two texts.
pub fn line_delta(old: &str, new: &str) -> DiffSummary {
    let mut balance: HashMap<&str, i64> = HashMap::new();
    for line in old.lines() {
        *balance.entry(line).or_insert(0) -= 1;
    }
    for line in new.lines() {
        *balance.entry(line).or_insert(0) += 1;
    }

    let mut summary = DiffSummary::default();
    for count in balance.into_values() {
        if count > 0 {
            summary.added += count as u64;
        } else {
            summary.removed += count.unsigned_abs();
        }
    }
    summary
}
