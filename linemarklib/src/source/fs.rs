//! File identities and the filesystem collaborator.
//!
//! The core never touches `std::fs` directly outside of [`LocalFs`]. Everything
//! else goes through the [`FileSystem`] trait so hosts (and tests) can supply
//! their own byte sources, stat calls and directory listings.

use std::fmt;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::error::LinemarkError;
use crate::Result;

/// Scheme used for entries on the local filesystem.
pub const FILE_SCHEME: &str = "file";

/// Stable handle to a file or directory: a scheme plus a path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FileIdentity {
    scheme: String,
    path: PathBuf,
}

impl FileIdentity {
    /// Create an identity with an explicit scheme.
    pub fn new(scheme: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            scheme: scheme.into(),
            path: path.into(),
        }
    }

    /// Create a local-filesystem identity.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::new(FILE_SCHEME, path)
    }

    /// Parse `scheme://path`. Anything without a scheme separator is a local path.
    pub fn parse(s: &str) -> Self {
        match s.split_once("://") {
            Some((scheme, rest)) if !scheme.is_empty() && !scheme.contains(['/', '\\']) => {
                Self::new(scheme.to_ascii_lowercase(), rest)
            }
            _ => Self::file(s),
        }
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the identity points at the local filesystem (as opposed to a
    /// virtual or remote scheme).
    pub fn is_local(&self) -> bool {
        self.scheme == FILE_SCHEME
    }

    /// Identity of a child entry.
    pub fn join(&self, name: &str) -> Self {
        Self::new(self.scheme.clone(), self.path.join(name))
    }

    /// Canonical string form used as the cache key.
    pub fn cache_key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for FileIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.scheme, self.path.display())
    }
}

/// Result of a stat call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    pub is_dir: bool,
    /// Regular file (not a directory, socket, device, ...)
    pub is_file: bool,
    pub size: u64,
    /// Opaque, only ever compared for equality
    pub mod_time: SystemTime,
}

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub is_dir: bool,
}

/// Filesystem access consumed by the core.
pub trait FileSystem: Send + Sync {
    /// Open a sequential byte source for a regular file.
    fn open(&self, id: &FileIdentity) -> Result<Box<dyn Read + Send>>;

    /// Size, kind and modification time of an entry.
    fn stat(&self, id: &FileIdentity) -> Result<FileStat>;

    /// Immediate children of a directory.
    fn list_dir(&self, id: &FileIdentity) -> Result<Vec<DirEntry>>;
}

/// [`FileSystem`] backed by the local disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl LocalFs {
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for LocalFs {
    fn open(&self, id: &FileIdentity) -> Result<Box<dyn Read + Send>> {
        let path = id.path();
        let file = File::open(path).map_err(|e| LinemarkError::from_io(path, e))?;
        Ok(Box::new(file))
    }

    fn stat(&self, id: &FileIdentity) -> Result<FileStat> {
        let path = id.path();
        let meta = fs::metadata(path).map_err(|e| LinemarkError::from_io(path, e))?;
        Ok(FileStat {
            is_dir: meta.is_dir(),
            is_file: meta.is_file(),
            size: meta.len(),
            mod_time: meta.modified().unwrap_or(SystemTime::UNIX_EPOCH),
        })
    }

    fn list_dir(&self, id: &FileIdentity) -> Result<Vec<DirEntry>> {
        let path = id.path();
        if !path.is_dir() {
            return Err(if path.exists() {
                LinemarkError::NotRegularFile(path.to_path_buf())
            } else {
                LinemarkError::NotFound(path.to_path_buf())
            });
        }

        // Links are not followed, so a symlinked directory shows up as a
        // non-directory entry and can never introduce a cycle.
        let walker = WalkDir::new(path)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
            .sort_by_file_name();

        let mut entries = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(err) => {
                    tracing::debug!(dir = %path.display(), error = %err, "skipping unreadable entry");
                    continue;
                }
            };
            entries.push(DirEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                is_dir: entry.file_type().is_dir(),
            });
        }
        Ok(entries)
    }
}
