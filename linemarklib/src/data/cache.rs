//! Per-file count cache.
//!
//! An entry is usable only while the file's current modification time equals
//! the one recorded with it; any mismatch is a miss. Entries are replaced
//! whole, so two requests racing to fill the same key simply leave the later
//! result in place. Line counts and SLOC values live in separate maps keyed by
//! [`FileIdentity::cache_key`]; both are cleared by [`LineCache::invalidate`]
//! and [`LineCache::invalidate_all`].

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::SystemTime;

use crate::data::counter::{count_file, read_text, CountedFile};
use crate::data::sloc::count_sloc_for_path;
use crate::source::fs::{FileIdentity, FileStat, FileSystem};
use crate::Result;

/// Last-known line count of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheEntry {
    pub line_count: u64,
    pub file_size: u64,
    pub mod_time: SystemTime,
}

impl From<CountedFile> for CacheEntry {
    fn from(counted: CountedFile) -> Self {
        Self {
            line_count: counted.lines,
            file_size: counted.size,
            mod_time: counted.mod_time,
        }
    }
}

/// Last-known SLOC value of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlocCacheEntry {
    pub sloc: u64,
    /// Modification time the value was computed from
    pub mod_time: SystemTime,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A panic while holding the lock cannot leave a half-written entry, so
    // the data is still consistent.
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Line count and SLOC cache.
#[derive(Debug, Default)]
pub struct LineCache {
    counts: Mutex<HashMap<String, CacheEntry>>,
    sloc: Mutex<HashMap<String, SlocCacheEntry>>,
}

impl LineCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up `id`, stating it through `fs` for a fresh modification time.
    /// Stat failures are misses.
    pub fn lookup(&self, fs: &dyn FileSystem, id: &FileIdentity) -> Option<CacheEntry> {
        let stat = fs.stat(id).ok()?;
        self.lookup_with_stat(id, &stat)
    }

    /// Look up `id` against an already obtained stat.
    pub fn lookup_with_stat(&self, id: &FileIdentity, stat: &FileStat) -> Option<CacheEntry> {
        let entry = lock(&self.counts).get(&id.cache_key()).copied()?;
        (entry.mod_time == stat.mod_time).then_some(entry)
    }

    /// Store (or replace) the entry for `id`.
    pub fn store(&self, id: &FileIdentity, entry: CacheEntry) {
        lock(&self.counts).insert(id.cache_key(), entry);
    }

    /// Cached SLOC for `id` if it was computed from the same modification time.
    pub fn lookup_sloc(&self, id: &FileIdentity, stat: &FileStat) -> Option<u64> {
        let entry = lock(&self.sloc).get(&id.cache_key()).copied()?;
        (entry.mod_time == stat.mod_time).then_some(entry.sloc)
    }

    pub fn store_sloc(&self, id: &FileIdentity, entry: SlocCacheEntry) {
        lock(&self.sloc).insert(id.cache_key(), entry);
    }

    /// Drop both entries for one file.
    pub fn invalidate(&self, id: &FileIdentity) {
        let key = id.cache_key();
        lock(&self.counts).remove(&key);
        lock(&self.sloc).remove(&key);
    }

    /// Drop everything.
    pub fn invalidate_all(&self) {
        lock(&self.counts).clear();
        lock(&self.sloc).clear();
    }

    /// Number of cached line counts.
    pub fn len(&self) -> usize {
        lock(&self.counts).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cached line count for `id`, counting the file on a miss.
    ///
    /// `stat` must be fresh; it decides hit or miss. The lock is not held
    /// while the file is read.
    pub fn line_count(
        &self,
        fs: &dyn FileSystem,
        id: &FileIdentity,
        stat: &FileStat,
        size_limit: u64,
    ) -> Result<CacheEntry> {
        if let Some(entry) = self.lookup_with_stat(id, stat) {
            tracing::trace!(file = %id, "line count cache hit");
            return Ok(entry);
        }

        tracing::debug!(file = %id, "line count cache miss");
        let entry = CacheEntry::from(count_file(fs, id, size_limit)?);
        self.store(id, entry);
        Ok(entry)
    }

    /// Cached SLOC for `id`, classifying the file on a miss.
    pub fn sloc_count(
        &self,
        fs: &dyn FileSystem,
        id: &FileIdentity,
        stat: &FileStat,
        size_limit: u64,
    ) -> Result<u64> {
        if let Some(sloc) = self.lookup_sloc(id, stat) {
            return Ok(sloc);
        }

        tracing::debug!(file = %id, "sloc cache miss");
        let text = read_text(fs, id, size_limit)?;
        let sloc = count_sloc_for_path(&text, id.path());
        self.store_sloc(
            id,
            SlocCacheEntry {
                sloc,
                mod_time: stat.mod_time,
            },
        );
        Ok(sloc)
    }
}
