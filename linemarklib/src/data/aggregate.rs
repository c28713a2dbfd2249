//! Recursive directory line totals.
//!
//! Every file below a directory is subject to the same rules as a single
//! decoration request: ignore patterns, ignored extensions and the size
//! ceiling. Hidden directories and dependency directories are never entered.
//! An entry that cannot be listed, stated or read contributes zero; the
//! aggregate for its siblings is unaffected.

use crate::config::Settings;
use crate::data::cache::LineCache;
use crate::source::fs::{FileIdentity, FileSystem};
use crate::source::ignore::should_skip_dir;

/// Sums line counts over a subtree.
pub struct DirectoryAggregator<'a> {
    fs: &'a dyn FileSystem,
    settings: &'a Settings,
    cache: Option<&'a LineCache>,
}

impl<'a> DirectoryAggregator<'a> {
    pub fn new(fs: &'a dyn FileSystem, settings: &'a Settings) -> Self {
        Self {
            fs,
            settings,
            cache: None,
        }
    }

    /// Reuse (and fill) a per-file cache while aggregating.
    pub fn with_cache(mut self, cache: &'a LineCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Total line count below `dir`.
    pub fn total(&self, dir: &FileIdentity) -> u64 {
        let entries = match self.fs.list_dir(dir) {
            Ok(entries) => entries,
            Err(err) => {
                tracing::debug!(dir = %dir, error = %err, "cannot list directory");
                return 0;
            }
        };

        let filter = self.settings.filter();
        let mut total = 0;
        for entry in entries {
            let child = dir.join(&entry.name);
            if entry.is_dir {
                if should_skip_dir(&entry.name) || filter.is_path_ignored(child.path()) {
                    continue;
                }
                total += self.total(&child);
            } else {
                if filter.is_ignored(child.path()) {
                    continue;
                }
                total += self.file_lines(&child);
            }
        }
        total
    }

    fn file_lines(&self, id: &FileIdentity) -> u64 {
        let limit = self.settings.config().size_limit;
        let counted = self.fs.stat(id).and_then(|stat| {
            if !stat.is_file {
                return Err(crate::LinemarkError::NotRegularFile(id.path().to_path_buf()));
            }
            match self.cache {
                Some(cache) => cache.line_count(self.fs, id, &stat, limit),
                None => crate::data::counter::count_file(self.fs, id, limit).map(Into::into),
            }
        });

        match counted {
            Ok(entry) => entry.line_count,
            Err(err) => {
                tracing::trace!(file = %id, error = %err, "file contributes nothing");
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::data::cache::tests::MemFs;
    use crate::data::counter::count_text_lines;
    use crate::source::fs::LocalFs;
    use std::fs;
    use tempfile::tempdir;

    fn settings_with(config: Config) -> Settings {
        Settings::new(config, &[]).unwrap()
    }

    #[test]
    fn test_sums_every_depth() {
        let memfs = MemFs::new();
        memfs.write("/w/a.txt", "1\n2\n3", 1);
        memfs.write("/w/src/b.rs", "fn b() {}", 1);
        memfs.write("/w/src/deep/c.rs", "x\ny", 1);

        let settings = Settings::default();
        let total = DirectoryAggregator::new(&memfs, &settings).total(&FileIdentity::file("/w"));

        let expected =
            count_text_lines("1\n2\n3") + count_text_lines("fn b() {}") + count_text_lines("x\ny");
        assert_eq!(total, expected);
        assert_eq!(total, 6);
    }

    #[test]
    fn test_skips_hidden_and_dependency_dirs() {
        let memfs = MemFs::new();
        memfs.write("/w/keep.txt", "a", 1);
        memfs.write("/w/.git/config", "a\nb\nc", 1);
        memfs.write("/w/node_modules/pkg/index.js", "a\nb", 1);

        // No patterns at all: the fast-path skip still applies
        let config = Config {
            ignored_patterns: Vec::new(),
            ..Config::default()
        };
        let settings = settings_with(config);
        let total = DirectoryAggregator::new(&memfs, &settings).total(&FileIdentity::file("/w"));
        assert_eq!(total, 1);
    }

    #[test]
    fn test_applies_file_rules() {
        let memfs = MemFs::new();
        memfs.write("/w/a.txt", "a\nb", 1);
        memfs.write("/w/logo.png", "x\nx\nx\nx", 1);
        memfs.write("/w/app.min.js", "x\nx\nx", 1);
        memfs.write("/w/huge.txt", &"x\n".repeat(100), 1);

        let config = Config {
            size_limit: 50,
            ..Config::default()
        };
        let settings = settings_with(config);
        let total = DirectoryAggregator::new(&memfs, &settings).total(&FileIdentity::file("/w"));
        assert_eq!(total, 2);
    }

    #[test]
    fn test_unreadable_file_contributes_zero() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("ok.txt"), "a\nb\nc").unwrap();
        fs::create_dir(temp.path().join("sub")).unwrap();
        fs::write(temp.path().join("sub/ok.txt"), "a").unwrap();

        #[cfg(unix)]
        std::os::unix::fs::symlink(
            temp.path().join("missing-target"),
            temp.path().join("dangling.txt"),
        )
        .unwrap();

        let settings = Settings::default();
        let total = DirectoryAggregator::new(&LocalFs, &settings)
            .total(&FileIdentity::file(temp.path()));
        assert_eq!(total, 4);
    }

    #[test]
    fn test_missing_directory_is_zero() {
        let settings = Settings::default();
        let total = DirectoryAggregator::new(&LocalFs, &settings)
            .total(&FileIdentity::file("/nonexistent/dir"));
        assert_eq!(total, 0);
    }

    #[test]
    fn test_aggregation_fills_cache() {
        let memfs = MemFs::new();
        memfs.write("/w/a.txt", "a\nb", 1);
        memfs.write("/w/b.txt", "c", 1);
        let cache = LineCache::new();
        let settings = Settings::default();
        let aggregator = DirectoryAggregator::new(&memfs, &settings).with_cache(&cache);

        assert_eq!(aggregator.total(&FileIdentity::file("/w")), 3);
        assert_eq!(cache.len(), 2);
        assert_eq!(aggregator.total(&FileIdentity::file("/w")), 3);
        assert_eq!(memfs.opens(), 2);
    }
}
