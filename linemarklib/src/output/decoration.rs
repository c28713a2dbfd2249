//! Decoration assembly: badge, tooltip and color for one entry.
//!
//! Checks run cheapest first and stop at the first that declines: the
//! global switch, the identity scheme, ignore patterns, ignored extensions,
//! then a stat call. Any failure past that point means "no decoration".
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use linemarklib::{Decorator, FileIdentity, LocalFs, Settings};
//!
//! let decorator = Decorator::new(Arc::new(LocalFs));
//! if let Some(decoration) = decorator.decorate(&FileIdentity::file("src/lib.rs"), &Settings::default()) {
//!     println!("{} {}", decoration.badge, decoration.tooltip);
//! }
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::{ColorThresholds, DisplayMode, Settings};
use crate::data::aggregate::DirectoryAggregator;
use crate::data::cache::LineCache;
use crate::output::format::{
    format_compact_number, format_directory_badge, format_exact, format_file_size,
    format_size_badge,
};
use crate::source::fs::{FileIdentity, FileStat, FileSystem};
use crate::source::vcs::{NoVcs, VcsProvider};

/// Severity band of a decoration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecorationColor {
    #[default]
    Default,
    Low,
    Medium,
    High,
}

/// What the host paints next to an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decoration {
    /// At most two visible characters
    pub badge: String,
    /// One fact per line
    pub tooltip: String,
    pub color: DecorationColor,
}

/// Map a line count onto a color band. Boundaries are inclusive-lower.
pub fn color_for(count: u64, thresholds: &ColorThresholds) -> DecorationColor {
    if count >= thresholds.large {
        DecorationColor::High
    } else if count >= thresholds.medium {
        DecorationColor::Medium
    } else if count >= thresholds.small {
        DecorationColor::Low
    } else {
        DecorationColor::Default
    }
}

fn line_badge(lines: u64, compact: bool) -> String {
    if compact {
        format_compact_number(lines)
    } else {
        lines.to_string()
    }
}

/// Produces decorations and owns the per-file cache.
pub struct Decorator {
    fs: Arc<dyn FileSystem>,
    vcs: Arc<dyn VcsProvider>,
    cache: LineCache,
}

impl Decorator {
    /// Decorator without version control.
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self {
            fs,
            vcs: Arc::new(NoVcs),
            cache: LineCache::new(),
        }
    }

    /// Use `vcs` for the git-changes tooltip line.
    pub fn with_vcs(mut self, vcs: Arc<dyn VcsProvider>) -> Self {
        self.vcs = vcs;
        self
    }

    pub fn cache(&self) -> &LineCache {
        &self.cache
    }

    /// Forget cached results for one file (after a save or edit).
    pub fn invalidate(&self, id: &FileIdentity) {
        self.cache.invalidate(id);
    }

    /// Forget everything (after a configuration change).
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    /// Decoration for `id` under `settings`, or `None` when nothing should
    /// be shown.
    pub fn decorate(&self, id: &FileIdentity, settings: &Settings) -> Option<Decoration> {
        let config = settings.config();
        if !config.enabled || !id.is_local() {
            return None;
        }

        let filter = settings.filter();
        if filter.is_path_ignored(id.path()) || filter.is_extension_ignored(id.path()) {
            return None;
        }

        let stat = match self.fs.stat(id) {
            Ok(stat) => stat,
            Err(err) => {
                tracing::debug!(file = %id, error = %err, "no decoration");
                return None;
            }
        };

        if stat.is_dir {
            self.decorate_dir(id, settings)
        } else {
            self.decorate_file(id, &stat, settings)
        }
    }

    fn decorate_dir(&self, id: &FileIdentity, settings: &Settings) -> Option<Decoration> {
        if !settings.config().show_directory_totals {
            return None;
        }
        let total = DirectoryAggregator::new(self.fs.as_ref(), settings)
            .with_cache(&self.cache)
            .total(id);

        Some(Decoration {
            badge: format_directory_badge(total),
            tooltip: format!("Total lines: {}", format_exact(total)),
            color: DecorationColor::Default,
        })
    }

    fn decorate_file(
        &self,
        id: &FileIdentity,
        stat: &FileStat,
        settings: &Settings,
    ) -> Option<Decoration> {
        let config = settings.config();
        if !stat.is_file || stat.size > config.size_limit {
            return None;
        }

        let entry = match self
            .cache
            .line_count(self.fs.as_ref(), id, stat, config.size_limit)
        {
            Ok(entry) => entry,
            Err(err) => {
                tracing::debug!(file = %id, error = %err, "no decoration");
                return None;
            }
        };

        let lines_line = format!("Lines: {}", format_exact(entry.line_count));
        let size_line = format!("Size: {}", format_file_size(entry.file_size));
        let (badge, mut tooltip) = match config.display_mode {
            DisplayMode::Lines | DisplayMode::Both => (
                line_badge(entry.line_count, config.compact_numbers),
                vec![lines_line, size_line],
            ),
            DisplayMode::Size => (
                format_size_badge(entry.file_size),
                vec![size_line, lines_line],
            ),
        };

        if config.sloc_enabled_for(id.path()) {
            match self
                .cache
                .sloc_count(self.fs.as_ref(), id, stat, config.size_limit)
            {
                Ok(sloc) => tooltip.push(format!("Source lines (SLOC): {}", format_exact(sloc))),
                Err(err) => tracing::debug!(file = %id, error = %err, "sloc unavailable"),
            }
        }

        if config.show_git_changes {
            if let Some(delta) = self.vcs.diff_summary(id).filter(|d| !d.is_empty()) {
                tooltip.push(format!("Git changes: +{} / -{}", delta.added, delta.removed));
            }
        }

        Some(Decoration {
            badge,
            tooltip: tooltip.join("\n"),
            color: color_for(entry.line_count, &config.thresholds_for(id.path())),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::data::cache::tests::MemFs;
    use crate::source::vcs::DiffSummary;

    struct FixedVcs(Option<DiffSummary>);

    impl VcsProvider for FixedVcs {
        fn diff_summary(&self, _id: &FileIdentity) -> Option<DiffSummary> {
            self.0
        }
    }

    fn settings(config: Config) -> Settings {
        Settings::new(config, &[]).unwrap()
    }

    fn fixture() -> (Arc<MemFs>, Decorator) {
        let memfs = Arc::new(MemFs::new());
        memfs.write("/w/a.txt", "a\nb\nc", 1);
        memfs.write("/w/src/app.js", "// header\nlet a = 1;\n\nlet b = 2;", 1);
        memfs.write("/w/logo.png", "png", 1);
        memfs.write("/w/node_modules/pkg/index.js", "x", 1);
        let decorator = Decorator::new(memfs.clone());
        (memfs, decorator)
    }

    #[test]
    fn test_color_boundaries_inclusive_lower() {
        let t = ColorThresholds::default();
        assert_eq!(color_for(0, &t), DecorationColor::Default);
        assert_eq!(color_for(299, &t), DecorationColor::Default);
        assert_eq!(color_for(300, &t), DecorationColor::Low);
        assert_eq!(color_for(999, &t), DecorationColor::Low);
        assert_eq!(color_for(1000, &t), DecorationColor::Medium);
        assert_eq!(color_for(2999, &t), DecorationColor::Medium);
        assert_eq!(color_for(3000, &t), DecorationColor::High);
    }

    #[test]
    fn test_file_decoration() {
        let (_, decorator) = fixture();
        let decoration = decorator
            .decorate(&FileIdentity::file("/w/a.txt"), &Settings::default())
            .unwrap();

        assert_eq!(decoration.badge, "3");
        assert_eq!(decoration.tooltip, "Lines: 3\nSize: 5 B");
        assert_eq!(decoration.color, DecorationColor::Default);
    }

    #[test]
    fn test_declines_in_check_order() {
        let (memfs, decorator) = fixture();
        let defaults = Settings::default();

        let disabled = settings(Config {
            enabled: false,
            ..Config::default()
        });
        assert!(decorator
            .decorate(&FileIdentity::file("/w/a.txt"), &disabled)
            .is_none());
        assert!(decorator
            .decorate(&FileIdentity::new("untitled", "/w/a.txt"), &defaults)
            .is_none());
        assert!(decorator
            .decorate(&FileIdentity::file("/w/node_modules/pkg/index.js"), &defaults)
            .is_none());
        assert!(decorator
            .decorate(&FileIdentity::file("/w/logo.png"), &defaults)
            .is_none());
        assert!(decorator
            .decorate(&FileIdentity::file("/w/missing.txt"), &defaults)
            .is_none());

        // Nothing above needed to read a file
        assert_eq!(memfs.opens(), 0);
    }

    #[test]
    fn test_size_limit_declines() {
        let (memfs, decorator) = fixture();
        let small = settings(Config {
            size_limit: 4,
            ..Config::default()
        });
        assert!(decorator
            .decorate(&FileIdentity::file("/w/a.txt"), &small)
            .is_none());
        assert_eq!(memfs.opens(), 0);
    }

    #[test]
    fn test_size_mode_and_exact_numbers() {
        let (memfs, decorator) = fixture();
        let size_mode = settings(Config {
            display_mode: DisplayMode::Size,
            ..Config::default()
        });
        let decoration = decorator
            .decorate(&FileIdentity::file("/w/a.txt"), &size_mode)
            .unwrap();
        assert_eq!(decoration.badge, "5B");
        assert_eq!(decoration.tooltip, "Size: 5 B\nLines: 3");

        let mut big = "x\n".repeat(1499);
        big.push('x');
        memfs.write("/w/big.txt", &big, 1);
        let id = FileIdentity::file("/w/big.txt");

        let decoration = decorator.decorate(&id, &Settings::default()).unwrap();
        assert_eq!(decoration.badge, "2k");
        assert_eq!(decoration.color, DecorationColor::Medium);
        assert!(decoration.tooltip.starts_with("Lines: 1,500\n"));

        let exact = settings(Config {
            compact_numbers: false,
            ..Config::default()
        });
        assert_eq!(decorator.decorate(&id, &exact).unwrap().badge, "1500");
    }

    #[test]
    fn test_directory_totals() {
        let (_, decorator) = fixture();
        let dir = FileIdentity::file("/w");
        assert!(decorator.decorate(&dir, &Settings::default()).is_none());

        let totals = settings(Config {
            show_directory_totals: true,
            ..Config::default()
        });
        let decoration = decorator.decorate(&dir, &totals).unwrap();
        // a.txt 3 + app.js 4; png and node_modules excluded
        assert_eq!(decoration.badge, "Σ7");
        assert_eq!(decoration.tooltip, "Total lines: 7");
        assert_eq!(decoration.color, DecorationColor::Default);
    }

    #[test]
    fn test_directory_color_is_always_default() {
        let memfs = Arc::new(MemFs::new());
        memfs.write("/big/a.txt", &"x\n".repeat(5000), 1);
        let decorator = Decorator::new(memfs);
        let totals = settings(Config {
            show_directory_totals: true,
            ..Config::default()
        });

        let decoration = decorator
            .decorate(&FileIdentity::file("/big"), &totals)
            .unwrap();
        assert_eq!(decoration.badge, "Σk");
        assert_eq!(decoration.color, DecorationColor::Default);
    }

    #[test]
    fn test_sloc_line_global_and_override() {
        let (_, decorator) = fixture();
        let id = FileIdentity::file("/w/src/app.js");

        let global = settings(Config {
            show_sloc: true,
            ..Config::default()
        });
        let tooltip = decorator.decorate(&id, &global).unwrap().tooltip;
        assert!(tooltip.ends_with("Source lines (SLOC): 2"));

        let config =
            Config::from_json_str(r#"{ "languageOverrides": { "js": { "showSloc": true } } }"#)
                .unwrap();
        let tooltip = decorator.decorate(&id, &settings(config)).unwrap().tooltip;
        assert!(tooltip.contains("Source lines (SLOC): 2"));

        let tooltip = decorator
            .decorate(&FileIdentity::file("/w/a.txt"), &settings(Config::default()))
            .unwrap()
            .tooltip;
        assert!(!tooltip.contains("SLOC"));
    }

    #[test]
    fn test_language_threshold_override() {
        let (_, decorator) = fixture();
        let config = Config::from_json_str(
            r#"{ "languageOverrides": { ".txt": { "colorThresholds": { "small": 1, "medium": 2, "large": 3 } } } }"#,
        )
        .unwrap();
        let decoration = decorator
            .decorate(&FileIdentity::file("/w/a.txt"), &settings(config))
            .unwrap();
        assert_eq!(decoration.color, DecorationColor::High);
    }

    #[test]
    fn test_git_changes_line() {
        let memfs = Arc::new(MemFs::new());
        memfs.write("/w/a.txt", "a\nb", 1);
        let id = FileIdentity::file("/w/a.txt");
        let git = settings(Config {
            show_git_changes: true,
            ..Config::default()
        });

        let delta = DiffSummary {
            added: 3,
            removed: 1,
        };
        let changed = Decorator::new(memfs.clone()).with_vcs(Arc::new(FixedVcs(Some(delta))));
        let tooltip = changed.decorate(&id, &git).unwrap().tooltip;
        assert!(tooltip.ends_with("Git changes: +3 / -1"));

        // Toggle off: provider is not consulted
        let tooltip = changed.decorate(&id, &Settings::default()).unwrap().tooltip;
        assert!(!tooltip.contains("Git"));

        let unchanged = Decorator::new(memfs.clone())
            .with_vcs(Arc::new(FixedVcs(Some(DiffSummary::default()))));
        assert!(!unchanged.decorate(&id, &git).unwrap().tooltip.contains("Git"));

        let untracked = Decorator::new(memfs).with_vcs(Arc::new(FixedVcs(None)));
        assert!(!untracked.decorate(&id, &git).unwrap().tooltip.contains("Git"));
    }

    #[test]
    fn test_cache_reuse_and_invalidation() {
        let (memfs, decorator) = fixture();
        let id = FileIdentity::file("/w/a.txt");
        let defaults = Settings::default();

        decorator.decorate(&id, &defaults).unwrap();
        decorator.decorate(&id, &defaults).unwrap();
        assert_eq!(memfs.opens(), 1);

        decorator.invalidate(&id);
        decorator.decorate(&id, &defaults).unwrap();
        assert_eq!(memfs.opens(), 2);

        // An edit changes the modification time
        memfs.write("/w/a.txt", "a\nb\nc\nd", 2);
        assert_eq!(decorator.decorate(&id, &defaults).unwrap().badge, "4");
        assert_eq!(memfs.opens(), 3);

        decorator.invalidate_all();
        assert!(decorator.cache().is_empty());
    }
}
