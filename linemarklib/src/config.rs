//! Configuration snapshot.
//!
//! A [`Config`] is a plain value resolved by the host (JSON keys in
//! camelCase, every key optional). [`Settings`] pairs a validated config with
//! its compiled ignore filter. [`ConfigStore`] holds the current settings
//! behind an `Arc` and swaps them wholesale, so an in-flight request keeps
//! the snapshot it started with.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use crate::data::counter::DEFAULT_SIZE_LIMIT;
use crate::error::LinemarkError;
use crate::source::ignore::IgnoreFilter;
use crate::Result;

/// What the badge shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    #[default]
    Lines,
    Size,
    Both,
}

/// Ascending, inclusive-lower color boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorThresholds {
    pub small: u64,
    pub medium: u64,
    pub large: u64,
}

impl Default for ColorThresholds {
    fn default() -> Self {
        Self {
            small: 300,
            medium: 1000,
            large: 3000,
        }
    }
}

impl ColorThresholds {
    pub fn new(small: u64, medium: u64, large: u64) -> Self {
        Self {
            small,
            medium,
            large,
        }
    }

    fn validate(&self, context: &str) -> Result<()> {
        if self.small <= self.medium && self.medium <= self.large {
            Ok(())
        } else {
            Err(LinemarkError::Config(format!(
                "{}: thresholds must be ascending (small {} / medium {} / large {})",
                context, self.small, self.medium, self.large
            )))
        }
    }
}

/// Per-extension overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LanguageOverride {
    pub color_thresholds: Option<ColorThresholds>,
    pub show_sloc: Option<bool>,
}

/// Resolved configuration snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    pub enabled: bool,
    pub display_mode: DisplayMode,
    pub compact_numbers: bool,
    pub show_sloc: bool,
    pub show_directory_totals: bool,
    pub show_git_changes: bool,
    /// Bytes; larger files get no decoration
    pub size_limit: u64,
    pub ignored_extensions: Vec<String>,
    pub ignored_patterns: Vec<String>,
    pub color_thresholds: ColorThresholds,
    /// Keyed by extension, with or without the leading dot
    pub language_overrides: BTreeMap<String, LanguageOverride>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enabled: true,
            display_mode: DisplayMode::Lines,
            compact_numbers: true,
            show_sloc: false,
            show_directory_totals: false,
            show_git_changes: false,
            size_limit: DEFAULT_SIZE_LIMIT,
            ignored_extensions: [
                "png", "jpg", "jpeg", "gif", "ico", "webp", "bmp", "pdf", "zip", "gz", "tar",
                "exe", "dll", "so", "dylib", "woff", "woff2", "ttf", "eot", "mp3", "mp4",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            ignored_patterns: vec![
                "**/node_modules/**".to_string(),
                "**/.git/**".to_string(),
                "**/dist/**".to_string(),
                "**/out/**".to_string(),
                "**/*.min.js".to_string(),
            ],
            color_thresholds: ColorThresholds::default(),
            language_overrides: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON document. Missing keys take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| LinemarkError::Config(format!("failed to parse JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| LinemarkError::from_io(path, e))?;
        Self::from_json_str(&json)
    }

    /// Check cross-field invariants.
    pub fn validate(&self) -> Result<()> {
        self.color_thresholds.validate("colorThresholds")?;
        for (ext, over) in &self.language_overrides {
            if let Some(thresholds) = &over.color_thresholds {
                thresholds.validate(&format!("languageOverrides.{}", ext))?;
            }
        }
        Ok(())
    }

    /// Override for a file's extension, if any.
    pub fn override_for(&self, path: &Path) -> Option<&LanguageOverride> {
        if self.language_overrides.is_empty() {
            return None;
        }
        let ext = path.extension()?.to_str()?.to_lowercase();
        self.language_overrides.iter().find_map(|(key, over)| {
            (key.trim_start_matches('.').to_lowercase() == ext).then_some(over)
        })
    }

    /// Thresholds that apply to `path`.
    pub fn thresholds_for(&self, path: &Path) -> ColorThresholds {
        self.override_for(path)
            .and_then(|o| o.color_thresholds)
            .unwrap_or(self.color_thresholds)
    }

    /// Whether SLOC is shown for `path`.
    pub fn sloc_enabled_for(&self, path: &Path) -> bool {
        self.override_for(path)
            .and_then(|o| o.show_sloc)
            .unwrap_or(self.show_sloc)
    }
}

/// A validated config with its compiled ignore filter.
#[derive(Debug, Clone)]
pub struct Settings {
    config: Config,
    filter: IgnoreFilter,
}

impl Settings {
    /// Validate `config` and compile its patterns. `roots` are the workspace
    /// roots used for the relative form of paths.
    pub fn new(config: Config, roots: &[PathBuf]) -> Result<Self> {
        config.validate()?;
        let mut filter = IgnoreFilter::new()
            .patterns(&config.ignored_patterns)?
            .extensions(&config.ignored_extensions);
        for root in roots {
            filter = filter.root(root.clone());
        }
        Ok(Self { config, filter })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn filter(&self) -> &IgnoreFilter {
        &self.filter
    }
}

impl Default for Settings {
    fn default() -> Self {
        // Built-in patterns are known to be valid.
        Self::new(Config::default(), &[]).unwrap_or_else(|_| Self {
            config: Config::default(),
            filter: IgnoreFilter::new(),
        })
    }
}

/// Holder for the current settings, replaced as a unit on change.
#[derive(Debug, Default)]
pub struct ConfigStore {
    current: RwLock<Arc<Settings>>,
}

impl ConfigStore {
    pub fn new(settings: Settings) -> Self {
        Self {
            current: RwLock::new(Arc::new(settings)),
        }
    }

    /// Snapshot of the current settings.
    pub fn current(&self) -> Arc<Settings> {
        match self.current.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Swap in new settings, returning the previous snapshot.
    pub fn replace(&self, settings: Settings) -> Arc<Settings> {
        let next = Arc::new(settings);
        let mut guard = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        std::mem::replace(&mut *guard, next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.enabled);
        assert_eq!(config.display_mode, DisplayMode::Lines);
        assert!(config.compact_numbers);
        assert!(!config.show_sloc);
        assert_eq!(config.size_limit, 10 * 1024 * 1024);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = Config::from_json_str(
            r#"{
                "displayMode": "both",
                "showSloc": true,
                "colorThresholds": { "small": 10, "medium": 20, "large": 30 },
                "languageOverrides": {
                    ".ts": { "showSloc": false },
                    "md": { "colorThresholds": { "small": 1, "medium": 2, "large": 3 } }
                }
            }"#,
        )
        .unwrap();

        assert_eq!(config.display_mode, DisplayMode::Both);
        assert!(config.show_sloc);
        assert!(config.enabled);
        assert_eq!(config.color_thresholds, ColorThresholds::new(10, 20, 30));
        assert!(!config.sloc_enabled_for(Path::new("a.TS")));
        assert!(config.sloc_enabled_for(Path::new("a.js")));
        assert_eq!(
            config.thresholds_for(Path::new("README.md")),
            ColorThresholds::new(1, 2, 3)
        );
        assert_eq!(
            config.thresholds_for(Path::new("main.rs")),
            ColorThresholds::new(10, 20, 30)
        );
    }

    #[test]
    fn test_descending_thresholds_rejected() {
        let result =
            Config::from_json_str(r#"{ "colorThresholds": { "small": 5, "medium": 4, "large": 9 } }"#);
        assert!(matches!(result, Err(LinemarkError::Config(_))));
    }

    #[test]
    fn test_malformed_json_rejected() {
        assert!(matches!(
            Config::from_json_str("{ not json"),
            Err(LinemarkError::Config(_))
        ));
    }

    #[test]
    fn test_settings_compile_patterns() {
        let settings = Settings::new(Config::default(), &[PathBuf::from("/w")]).unwrap();
        assert!(settings.filter().is_ignored(Path::new("/w/node_modules/x/index.js")));
        assert!(settings.filter().is_ignored(Path::new("/w/logo.png")));
        assert!(!settings.filter().is_ignored(Path::new("/w/src/index.js")));
    }

    #[test]
    fn test_unusual_patterns_keep_the_snapshot() {
        let config = Config {
            ignored_patterns: vec![
                "**.log".to_string(),
                "src/**.rs".to_string(),
                "file[1].txt".to_string(),
            ],
            ..Config::default()
        };
        let settings = Settings::new(config, &[PathBuf::from("/w")]).unwrap();

        assert!(settings.filter().is_ignored(Path::new("/w/logs/build.log")));
        assert!(settings.filter().is_ignored(Path::new("/w/src/deep/main.rs")));
        assert!(settings.filter().is_ignored(Path::new("/w/file[1].txt")));
        assert!(!settings.filter().is_ignored(Path::new("/w/file1.txt")));
    }

    #[test]
    fn test_store_swaps_whole_snapshot() {
        let store = ConfigStore::new(Settings::default());
        let before = store.current();

        let config = Config {
            enabled: false,
            ..Config::default()
        };
        let previous = store.replace(Settings::new(config, &[]).unwrap());

        // Holders of the old snapshot keep seeing it unchanged
        assert!(before.config().enabled);
        assert!(previous.config().enabled);
        assert!(!store.current().config().enabled);
    }
}
