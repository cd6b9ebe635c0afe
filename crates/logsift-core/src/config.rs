//! Configuration types for logsift.
//!
//! [`Config::load`] reads `~/.config/logsift/config.toml`, creating it with
//! hardcoded defaults if it does not yet exist. [`Config::load_from`] layers
//! an explicit file instead, and [`Config::defaults`] returns the defaults
//! without touching the filesystem (useful in tests).

use crate::assembler::ParseOptions;
use crate::export::DEFAULT_TOP_MESSAGES;
use crate::timeline::BucketWidth;
use serde::Deserialize;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Embedded defaults
// ---------------------------------------------------------------------------

const DEFAULT_CONFIG: &str = r#"
[parse]
# "local", "utc", or a fixed offset such as "+02:00"
naive_zone = "local"

[timeline]
bucket = "1m"

[search]
regex     = false
highlight = true

[export]
top_messages = 10
"#;

// ---------------------------------------------------------------------------
// Public config types
// ---------------------------------------------------------------------------

/// Top-level application configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub parse: ParseOptions,
    #[serde(default)]
    pub timeline: TimelineConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

/// `[timeline]` section of `config.toml`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct TimelineConfig {
    #[serde(default)]
    pub bucket: BucketWidth,
}

/// `[search]` section of `config.toml`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SearchConfig {
    /// Treat queries as regular expressions by default.
    #[serde(default)]
    pub regex: bool,
    /// Mark matches when writing to a terminal.
    #[serde(default = "default_highlight")]
    pub highlight: bool,
}

fn default_highlight() -> bool { true }

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            regex: false,
            highlight: default_highlight(),
        }
    }
}

/// `[export]` section of `config.toml`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_top_messages")]
    pub top_messages: usize,
}

fn default_top_messages() -> usize { DEFAULT_TOP_MESSAGES }

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            top_messages: default_top_messages(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::defaults()
    }
}

impl Config {
    /// Load from `~/.config/logsift/config.toml`, layered on top of the
    /// built-in defaults. Creates the file with defaults if it does not exist.
    pub fn load() -> anyhow::Result<Self> {
        let path = config_path();

        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, DEFAULT_CONFIG.trim_start())?;
            tracing::debug!(path = %path.display(), "config: wrote defaults");
        }

        Self::layered(&path, false)
    }

    /// Load an explicit file over the built-in defaults. The file must exist.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        Self::layered(path, true)
    }

    fn layered(path: &Path, required: bool) -> anyhow::Result<Self> {
        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .add_source(config::File::from(path).required(required))
            .build()?
            .try_deserialize()
            .map_err(Into::into)
    }

    /// Return the built-in defaults without touching the filesystem.
    pub fn defaults() -> Self {
        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .build()
            .expect("built-in default config must be valid TOML")
            .try_deserialize()
            .expect("built-in default config must deserialize correctly")
    }
}

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

fn config_path() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".to_string()))
                .join(".config")
        })
        .join("logsift")
        .join("config.toml")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timestamp::NaiveZone;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_load() {
        let cfg = Config::defaults();
        assert_eq!(cfg.parse.naive_zone, NaiveZone::Local);
        assert_eq!(cfg.timeline.bucket, BucketWidth::MINUTE);
        assert!(!cfg.search.regex);
        assert!(cfg.search.highlight);
        assert_eq!(cfg.export.top_messages, 10);
    }

    #[test]
    fn file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[parse]\nnaive_zone = \"+02:00\"\n[timeline]\nbucket = \"5s\"\n[search]\nregex = true\n",
        )
        .unwrap();

        let cfg = Config::load_from(&path).unwrap();

        assert_eq!(cfg.parse.naive_zone, "+02:00".parse::<NaiveZone>().unwrap());
        assert_eq!(cfg.timeline.bucket.as_millis(), 5_000);
        assert!(cfg.search.regex);
        assert!(cfg.search.highlight);
        assert_eq!(cfg.export.top_messages, 10);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[timeline]\nbucket = \"0s\"\n").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        assert!(Config::load_from(Path::new("/nonexistent/logsift.toml")).is_err());
    }
}
