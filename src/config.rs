//! Configuration file parser for ~/.config/feednorm/config.toml.
//!
//! The config file is optional: a missing file yields `Config::default()`.
//! Unknown keys are accepted by serde, though we log a warning when the file
//! contains potential typos.
use chrono::Duration;
use serde::Deserialize;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use thiserror::Error;

use crate::feed::{ParseOptions, DEFAULT_REFRESH_MINUTES, MAX_DOCUMENT_DEPTH};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// SEC-014: Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Normalizer configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Minutes until the next refresh when a feed carries no TTL.
    pub default_refresh_minutes: u64,

    /// Maximum element nesting accepted in a feed document.
    pub max_nesting_depth: usize,

    /// Whether the CLI prints per-item diagnostics after the summary.
    pub show_diagnostics: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_refresh_minutes: DEFAULT_REFRESH_MINUTES.unsigned_abs(),
            max_nesting_depth: MAX_DOCUMENT_DEPTH,
            show_diagnostics: true,
        }
    }
}

impl Config {
    /// SEC-014: Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    /// Upper bound for `default_refresh_minutes` (one year).
    const MAX_REFRESH_MINUTES: u64 = 525_600;

    const KNOWN_KEYS: [&'static str; 3] = [
        "default_refresh_minutes",
        "max_nesting_depth",
        "show_diagnostics",
    ];

    /// Load configuration from a TOML file.
    ///
    /// An absent or blank file gives `Config::default()`. Unknown keys are
    /// kept out of the result and reported with `tracing::warn!`.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::TooLarge`] past `MAX_FILE_SIZE` bytes
    /// - [`ConfigError::Parse`] for malformed TOML or mistyped values
    /// - [`ConfigError::Io`] for any other read failure
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let Some(content) = Self::read_bounded(path)? else {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Blank config file, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            raw.keys()
                .filter(|key| !Self::KNOWN_KEYS.contains(&key.as_str()))
                .for_each(|key| tracing::warn!(key = %key, "Ignoring unrecognized config key"));
        }

        let config: Config = toml::from_str(&content)?;
        tracing::info!(
            path = %path.display(),
            refresh_minutes = config.default_refresh_minutes,
            max_depth = config.max_nesting_depth,
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Reads at most `MAX_FILE_SIZE` bytes from one open handle.
    ///
    /// `Ok(None)` means the file does not exist.
    fn read_bounded(path: &Path) -> Result<Option<String>, ConfigError> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(ConfigError::Io(e)),
        };

        // SEC-014: one byte past the limit is enough to reject the file
        let mut content = String::new();
        file.take(Self::MAX_FILE_SIZE + 1).read_to_string(&mut content)?;
        if content.len() as u64 > Self::MAX_FILE_SIZE {
            return Err(ConfigError::TooLarge(format!(
                "{} exceeds {} bytes",
                path.display(),
                Self::MAX_FILE_SIZE
            )));
        }
        Ok(Some(content))
    }

    /// Parse options derived from this configuration, reading the wall clock.
    pub fn parse_options(&self) -> ParseOptions {
        let minutes = self.default_refresh_minutes.min(Self::MAX_REFRESH_MINUTES);
        ParseOptions {
            default_refresh_interval: Duration::minutes(i64::try_from(minutes).unwrap_or(0)),
            max_depth: self.max_nesting_depth,
            now: None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
