//! Tracker configuration.
//!
//! The set of overridable fields is closed: string-keyed overrides and
//! JSON documents naming anything else are rejected.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_MAX;

/// Errors raised while building a [`TrackerConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The key does not name a configurable field.
    #[error("unknown configuration key `{0}`")]
    UnknownKey(String),

    /// The value could not be parsed for the given key.
    #[error("invalid value `{value}` for `{key}`: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    /// An override was not of the form `key=value`.
    #[error("malformed override `{0}`, expected key=value")]
    MalformedOverride(String),

    /// The JSON document did not describe a configuration.
    #[error("invalid configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// The configuration file could not be read.
    #[error("cannot read configuration file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Initial state and policy of a tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrackerConfig {
    /// Starting step count.
    pub index: u64,
    /// Step count representing completion (bounded trackers only).
    pub max: u64,
    /// Whether `goto` may move backwards (bounded trackers only).
    pub backtrack: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            index: 0,
            max: DEFAULT_MAX,
            backtrack: false,
        }
    }
}

impl TrackerConfig {
    /// Keys accepted by [`TrackerConfig::set`].
    pub const KEYS: [&'static str; 3] = ["index", "max", "backtrack"];

    #[must_use]
    pub fn with_index(mut self, index: u64) -> Self {
        self.index = index;
        self
    }

    #[must_use]
    pub fn with_max(mut self, max: u64) -> Self {
        self.max = max;
        self
    }

    #[must_use]
    pub fn with_backtrack(mut self, backtrack: bool) -> Self {
        self.backtrack = backtrack;
        self
    }

    /// Override one field by name.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        match key.trim() {
            "index" => self.index = parse_u64(key, value)?,
            "max" => self.max = parse_u64(key, value)?,
            "backtrack" => self.backtrack = parse_bool(key, value)?,
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        }
        Ok(())
    }

    /// Apply a `key=value` override.
    pub fn apply_override(&mut self, spec: &str) -> Result<(), ConfigError> {
        let (key, value) = spec
            .split_once('=')
            .ok_or_else(|| ConfigError::MalformedOverride(spec.to_string()))?;
        self.set(key, value)
    }

    /// Parse a JSON document. Missing fields keep their defaults.
    pub fn from_json(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Load a JSON configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&content)?;
        tracing::debug!(path = %path.display(), ?config, "Loaded tracker configuration");
        Ok(config)
    }
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse().map_err(|e: std::num::ParseIntError| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        reason: e.to_string(),
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            reason: "expected a boolean".to_string(),
        }),
    }
}
