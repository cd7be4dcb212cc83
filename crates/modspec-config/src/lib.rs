//! modspec configuration
//!
//! Stored as TOML at `~/.config/modspec/modspec.toml` unless `MODSPEC_CONFIG`
//! points somewhere else. Every value is optional; accessors fill in defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable overriding the config file location
pub const CONFIG_ENV: &str = "MODSPEC_CONFIG";

/// File name looked up when a directory is given instead of a manifest
pub const DEFAULT_MANIFEST_FILE_NAME: &str = "mod.json";

/// Keys accepted by [`Config::get`] and [`Config::set`]
pub const KEYS: &[&str] = &["manifest-file-name", "log-file", "verbosity", "parse-threads"];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Unknown config key '{0}'")]
    UnknownKey(String),

    #[error("Invalid value '{value}' for '{key}': expected {expected}")]
    InvalidValue {
        key: String,
        value: String,
        expected: &'static str,
    },

    #[error("Could not determine the home directory")]
    NoHomeDir,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest_file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verbosity: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_threads: Option<usize>,
}

impl Config {
    pub fn path() -> Result<PathBuf, ConfigError> {
        // Explicit override for tests and isolated runs
        if let Ok(env_path) = std::env::var(CONFIG_ENV) {
            let trimmed = env_path.trim();
            if !trimmed.is_empty() {
                return Ok(PathBuf::from(trimmed));
            }
        }

        #[cfg(not(target_os = "windows"))]
        let default = dirs::home_dir()
            .ok_or(ConfigError::NoHomeDir)?
            .join(".config")
            .join("modspec")
            .join("modspec.toml");

        #[cfg(target_os = "windows")]
        let default = dirs::config_dir()
            .ok_or(ConfigError::NoHomeDir)?
            .join("modspec")
            .join("modspec.toml");

        Ok(default)
    }

    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path(&Self::path()?)
    }

    /// Load from `path`, returning defaults if the file doesn't exist
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to_path(&Self::path()?)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "manifest-file-name" => self.manifest_file_name.clone(),
            "log-file" => self.log_file.clone(),
            "verbosity" => self.verbosity.map(|v| v.to_string()),
            "parse-threads" => self.parse_threads.map(|v| v.to_string()),
            _ => None,
        }
    }

    pub fn set(&mut self, key: &str, value: String) -> Result<(), ConfigError> {
        match key {
            "manifest-file-name" => self.manifest_file_name = Some(value),
            "log-file" => self.log_file = Some(value),
            "verbosity" => {
                self.verbosity = Some(parse_value(key, &value, "an integer between 0 and 255")?);
            }
            "parse-threads" => {
                self.parse_threads = Some(parse_value(key, &value, "a non-negative integer")?);
            }
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.values_iter().is_empty()
    }

    pub fn values_iter(&self) -> Vec<(&'static str, String)> {
        KEYS.iter()
            .filter_map(|key| self.get(key).map(|value| (*key, value)))
            .collect()
    }

    pub fn manifest_file_name(&self) -> &str {
        self.manifest_file_name
            .as_deref()
            .unwrap_or(DEFAULT_MANIFEST_FILE_NAME)
    }

    /// Configured log file, if logging to a file is enabled
    pub fn log_file(&self) -> Option<PathBuf> {
        self.log_file.as_ref().map(PathBuf::from)
    }

    pub fn verbosity(&self) -> u8 {
        self.verbosity.unwrap_or(0)
    }

    /// Worker threads for parallel parsing; 0 lets the pool decide
    pub fn parse_threads(&self) -> usize {
        self.parse_threads.unwrap_or(0)
    }
}

fn parse_value<T: std::str::FromStr>(
    key: &str,
    value: &str,
    expected: &'static str,
) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        expected,
    })
}

#[cfg(test)]
mod tests {
    use crate::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.is_empty());
        assert_eq!(config.manifest_file_name(), "mod.json");
        assert_eq!(config.verbosity(), 0);
        assert!(config.log_file().is_none());
    }

    #[test]
    fn test_set_and_get_by_key() {
        let mut config = Config::default();
        assert!(config.set("manifest-file-name", "fabric.mod.json".to_string()).is_ok());
        assert!(config.set("parse-threads", "4".to_string()).is_ok());
        assert_eq!(config.get("manifest-file-name").as_deref(), Some("fabric.mod.json"));
        assert_eq!(config.parse_threads(), 4);
        assert_eq!(config.values_iter().len(), 2);

        assert!(matches!(
            config.set("verbosity", "loud".to_string()),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            config.set("cache-path", "/tmp".to_string()),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let path = temp_dir.path().join("nested").join("modspec.toml");

        let loaded = Config::load_from_path(&path);
        assert!(loaded.is_ok_and(|c| c.is_empty()));

        let mut config = Config::default();
        assert!(config.set("verbosity", "2".to_string()).is_ok());
        assert!(config.save_to_path(&path).is_ok());

        let content = fs::read_to_string(&path).unwrap_or_default();
        assert!(content.contains("verbosity = 2"));
        assert!(Config::load_from_path(&path).is_ok_and(|c| c == config));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let path = temp_dir.path().join("modspec.toml");
        if fs::write(&path, "verbosity = [").is_err() {
            return;
        }
        assert!(matches!(
            Config::load_from_path(&path),
            Err(ConfigError::Parse(_))
        ));
    }
}
