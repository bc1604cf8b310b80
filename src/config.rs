//! Runtime configuration
//!
//! Read from a YAML file, then overridden by `PODPLANNER_*` environment
//! variables. Every field has a default, so an empty or missing file is a
//! valid configuration.

use crate::store::{DEFAULT_CAPACITY, DEFAULT_TTL};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const ENV_TTL_SECS: &str = "PODPLANNER_TTL_SECS";
pub const ENV_CAPACITY: &str = "PODPLANNER_CAPACITY";
pub const ENV_LOG: &str = "PODPLANNER_LOG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub store: StoreConfig,
    /// Fallback filter when `RUST_LOG` is unset
    pub log_level: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Inactivity window in seconds
    pub ttl_secs: u64,
    /// Maximum number of sessions kept at once
    pub capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            ttl_secs: DEFAULT_TTL.as_secs(),
            capacity: DEFAULT_CAPACITY,
        }
    }
}

impl Config {
    /// Load configuration for the running process.
    ///
    /// An explicit path must exist. Without one, the default location is
    /// used if present and built-in defaults otherwise. Environment
    /// overrides are applied last.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// `<config_dir>/podplanner/config.yaml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("podplanner").join("config.yaml"))
    }

    /// Apply environment overrides looked up through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_TTL_SECS) {
            self.store.ttl_secs = parse_env(ENV_TTL_SECS, &value)?;
        }
        if let Some(value) = lookup(ENV_CAPACITY) {
            self.store.capacity = parse_env(ENV_CAPACITY, &value)?;
        }
        if let Some(value) = lookup(ENV_LOG) {
            self.log_level = value;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.ttl_secs == 0 {
            return Err(ConfigError::Invalid("store.ttl_secs must be > 0".into()));
        }
        if self.store.capacity == 0 {
            return Err(ConfigError::Invalid("store.capacity must be > 0".into()));
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid(format!("{key} must be a non-negative integer, got {value:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.store.ttl_secs, 14_400);
        assert_eq!(config.store.capacity, 100);
        assert_eq!(config.log_level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = Config::from_yaml("store:\n  capacity: 5\n").unwrap();
        assert_eq!(config.store.capacity, 5);
        assert_eq!(config.store.ttl_secs, 14_400);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(Config::from_yaml("  \n").unwrap(), Config::default());
    }

    #[test]
    fn test_malformed_yaml_is_rejected() {
        let err = Config::from_yaml("store: [1, 2").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "store:\n  ttl_secs: 60\nlog_level: debug").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.store.ttl_secs, 60);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(Some(dir.path().join("nope.yaml").as_path())).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config
            .apply_env(env(&[
                (ENV_TTL_SECS, "30"),
                (ENV_CAPACITY, " 7 "),
                (ENV_LOG, "podplanner=trace"),
            ]))
            .unwrap();
        assert_eq!(config.store.ttl_secs, 30);
        assert_eq!(config.store.capacity, 7);
        assert_eq!(config.log_level, "podplanner=trace");
    }

    #[test]
    fn test_bad_env_value_is_rejected() {
        let mut config = Config::default();
        let err = config.apply_env(env(&[(ENV_CAPACITY, "lots")])).unwrap_err();
        assert!(err.to_string().contains(ENV_CAPACITY));
    }

    #[test]
    fn test_zero_values_fail_validation() {
        let mut config = Config::default();
        config.store.capacity = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = Config::default();
        config.store.ttl_secs = 0;
        assert!(config.validate().is_err());
    }
}
