//! Configuration for opening a store.
//!
//! Sensible defaults, a builder, and an environment loader for the binary.

use crate::error::{Error, Result};
use crate::persist::WriteMode;
use std::path::PathBuf;

/// Environment variable holding the snapshot path.
pub const ENV_DATA_PATH: &str = "DATA_PATH";
/// Environment variable selecting the write mode (`atomic` / `in-place`).
pub const ENV_WRITE_MODE: &str = "USER_STORE_WRITE_MODE";
/// Environment variable toggling pretty JSON.
pub const ENV_PRETTY: &str = "USER_STORE_PRETTY";

/// Where the default snapshot lives.
pub const DEFAULT_DATA_PATH: &str = "./data/users.json";

/// Settings for a [`UserStore`](crate::UserStore).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Snapshot file. Its directory is created on open.
    pub data_path: PathBuf,
    /// Two-space indented JSON when `true`.
    pub pretty: bool,
    /// How snapshots are written.
    pub write_mode: WriteMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            pretty: true,
            write_mode: WriteMode::Atomic,
        }
    }
}

impl Config {
    /// Create a new config builder.
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Defaults overridden by `DATA_PATH`, `USER_STORE_WRITE_MODE` and
    /// `USER_STORE_PRETTY` where set.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) but reads variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(path) = lookup(ENV_DATA_PATH).filter(|p| !p.trim().is_empty()) {
            config.data_path = PathBuf::from(path);
        }
        if let Some(mode) = lookup(ENV_WRITE_MODE) {
            config.write_mode = mode.parse()?;
        }
        if let Some(pretty) = lookup(ENV_PRETTY) {
            config.pretty = parse_bool(ENV_PRETTY, &pretty)?;
        }
        Ok(config)
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(Error::Invalid(format!("{key}: expected a boolean, got {other:?}"))),
    }
}

/// Builder for [`Config`].
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the snapshot path.
    pub fn data_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_path = path.into();
        self
    }

    /// Toggle pretty JSON.
    pub fn pretty(mut self, yes: bool) -> Self {
        self.config.pretty = yes;
        self
    }

    /// Set the write mode.
    pub fn write_mode(mut self, mode: WriteMode) -> Self {
        self.config.write_mode = mode;
        self
    }

    /// Finish.
    pub fn build(self) -> Config {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_env() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.data_path, PathBuf::from("./data/users.json"));
    }

    #[test]
    fn env_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("DATA_PATH", "/var/lib/users.json"),
            ("USER_STORE_WRITE_MODE", "in-place"),
            ("USER_STORE_PRETTY", "0"),
        ]))
        .unwrap();
        assert_eq!(config.data_path, PathBuf::from("/var/lib/users.json"));
        assert_eq!(config.write_mode, WriteMode::InPlace);
        assert!(!config.pretty);
    }

    #[test]
    fn blank_data_path_falls_back() {
        let config = Config::from_lookup(lookup(&[("DATA_PATH", "  ")])).unwrap();
        assert_eq!(config.data_path, PathBuf::from(DEFAULT_DATA_PATH));
    }

    #[test]
    fn bad_values_rejected() {
        assert!(matches!(
            Config::from_lookup(lookup(&[("USER_STORE_PRETTY", "maybe")])),
            Err(Error::Invalid(_))
        ));
        assert!(matches!(
            Config::from_lookup(lookup(&[("USER_STORE_WRITE_MODE", "lazy")])),
            Err(Error::Invalid(_))
        ));
    }

    #[test]
    fn builder_sets_fields() {
        let config = Config::builder()
            .data_path("x.json")
            .pretty(false)
            .write_mode(WriteMode::InPlace)
            .build();
        assert_eq!(config.data_path, PathBuf::from("x.json"));
        assert!(!config.pretty);
        assert_eq!(config.write_mode, WriteMode::InPlace);
    }
}
