//! Configuration loading from files and environment
//!
//! Sources, later wins:
//! 1. Built-in defaults
//! 2. Global config: `<config dir>/registrar/config.toml`
//! 3. Project config: `.registrar/config.toml`
//! 4. Explicit `--config` file
//! 5. Environment variables: `REGISTRAR_*`
//! 6. `--db` flag

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::panic))]

use std::{
    path::{Path, PathBuf},
    str::FromStr,
};

use registrar_core::coordination::MAX_CREDITS_PER_STUDENT;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::filter::LevelFilter;

use crate::logging;

pub const ENV_DB: &str = "REGISTRAR_DB";
pub const ENV_MAX_CREDITS: &str = "REGISTRAR_MAX_CREDITS";
pub const ENV_LOG: &str = "REGISTRAR_LOG";

const DEFAULT_DB_PATH: &str = ".registrar/registrar.db";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid {var} value '{value}': {reason}")]
    Env {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Resolved settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub database_path: PathBuf,
    pub max_credits: u32,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DB_PATH),
            max_credits: MAX_CREDITS_PER_STUDENT,
            log_level: logging::DEFAULT_LEVEL.to_string(),
        }
    }
}

/// One config file's contents. Absent keys leave the layer below alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub database_path: Option<PathBuf>,
    pub max_credits: Option<u32>,
    pub log_level: Option<String>,
}

impl Config {
    /// Load from every source.
    ///
    /// A missing global or project file is skipped; a missing `explicit`
    /// file is an error.
    pub fn load(explicit: Option<&Path>, db_flag: Option<&Path>) -> Result<Self, ConfigError> {
        let mut implicit = [global_config_path(), project_config_path()]
            .into_iter()
            .flatten()
            .filter(|path| path.is_file());

        let config = implicit.try_fold(Self::default(), |config, path| {
            load_toml_file(&path).map(|file| config.merge(file))
        })?;

        let config = match explicit {
            Some(path) => config.merge(load_toml_file(path)?),
            None => config,
        };

        let config = config.apply_env_vars()?;

        let config = match db_flag {
            Some(path) => Self {
                database_path: path.to_path_buf(),
                ..config
            },
            None => config,
        };

        config.validate()?;
        Ok(config)
    }

    /// Overlay `file` on top of `self`.
    pub fn merge(self, file: ConfigFile) -> Self {
        Self {
            database_path: file.database_path.unwrap_or(self.database_path),
            max_credits: file.max_credits.unwrap_or(self.max_credits),
            log_level: file.log_level.unwrap_or(self.log_level),
        }
    }

    pub fn apply_env_vars(self) -> Result<Self, ConfigError> {
        let database_path = std::env::var(ENV_DB)
            .ok()
            .map_or(self.database_path, PathBuf::from);

        let max_credits = match std::env::var(ENV_MAX_CREDITS) {
            Ok(value) => value.trim().parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::Env {
                    var: ENV_MAX_CREDITS,
                    value: value.clone(),
                    reason: e.to_string(),
                }
            })?,
            Err(_) => self.max_credits,
        };

        let log_level = std::env::var(ENV_LOG).unwrap_or(self.log_level);

        Ok(Self {
            database_path,
            max_credits,
            log_level,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_credits == 0 {
            return Err(ConfigError::Invalid(
                "max_credits must be at least 1".to_string(),
            ));
        }
        if self.database_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(
                "database_path cannot be empty".to_string(),
            ));
        }
        LevelFilter::from_str(&self.log_level).map_err(|_| {
            ConfigError::Invalid(format!(
                "log_level '{}' is not one of off, error, warn, info, debug, trace",
                self.log_level
            ))
        })?;
        Ok(())
    }
}

pub fn global_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "registrar")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

pub fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|dir| dir.join(".registrar").join("config.toml"))
}

pub fn load_toml_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
