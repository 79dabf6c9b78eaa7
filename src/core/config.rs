//! Tool settings: TOML file + env var overrides + smart defaults.
//!
//! Per-run inputs (URL, token, exclusions, query spec) come from the CLI.
//! This file only covers how the tool itself behaves: which `jf` binary to
//! drive, how many deletion workers to run, and where logs go.

#![allow(missing_docs)]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::errors::{Result, SweepError};
use crate::logger::dual::Level;

/// Environment variable naming an explicit settings file.
pub const CONFIG_ENV: &str = "ASW_CONFIG";

/// Full tool configuration model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Config {
    pub remote: RemoteConfig,
    pub executor: ExecutorConfig,
    pub logging: LoggingConfig,
}

/// How the external `jf` CLI is invoked.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RemoteConfig {
    /// Program name or path of the JFrog CLI.
    pub jf_binary: String,
    /// Prefix of generated server ids (`<prefix>-<8 hex>`).
    pub server_id_prefix: String,
}

/// Deletion worker pool sizing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ExecutorConfig {
    pub threads: usize,
}

/// Console and file sink settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    pub log_dir: PathBuf,
    pub file_prefix: String,
    pub console_level: Level,
    pub file_level: Level,
    pub write_file: bool,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            jf_binary: "jf".to_string(),
            server_id_prefix: "cli-config".to_string(),
        }
    }
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self { threads: 4 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("."),
            file_prefix: "clean_old_artifacts".to_string(),
            console_level: Level::Info,
            file_level: Level::Debug,
            write_file: true,
        }
    }
}

impl Config {
    /// Default settings path (`~/.config/asweep/config.toml`).
    #[must_use]
    pub fn default_path() -> PathBuf {
        let home = env::var_os("HOME").map_or_else(|| PathBuf::from("/tmp"), PathBuf::from);
        home.join(".config").join("asweep").join("config.toml")
    }

    /// Load settings from an explicit path, `$ASW_CONFIG`, or the default
    /// path, then apply env overrides.
    ///
    /// A missing file is only an error when the path was given explicitly.
    /// The result is not validated; callers layer their own overrides on
    /// top and then call [`Config::validate`].
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let explicit = path
            .map(Path::to_path_buf)
            .or_else(|| env_var(CONFIG_ENV).map(PathBuf::from));
        let is_explicit_path = explicit.is_some();
        let path_buf = explicit.unwrap_or_else(Self::default_path);

        let mut cfg = if path_buf.exists() {
            let raw = fs::read_to_string(&path_buf).map_err(|source| SweepError::Io {
                path: path_buf.clone(),
                source,
            })?;
            Self::from_toml_str(&raw)?
        } else if is_explicit_path {
            return Err(SweepError::MissingFile {
                what: "settings",
                path: path_buf,
            });
        } else {
            Self::default()
        };

        cfg.apply_env_overrides_from(env_var)?;
        Ok(cfg)
    }

    /// Parse settings from TOML text without touching the environment.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    fn apply_env_overrides_from<F>(&mut self, mut lookup: F) -> Result<()>
    where
        F: FnMut(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("ASW_JF_BIN") {
            self.remote.jf_binary = raw;
        }
        if let Some(raw) = lookup("ASW_THREADS") {
            self.executor.threads = parse_env_usize("ASW_THREADS", &raw)?;
        }
        if let Some(raw) = lookup("ASW_LOG_DIR") {
            self.logging.log_dir = PathBuf::from(raw);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.executor.threads == 0 {
            return Err(SweepError::InvalidConfig {
                details: "executor.threads must be >= 1".to_string(),
            });
        }
        if self.remote.jf_binary.trim().is_empty() {
            return Err(SweepError::InvalidConfig {
                details: "remote.jf_binary must not be empty".to_string(),
            });
        }
        if self.remote.server_id_prefix.trim().is_empty() {
            return Err(SweepError::InvalidConfig {
                details: "remote.server_id_prefix must not be empty".to_string(),
            });
        }
        if self.logging.file_prefix.trim().is_empty() {
            return Err(SweepError::InvalidConfig {
                details: "logging.file_prefix must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|raw| !raw.trim().is_empty())
}

fn parse_env_usize(name: &str, raw: &str) -> Result<usize> {
    raw.trim()
        .parse::<usize>()
        .map_err(|error| SweepError::ConfigParse {
            context: "env",
            details: format!("{name}={raw:?}: {error}"),
        })
}
