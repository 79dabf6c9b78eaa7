//! `jf` (JFrog CLI) backed artifact store.
//!
//! Command contract:
//! - configure: `jf config show`, then `jf config add <id> --url <url>
//!   --access-token <token> --interactive=false` and `jf config use <id>`
//! - search: `jf rt search --spec <spec> --spec-vars timeframe=<window>`
//! - delete: `jf rt del <path> --quiet [--dry-run]`

#![allow(missing_docs)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use crate::core::errors::{Result, SweepError};
use crate::logger::dual::LoggerHandle;
use crate::remote::{ArtifactStore, ServerConfig};

/// Artifact store that shells out to the JFrog CLI.
#[derive(Debug, Clone)]
pub struct JfrogCli {
    binary: String,
    logger: LoggerHandle,
}

impl JfrogCli {
    pub fn new(binary: impl Into<String>, logger: LoggerHandle) -> Self {
        Self {
            binary: binary.into(),
            logger,
        }
    }

    /// Argument vector for a delete call (without the program name).
    pub fn delete_args(path: &str, dry_run: bool) -> Vec<String> {
        let mut args = vec![
            "rt".to_string(),
            "del".to_string(),
            path.to_string(),
            "--quiet".to_string(),
        ];
        if dry_run {
            args.push("--dry-run".to_string());
        }
        args
    }

    pub fn search_args(spec: &Path, timeframe: &str) -> Vec<String> {
        vec![
            "rt".to_string(),
            "search".to_string(),
            "--spec".to_string(),
            spec.to_string_lossy().into_owned(),
            "--spec-vars".to_string(),
            format!("timeframe={timeframe}"),
        ]
    }

    fn spawn(&self, args: &[String]) -> Result<Output> {
        Command::new(&self.binary)
            .args(args)
            .output()
            .map_err(|source| SweepError::Io {
                path: PathBuf::from(&self.binary),
                source,
            })
    }

    /// Run `jf` and return trimmed stdout, or a description of the failure.
    fn run_jf(&self, args: &[String]) -> std::result::Result<String, String> {
        let output = self.spawn(args).map_err(|e| e.to_string())?;
        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
        } else {
            Err(format!(
                "exit {}: {}",
                output.status.code().unwrap_or(-1),
                String::from_utf8_lossy(&output.stderr).trim()
            ))
        }
    }
}

impl ArtifactStore for JfrogCli {
    fn configure(&self, server: &ServerConfig) -> Result<()> {
        let id = &server.server_id;
        self.logger
            .info(format!("Configuring JFrog CLI with server ID '{id}'..."));

        // `config show` failing just means nothing is configured yet.
        if let Ok(existing) = self.run_jf(&["config".to_string(), "show".to_string()])
            && existing.contains(id.as_str())
        {
            self.logger
                .info(format!("Server '{id}' already configured, skipping add."));
            return Ok(());
        }

        let add = vec![
            "config".to_string(),
            "add".to_string(),
            id.clone(),
            "--url".to_string(),
            server.url.clone(),
            "--access-token".to_string(),
            server.access_token.clone(),
            "--interactive=false".to_string(),
        ];
        self.run_jf(&add).map_err(|details| SweepError::RemoteConfig {
            server_id: id.clone(),
            details: format!("jf config add failed ({details})"),
        })?;
        self.logger
            .info(format!("Successfully added JFrog CLI server '{id}'."));

        let use_args = vec!["config".to_string(), "use".to_string(), id.clone()];
        self.run_jf(&use_args)
            .map_err(|details| SweepError::RemoteConfig {
                server_id: id.clone(),
                details: format!("failed to set default server ({details})"),
            })?;
        self.logger.info(format!("Using '{id}' as default server."));
        Ok(())
    }

    fn search(&self, spec: &Path, timeframe: &str) -> Result<String> {
        let args = Self::search_args(spec, timeframe);
        self.logger
            .debug(format!("Running: {} {}", self.binary, args.join(" ")));
        let output = self.spawn(&args).map_err(|e| SweepError::Search {
            details: e.to_string(),
        })?;
        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            Err(SweepError::Search {
                details: format!(
                    "exit {}: {}",
                    output.status.code().unwrap_or(-1),
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            })
        }
    }

    fn delete(&self, path: &str, dry_run: bool) -> Result<()> {
        self.run_jf(&Self::delete_args(path, dry_run))
            .map(|_| ())
            .map_err(|details| SweepError::Delete {
                path: path.to_string(),
                details,
            })
    }

    fn describe_delete(&self, path: &str, dry_run: bool) -> String {
        format!("{} {}", self.binary, Self::delete_args(path, dry_run).join(" "))
    }
}
