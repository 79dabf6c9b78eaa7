//! Top-level CLI definition and dispatch.

use std::path::PathBuf;

use chrono::Utc;
use clap::Parser;
use clap::builder::RangedU64ValueParser;
use thiserror::Error;

use artifact_sweeper::core::config::Config;
use artifact_sweeper::core::errors::SweepError;
use artifact_sweeper::logger::dual::{DualLoggerConfig, LoggerHandle, spawn_logger};
use artifact_sweeper::remote::ServerConfig;
use artifact_sweeper::remote::jfrog::JfrogCli;
use artifact_sweeper::scanner::pipeline::{SweepRequest, run_sweep};

/// Artifact Sweeper: delete old artifacts from Artifactory.
#[derive(Debug, Parser)]
#[command(
    name = "asweep",
    author,
    version,
    about = "Delete old artifacts from all JFrog repositories.",
    long_about = None
)]
pub struct Cli {
    /// Artifactory base URL.
    #[arg(long, value_name = "URL")]
    artifactory_url: String,
    /// JFrog access token.
    #[arg(long, value_name = "TOKEN")]
    access_token: String,
    /// Retention window (e.g. 90d, 3mo, 1y), substituted as the query's timeframe.
    #[arg(long, value_name = "WINDOW")]
    older_than: String,
    /// Path to the exclusions file (glob-style patterns under `exclude`).
    #[arg(long, value_name = "PATH")]
    exclusions_file: PathBuf,
    /// Path to the AQL spec file (e.g. aql-filespec.json).
    #[arg(long, value_name = "PATH")]
    aql_spec: PathBuf,
    /// List deletions without executing them.
    #[arg(long)]
    dry_run: bool,
    /// Number of parallel deletion workers [default: 4].
    #[arg(long, value_name = "N", value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
    threads: Option<usize>,
    /// Override settings file path.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Directory for the run log file.
    #[arg(long, value_name = "DIR")]
    log_dir: Option<PathBuf>,
    /// Log to the console only.
    #[arg(long)]
    no_log_file: bool,
    /// Reuse this CLI server id instead of generating one.
    #[arg(long, value_name = "ID")]
    server_id: Option<String>,
}

/// CLI error type with explicit exit-code mapping.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration or search failure.
    #[error("{0}")]
    Sweep(#[from] SweepError),
    /// Internal bug or invariant violation.
    #[error("{0}")]
    Internal(String),
}

impl CliError {
    /// Process exit code contract for the CLI: every fatal error exits 1.
    /// Usage errors exit 2 from clap before `run` is reached.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Sweep(_) | Self::Internal(_) => 1,
        }
    }
}

/// Resolve settings: file and env first, then command-line flags.
fn resolve_config(cli: &Cli) -> Result<Config, CliError> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(threads) = cli.threads {
        config.executor.threads = threads;
    }
    if let Some(dir) = &cli.log_dir {
        config.logging.log_dir.clone_from(dir);
    }
    if cli.no_log_file {
        config.logging.write_file = false;
    }
    config.validate()?;
    Ok(config)
}

fn build_request(cli: &Cli, config: &Config) -> SweepRequest {
    let server_id = cli
        .server_id
        .clone()
        .unwrap_or_else(|| ServerConfig::generate_id(&config.remote.server_id_prefix));
    SweepRequest {
        server: ServerConfig::new(server_id, &cli.artifactory_url, &cli.access_token),
        exclusions_path: cli.exclusions_file.clone(),
        spec_path: cli.aql_spec.clone(),
        older_than: cli.older_than.clone(),
        dry_run: cli.dry_run,
        threads: config.executor.threads,
    }
}

/// Run one cleanup pass. The logger is flushed before returning, even on error.
pub fn run(cli: &Cli) -> Result<(), CliError> {
    let config = resolve_config(cli)?;

    let logger_config = DualLoggerConfig::from_settings(&config.logging, Utc::now());
    let log_file = logger_config.log_file().map(PathBuf::from);
    let (logger, join) = spawn_logger(logger_config)?;
    if let Some(path) = &log_file {
        logger.debug(format!("Logging to {}", path.display()));
    }

    let outcome = sweep(cli, &config, &logger);

    logger.shutdown();
    join.join()
        .map_err(|_| CliError::Internal("logger thread panicked".to_string()))?;
    outcome
}

fn sweep(cli: &Cli, config: &Config, logger: &LoggerHandle) -> Result<(), CliError> {
    let store = JfrogCli::new(config.remote.jf_binary.clone(), logger.clone());
    let request = build_request(cli, config);
    logger.debug(format!("Run request: {request:?}"));

    match run_sweep(&store, logger, &request) {
        Ok(summary) => {
            if summary.failed() > 0 {
                logger.warning(format!(
                    "{} of {} deletions failed; see the log above.",
                    summary.failed(),
                    summary.planned
                ));
            }
            Ok(())
        }
        Err(e) => {
            logger.error(format!("Aborting: {e}"));
            Err(e.into())
        }
    }
}
