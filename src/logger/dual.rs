//! Dual-sink logger: human-readable console stream plus a persisted log file.
//!
//! Architecture: a dedicated logger thread owns both sinks. Every component
//! holds a cheaply-cloneable `LoggerHandle` and sends `LogRecord`s over a
//! bounded crossbeam channel, so deletion workers on many threads can log
//! without locking each other. Console and file share one line format:
//!
//! ```text
//! 2026-10-15 08:15:00 [INFO] 3 artifact(s) found. Checking exclusions...
//! ```

#![allow(missing_docs)]

use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::thread;

use chrono::{DateTime, Local, Utc};
use crossbeam_channel::{Receiver, Sender, bounded};
use serde::{Deserialize, Serialize};

use crate::core::config::LoggingConfig;
use crate::core::errors::{Result, SweepError};
use crate::logger::file::{LogFile, log_file_name};

/// Default bounded channel capacity for log records.
const CHANNEL_CAPACITY: usize = 1024;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ──────────────────── levels and records ────────────────────

/// Severity of a log record, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Debug,
    Info,
    #[serde(alias = "warn")]
    Warning,
    Error,
}

impl Level {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One timestamped message.
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub at: DateTime<Local>,
    pub level: Level,
    pub message: String,
}

impl LogRecord {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            at: Local::now(),
            level,
            message: message.into(),
        }
    }

    /// Render as `<timestamp> [LEVEL] message`.
    pub fn format_line(&self) -> String {
        format!(
            "{} [{}] {}",
            self.at.format(TIMESTAMP_FORMAT),
            self.level,
            self.message
        )
    }
}

enum LogEvent {
    Record(LogRecord),
    /// Sentinel to request graceful shutdown of the logger thread.
    Shutdown,
}

// ──────────────────── public handle ────────────────────

/// Thread-safe, cheaply-cloneable handle for sending log records.
///
/// `send` blocks when the channel is full; records are never dropped.
#[derive(Clone, Debug)]
pub struct LoggerHandle {
    tx: Option<Sender<LogEvent>>,
}

impl fmt::Debug for LogEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Record(r) => write!(f, "Record({})", r.format_line()),
            Self::Shutdown => f.write_str("Shutdown"),
        }
    }
}

impl LoggerHandle {
    /// A handle that discards everything. Useful for library callers and tests
    /// that do not care about output.
    #[must_use]
    pub fn noop() -> Self {
        Self { tx: None }
    }

    pub fn log(&self, level: Level, message: impl Into<String>) {
        if let Some(tx) = &self.tx {
            // Disconnected is fine after shutdown.
            let _ = tx.send(LogEvent::Record(LogRecord::new(level, message)));
        }
    }

    pub fn debug(&self, message: impl Into<String>) {
        self.log(Level::Debug, message);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.log(Level::Info, message);
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.log(Level::Warning, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.log(Level::Error, message);
    }

    /// Ask the logger thread to flush and exit. Join the thread afterwards.
    pub fn shutdown(&self) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(LogEvent::Shutdown);
        }
    }
}

// ──────────────────── configuration ────────────────────

/// Options for building the dual-sink logger.
#[derive(Debug, Clone)]
pub struct DualLoggerConfig {
    /// Persisted log file. `None` disables the file sink.
    pub log_file: Option<PathBuf>,
    /// Whether the console (stdout) sink is active.
    pub console: bool,
    pub console_level: Level,
    pub file_level: Level,
    /// Bounded channel capacity.
    pub channel_capacity: usize,
}

impl Default for DualLoggerConfig {
    fn default() -> Self {
        Self {
            log_file: None,
            console: true,
            console_level: Level::Info,
            file_level: Level::Debug,
            channel_capacity: CHANNEL_CAPACITY,
        }
    }
}

impl DualLoggerConfig {
    /// Build from tool settings; the file name is stamped with `started_at`.
    pub fn from_settings(settings: &LoggingConfig, started_at: DateTime<Utc>) -> Self {
        let log_file = settings.write_file.then(|| {
            settings
                .log_dir
                .join(log_file_name(&settings.file_prefix, started_at))
        });
        Self {
            log_file,
            console: true,
            console_level: settings.console_level,
            file_level: settings.file_level,
            channel_capacity: CHANNEL_CAPACITY,
        }
    }

    pub fn log_file(&self) -> Option<&Path> {
        self.log_file.as_deref()
    }
}

// ──────────────────── spawn ────────────────────

/// Spawn the logger thread and return a handle.
///
/// The logger thread runs until `handle.shutdown()` is called or every
/// handle has been dropped.
pub fn spawn_logger(config: DualLoggerConfig) -> Result<(LoggerHandle, thread::JoinHandle<()>)> {
    let (tx, rx) = bounded::<LogEvent>(config.channel_capacity.max(1));
    let handle = LoggerHandle { tx: Some(tx) };

    let join = thread::Builder::new()
        .name("asweep-logger".to_string())
        .spawn(move || logger_thread_main(&rx, &config))
        .map_err(|e| SweepError::Runtime {
            details: format!("failed to spawn logger thread: {e}"),
        })?;

    Ok((handle, join))
}

// ──────────────────── logger thread ────────────────────

fn logger_thread_main(rx: &Receiver<LogEvent>, config: &DualLoggerConfig) {
    let mut file = config
        .log_file
        .as_deref()
        .map(LogFile::open)
        .filter(LogFile::is_active);

    while let Ok(event) = rx.recv() {
        let record = match event {
            LogEvent::Record(record) => record,
            LogEvent::Shutdown => break,
        };
        let line = record.format_line();

        if config.console && record.level >= config.console_level {
            let mut out = io::stdout().lock();
            let _ = writeln!(out, "{line}");
        }
        if record.level >= config.file_level
            && let Some(file) = file.as_mut()
        {
            file.write_line(&line);
        }
    }

    let _ = io::stdout().flush();
    if let Some(file) = file.as_mut() {
        file.fsync();
    }
}

// ──────────────────── tests ────────────────────
