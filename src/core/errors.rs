//! ASW-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, SweepError>;

/// Top-level error type for artifact_sweeper.
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("[ASW-1001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[ASW-1002] missing {what} file: {path}")]
    MissingFile { what: &'static str, path: PathBuf },

    #[error("[ASW-1003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[ASW-1101] remote configuration failed for server '{server_id}': {details}")]
    RemoteConfig { server_id: String, details: String },

    #[error("[ASW-2001] artifact search failed: {details}")]
    Search { details: String },

    #[error("[ASW-2002] unreadable search output: {details}")]
    SearchParse { details: String },

    #[error("[ASW-2101] delete failed for {path}: {details}")]
    Delete { path: String, details: String },

    #[error("[ASW-3002] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[ASW-3900] runtime failure: {details}")]
    Runtime { details: String },
}

/// Coarse failure class, used to decide between fail-fast and absorb.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Locator,
    Parse,
    Deletion,
    Internal,
}

impl SweepError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "ASW-1001",
            Self::MissingFile { .. } => "ASW-1002",
            Self::ConfigParse { .. } => "ASW-1003",
            Self::RemoteConfig { .. } => "ASW-1101",
            Self::Search { .. } => "ASW-2001",
            Self::SearchParse { .. } => "ASW-2002",
            Self::Delete { .. } => "ASW-2101",
            Self::Io { .. } => "ASW-3002",
            Self::Runtime { .. } => "ASW-3900",
        }
    }

    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidConfig { .. }
            | Self::MissingFile { .. }
            | Self::ConfigParse { .. }
            | Self::RemoteConfig { .. } => ErrorKind::Config,
            Self::Search { .. } => ErrorKind::Locator,
            Self::SearchParse { .. } => ErrorKind::Parse,
            Self::Delete { .. } => ErrorKind::Deletion,
            Self::Io { .. } | Self::Runtime { .. } => ErrorKind::Internal,
        }
    }

    /// Whether this failure must halt the pipeline.
    ///
    /// Parse and per-deletion failures are absorbed where they happen.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !matches!(self.kind(), ErrorKind::Parse | ErrorKind::Deletion)
    }

    /// Convenience constructor for IO errors with a known path.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

impl From<serde_json::Error> for SweepError {
    fn from(value: serde_json::Error) -> Self {
        Self::ConfigParse {
            context: "serde_json",
            details: value.to_string(),
        }
    }
}

impl From<toml::de::Error> for SweepError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse {
            context: "toml",
            details: value.to_string(),
        }
    }
}
