//! Artifact locator: run the time-windowed query and interpret its output.
//!
//! The search tool prints JSON in one of two shapes, a bare list of records
//! or an object wrapping them under `results`. The shape is resolved once
//! into [`SearchOutput`] and only [`ArtifactRecord`]s travel further down
//! the pipeline.

#![allow(missing_docs)]

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::errors::{Result, SweepError};
use crate::logger::dual::LoggerHandle;
use crate::remote::ArtifactStore;

/// One search hit. Only `path` is read; every other attribute the search
/// tool prints is ignored whatever its type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ArtifactRecord {
    /// Repository path, e.g. `libs-release-local/org/app/1.0/app-1.0.jar`.
    #[serde(default)]
    pub path: String,
}

impl ArtifactRecord {
    pub fn with_path(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

/// Shape of the search tool's output.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutput {
    /// A bare JSON array of records.
    List(Vec<Value>),
    /// `{"results": [...], ...}`.
    Wrapped(Vec<Value>),
    /// Valid JSON of any other shape; carries a short description.
    Unexpected(&'static str),
}

impl SearchOutput {
    /// Classify raw output. Invalid JSON is a parse error.
    pub fn parse(raw: &str) -> Result<Self> {
        let value: Value =
            serde_json::from_str(raw).map_err(|e| SweepError::SearchParse {
                details: e.to_string(),
            })?;
        Ok(match value {
            Value::Array(items) => Self::List(items),
            Value::Object(mut map) => match map.remove("results") {
                Some(Value::Array(items)) => Self::Wrapped(items),
                Some(_) => Self::Unexpected("object whose `results` is not a list"),
                None => Self::Unexpected("object without `results`"),
            },
            Value::String(_) => Self::Unexpected("string"),
            Value::Number(_) => Self::Unexpected("number"),
            Value::Bool(_) => Self::Unexpected("boolean"),
            Value::Null => Self::Unexpected("null"),
        })
    }
}

/// Turn raw search output into records. Never fails: unreadable output is
/// logged and treated as zero artifacts.
pub fn parse_artifacts(raw: &str, logger: &LoggerHandle) -> Vec<ArtifactRecord> {
    let items = match SearchOutput::parse(raw) {
        Ok(SearchOutput::List(items) | SearchOutput::Wrapped(items)) => items,
        Ok(SearchOutput::Unexpected(shape)) => {
            logger.warning(format!(
                "Unexpected data format in search output ({shape})."
            ));
            return Vec::new();
        }
        Err(e) => {
            logger.error(format!("Failed to parse search response: {e}"));
            return Vec::new();
        }
    };

    let mut records = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<ArtifactRecord>(item) {
            Ok(record) if record.path.trim().is_empty() => {
                logger.warning(format!("Ignoring search result #{index}: no path"));
            }
            Ok(record) => records.push(record),
            Err(e) => {
                logger.warning(format!("Ignoring search result #{index}: {e}"));
            }
        }
    }
    records
}

/// Runs the query through an [`ArtifactStore`] and parses the result.
pub struct ArtifactLocator<'a> {
    store: &'a dyn ArtifactStore,
    logger: LoggerHandle,
}

impl<'a> ArtifactLocator<'a> {
    pub fn new(store: &'a dyn ArtifactStore, logger: LoggerHandle) -> Self {
        Self { store, logger }
    }

    /// Locate candidates older than `time_window` using the query in `spec`.
    ///
    /// A missing spec file or a failed search is fatal; bad output is not.
    pub fn locate(&self, spec: &Path, time_window: &str) -> Result<Vec<ArtifactRecord>> {
        if !spec.exists() {
            self.logger
                .error(format!("AQL spec file not found: {}", spec.display()));
            return Err(SweepError::MissingFile {
                what: "AQL spec",
                path: spec.to_path_buf(),
            });
        }

        let raw = self.store.search(spec, time_window).inspect_err(|e| {
            self.logger.error("Search using spec file failed:");
            self.logger.error(e.to_string());
        })?;
        Ok(parse_artifacts(&raw, &self.logger))
    }
}
