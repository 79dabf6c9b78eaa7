//! In-memory artifact store for deterministic tests.

#![allow(missing_docs)]

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;

use crate::core::errors::{Result, SweepError};
use crate::remote::{ArtifactStore, ServerConfig};

/// One call observed by [`MockStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Configure { server_id: String },
    Search { spec: PathBuf, timeframe: String },
    Delete { path: String, dry_run: bool },
}

/// Scripted store: canned search output, selectable failures, call log.
#[derive(Debug, Default)]
pub struct MockStore {
    search_output: String,
    fail_configure: bool,
    fail_search: bool,
    failing_paths: HashSet<String>,
    delete_latency: Option<Duration>,
    calls: Mutex<Vec<StoreCall>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl MockStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose search returns `raw` verbatim.
    #[must_use]
    pub fn with_search_output(raw: impl Into<String>) -> Self {
        Self {
            search_output: raw.into(),
            ..Self::default()
        }
    }

    /// Store whose search returns a JSON list of records with these paths.
    #[must_use]
    pub fn with_paths(paths: &[&str]) -> Self {
        let records: Vec<serde_json::Value> = paths
            .iter()
            .map(|p| serde_json::json!({ "path": p, "type": "file" }))
            .collect();
        Self::with_search_output(serde_json::Value::Array(records).to_string())
    }

    #[must_use]
    pub fn failing_configure(mut self) -> Self {
        self.fail_configure = true;
        self
    }

    #[must_use]
    pub fn failing_search(mut self) -> Self {
        self.fail_search = true;
        self
    }

    /// Make deletes of `path` fail as if the CLI exited non-zero.
    #[must_use]
    pub fn failing_delete(mut self, path: impl Into<String>) -> Self {
        self.failing_paths.insert(path.into());
        self
    }

    /// Hold each delete for `latency` so concurrency becomes observable.
    #[must_use]
    pub fn with_delete_latency(mut self, latency: Duration) -> Self {
        self.delete_latency = Some(latency);
        self
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().clone()
    }

    /// Paths passed to `delete`, in call order.
    pub fn deleted_paths(&self) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .filter_map(|c| match c {
                StoreCall::Delete { path, .. } => Some(path.clone()),
                _ => None,
            })
            .collect()
    }

    /// Deletes issued without the dry-run flag.
    pub fn real_delete_count(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| matches!(c, StoreCall::Delete { dry_run: false, .. }))
            .count()
    }

    /// Highest number of deletes observed running at the same time.
    pub fn peak_concurrency(&self) -> usize {
        self.peak_in_flight.load(Ordering::Acquire)
    }

    fn record(&self, call: StoreCall) {
        self.calls.lock().push(call);
    }
}

impl ArtifactStore for MockStore {
    fn configure(&self, server: &ServerConfig) -> Result<()> {
        self.record(StoreCall::Configure {
            server_id: server.server_id.clone(),
        });
        if self.fail_configure {
            return Err(SweepError::RemoteConfig {
                server_id: server.server_id.clone(),
                details: "mock configure failure".to_string(),
            });
        }
        Ok(())
    }

    fn search(&self, spec: &Path, timeframe: &str) -> Result<String> {
        self.record(StoreCall::Search {
            spec: spec.to_path_buf(),
            timeframe: timeframe.to_string(),
        });
        if self.fail_search {
            return Err(SweepError::Search {
                details: "exit 1: mock search failure".to_string(),
            });
        }
        Ok(self.search_output.clone())
    }

    fn delete(&self, path: &str, dry_run: bool) -> Result<()> {
        let now = self.in_flight.fetch_add(1, Ordering::AcqRel) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::AcqRel);

        self.record(StoreCall::Delete {
            path: path.to_string(),
            dry_run,
        });
        if let Some(latency) = self.delete_latency {
            std::thread::sleep(latency);
        }

        self.in_flight.fetch_sub(1, Ordering::AcqRel);
        if self.failing_paths.contains(path) {
            return Err(SweepError::Delete {
                path: path.to_string(),
                details: "exit 1: mock delete failure".to_string(),
            });
        }
        Ok(())
    }
}
