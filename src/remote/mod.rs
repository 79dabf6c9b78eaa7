//! Remote artifact store capability: configure, search, delete.
//!
//! The cleanup pipeline only ever talks to the store through
//! [`ArtifactStore`]. [`jfrog::JfrogCli`] drives the real `jf` binary;
//! [`mock::MockStore`] is an in-memory fake for deterministic tests.

pub mod jfrog;
pub mod mock;

use std::fmt;
use std::path::Path;

use crate::core::errors::Result;

/// Connection details for one Artifactory server.
#[derive(Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Name the server is registered under in the CLI's own config store.
    pub server_id: String,
    pub url: String,
    pub access_token: String,
}

impl ServerConfig {
    pub fn new(
        server_id: impl Into<String>,
        url: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            server_id: server_id.into(),
            url: url.into(),
            access_token: access_token.into(),
        }
    }

    /// Fresh server id of the form `<prefix>-<8 lowercase hex digits>`.
    pub fn generate_id(prefix: &str) -> String {
        let suffix: u32 = rand::random();
        format!("{prefix}-{suffix:08x}")
    }
}

// Keeps the token out of logs and panic messages.
impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("server_id", &self.server_id)
            .field("url", &self.url)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

/// Narrow interface over the remote repository manager.
///
/// Implementations must be shareable across deletion workers.
pub trait ArtifactStore: Send + Sync {
    /// Register and select `server` as the active connection.
    fn configure(&self, server: &ServerConfig) -> Result<()>;

    /// Run the query in `spec`, substituting `timeframe`, and return the raw
    /// output for the locator to interpret.
    fn search(&self, spec: &Path, timeframe: &str) -> Result<String>;

    /// Delete one artifact. With `dry_run` the store only reports what it
    /// would remove.
    fn delete(&self, path: &str, dry_run: bool) -> Result<()>;

    /// Human-readable rendering of a delete call, used in log lines.
    fn describe_delete(&self, path: &str, dry_run: bool) -> String {
        if dry_run {
            format!("delete {path} (dry run)")
        } else {
            format!("delete {path}")
        }
    }
}
