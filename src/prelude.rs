//! Convenience re-exports for library consumers.
//!
//! ```rust,no_run
//! use artifact_sweeper::prelude::*;
//! ```

// Core
pub use crate::core::config::Config;
pub use crate::core::errors::{ErrorKind, Result, SweepError};

// Logging
pub use crate::logger::dual::{DualLoggerConfig, Level, LoggerHandle, spawn_logger};

// Remote
pub use crate::remote::jfrog::JfrogCli;
pub use crate::remote::mock::MockStore;
pub use crate::remote::{ArtifactStore, ServerConfig};

// Scanner
pub use crate::scanner::deletion::{DeletionConfig, DeletionExecutor, DeletionReport};
pub use crate::scanner::exclusion::ExclusionSet;
pub use crate::scanner::locator::{ArtifactLocator, ArtifactRecord, SearchOutput};
pub use crate::scanner::pipeline::{SweepRequest, SweepSummary, run_sweep};
pub use crate::scanner::planner::{DeletionOperation, DeletionPlan, DeletionPlanner};
