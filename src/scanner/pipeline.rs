//! One cleanup run, end to end.
//!
//! configure remote → load exclusions → locate → plan → execute.
//! Configuration and search failures abort the run; unreadable search
//! output and individual delete failures do not.

#![allow(missing_docs)]

use std::path::PathBuf;

use crate::core::errors::{Result, SweepError};
use crate::logger::dual::LoggerHandle;
use crate::remote::{ArtifactStore, ServerConfig};
use crate::scanner::deletion::{DeletionConfig, DeletionExecutor, DeletionReport};
use crate::scanner::exclusion::ExclusionSet;
use crate::scanner::locator::ArtifactLocator;
use crate::scanner::planner::DeletionPlanner;

/// Inputs for a single run.
#[derive(Debug, Clone)]
pub struct SweepRequest {
    pub server: ServerConfig,
    pub exclusions_path: PathBuf,
    pub spec_path: PathBuf,
    /// Retention window, e.g. `90d`. Substituted as the query's `timeframe`.
    pub older_than: String,
    pub dry_run: bool,
    pub threads: usize,
}

/// What a run found and did.
#[derive(Debug, Clone, Default)]
pub struct SweepSummary {
    pub found: usize,
    pub skipped: usize,
    pub planned: usize,
    /// `None` when the search came back empty and nothing was executed.
    pub report: Option<DeletionReport>,
}

impl SweepSummary {
    pub fn deleted(&self) -> usize {
        self.report.as_ref().map_or(0, |r| r.items_deleted)
    }

    pub fn failed(&self) -> usize {
        self.report.as_ref().map_or(0, |r| r.items_failed)
    }
}

/// Execute one cleanup run against `store`.
pub fn run_sweep(
    store: &dyn ArtifactStore,
    logger: &LoggerHandle,
    request: &SweepRequest,
) -> Result<SweepSummary> {
    store.configure(&request.server)?;

    let exclusions = ExclusionSet::load(&request.exclusions_path).inspect_err(|e| {
        if matches!(e, SweepError::MissingFile { .. }) {
            logger.error(format!(
                "Exclusion file not found: {}",
                request.exclusions_path.display()
            ));
        } else {
            logger.error(format!("Failed to read exclusion file: {e}"));
        }
    })?;
    logger.info(format!(
        "Loaded {} exclusion patterns from {}",
        exclusions.len(),
        request.exclusions_path.display()
    ));

    logger.info(format!(
        "Searching for artifacts created before '{}' using filespec '{}'...",
        request.older_than,
        request.spec_path.display()
    ));
    let records = ArtifactLocator::new(store, logger.clone())
        .locate(&request.spec_path, &request.older_than)?;

    let mut summary = SweepSummary {
        found: records.len(),
        ..SweepSummary::default()
    };
    if records.is_empty() {
        logger.info("No matching artifacts found.");
        return Ok(summary);
    }
    logger.info(format!(
        "{} artifact(s) found. Checking exclusions...",
        records.len()
    ));

    let plan = DeletionPlanner::new(&exclusions, logger.clone()).plan(&records, request.dry_run);
    summary.skipped = plan.skipped.len();
    summary.planned = plan.operations.len();

    logger.info(format!(
        "Executing {} deletions using {} thread(s)...",
        plan.operations.len(),
        request.threads
    ));
    let executor = DeletionExecutor::new(
        DeletionConfig {
            worker_count: request.threads,
        },
        store,
        logger.clone(),
    );
    let report = executor.execute(plan.operations);

    let verb = if report.dry_run { "previewed" } else { "deleted" };
    logger.info(format!(
        "Done: {} {verb}, {} failed, {} skipped by exclusions in {:.1}s.",
        report.items_deleted,
        report.items_failed,
        summary.skipped,
        report.duration.as_secs_f64()
    ));
    summary.report = Some(report);
    Ok(summary)
}
