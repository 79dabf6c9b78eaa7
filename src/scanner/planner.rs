//! Deletion planner: filter located artifacts through the exclusion set.
//!
//! Every path is checked against every exclusion pattern before an operation
//! is built for it, so nothing excluded can reach the executor.

#![allow(missing_docs)]

use std::collections::HashSet;

use crate::logger::dual::LoggerHandle;
use crate::scanner::exclusion::ExclusionSet;
use crate::scanner::locator::ArtifactRecord;

/// A single planned delete: a path plus the dry-run flag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeletionOperation {
    pub path: String,
    pub dry_run: bool,
}

impl DeletionOperation {
    pub fn new(path: impl Into<String>, dry_run: bool) -> Self {
        Self {
            path: path.into(),
            dry_run,
        }
    }

    /// Tag used in preview log lines.
    pub const fn label(&self) -> &'static str {
        if self.dry_run { "[DRYRUN]" } else { "[DELETE]" }
    }
}

/// A path left out of the plan and the pattern that protected it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedArtifact {
    pub path: String,
    pub pattern: String,
}

/// Planner output: operations in input order plus what was skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletionPlan {
    pub operations: Vec<DeletionOperation>,
    pub skipped: Vec<SkippedArtifact>,
    /// Records handed to the planner.
    pub candidates: usize,
    /// Repeated paths collapsed into their first occurrence.
    pub duplicates: usize,
}

impl DeletionPlan {
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

/// Builds [`DeletionPlan`]s against a fixed exclusion set.
pub struct DeletionPlanner<'a> {
    exclusions: &'a ExclusionSet,
    logger: LoggerHandle,
}

impl<'a> DeletionPlanner<'a> {
    pub fn new(exclusions: &'a ExclusionSet, logger: LoggerHandle) -> Self {
        Self { exclusions, logger }
    }

    /// Plan deletes for `records`, preserving their order.
    ///
    /// Pure apart from logging: the same input always yields the same plan.
    pub fn plan(&self, records: &[ArtifactRecord], dry_run: bool) -> DeletionPlan {
        let mut plan = DeletionPlan {
            candidates: records.len(),
            ..DeletionPlan::default()
        };
        let mut seen: HashSet<&str> = HashSet::with_capacity(records.len());

        for record in records {
            let path = record.path.as_str();
            if let Some(pattern) = self.exclusions.matching_pattern(path) {
                self.logger
                    .info(format!("[SKIP] Excluded by pattern: {path}"));
                plan.skipped.push(SkippedArtifact {
                    path: path.to_string(),
                    pattern: pattern.to_string(),
                });
                continue;
            }
            if !seen.insert(path) {
                plan.duplicates += 1;
                self.logger
                    .debug(format!("Duplicate search result ignored: {path}"));
                continue;
            }

            let op = DeletionOperation::new(path, dry_run);
            self.logger.debug(format!("{} {path}", op.label()));
            plan.operations.push(op);
        }

        plan
    }
}

/// Free-function form of [`DeletionPlanner::plan`] without logging.
pub fn plan(
    records: &[ArtifactRecord],
    patterns: &ExclusionSet,
    dry_run: bool,
) -> Vec<DeletionOperation> {
    DeletionPlanner::new(patterns, LoggerHandle::noop())
        .plan(records, dry_run)
        .operations
}
