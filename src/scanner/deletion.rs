//! Deletion executor: bounded worker pool over planned delete operations.
//!
//! Pipeline: planned operations -> work queue -> N workers -> one remote
//! delete each -> outcome channel -> report.
//!
//! Each operation ends in exactly one of `Succeeded` or `Failed`.
//! There are no retries and no cancellation. A failed delete is logged and
//! recorded; it never stops sibling operations and never becomes an error
//! for the caller. `execute` returns only after every operation finished.

#![allow(missing_docs)]

use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, bounded, unbounded};

use crate::logger::dual::LoggerHandle;
use crate::remote::ArtifactStore;
use crate::scanner::planner::DeletionOperation;

/// Default number of concurrent delete workers.
pub const DEFAULT_WORKERS: usize = 4;

// ──────────────────── configuration ────────────────────

#[derive(Debug, Clone)]
pub struct DeletionConfig {
    /// Maximum concurrent deletes. Values below 1 are treated as 1.
    pub worker_count: usize,
}

impl Default for DeletionConfig {
    fn default() -> Self {
        Self {
            worker_count: DEFAULT_WORKERS,
        }
    }
}

// ──────────────────── report types ────────────────────

/// Terminal state of one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationState {
    Succeeded,
    Failed,
}

/// A single deletion failure record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionError {
    pub path: String,
    pub error: String,
    pub error_code: String,
}

/// Final state of one operation.
#[derive(Debug, Clone)]
pub struct DeletionOutcome {
    pub operation: DeletionOperation,
    pub state: OperationState,
    pub error: Option<DeletionError>,
    pub duration: Duration,
}

/// Summary after all operations completed.
#[derive(Debug, Clone, Default)]
pub struct DeletionReport {
    /// Outcomes in plan order, regardless of completion order.
    pub outcomes: Vec<DeletionOutcome>,
    pub items_deleted: usize,
    pub items_failed: usize,
    pub workers_used: usize,
    pub dry_run: bool,
    pub duration: Duration,
}

impl DeletionReport {
    pub fn errors(&self) -> impl Iterator<Item = &DeletionError> {
        self.outcomes.iter().filter_map(|o| o.error.as_ref())
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }
}

// ──────────────────── executor ────────────────────

/// Runs planned deletes against an [`ArtifactStore`] with bounded parallelism.
pub struct DeletionExecutor<'a> {
    config: DeletionConfig,
    store: &'a dyn ArtifactStore,
    logger: LoggerHandle,
}

impl<'a> DeletionExecutor<'a> {
    pub fn new(config: DeletionConfig, store: &'a dyn ArtifactStore, logger: LoggerHandle) -> Self {
        Self {
            config,
            store,
            logger,
        }
    }

    /// Execute every operation exactly once and wait for all of them.
    pub fn execute(&self, operations: Vec<DeletionOperation>) -> DeletionReport {
        let start = Instant::now();
        let dry_run = operations.first().is_some_and(|op| op.dry_run);
        let workers = self.config.worker_count.max(1).min(operations.len());
        let total = operations.len();

        let mut report = DeletionReport {
            workers_used: workers,
            dry_run,
            ..DeletionReport::default()
        };
        if total == 0 {
            return report;
        }

        let (result_tx, result_rx) = unbounded::<(usize, DeletionOutcome)>();

        thread::scope(|s| {
            let (work_tx, work_rx) = bounded::<(usize, DeletionOperation)>(workers * 2);
            for _ in 0..workers {
                let work_rx = work_rx.clone();
                let result_tx = result_tx.clone();
                s.spawn(move || self.worker_loop(&work_rx, &result_tx));
            }
            for item in operations.into_iter().enumerate() {
                if work_tx.send(item).is_err() {
                    break;
                }
            }
            // `work_tx` drops here, closing the queue; the scope then joins.
        });
        drop(result_tx);

        let mut outcomes: Vec<(usize, DeletionOutcome)> = result_rx.iter().collect();
        outcomes.sort_by_key(|(index, _)| *index);

        for (_, outcome) in outcomes {
            match outcome.state {
                OperationState::Succeeded => report.items_deleted += 1,
                OperationState::Failed => report.items_failed += 1,
            }
            report.outcomes.push(outcome);
        }
        report.duration = start.elapsed();
        report
    }

    fn worker_loop(
        &self,
        work_rx: &Receiver<(usize, DeletionOperation)>,
        result_tx: &Sender<(usize, DeletionOutcome)>,
    ) {
        while let Ok((index, operation)) = work_rx.recv() {
            let outcome = self.run_one(operation);
            if result_tx.send((index, outcome)).is_err() {
                return;
            }
        }
    }

    fn run_one(&self, operation: DeletionOperation) -> DeletionOutcome {
        let command = self
            .store
            .describe_delete(&operation.path, operation.dry_run);
        self.logger.debug(format!("Running: {command}"));

        let started = Instant::now();
        let result = self.store.delete(&operation.path, operation.dry_run);
        let duration = started.elapsed();

        match result {
            Ok(()) => {
                if operation.dry_run {
                    self.logger.info(format!("[DRYRUN-COMPLETE] {command}"));
                } else {
                    self.logger.info(format!("[DELETED] {command}"));
                }
                DeletionOutcome {
                    operation,
                    state: OperationState::Succeeded,
                    error: None,
                    duration,
                }
            }
            Err(e) => {
                self.logger
                    .error(format!("[ERROR] Delete failed: {command} - {e}"));
                let error = DeletionError {
                    path: operation.path.clone(),
                    error: e.to_string(),
                    error_code: e.code().to_string(),
                };
                DeletionOutcome {
                    operation,
                    state: OperationState::Failed,
                    error: Some(error),
                    duration,
                }
            }
        }
    }
}

// ──────────────────── tests ────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::dual::{DualLoggerConfig, spawn_logger};
    use crate::remote::mock::{MockStore, StoreCall};
    use proptest::prelude::*;
    use std::collections::HashMap;

    fn ops(paths: &[&str], dry_run: bool) -> Vec<DeletionOperation> {
        paths
            .iter()
            .map(|p| DeletionOperation::new(*p, dry_run))
            .collect()
    }

    fn executor(store: &MockStore, workers: usize) -> DeletionExecutor<'_> {
        DeletionExecutor::new(
            DeletionConfig {
                worker_count: workers,
            },
            store,
            LoggerHandle::noop(),
        )
    }

    #[test]
    fn empty_plan_is_a_no_op() {
        let store = MockStore::new();
        let report = executor(&store, 4).execute(Vec::new());
        assert_eq!(report.total(), 0);
        assert_eq!(report.workers_used, 0);
        assert!(store.calls().is_empty());
    }

    #[test]
    fn every_operation_runs_once_and_succeeds() {
        let store = MockStore::new();
        let report = executor(&store, 3).execute(ops(&["a", "b", "c", "d", "e"], false));

        assert_eq!(report.items_deleted, 5);
        assert_eq!(report.items_failed, 0);
        let mut deleted = store.deleted_paths();
        deleted.sort();
        assert_eq!(deleted, vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn outcomes_follow_plan_order() {
        let store = MockStore::new().with_delete_latency(Duration::from_millis(2));
        let report = executor(&store, 4).execute(ops(&["p1", "p2", "p3", "p4", "p5", "p6"], false));
        let paths: Vec<_> = report
            .outcomes
            .iter()
            .map(|o| o.operation.path.as_str())
            .collect();
        assert_eq!(paths, vec!["p1", "p2", "p3", "p4", "p5", "p6"]);
    }

    #[test]
    fn failure_is_isolated() {
        let store = MockStore::new().failing_delete("b");
        let report = executor(&store, 2).execute(ops(&["a", "b", "c"], false));

        assert_eq!(report.items_deleted, 2);
        assert_eq!(report.items_failed, 1);
        let errors: Vec<_> = report.errors().collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path, "b");
        assert_eq!(errors[0].error_code, "ASW-2101");
        assert_eq!(report.outcomes[0].state, OperationState::Succeeded);
        assert_eq!(report.outcomes[1].state, OperationState::Failed);
        assert_eq!(report.outcomes[2].state, OperationState::Succeeded);
    }

    #[test]
    fn state_agrees_with_recorded_error() {
        let store = MockStore::new().failing_delete("b").failing_delete("d");
        let report = executor(&store, 3).execute(ops(&["a", "b", "c", "d"], false));

        assert_eq!(report.total(), 4);
        for outcome in &report.outcomes {
            match outcome.state {
                OperationState::Succeeded => assert!(outcome.error.is_none()),
                OperationState::Failed => {
                    let error = outcome.error.as_ref().expect("failed outcome carries error");
                    assert_eq!(error.path, outcome.operation.path);
                }
            }
        }
        assert_eq!(report.items_deleted + report.items_failed, report.total());
    }

    #[test]
    fn dry_run_never_issues_real_delete() {
        let store = MockStore::new();
        let report = executor(&store, 2).execute(ops(&["a", "b"], true));

        assert!(report.dry_run);
        assert_eq!(store.real_delete_count(), 0);
        assert!(
            store
                .calls()
                .iter()
                .all(|c| matches!(c, StoreCall::Delete { dry_run: true, .. }))
        );
    }

    #[test]
    fn concurrency_is_bounded_by_worker_count() {
        let store = MockStore::new().with_delete_latency(Duration::from_millis(20));
        let paths: Vec<String> = (0..12).map(|i| format!("repo/{i}.jar")).collect();
        let refs: Vec<&str> = paths.iter().map(String::as_str).collect();

        let report = executor(&store, 3).execute(ops(&refs, false));

        assert_eq!(report.workers_used, 3);
        assert_eq!(report.items_deleted, 12);
        assert!(store.peak_concurrency() <= 3);
        assert!(store.peak_concurrency() >= 2, "pool should actually overlap work");
    }

    #[test]
    fn zero_workers_treated_as_one() {
        let store = MockStore::new();
        let report = executor(&store, 0).execute(ops(&["a", "b"], false));
        assert_eq!(report.workers_used, 1);
        assert_eq!(report.items_deleted, 2);
    }

    #[test]
    fn outcomes_are_logged() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("exec.log");
        let (logger, join) = spawn_logger(DualLoggerConfig {
            log_file: Some(log.clone()),
            console: false,
            ..DualLoggerConfig::default()
        })
        .unwrap();

        let store = MockStore::new().failing_delete("bad.jar");
        DeletionExecutor::new(DeletionConfig::default(), &store, logger.clone())
            .execute(ops(&["good.jar", "bad.jar"], false));
        DeletionExecutor::new(DeletionConfig::default(), &store, logger.clone())
            .execute(ops(&["preview.jar"], true));
        logger.shutdown();
        join.join().unwrap();

        let contents = std::fs::read_to_string(log).unwrap();
        assert!(contents.contains("[INFO] [DELETED] delete good.jar"));
        assert!(contents.contains("[ERROR] [ERROR] Delete failed: delete bad.jar"));
        assert!(contents.contains("[INFO] [DRYRUN-COMPLETE] delete preview.jar (dry run)"));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn each_operation_runs_exactly_once(n in 1usize..24, k_seed in 0usize..64) {
            let k = 1 + k_seed % n;
            let store = MockStore::new();
            let paths: Vec<String> = (0..n).map(|i| format!("r/{i}")).collect();
            let refs: Vec<&str> = paths.iter().map(String::as_str).collect();

            let report = executor(&store, k).execute(ops(&refs, false));

            prop_assert_eq!(report.total(), n);
            prop_assert_eq!(report.items_deleted, n);
            let mut counts: HashMap<String, usize> = HashMap::new();
            for p in store.deleted_paths() {
                *counts.entry(p).or_default() += 1;
            }
            prop_assert_eq!(counts.len(), n);
            prop_assert!(counts.values().all(|&c| c == 1));
        }
    }
}
