//! Append-only text log file for the persisted (debug-level) sink.
//!
//! Each line is assembled in memory and written with a single `write_all` so
//! that concurrent tails never see half a record.
//!
//! Degradation chain:
//! 1. Log file at the requested path
//! 2. Silent discard (a broken log file must never stop a cleanup run; the
//!    console sink still carries info-level output)

#![allow(missing_docs)]

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::core::errors::{Result, SweepError};

/// Build the timestamped file name, e.g. `clean_old_artifacts_20261015_081500.log`.
pub fn log_file_name(prefix: &str, started_at: DateTime<Utc>) -> String {
    format!("{prefix}_{}.log", started_at.format("%Y%m%d_%H%M%S"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriterState {
    Normal,
    Discard,
}

/// Buffered append-only writer that degrades instead of failing.
pub struct LogFile {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    state: WriterState,
}

impl LogFile {
    /// Open (creating parents as needed). Falls back to discard on failure.
    pub fn open(path: &Path) -> Self {
        match open_append(path) {
            Ok(file) => Self {
                path: path.to_path_buf(),
                writer: Some(BufWriter::with_capacity(64 * 1024, file)),
                state: WriterState::Normal,
            },
            Err(e) => {
                let _ = writeln!(io::stderr(), "[ASW-LOG] {e}; file logging disabled");
                Self {
                    path: path.to_path_buf(),
                    writer: None,
                    state: WriterState::Discard,
                }
            }
        }
    }

    /// Append one already-formatted line (newline added here).
    pub fn write_line(&mut self, line: &str) {
        if self.state == WriterState::Discard {
            return;
        }
        let mut buf = String::with_capacity(line.len() + 1);
        buf.push_str(line);
        buf.push('\n');

        let Some(w) = self.writer.as_mut() else {
            self.state = WriterState::Discard;
            return;
        };
        if let Err(e) = w.write_all(buf.as_bytes()) {
            let _ = writeln!(
                io::stderr(),
                "[ASW-LOG] write to {} failed: {e}; file logging disabled",
                self.path.display()
            );
            self.writer = None;
            self.state = WriterState::Discard;
        }
    }

    /// Flush and sync to disk; called once at shutdown.
    pub fn fsync(&mut self) {
        if let Some(w) = self.writer.as_mut() {
            let _ = w.flush();
            let _ = w.get_ref().sync_data();
        }
    }

    pub fn is_active(&self) -> bool {
        self.state == WriterState::Normal
    }
}

fn open_append(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| SweepError::io(parent, e))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| SweepError::io(path, e))
}
