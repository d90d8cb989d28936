// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only per-job log with console mirror.
//!
//! Writes human-readable timestamped lines to `<logs_dir>/<job_id>.log`,
//! rooted beside the checkpoint file. Info lines mirror to stdout, error
//! lines to stderr with an `[ERROR]` tag.
//!
//! Format: `[2026-01-30T08:14:09Z] message arg1 arg2`
//!
//! Each append opens, writes, and closes the file. This is safe for the low
//! write frequency of engine events. Failures are logged via tracing but do
//! not propagate; logging must not break the engine.

use crate::time_fmt::format_utc_now;
use drover_core::{ItemId, JobId, LogSink};
use serde_json::Value;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Append-only logger for one job run.
pub struct JobLogger {
    log_path: PathBuf,
}

impl JobLogger {
    /// Create a logger for the given job, rooted beside the checkpoint file.
    ///
    /// Log file: `<checkpoint dir>/logs/<job_id>.log`.
    pub fn new(checkpoint_path: &Path, job_id: &JobId) -> Self {
        let dir = checkpoint_path.parent().unwrap_or_else(|| Path::new("."));
        Self {
            log_path: dir.join("logs").join(format!("{}.log", job_id)),
        }
    }

    /// Path of the log file on disk.
    pub fn path(&self) -> &Path {
        &self.log_path
    }

    /// Append an info line; mirrored to stdout.
    pub fn info(&self, message: &str) {
        self.emit(false, message, &[]);
    }

    /// Append an info line with extra values, serialized compactly.
    pub fn info_args(&self, message: &str, args: &[Value]) {
        self.emit(false, message, args);
    }

    /// Append an error line; mirrored to stderr with an `[ERROR]` tag.
    pub fn error(&self, message: &str) {
        self.emit(true, message, &[]);
    }

    /// Append an error line with extra values, serialized compactly.
    pub fn error_args(&self, message: &str, args: &[Value]) {
        self.emit(true, message, args);
    }

    fn emit(&self, is_error: bool, message: &str, args: &[Value]) {
        let mut line = format!("[{}] ", format_utc_now());
        if is_error {
            line.push_str("[ERROR] ");
        }
        line.push_str(message);
        for arg in args {
            line.push(' ');
            match serde_json::to_string(arg) {
                Ok(text) => line.push_str(&text),
                Err(_) => line.push_str("<unserializable>"),
            }
        }

        if is_error {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }

        if let Err(e) = self.write_line(&line) {
            tracing::warn!(
                path = %self.log_path.display(),
                error = %e,
                "failed to write job log"
            );
        }
    }

    fn write_line(&self, line: &str) -> std::io::Result<()> {
        if let Some(parent) = self.log_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)?;
        writeln!(file, "{}", line)?;
        Ok(())
    }
}

/// Worker-context lines land in the job log attributed to their item.
impl LogSink for JobLogger {
    fn append(&self, item_id: &ItemId, line: &str) {
        self.info(&format!("[{}] {}", item_id, line));
    }
}

#[cfg(test)]
#[path = "job_logger_tests.rs"]
mod tests;
