// src/exec/match_file.rs

//! File watch engine: run a command until a pattern shows up in a file it
//! (presumably) writes, the deadline passes, or it exits on its own.

use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::errors::{ExecError, MonitorError};
use crate::exec::buffer::SharedBuffer;
use crate::exec::invocation::Invocation;
use crate::exec::launcher::{
    Executor, STREAM_DRAIN_GRACE, kill_child, spawn_copiers, spawn_piped,
};
use crate::exec::race::{record_exit, snapshot};
use crate::exec::result::{CommandResult, RaceOutcome};
use crate::watch::monitor::{MonitorOutcome, monitor_file_for, wait_for_file};

impl Executor {
    /// Run a command while watching `watch_path` for `pattern`.
    ///
    /// The command's own output is captured like [`Executor::run`] does but
    /// not scanned. The watched file does not need to exist yet; it is
    /// polled for until the deadline. If it never shows up the command is
    /// killed and the result is a timeout.
    ///
    /// Once the pattern is in the file the command is killed and
    /// `completed` is false. A monitor I/O failure kills the command too and
    /// ends up in `error`.
    pub async fn run_match_file(
        &self,
        inv: Invocation,
        pattern: impl Into<String>,
        watch_path: impl Into<PathBuf>,
        timeout: Duration,
    ) -> CommandResult {
        let pattern = pattern.into();
        let watch_path = watch_path.into();
        let deadline = Instant::now() + timeout;
        let poll = self.options().poll_interval;
        let mut result = CommandResult::for_invocation(&inv);

        let logs = match self.prepare_logs(&inv) {
            Ok(logs) => logs,
            Err(err) => return result.failed(err),
        };
        result.logs = logs.paths.clone();

        let mut child = match spawn_piped(&inv) {
            Ok(child) => child,
            Err(err) => return result.failed(err),
        };
        result.pid = child.id();

        let stdout_buf = SharedBuffer::new();
        let stderr_buf = SharedBuffer::new();
        let copiers = match spawn_copiers(&mut child, logs, &stdout_buf, &stderr_buf) {
            Ok(tasks) => tasks,
            Err(err) => {
                kill_child(&mut child, &inv.program).await;
                return result.failed(err);
            }
        };

        if !wait_for_file(&watch_path, poll, deadline).await {
            warn!(program = %inv.program, path = ?watch_path, "watched file never appeared");
            kill_child(&mut child, &inv.program).await;
            result.timed_out = true;
            result.error = Some(ExecError::TimedOut { timeout });
            snapshot(&mut result, &stdout_buf, &stderr_buf);
            copiers.drain(STREAM_DRAIN_GRACE).await;
            return result;
        }

        let mut file = match tokio::fs::File::open(&watch_path).await {
            Ok(file) => file,
            Err(source) => {
                kill_child(&mut child, &inv.program).await;
                result.error = Some(ExecError::WatchOpen {
                    path: watch_path,
                    source,
                });
                snapshot(&mut result, &stdout_buf, &stderr_buf);
                copiers.drain(STREAM_DRAIN_GRACE).await;
                return result;
            }
        };

        let cancel = CancellationToken::new();
        let monitor_cancel = cancel.clone();
        let monitor_pattern = pattern.clone();
        let mut monitor = tokio::spawn(async move {
            monitor_file_for(&monitor_cancel, &mut file, monitor_pattern.as_bytes(), poll).await
        });

        let verdict = tokio::select! {
            joined = &mut monitor => Verdict::Monitor(joined),
            _ = sleep_until(deadline) => Verdict::Deadline,
            status = child.wait() => Verdict::Exited(status),
        };

        match verdict {
            Verdict::Monitor(Ok(Ok(MonitorOutcome::Found))) => {
                info!(program = %inv.program, outcome = %RaceOutcome::PatternFound, "file match race resolved");
                result.matched = pattern;
                kill_child(&mut child, &inv.program).await;
                result.completed = false;
            }
            Verdict::Monitor(Ok(Ok(MonitorOutcome::Cancelled))) => {
                // Nothing cancels the token before the race is decided.
                kill_child(&mut child, &inv.program).await;
                result.error = Some(ExecError::TaskAborted);
            }
            Verdict::Monitor(Ok(Err(err))) => {
                warn!(program = %inv.program, error = %err, "file monitor failed");
                kill_child(&mut child, &inv.program).await;
                result.error = Some(ExecError::from(err));
            }
            Verdict::Monitor(Err(join_err)) => {
                warn!(program = %inv.program, error = %join_err, "file monitor task died");
                kill_child(&mut child, &inv.program).await;
                result.error = Some(ExecError::TaskAborted);
            }
            Verdict::Deadline => {
                info!(program = %inv.program, outcome = %RaceOutcome::TimedOut, "file match race resolved");
                kill_child(&mut child, &inv.program).await;
                result.timed_out = true;
                result.error = Some(ExecError::TimedOut { timeout });
            }
            Verdict::Exited(status) => {
                info!(program = %inv.program, outcome = %RaceOutcome::ProcessExited, "file match race resolved");
                record_exit(&mut result, Some(status));
            }
        }

        cancel.cancel();
        if !monitor.is_finished() {
            // Wakes up from its idle sleep on the cancelled token.
            let _ = monitor.await;
        }

        copiers.drain(STREAM_DRAIN_GRACE).await;
        snapshot(&mut result, &stdout_buf, &stderr_buf);
        result
    }

    /// Same as [`Executor::run_match_file`], on a spawned task.
    pub fn run_match_file_bg(
        &self,
        inv: Invocation,
        pattern: impl Into<String>,
        watch_path: impl Into<PathBuf>,
        timeout: Duration,
    ) -> oneshot::Receiver<CommandResult> {
        let (tx, rx) = oneshot::channel();
        let exec = self.clone();
        let pattern = pattern.into();
        let watch_path = watch_path.into();
        tokio::spawn(async move {
            let result = exec.run_match_file(inv, pattern, watch_path, timeout).await;
            let _ = tx.send(result);
        });
        rx
    }
}

enum Verdict {
    Monitor(Result<Result<MonitorOutcome, MonitorError>, tokio::task::JoinError>),
    Deadline,
    Exited(std::io::Result<std::process::ExitStatus>),
}
