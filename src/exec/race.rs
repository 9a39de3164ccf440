// src/exec/race.rs

//! Completion race: run a command until a pattern shows up in its output,
//! the deadline passes, or it exits on its own, whichever happens first.

use std::fs::File;
use std::io;
use std::process::ExitStatus;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWriteExt, BufReader, BufWriter};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::errors::ExecError;
use crate::exec::buffer::SharedBuffer;
use crate::exec::invocation::Invocation;
use crate::exec::launcher::{
    Executor, STREAM_DRAIN_GRACE, StreamTasks, apply_exit_status, kill_child, spawn_piped,
};
use crate::exec::result::{CommandResult, RaceOutcome};
use crate::exec::signal::MatchSignal;
use crate::lines::{contains_bytes, next_line_lossy};

impl Executor {
    /// Run a command while scanning stdout and stderr, line by line, for
    /// `pattern` (a literal substring).
    ///
    /// - Pattern found: the command is killed, `matched` is set and
    ///   `completed` is false.
    /// - Deadline passed: the command is killed, `timed_out` is set and
    ///   `error` is [`ExecError::TimedOut`].
    /// - Command exited: `completed` is set and `exit_code` recorded.
    ///
    /// When the match and the exit happen at the same moment either may win.
    /// A few bytes written between the decision and the kill taking effect
    /// may or may not be in the captured output.
    pub async fn run_match(
        &self,
        inv: Invocation,
        pattern: impl Into<String>,
        timeout: Duration,
    ) -> CommandResult {
        let pattern: Arc<str> = Arc::from(pattern.into());
        let deadline = Instant::now() + timeout;
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

        let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
            kill_child(&mut child, &inv.program).await;
            return result.failed(ExecError::MissingPipe("stdout/stderr"));
        };

        let stdout_buf = SharedBuffer::new();
        let stderr_buf = SharedBuffer::new();
        let (signal, mut found_rx) = MatchSignal::new();

        let stop = CancellationToken::new();
        let scanners = StreamTasks {
            handles: [
                spawn_scanner(stdout, logs.stdout, stdout_buf.clone(), Arc::clone(&pattern), signal.clone(), stop.clone(), "stdout"),
                spawn_scanner(stderr, logs.stderr, stderr_buf.clone(), Arc::clone(&pattern), signal, stop.clone(), "stderr"),
            ],
            stop,
        };

        let (outcome, status) = race(&mut found_rx, deadline, child.wait()).await;
        info!(program = %inv.program, %outcome, "match race resolved");

        match outcome {
            RaceOutcome::PatternFound => {
                result.matched = pattern.to_string();
                kill_child(&mut child, &inv.program).await;
                result.completed = false;
                snapshot(&mut result, &stdout_buf, &stderr_buf);
                scanners.drain(STREAM_DRAIN_GRACE).await;
            }
            RaceOutcome::TimedOut => {
                kill_child(&mut child, &inv.program).await;
                result.timed_out = true;
                result.error = Some(ExecError::TimedOut { timeout });
                snapshot(&mut result, &stdout_buf, &stderr_buf);
                scanners.drain(STREAM_DRAIN_GRACE).await;
            }
            RaceOutcome::ProcessExited => {
                record_exit(&mut result, status);
                // The deadline no longer matters; let the scanners catch up
                // with whatever is still sitting in the pipes.
                scanners.drain(STREAM_DRAIN_GRACE).await;
                snapshot(&mut result, &stdout_buf, &stderr_buf);
            }
        }

        result
    }

    /// Same as [`Executor::run_match`], on a spawned task.
    pub fn run_match_bg(
        &self,
        inv: Invocation,
        pattern: impl Into<String>,
        timeout: Duration,
    ) -> oneshot::Receiver<CommandResult> {
        let (tx, rx) = oneshot::channel();
        let exec = self.clone();
        let pattern = pattern.into();
        tokio::spawn(async move {
            let result = exec.run_match(inv, pattern, timeout).await;
            let _ = tx.send(result);
        });
        rx
    }
}

/// Wait for the first of: pattern notification, deadline, process exit.
///
/// A closed notification channel (both scanners ended without a match) just
/// takes that leg out of the race.
async fn race<F>(
    found_rx: &mut oneshot::Receiver<()>,
    deadline: Instant,
    wait: F,
) -> (RaceOutcome, Option<io::Result<ExitStatus>>)
where
    F: Future<Output = io::Result<ExitStatus>>,
{
    tokio::select! {
        Ok(()) = found_rx => (RaceOutcome::PatternFound, None),
        _ = sleep_until(deadline) => (RaceOutcome::TimedOut, None),
        status = wait => (RaceOutcome::ProcessExited, Some(status)),
    }
}

pub(crate) fn record_exit(result: &mut CommandResult, status: Option<io::Result<ExitStatus>>) {
    match status {
        Some(Ok(status)) => {
            apply_exit_status(result, status);
            result.completed = true;
        }
        Some(Err(e)) => result.error = Some(ExecError::Wait(e)),
        None => {}
    }
}

pub(crate) fn snapshot(result: &mut CommandResult, stdout: &SharedBuffer, stderr: &SharedBuffer) {
    result.stdout = stdout.to_string_lossy();
    result.stderr = stderr.to_string_lossy();
}

/// Read complete lines from one output stream, copy each (newline
/// terminated) to the log file and the buffer, and stop after the first line
/// containing `pattern`.
fn spawn_scanner<R>(
    reader: R,
    file: File,
    buf: SharedBuffer,
    pattern: Arc<str>,
    signal: MatchSignal,
    stop: CancellationToken,
    stream: &'static str,
) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut reader = BufReader::new(reader);
        let mut file = BufWriter::new(tokio::fs::File::from_std(file));
        let mut raw = Vec::new();
        let mut file_ok = true;

        loop {
            let next = tokio::select! {
                _ = stop.cancelled() => break,
                next = next_line_lossy(&mut reader, &mut raw) => next,
            };

            let line = match next {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    debug!(stream, error = %e, "stream read failed");
                    break;
                }
            };

            let mut out = line.into_bytes();
            out.push(b'\n');
            buf.write(&out);
            if file_ok {
                if let Err(e) = file.write_all(&out).await {
                    warn!(stream, error = %e, "failed to write log file; keeping in-memory copy only");
                    file_ok = false;
                }
            }

            if contains_bytes(&out[..out.len() - 1], pattern.as_bytes()) {
                let delivered = signal.notify();
                debug!(stream, delivered, "pattern found in output");
                break;
            }
        }

        if let Err(e) = file.flush().await {
            debug!(stream, error = %e, "failed to flush log file");
        }
    })
}
