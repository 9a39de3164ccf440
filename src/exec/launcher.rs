// src/exec/launcher.rs

//! Process launcher: log file preparation, synchronous, background and
//! detached launches.

use std::fs::File;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt, BufWriter};
use tokio::process::{Child, Command};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{Instant, timeout};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::ExecSettings;
use crate::errors::ExecError;
use crate::exec::buffer::SharedBuffer;
use crate::exec::detach::DetachExt;
use crate::exec::invocation::Invocation;
use crate::exec::result::{CommandResult, LogPaths};
use crate::fs::{create_private_dir, write_private_file};

/// Timestamp layout used in log file names.
const LOG_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// How long to keep reading a child's pipes after the decision has been
/// made. Bounds the wait when a grandchild inherited the pipe and keeps it
/// open after the direct child is gone.
pub(crate) const STREAM_DRAIN_GRACE: Duration = Duration::from_millis(500);

/// How long a reader that was told to stop gets to flush its log file.
const STREAM_STOP_GRACE: Duration = Duration::from_millis(200);

/// Tunables for the launcher and the matching engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecOptions {
    /// Polling interval for watched file existence and growth.
    pub poll_interval: Duration,
    /// Delay before `run_detached` returns.
    pub detach_grace: Duration,
}

impl Default for ExecOptions {
    fn default() -> Self {
        Self::from(&ExecSettings::default())
    }
}

impl From<&ExecSettings> for ExecOptions {
    fn from(settings: &ExecSettings) -> Self {
        Self {
            poll_interval: Duration::from_millis(settings.poll_interval_ms),
            detach_grace: Duration::from_millis(settings.detach_grace_ms),
        }
    }
}

/// Entry point for running external commands.
///
/// Cheap to clone; the background variants clone it into the spawned task.
#[derive(Debug, Clone)]
pub struct Executor {
    clock: Arc<dyn Clock>,
    options: ExecOptions,
}

impl Default for Executor {
    fn default() -> Self {
        Self::new()
    }
}

/// Log files opened for one invocation.
pub(crate) struct LogFiles {
    pub(crate) stdout: File,
    pub(crate) stderr: File,
    pub(crate) paths: LogPaths,
}

impl Executor {
    pub fn new() -> Self {
        Self {
            clock: Arc::new(SystemClock),
            options: ExecOptions::default(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_options(mut self, options: ExecOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> ExecOptions {
        self.options
    }

    /// Run a command to completion, copying both output streams into their
    /// log files and into the result.
    pub async fn run(&self, inv: Invocation) -> CommandResult {
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
            Err(err) => return result.failed(err),
        };

        match child.wait().await {
            Ok(status) => {
                apply_exit_status(&mut result, status);
                result.completed = true;
            }
            Err(e) => result.error = Some(ExecError::Wait(e)),
        }

        copiers.drain(STREAM_DRAIN_GRACE).await;
        result.stdout = stdout_buf.to_string_lossy();
        result.stderr = stderr_buf.to_string_lossy();

        info!(
            program = %result.program,
            exit_code = result.exit_code,
            success = result.is_success(),
            "command finished"
        );

        result
    }

    /// Same as [`Executor::run`], on a spawned task. The receiver yields the
    /// result exactly once.
    pub fn run_bg(&self, inv: Invocation) -> oneshot::Receiver<CommandResult> {
        let (tx, rx) = oneshot::channel();
        let exec = self.clone();
        tokio::spawn(async move {
            let result = exec.run(inv).await;
            let _ = tx.send(result);
        });
        rx
    }

    /// Start a long-running daemon that must outlive the current process.
    ///
    /// The child runs in its own process group with its output redirected
    /// straight into the log files (no pipes, no captured output). The call
    /// returns after a short grace delay; if the child already exited by
    /// then, its exit status is reported.
    pub async fn run_detached(&self, inv: Invocation) -> CommandResult {
        let mut result = CommandResult::for_invocation(&inv);

        let logs = match self.prepare_logs(&inv) {
            Ok(logs) => logs,
            Err(err) => return result.failed(err),
        };
        result.logs = logs.paths.clone();

        // Keep our own handles so the files can be synced after the grace
        // period; the originals move into the child.
        let sync_handles = [logs.stdout.try_clone().ok(), logs.stderr.try_clone().ok()];

        let mut std_cmd = std::process::Command::new(&inv.program);
        std_cmd
            .args(&inv.args)
            .stdin(Stdio::null())
            .stdout(Stdio::from(logs.stdout))
            .stderr(Stdio::from(logs.stderr))
            .detach();

        let mut child = match Command::from(std_cmd).spawn() {
            Ok(child) => child,
            Err(source) => {
                return result.failed(ExecError::Spawn {
                    program: inv.program.clone(),
                    source,
                });
            }
        };
        result.pid = child.id();
        info!(program = %inv.program, pid = ?result.pid, "started detached command");

        tokio::time::sleep(self.options.detach_grace).await;

        match child.try_wait() {
            Ok(Some(status)) => {
                warn!(program = %inv.program, %status, "detached command exited during grace period");
                apply_exit_status(&mut result, status);
                result.completed = true;
            }
            Ok(None) => {}
            Err(e) => debug!(program = %inv.program, error = %e, "could not poll detached command"),
        }

        for file in sync_handles.into_iter().flatten() {
            if let Err(e) = tokio::fs::File::from_std(file).sync_all().await {
                debug!(program = %inv.program, error = %e, "failed to sync detached log file");
            }
        }

        result
    }

    /// Create the log directory and the per-stream log files, and record the
    /// command line next to them.
    pub(crate) fn prepare_logs(&self, inv: &Invocation) -> Result<LogFiles, ExecError> {
        create_private_dir(&inv.log_dir).map_err(|source| ExecError::CreateLogDir {
            path: inv.log_dir.clone(),
            source,
        })?;

        let timestamp = self.clock.now().format(LOG_TIMESTAMP_FORMAT).to_string();
        let prefix = format!("{timestamp}_{}", inv.program_name());
        let stdout_path = inv.log_dir.join(format!("{prefix}_stdout.log"));
        let stderr_path = inv.log_dir.join(format!("{prefix}_stderr.log"));
        let command_path = inv.log_dir.join(format!("{prefix}_command.log"));

        let stdout = create_log_file("stdout", &stdout_path)?;
        let stderr = create_log_file("stderr", &stderr_path)?;

        write_private_file(&command_path, inv.describe().as_bytes()).map_err(|source| {
            ExecError::CommandLog {
                path: command_path.clone(),
                source,
            }
        })?;

        debug!(
            program = %inv.program,
            stdout = ?stdout_path,
            stderr = ?stderr_path,
            "prepared log files"
        );

        Ok(LogFiles {
            stdout,
            stderr,
            paths: LogPaths {
                stdout: stdout_path,
                stderr: stderr_path,
            },
        })
    }
}

fn create_log_file(stream: &'static str, path: &Path) -> Result<File, ExecError> {
    File::create(path).map_err(|source| ExecError::CreateLogFile {
        stream,
        path: path.to_path_buf(),
        source,
    })
}

/// Spawn `inv` with both output streams piped. The child is killed if its
/// handle is dropped.
pub(crate) fn spawn_piped(inv: &Invocation) -> Result<Child, ExecError> {
    let mut cmd = Command::new(&inv.program);
    cmd.args(&inv.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let child = cmd.spawn().map_err(|source| ExecError::Spawn {
        program: inv.program.clone(),
        source,
    })?;

    info!(program = %inv.program, args = ?inv.args, pid = ?child.id(), "started command");
    Ok(child)
}

/// Reader tasks for a child's two output streams, plus the token that asks
/// them to stop early.
pub(crate) struct StreamTasks {
    pub(crate) handles: [JoinHandle<()>; 2],
    pub(crate) stop: CancellationToken,
}

impl StreamTasks {
    /// Wait for both readers to reach EOF. After `grace` they are told to
    /// stop, which makes them flush their log file and return; a reader that
    /// still does not finish within [`STREAM_STOP_GRACE`] is aborted.
    pub(crate) async fn drain(self, grace: Duration) {
        let deadline = Instant::now() + grace;
        let mut pending = Vec::new();
        for mut handle in self.handles {
            if timeout(deadline.saturating_duration_since(Instant::now()), &mut handle)
                .await
                .is_err()
            {
                pending.push(handle);
            }
        }

        if pending.is_empty() {
            return;
        }

        debug!(streams = pending.len(), "stream still open after drain grace; stopping readers");
        self.stop.cancel();
        for mut handle in pending {
            if timeout(STREAM_STOP_GRACE, &mut handle).await.is_err() {
                handle.abort();
            }
        }
    }
}

/// Start one raw copier per output stream, each writing to its log file and
/// its buffer.
pub(crate) fn spawn_copiers(
    child: &mut Child,
    logs: LogFiles,
    stdout_buf: &SharedBuffer,
    stderr_buf: &SharedBuffer,
) -> Result<StreamTasks, ExecError> {
    let stdout = child.stdout.take().ok_or(ExecError::MissingPipe("stdout"))?;
    let stderr = child.stderr.take().ok_or(ExecError::MissingPipe("stderr"))?;
    let stop = CancellationToken::new();

    Ok(StreamTasks {
        handles: [
            spawn_copier(stdout, logs.stdout, stdout_buf.clone(), stop.clone(), "stdout"),
            spawn_copier(stderr, logs.stderr, stderr_buf.clone(), stop.clone(), "stderr"),
        ],
        stop,
    })
}

fn spawn_copier<R>(
    reader: R,
    file: File,
    buf: SharedBuffer,
    stop: CancellationToken,
    stream: &'static str,
) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut reader = reader;
        let mut file = BufWriter::new(tokio::fs::File::from_std(file));
        let mut chunk = vec![0u8; 8192];
        let mut file_ok = true;

        loop {
            let read = tokio::select! {
                _ = stop.cancelled() => break,
                read = reader.read(&mut chunk) => read,
            };

            match read {
                Ok(0) => break,
                Ok(n) => {
                    buf.write(&chunk[..n]);
                    if file_ok {
                        if let Err(e) = file.write_all(&chunk[..n]).await {
                            warn!(stream, error = %e, "failed to write log file; keeping in-memory copy only");
                            file_ok = false;
                        }
                    }
                }
                Err(e) => {
                    debug!(stream, error = %e, "stream read failed");
                    break;
                }
            }
        }

        if let Err(e) = file.flush().await {
            debug!(stream, error = %e, "failed to flush log file");
        }
    })
}

/// Record the exit code; termination without one (a signal) is an error.
pub(crate) fn apply_exit_status(result: &mut CommandResult, status: ExitStatus) {
    match status.code() {
        Some(code) => result.exit_code = code,
        None => {
            result.exit_code = -1;
            result.error = Some(ExecError::Signaled {
                signal: exit_signal(&status),
            });
        }
    }
}

#[cfg(unix)]
fn exit_signal(status: &ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn exit_signal(_status: &ExitStatus) -> Option<i32> {
    None
}

/// Forcibly terminate the child and reap it.
pub(crate) async fn kill_child(child: &mut Child, program: &str) {
    if let Err(e) = child.kill().await {
        debug!(program, error = %e, "failed to kill command (already exited?)");
    }
}
