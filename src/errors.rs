// src/errors.rs

//! Crate-wide error types.
//!
//! - [`ExecError`] is what ends up in `CommandResult::error`. It is never
//!   returned across a task boundary; the engines capture it into the result.
//! - [`MonitorError`] is the terminal I/O fault of the file content monitor.
//! - [`RelayError`] covers the socket log relay.
//! - [`ZedamigoError`] is the top-level error used by config loading and the
//!   `socket-tailer` binary.

use std::error::Error as StdError;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExecError {
    #[error("failed to create log directory {path:?}: {source}")]
    CreateLogDir { path: PathBuf, source: io::Error },

    #[error("failed to create {stream} file {path:?}: {source}")]
    CreateLogFile {
        stream: &'static str,
        path: PathBuf,
        source: io::Error,
    },

    #[error("failed to create command log file {path:?}: {source}")]
    CommandLog { path: PathBuf, source: io::Error },

    #[error("failed to create {0} pipe")]
    MissingPipe(&'static str),

    #[error("failed to start command {program}: {source}")]
    Spawn { program: String, source: io::Error },

    #[error("failed to wait for command: {0}")]
    Wait(#[source] io::Error),

    #[error("command terminated abnormally ({})", describe_signal(.signal))]
    Signaled { signal: Option<i32> },

    #[error("command timed out after {timeout:?}")]
    TimedOut { timeout: Duration },

    #[error("failed to open watched file {path:?}: {source}")]
    WatchOpen { path: PathBuf, source: io::Error },

    #[error(transparent)]
    Monitor(#[from] MonitorError),

    #[error("background command task aborted")]
    TaskAborted,
}

#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("monitor_file_for: file stat failed: {0}")]
    Stat(#[source] io::Error),

    #[error("monitor_file_for: file seek (to start after truncation) failed: {0}")]
    Seek(#[source] io::Error),

    #[error("monitor_file_for: read failed: {0}")]
    Read(#[source] io::Error),

    #[error("monitor_file_for: pattern is {len} bytes, longer than the {window} byte carry-over window")]
    PatternTooLong { len: usize, window: usize },
}

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("tailer is closed")]
    Closed,

    #[error("tailer failed to write line: {0}")]
    Write(#[source] io::Error),

    #[error("file sync failed: {0}")]
    Sync(#[source] io::Error),

    #[error("close failed: {0}")]
    Close(#[source] io::Error),

    #[error("failed to remove existing socket {path:?}: {source}")]
    RemoveStale { path: PathBuf, source: io::Error },

    #[error("failed to listen on UNIX socket {path:?}: {source}")]
    Bind { path: PathBuf, source: io::Error },

    #[error("failed to set permissions on UNIX socket {path:?}: {source}")]
    Permissions { path: PathBuf, source: io::Error },

    #[error("error reading from socket: {0}")]
    Read(#[source] io::Error),
}

#[derive(Error, Debug)]
pub enum ZedamigoError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Relay(#[from] RelayError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn describe_signal(signal: &Option<i32>) -> String {
    match signal {
        Some(sig) => format!("signal {sig}"),
        None => "no exit code".to_string(),
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, ZedamigoError>;

/// Report whether `err`, or any error in its `source()` chain, has a message
/// containing one of `needles`.
///
/// Callers use this to recognise tool failures they can tolerate (for
/// example "File exists" from `ip link add`). An empty needle list never
/// matches.
pub fn contains_any(err: &(dyn StdError + 'static), needles: &[&str]) -> bool {
    if needles.is_empty() {
        return false;
    }

    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(e) = current {
        let msg = e.to_string();
        if needles.iter().any(|n| msg.contains(n)) {
            return true;
        }
        current = e.source();
    }

    false
}
