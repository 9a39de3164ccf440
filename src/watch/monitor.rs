// src/watch/monitor.rs

use std::io::SeekFrom;
use std::path::Path;
use std::time::Duration;

use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio::time::{Instant, sleep, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::errors::MonitorError;
use crate::watch::cursor::{CARRY_WINDOW, READ_CHUNK, SizeChange, WatchCursor};

/// How a [`monitor_file_for`] call ended without an I/O fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorOutcome {
    Found,
    /// The token fired before the pattern showed up.
    Cancelled,
}

impl MonitorOutcome {
    pub fn is_found(self) -> bool {
        matches!(self, MonitorOutcome::Found)
    }
}

/// Poll `file` for `pattern` until it is found or `cancel` fires.
///
/// The file is read from its current position onwards in chunks of
/// [`READ_CHUNK`] bytes. A pattern split across two reads is found as long
/// as it fits in the [`CARRY_WINDOW`]; longer patterns are rejected up
/// front. When the file shrinks below the read offset it is considered
/// truncated and reading starts over from the beginning, with the carried
/// bytes discarded.
///
/// Cancellation is checked before every stat and interrupts the idle sleep,
/// so a cancelled monitor returns within one read.
pub async fn monitor_file_for(
    cancel: &CancellationToken,
    file: &mut File,
    pattern: &[u8],
    poll: Duration,
) -> Result<MonitorOutcome, MonitorError> {
    if pattern.len() > CARRY_WINDOW {
        return Err(MonitorError::PatternTooLong {
            len: pattern.len(),
            window: CARRY_WINDOW,
        });
    }

    let mut cursor = WatchCursor::new();
    let mut chunk = vec![0u8; READ_CHUNK];

    loop {
        if cancel.is_cancelled() {
            return Ok(MonitorOutcome::Cancelled);
        }

        let size = file.metadata().await.map_err(MonitorError::Stat)?.len();

        match cursor.classify(size) {
            SizeChange::Unchanged => {
                if idle(cancel, poll).await {
                    return Ok(MonitorOutcome::Cancelled);
                }
                continue;
            }
            SizeChange::Truncated => {
                file.seek(SeekFrom::Start(0))
                    .await
                    .map_err(MonitorError::Seek)?;
                cursor.reset();
                debug!(
                    size,
                    generation = cursor.generation(),
                    "watched file truncated; reading from the start"
                );
            }
            SizeChange::Grown => {}
        }

        let n = file.read(&mut chunk).await.map_err(MonitorError::Read)?;
        if n == 0 {
            if idle(cancel, poll).await {
                return Ok(MonitorOutcome::Cancelled);
            }
            continue;
        }

        trace!(bytes = n, offset = cursor.offset(), "read watched file chunk");
        if cursor.ingest(&chunk[..n], pattern) {
            debug!(offset = cursor.offset(), "pattern found in watched file");
            return Ok(MonitorOutcome::Found);
        }
    }
}

/// Sleep for `poll`, returning `true` if `cancel` fired in the meantime.
async fn idle(cancel: &CancellationToken, poll: Duration) -> bool {
    tokio::select! {
        _ = cancel.cancelled() => true,
        _ = sleep(poll) => false,
    }
}

/// Wait until `path` exists, checking every `poll`. Returns `false` if the
/// deadline passed first.
pub async fn wait_for_file(path: &Path, poll: Duration, deadline: Instant) -> bool {
    loop {
        if tokio::fs::try_exists(path).await.unwrap_or(false) {
            return true;
        }

        let now = Instant::now();
        if now >= deadline {
            return false;
        }

        sleep_until((now + poll).min(deadline)).await;
    }
}
