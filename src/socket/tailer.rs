// src/socket/tailer.rs

use std::fmt::{self, Write as _};
use std::path::Path;
use std::sync::Arc;

use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::TailerSettings;
use crate::errors::RelayError;

/// Where timestamped lines end up.
///
/// Only a [`Sink::File`] is periodically synced to disk.
pub enum Sink {
    File(File),
    Stream(Box<dyn AsyncWrite + Send + Unpin>),
}

impl fmt::Debug for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sink::File(file) => f.debug_tuple("File").field(file).finish(),
            Sink::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

impl Sink {
    /// Open `path` for appending, creating it with mode 0644 if needed.
    pub async fn append_file(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let mut options = OpenOptions::new();
        options.create(true).append(true);
        #[cfg(unix)]
        options.mode(0o644);

        let file = options.open(path).await?;
        Ok(Sink::File(file))
    }

    pub fn stdout() -> Self {
        Sink::Stream(Box::new(tokio::io::stdout()))
    }

    fn is_file(&self) -> bool {
        matches!(self, Sink::File(_))
    }

    async fn write_all(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        match self {
            Sink::File(file) => {
                file.write_all(bytes).await?;
                file.flush().await
            }
            Sink::Stream(stream) => {
                stream.write_all(bytes).await?;
                stream.flush().await
            }
        }
    }

    async fn sync(&mut self) -> std::io::Result<()> {
        match self {
            Sink::File(file) => file.sync_all().await,
            Sink::Stream(stream) => stream.flush().await,
        }
    }
}

#[derive(Debug)]
struct TailerState {
    sink: Sink,
    lines_since_sync: usize,
    closed: bool,
}

/// Writes lines of text to a [`Sink`], each prefixed with a timestamp.
///
/// Safe to share between connections; every line is written whole under
/// one lock, so lines from different writers never interleave.
#[derive(Debug)]
pub struct Tailer {
    state: Mutex<TailerState>,
    settings: TailerSettings,
    clock: Arc<dyn Clock>,
}

impl Tailer {
    pub fn new(sink: Sink) -> Self {
        Self {
            state: Mutex::new(TailerState {
                sink,
                lines_since_sync: 0,
                closed: false,
            }),
            settings: TailerSettings::default(),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn from_file(file: File) -> Self {
        Self::new(Sink::File(file))
    }

    pub fn from_stream<W>(stream: W) -> Self
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Self::new(Sink::Stream(Box::new(stream)))
    }

    pub fn with_settings(mut self, settings: TailerSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn settings(&self) -> &TailerSettings {
        &self.settings
    }

    /// Write `[<timestamp>] <line>\n` to the sink.
    ///
    /// File sinks are synced to disk every `sync_every` lines. Fails with
    /// [`RelayError::Closed`] once [`Tailer::close`] has been called.
    pub async fn write_line(&self, line: &str) -> Result<(), RelayError> {
        let mut state = self.state.lock().await;
        if state.closed {
            return Err(RelayError::Closed);
        }

        let entry = self.format_line(line);
        state
            .sink
            .write_all(entry.as_bytes())
            .await
            .map_err(RelayError::Write)?;

        if !state.sink.is_file() {
            return Ok(());
        }

        state.lines_since_sync += 1;
        if state.lines_since_sync >= self.settings.sync_every {
            state.sink.sync().await.map_err(RelayError::Sync)?;
            state.lines_since_sync = 0;
        }

        Ok(())
    }

    /// Flush (and for a file, sync) the sink and refuse further writes.
    /// Closing twice is fine.
    pub async fn close(&self) -> Result<(), RelayError> {
        let mut state = self.state.lock().await;
        if state.closed {
            return Ok(());
        }

        if let Err(e) = state.sink.sync().await {
            warn!(error = %e, "failed to sync sink before close");
            return Err(RelayError::Close(e));
        }

        state.closed = true;
        debug!("tailer closed");
        Ok(())
    }

    fn format_line(&self, line: &str) -> String {
        let now = self.clock.now();
        let mut entry = String::with_capacity(line.len() + 32);
        entry.push('[');
        if write!(entry, "{}", now.format(&self.settings.timestamp_format)).is_err() {
            // Unusable format string; fall back to something unambiguous.
            entry.truncate(1);
            entry.push_str(&now.to_rfc3339());
        }
        entry.push_str("] ");
        entry.push_str(line);
        entry.push('\n');
        entry
    }
}
