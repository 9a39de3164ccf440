// src/socket/client.rs

use std::path::Path;
use std::time::Duration;

use tokio::io::BufReader;
use tokio::net::UnixStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::errors::RelayError;
use crate::lines::next_line_lossy;
use crate::socket::tailer::Tailer;

impl Tailer {
    /// Connect to the UNIX socket at `path` and log every line read from it.
    ///
    /// The peer may not be listening yet, so connecting is retried every
    /// `reconnect_interval_ms` until it succeeds or `cancel` fires. Once
    /// connected there is no reconnect: the call returns when the peer
    /// closes the connection. Cancellation is a normal return, even in the
    /// middle of a read.
    pub async fn run_client(
        &self,
        path: impl AsRef<Path>,
        cancel: CancellationToken,
    ) -> Result<(), RelayError> {
        let path = path.as_ref();
        let retry = Duration::from_millis(self.settings().reconnect_interval_ms);

        if !path.exists() {
            info!(?path, "socket file does not exist yet");
        }

        let stream = loop {
            match UnixStream::connect(path).await {
                Ok(stream) => break stream,
                Err(e) => {
                    warn!(?path, error = %e, "failed to connect to UNIX socket, will retry");
                    tokio::select! {
                        _ = cancel.cancelled() => {
                            info!("client shutting down before connecting");
                            return Ok(());
                        }
                        _ = tokio::time::sleep(retry) => {}
                    }
                }
            }
        };
        info!(?path, "connected to UNIX socket");

        let mut reader = BufReader::new(stream);
        let mut raw = Vec::new();

        loop {
            let next = tokio::select! {
                _ = cancel.cancelled() => {
                    info!("client shutting down");
                    return Ok(());
                }
                next = next_line_lossy(&mut reader, &mut raw) => next,
            };

            match next {
                Ok(Some(line)) => match self.write_line(&line).await {
                    Ok(()) => debug!(%line, "logged line"),
                    Err(e) => error!(error = %e, "failed to write line"),
                },
                Ok(None) => break,
                Err(e) => return Err(RelayError::Read(e)),
            }
        }

        info!("socket connection closed");
        Ok(())
    }
}
