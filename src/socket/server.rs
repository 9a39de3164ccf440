// src/socket/server.rs

use std::fs::Permissions;
use std::io::ErrorKind;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::io::BufReader;
use tokio::net::{UnixListener, UnixStream};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::errors::RelayError;
use crate::lines::next_line_lossy;
use crate::socket::tailer::Tailer;

/// Removes the socket file when the server returns.
struct SocketFile(PathBuf);

impl Drop for SocketFile {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.0)
            && e.kind() != ErrorKind::NotFound
        {
            debug!(path = ?self.0, error = %e, "failed to remove socket file");
        }
    }
}

impl Tailer {
    /// Listen on a UNIX socket at `path` and log every line received from
    /// any number of concurrent connections.
    ///
    /// A stale socket file at `path` is replaced. The socket is restricted
    /// to its owner and removed again on return. A failed accept or a
    /// broken connection is logged and does not stop the server. Returns
    /// `Ok(())` once `cancel` fires and every connection has wound down.
    pub async fn run_server(
        self: &Arc<Self>,
        path: impl AsRef<Path>,
        cancel: CancellationToken,
    ) -> Result<(), RelayError> {
        let path = path.as_ref();

        match std::fs::remove_file(path) {
            Ok(()) => debug!(?path, "removed stale socket file"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(source) => {
                return Err(RelayError::RemoveStale {
                    path: path.to_path_buf(),
                    source,
                });
            }
        }

        let listener = UnixListener::bind(path).map_err(|source| RelayError::Bind {
            path: path.to_path_buf(),
            source,
        })?;
        let _socket_file = SocketFile(path.to_path_buf());

        std::fs::set_permissions(path, Permissions::from_mode(0o600)).map_err(|source| {
            RelayError::Permissions {
                path: path.to_path_buf(),
                source,
            }
        })?;

        info!(?path, "listening on UNIX socket");

        let mut connections = JoinSet::new();
        let mut next_id: u64 = 0;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("server shutting down");
                    break;
                }
                accepted = listener.accept() => match accepted {
                    Ok((stream, _)) => {
                        next_id += 1;
                        let tailer = Arc::clone(self);
                        let cancel = cancel.clone();
                        connections.spawn(handle_connection(tailer, stream, next_id, cancel));
                    }
                    Err(e) => error!(error = %e, "failed to accept connection"),
                },
                Some(_) = connections.join_next(), if !connections.is_empty() => {}
            }
        }

        drop(listener);
        while connections.join_next().await.is_some() {}
        Ok(())
    }
}

async fn handle_connection(
    tailer: Arc<Tailer>,
    stream: UnixStream,
    conn: u64,
    cancel: CancellationToken,
) {
    info!(conn, "new connection");

    let mut reader = BufReader::new(stream);
    let mut raw = Vec::new();

    loop {
        let next = tokio::select! {
            _ = cancel.cancelled() => {
                debug!(conn, "closing connection on shutdown");
                return;
            }
            next = next_line_lossy(&mut reader, &mut raw) => next,
        };

        match next {
            Ok(Some(line)) => match tailer.write_line(&line).await {
                Ok(()) => debug!(conn, %line, "logged line"),
                Err(e) => error!(conn, error = %e, "failed to write line"),
            },
            Ok(None) => break,
            Err(e) => {
                error!(conn, error = %e, "error reading from connection");
                return;
            }
        }
    }

    info!(conn, "connection closed");
}
