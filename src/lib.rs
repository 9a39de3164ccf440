// src/lib.rs

pub mod cli;
pub mod clock;
pub mod config;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod lines;
pub mod logging;
pub mod socket;
pub mod watch;

use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::cli::{CliArgs, Mode};
use crate::config::load_or_default;
use crate::socket::{Sink, Tailer};

pub use crate::exec::{CommandResult, Executor, Invocation};
pub use crate::lines::into_lines;

/// High-level entry point used by `main.rs` (the `socket-tailer` binary).
///
/// This wires together:
/// - settings loading
/// - the output sink and the tailer
/// - SIGINT / SIGTERM handling
/// - the server or client role
pub async fn run(args: CliArgs) -> Result<()> {
    let mode = args
        .mode()
        .ok_or_else(|| anyhow!("must specify exactly one of --listen or --connect"))?;

    let settings = load_or_default(args.config.as_deref())?;

    let sink = match &args.out {
        Some(path) => {
            let sink = Sink::append_file(path)
                .await
                .with_context(|| format!("failed to open output file {path:?}"))?;
            info!(file = ?path, "writing to file");
            sink
        }
        None => {
            info!("writing to stdout");
            Sink::stdout()
        }
    };

    let tailer = Arc::new(Tailer::new(sink).with_settings(settings.tailer));

    let cancel = CancellationToken::new();
    spawn_shutdown_listener(cancel.clone());

    let outcome = run_mode(&tailer, &mode, cancel).await;

    if let Err(e) = tailer.close().await {
        error!(error = %e, "failed to close tailer");
    }

    outcome.with_context(|| format!("{} mode failed", mode.name()))
}

#[cfg(unix)]
async fn run_mode(
    tailer: &Arc<Tailer>,
    mode: &Mode,
    cancel: CancellationToken,
) -> std::result::Result<(), errors::RelayError> {
    match mode {
        Mode::Listen(path) => tailer.run_server(path, cancel).await,
        Mode::Connect(path) => tailer.run_client(path, cancel).await,
    }
}

#[cfg(not(unix))]
async fn run_mode(
    _tailer: &Arc<Tailer>,
    mode: &Mode,
    _cancel: CancellationToken,
) -> std::result::Result<(), errors::RelayError> {
    Err(errors::RelayError::Bind {
        path: match mode {
            Mode::Listen(p) | Mode::Connect(p) => p.clone(),
        },
        source: std::io::Error::new(
            std::io::ErrorKind::Unsupported,
            "UNIX sockets are not available on this platform",
        ),
    })
}

/// Cancel `cancel` on the first SIGINT (Ctrl-C) or SIGTERM.
fn spawn_shutdown_listener(cancel: CancellationToken) {
    tokio::spawn(async move {
        if let Err(e) = shutdown_signal().await {
            eprintln!("failed to listen for shutdown signals: {e}");
            return;
        }
        info!("received shutdown signal");
        cancel.cancel();
    });
}

#[cfg(unix)]
async fn shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut term = signal(SignalKind::terminate())?;
    tokio::select! {
        res = tokio::signal::ctrl_c() => res,
        _ = term.recv() => Ok(()),
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}
