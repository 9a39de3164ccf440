// src/exec/signal.rs

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::oneshot;

/// Single-slot "pattern found" notification shared by the stream scanners.
///
/// The first `notify` completes the paired receiver; later calls are silent
/// no-ops. Once every clone is dropped without a notification the receiver
/// resolves to `Err`, which the race treats as "this leg will never fire".
#[derive(Debug, Clone)]
pub(crate) struct MatchSignal {
    slot: Arc<Mutex<Option<oneshot::Sender<()>>>>,
}

impl MatchSignal {
    pub(crate) fn new() -> (Self, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel();
        let signal = Self {
            slot: Arc::new(Mutex::new(Some(tx))),
        };
        (signal, rx)
    }

    /// Returns `true` only for the call that actually delivered the signal.
    pub(crate) fn notify(&self) -> bool {
        let sender = self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        match sender {
            Some(tx) => tx.send(()).is_ok(),
            None => false,
        }
    }
}
