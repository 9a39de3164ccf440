// src/exec/buffer.rs

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Append-only byte buffer shared between the stream copiers and the caller.
///
/// Clones share the same storage. Writes never fail; the buffer grows for the
/// lifetime of one command invocation.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write(&self, bytes: &[u8]) {
        self.lock().extend_from_slice(bytes);
    }

    /// Copy of everything written so far.
    pub fn snapshot(&self) -> Vec<u8> {
        self.lock().clone()
    }

    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.lock()).into_owned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // A panicking writer cannot leave the Vec half-updated, so a poisoned
    // lock still guards valid data.
    fn lock(&self) -> MutexGuard<'_, Vec<u8>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
