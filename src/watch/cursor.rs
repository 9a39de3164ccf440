// src/watch/cursor.rs

use crate::lines::contains_bytes;

/// Size of the carry-over window, and therefore the longest pattern the
/// monitor accepts.
pub const CARRY_WINDOW: usize = 64;

/// Maximum number of bytes read from the watched file per iteration.
pub const READ_CHUNK: usize = 4096;

/// How the watched file's size compares to what has been read so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeChange {
    Unchanged,
    Grown,
    Truncated,
}

/// Read position and carry-over window for one watched file.
///
/// The window keeps the tail of the previous chunk so a pattern written in
/// two pieces is still found, as long as it fits in [`CARRY_WINDOW`].
#[derive(Debug, Clone)]
pub struct WatchCursor {
    offset: u64,
    carry: [u8; CARRY_WINDOW],
    carry_len: usize,
    generation: u64,
}

impl Default for WatchCursor {
    fn default() -> Self {
        Self::new()
    }
}

impl WatchCursor {
    pub fn new() -> Self {
        Self {
            offset: 0,
            carry: [0; CARRY_WINDOW],
            carry_len: 0,
            generation: 0,
        }
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Number of truncations observed so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn carry(&self) -> &[u8] {
        &self.carry[..self.carry_len]
    }

    pub fn classify(&self, size: u64) -> SizeChange {
        match size.cmp(&self.offset) {
            std::cmp::Ordering::Equal => SizeChange::Unchanged,
            std::cmp::Ordering::Greater => SizeChange::Grown,
            std::cmp::Ordering::Less => SizeChange::Truncated,
        }
    }

    /// Start over from the beginning of the file. The carried bytes belong
    /// to content that no longer exists and are dropped.
    pub fn reset(&mut self) {
        self.offset = 0;
        self.carry_len = 0;
        self.generation += 1;
    }

    /// Account for a freshly read chunk and search carry + chunk for
    /// `pattern`.
    ///
    /// On a miss the window is replaced (not extended) by the tail of the
    /// chunk.
    pub fn ingest(&mut self, chunk: &[u8], pattern: &[u8]) -> bool {
        self.offset += chunk.len() as u64;

        let mut combined = Vec::with_capacity(self.carry_len + chunk.len());
        combined.extend_from_slice(self.carry());
        combined.extend_from_slice(chunk);
        if contains_bytes(&combined, pattern) {
            return true;
        }

        let tail = &chunk[chunk.len().saturating_sub(CARRY_WINDOW)..];
        self.carry[..tail.len()].copy_from_slice(tail);
        self.carry_len = tail.len();
        false
    }
}
