// src/watch/mod.rs

//! Watching a file written by somebody else for a literal pattern.
//!
//! The monitor is poll based on purpose: the writer (typically a VM serial
//! console) is not under our control, the file can be truncated or rotated
//! underneath us, and the only state worth keeping is a read offset plus a
//! small carry-over window.
//!
//! - [`cursor`] holds that per-file state and the split-pattern search.
//! - [`monitor`] drives the stat / seek / read loop.

pub mod cursor;
pub mod monitor;

pub use cursor::{CARRY_WINDOW, READ_CHUNK, SizeChange, WatchCursor};
pub use monitor::{MonitorOutcome, monitor_file_for, wait_for_file};
