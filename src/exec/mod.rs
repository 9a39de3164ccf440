// src/exec/mod.rs

//! Launching external commands and deciding when they are "done".
//!
//! Responsibilities:
//! - Capture a command's output into per-stream log files and memory
//!   (`buffer.rs`, `launcher.rs`).
//! - Plain, background and detached launches (`launcher.rs`, `detach.rs`).
//! - Race a pattern in the command's own output against a deadline and the
//!   command's exit (`race.rs`).
//! - The same race with the pattern expected in a separate file
//!   (`match_file.rs`).
//!
//! Every engine returns a [`CommandResult`]; failures are recorded in it,
//! never returned across a task boundary.

pub mod buffer;
pub mod detach;
pub mod invocation;
pub mod launcher;
pub mod match_file;
pub mod race;
pub mod result;

mod signal;

pub use buffer::SharedBuffer;
pub use detach::DetachExt;
pub use invocation::Invocation;
pub use launcher::{ExecOptions, Executor};
pub use result::{CommandResult, Diagnostic, LogPaths};
