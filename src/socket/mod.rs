// src/socket/mod.rs

//! Socket log relay.
//!
//! Carries newline-delimited text arriving on a UNIX socket into a
//! timestamped log sink. The [`Tailer`] owns the sink; the server and
//! client roles only read lines and hand them to [`Tailer::write_line`].

pub mod tailer;

#[cfg(unix)]
pub mod client;
#[cfg(unix)]
pub mod server;

pub use tailer::{Sink, Tailer};
