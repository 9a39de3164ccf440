// src/cli.rs

//! CLI argument parsing for `socket-tailer` using `clap`.

use std::path::PathBuf;

use clap::{ArgGroup, Parser, ValueEnum};

/// Command-line arguments for `socket-tailer`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "socket-tailer",
    version,
    about = "Log lines from a UNIX socket with a timestamp prefix.",
    long_about = None
)]
#[command(group(ArgGroup::new("mode").required(true).args(["listen", "connect"])))]
pub struct CliArgs {
    /// Listen on a UNIX socket at the given path.
    #[arg(long, value_name = "PATH")]
    pub listen: Option<PathBuf>,

    /// Connect to an existing UNIX socket at the given path.
    #[arg(long, value_name = "PATH")]
    pub connect: Option<PathBuf>,

    /// Output file, appended to and created if missing (default: stdout).
    #[arg(long, value_name = "FILE")]
    pub out: Option<PathBuf>,

    /// Verbose logging (same as `--log-level debug`).
    #[arg(short, long)]
    pub verbose: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `-v`, then `ZEDAMIGO_LOG`, then `info` is used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Settings file (TOML). Built-in defaults are used when omitted.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Which role the relay plays, and on which socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Listen(PathBuf),
    Connect(PathBuf),
}

impl Mode {
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Listen(_) => "listen",
            Mode::Connect(_) => "connect",
        }
    }
}

impl CliArgs {
    /// The selected role. `None` only if the arguments were built by hand
    /// without either socket path.
    pub fn mode(&self) -> Option<Mode> {
        match (&self.listen, &self.connect) {
            (Some(path), None) => Some(Mode::Listen(path.clone())),
            (None, Some(path)) => Some(Mode::Connect(path.clone())),
            _ => None,
        }
    }
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
