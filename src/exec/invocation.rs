// src/exec/invocation.rs

use std::path::{Path, PathBuf};

/// A single external command to run, together with the directory its logs
/// go to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub log_dir: PathBuf,
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new(log_dir: impl Into<PathBuf>, program: impl Into<String>) -> Self {
        Self {
            log_dir: log_dir.into(),
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Base name of the program, used in log file names.
    pub fn program_name(&self) -> String {
        Path::new(&self.program)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.program.clone())
    }

    /// Human readable form written to the `_command.log` file.
    pub fn describe(&self) -> String {
        format!("command={} args=[{}]\n", self.program, self.args.join(" "))
    }
}
