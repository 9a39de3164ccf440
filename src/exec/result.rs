// src/exec/result.rs

use std::fmt;
use std::path::PathBuf;

use crate::errors::ExecError;
use crate::exec::invocation::Invocation;

/// Paths of the two per-stream log files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogPaths {
    pub stdout: PathBuf,
    pub stderr: PathBuf,
}

/// Outcome of running an external command.
///
/// For the matching variants exactly one of `matched` (non-empty),
/// `timed_out` and `completed` explains why the call returned. A plain
/// launch only sets `completed`/`error`.
///
/// `exit_code` is only meaningful when the process exited on its own. A
/// non-zero exit code alone does not set `error`; callers must check both.
#[derive(Debug, Default)]
pub struct CommandResult {
    pub program: String,
    pub args: Vec<String>,
    pub pid: Option<u32>,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub logs: LogPaths,
    pub matched: String,
    pub completed: bool,
    pub timed_out: bool,
    pub error: Option<ExecError>,
}

/// One entry of the summary surfaced to users when a command fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub summary: String,
    pub detail: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.summary, self.detail)
    }
}

impl CommandResult {
    pub(crate) fn for_invocation(inv: &Invocation) -> Self {
        Self {
            program: inv.program.clone(),
            args: inv.args.clone(),
            ..Self::default()
        }
    }

    pub(crate) fn failed(mut self, err: ExecError) -> Self {
        self.error = Some(err);
        self
    }

    /// No error was recorded and, if the process finished on its own, it
    /// exited with status 0.
    pub fn is_success(&self) -> bool {
        self.error.is_none() && !(self.completed && self.exit_code != 0)
    }

    pub fn pattern_found(&self) -> bool {
        !self.matched.is_empty()
    }

    /// Turn a recorded error into `Err`, keeping the rest of the result
    /// available on success.
    pub fn into_result(mut self) -> Result<Self, ExecError> {
        match self.error.take() {
            Some(err) => Err(err),
            None => Ok(self),
        }
    }

    /// Exit code, arguments and the captured output, in the form the
    /// provisioning layer reports them. Captured output is usually the only
    /// hint about why an external tool failed, so it is passed verbatim.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        vec![
            Diagnostic {
                summary: format!("{} exit code: {}", self.program, self.exit_code),
                detail: format!("args: {:?}", self.args),
            },
            Diagnostic {
                summary: format!("{} stdout", self.program),
                detail: self.stdout.clone(),
            },
            Diagnostic {
                summary: format!("{} stderr", self.program),
                detail: self.stderr.clone(),
            },
        ]
    }
}

/// Which completion signal won a race.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RaceOutcome {
    PatternFound,
    TimedOut,
    ProcessExited,
}

impl fmt::Display for RaceOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RaceOutcome::PatternFound => "pattern_found",
            RaceOutcome::TimedOut => "timed_out",
            RaceOutcome::ProcessExited => "process_exited",
        };
        f.write_str(s)
    }
}
