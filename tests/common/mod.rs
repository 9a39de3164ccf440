#![allow(dead_code)]

use std::path::Path;
use std::time::Duration;

pub use zedamigo_exec_test_utils::{files, fixed_clock, init_tracing, with_timeout};

use zedamigo_exec::exec::{ExecOptions, Executor};

/// Executor with a pinned clock (2003-01-01 00:00:00) and fast polling.
pub fn test_executor() -> Executor {
    Executor::new()
        .with_clock(fixed_clock(2003, 1, 1))
        .with_options(ExecOptions {
            poll_interval: Duration::from_millis(20),
            detach_grace: Duration::from_millis(500),
        })
}

/// Whether a process with this pid can still be signalled.
#[cfg(unix)]
pub fn pid_alive(pid: u32) -> bool {
    std::process::Command::new("kill")
        .args(["-0", &pid.to_string()])
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Poll `path` until its content satisfies `pred` or two seconds pass.
pub async fn wait_for_content<F>(path: &Path, pred: F) -> String
where
    F: Fn(&str) -> bool,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    loop {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        if pred(&content) || tokio::time::Instant::now() >= deadline {
            return content;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}
