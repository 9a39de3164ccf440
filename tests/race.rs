// tests/race.rs

mod common;
use crate::common::{init_tracing, test_executor, with_timeout};

use std::error::Error;
use std::time::{Duration, Instant};

use tempfile::tempdir;

use zedamigo_exec::errors::ExecError;
use zedamigo_exec::exec::Invocation;

type TestResult = Result<(), Box<dyn Error>>;

const NINE_LINES: &str = "for i in 1 2 3 4 5 6 7 8 9; do echo \"line $i\"; sleep 0.1; done";

#[tokio::test]
async fn pattern_in_stdout_stops_the_command() -> TestResult {
    init_tracing();
    let dir = tempdir()?;

    let inv = Invocation::new(dir.path(), "sh").args(["-c", NINE_LINES]);
    let res = with_timeout(test_executor().run_match(inv, "line 6", Duration::from_secs(4))).await;

    assert!(res.error.is_none(), "unexpected error: {:?}", res.error);
    assert_eq!(res.matched, "line 6");
    assert!(res.pattern_found());
    assert!(!res.completed);
    assert!(!res.timed_out);
    assert_eq!(
        res.stdout,
        "line 1\nline 2\nline 3\nline 4\nline 5\nline 6\n"
    );

    let logged = std::fs::read_to_string(&res.logs.stdout)?;
    assert!(logged.ends_with("line 6\n"));
    assert!(!logged.contains("line 7"));

    Ok(())
}

#[tokio::test]
async fn pattern_in_stderr_counts_too() -> TestResult {
    init_tracing();
    let dir = tempdir()?;

    let inv = Invocation::new(dir.path(), "sh").args(["-c", "echo booting; echo ready >&2; sleep 10"]);
    let started = Instant::now();
    let res = with_timeout(test_executor().run_match(inv, "ready", Duration::from_secs(4))).await;

    assert_eq!(res.matched, "ready");
    assert!(!res.completed);
    assert!(started.elapsed() < Duration::from_secs(3));
    assert_eq!(res.stderr, "ready\n");

    Ok(())
}

#[cfg(unix)]
#[tokio::test]
async fn deadline_kills_the_command() -> TestResult {
    init_tracing();
    let dir = tempdir()?;

    let inv = Invocation::new(dir.path(), "sh").args(["-c", "echo waiting; exec sleep 10"]);
    let res = with_timeout(test_executor().run_match(
        inv,
        "never printed",
        Duration::from_millis(400),
    ))
    .await;

    assert!(res.timed_out);
    assert!(res.matched.is_empty());
    assert!(!res.completed);
    assert!(matches!(res.error, Some(ExecError::TimedOut { .. })));
    assert_eq!(res.stdout, "waiting\n");

    let pid = res.pid.ok_or("no pid recorded")?;
    assert!(!common::pid_alive(pid), "command {pid} still running after timeout");

    Ok(())
}

#[tokio::test]
async fn natural_exit_without_pattern_completes() -> TestResult {
    init_tracing();
    let dir = tempdir()?;

    let inv = Invocation::new(dir.path(), "echo").arg("nothing to see");
    let res = with_timeout(test_executor().run_match(inv, "ready", Duration::from_secs(4))).await;

    assert!(res.completed);
    assert!(!res.timed_out);
    assert!(res.matched.is_empty());
    assert_eq!(res.exit_code, 0);
    assert_eq!(res.stdout, "nothing to see\n");
    assert!(res.is_success());

    Ok(())
}

#[tokio::test]
async fn natural_exit_reports_exit_code() -> TestResult {
    init_tracing();
    let dir = tempdir()?;

    let inv = Invocation::new(dir.path(), "sh").args(["-c", "echo oops; exit 4"]);
    let res = with_timeout(test_executor().run_match(inv, "ready", Duration::from_secs(4))).await;

    assert!(res.completed);
    assert_eq!(res.exit_code, 4);
    assert!(res.error.is_none());

    Ok(())
}

#[tokio::test]
async fn race_writes_command_log() -> TestResult {
    init_tracing();
    let dir = tempdir()?;

    let inv = Invocation::new(dir.path(), "echo").args(["a", "b"]);
    let res = with_timeout(test_executor().run_match(inv, "a b", Duration::from_secs(4))).await;
    assert!(res.error.is_none());

    let command_log = dir.path().join("20030101_000000_echo_command.log");
    assert_eq!(std::fs::read_to_string(command_log)?, "command=echo args=[a b]\n");

    Ok(())
}

#[tokio::test]
async fn run_match_bg_delivers_result() -> TestResult {
    init_tracing();
    let dir = tempdir()?;

    let inv = Invocation::new(dir.path(), "sh").args(["-c", NINE_LINES]);
    let rx = test_executor().run_match_bg(inv, "line 3", Duration::from_secs(4));
    let res = with_timeout(rx).await?;

    assert_eq!(res.matched, "line 3");
    assert_eq!(res.stdout, "line 1\nline 2\nline 3\n");

    Ok(())
}

#[tokio::test]
async fn spawn_failure_is_captured() -> TestResult {
    init_tracing();
    let dir = tempdir()?;

    let inv = Invocation::new(dir.path(), "no-such-binary-for-race-test");
    let res = test_executor().run_match(inv, "x", Duration::from_secs(1)).await;

    assert!(matches!(res.error, Some(ExecError::Spawn { .. })));
    assert!(!res.timed_out);
    assert!(!res.completed);

    Ok(())
}

#[tokio::test]
async fn burst_before_exit_near_deadline_is_fully_captured() -> TestResult {
    init_tracing();
    let dir = tempdir()?;

    let inv = Invocation::new(dir.path(), "sh").args(["-c", "sleep 0.3; seq 1 30000"]);
    let res = with_timeout(test_executor().run_match(inv, "never", Duration::from_millis(800))).await;

    assert!(res.completed, "command should exit before the deadline: {res:?}");
    assert!(!res.timed_out);
    assert_eq!(res.exit_code, 0);
    assert!(res.error.is_none());

    let expected: String = (1..=30000).map(|n| format!("{n}\n")).collect();
    assert_eq!(res.stdout.lines().count(), 30000);
    assert_eq!(res.stdout, expected);
    assert_eq!(std::fs::read_to_string(&res.logs.stdout)?, expected);

    Ok(())
}
