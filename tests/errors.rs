// tests/errors.rs

use std::error::Error;
use std::io;

use zedamigo_exec::errors::{ExecError, MonitorError, contains_any};

#[derive(Debug)]
struct Wrapper {
    msg: &'static str,
    inner: io::Error,
}

impl std::fmt::Display for Wrapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.msg)
    }
}

impl Error for Wrapper {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.inner)
    }
}

#[test]
fn contains_any_walks_the_source_chain() {
    let err = Wrapper {
        msg: "ip link add failed",
        inner: io::Error::other("RTNETLINK answers: File exists"),
    };

    assert!(contains_any(&err, &["File exists"]));
    assert!(contains_any(&err, &["nope", "link add"]));
    assert!(!contains_any(&err, &["No such device"]));
    assert!(!contains_any(&err, &[]));
}

#[test]
fn contains_any_sees_through_exec_errors() {
    let err = ExecError::Monitor(MonitorError::Read(io::Error::other("disk on fire")));
    assert!(contains_any(&err, &["disk on fire"]));

    let err = ExecError::Spawn {
        program: "qemu-img".to_string(),
        source: io::Error::from(io::ErrorKind::NotFound),
    };
    assert!(contains_any(&err, &["qemu-img"]));
}

#[test]
fn error_messages_name_the_problem() {
    let err = ExecError::TimedOut {
        timeout: std::time::Duration::from_secs(2),
    };
    assert_eq!(err.to_string(), "command timed out after 2s");

    let err = ExecError::Signaled { signal: Some(9) };
    assert_eq!(err.to_string(), "command terminated abnormally (signal 9)");

    let err = MonitorError::PatternTooLong { len: 70, window: 64 };
    assert!(err.to_string().contains("70 bytes"));
}
