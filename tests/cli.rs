// tests/cli.rs

use clap::Parser;

use zedamigo_exec::cli::{CliArgs, LogLevel, Mode};
use zedamigo_exec::logging::resolve_level;

#[test]
fn listen_mode_with_output_file() {
    let args = CliArgs::try_parse_from([
        "socket-tailer",
        "--listen",
        "/tmp/vm.sock",
        "--out",
        "/tmp/console.log",
        "-v",
    ])
    .expect("valid arguments");

    assert_eq!(args.mode(), Some(Mode::Listen("/tmp/vm.sock".into())));
    assert_eq!(args.out.as_deref(), Some(std::path::Path::new("/tmp/console.log")));
    assert!(args.verbose);
}

#[test]
fn connect_mode_defaults_to_stdout() {
    let args = CliArgs::try_parse_from(["socket-tailer", "--connect", "/tmp/vm.sock"])
        .expect("valid arguments");

    assert_eq!(args.mode(), Some(Mode::Connect("/tmp/vm.sock".into())));
    assert_eq!(args.mode().map(|m| m.name()), Some("connect"));
    assert!(args.out.is_none());
}

#[test]
fn exactly_one_mode_is_required() {
    assert!(CliArgs::try_parse_from(["socket-tailer"]).is_err());
    assert!(
        CliArgs::try_parse_from(["socket-tailer", "--listen", "a", "--connect", "b"]).is_err()
    );
}

#[test]
fn log_level_precedence() {
    use tracing::Level;

    assert_eq!(resolve_level(Some(LogLevel::Warn), true, Some("trace")), Level::WARN);
    assert_eq!(resolve_level(None, true, Some("error")), Level::DEBUG);
    assert_eq!(resolve_level(None, false, Some(" Trace ")), Level::TRACE);
    assert_eq!(resolve_level(None, false, Some("bogus")), Level::INFO);
    assert_eq!(resolve_level(None, false, None), Level::INFO);
}
