// tests/config.rs

mod common;
use crate::common::init_tracing;

use std::error::Error;
use std::io::Write;
use std::time::Duration;

use tempfile::NamedTempFile;

use zedamigo_exec::config::{Settings, load_and_validate, load_from_path, load_or_default, validate_settings};
use zedamigo_exec::errors::ZedamigoError;
use zedamigo_exec::exec::ExecOptions;

type TestResult = Result<(), Box<dyn Error>>;

fn write_config(contents: &str) -> Result<NamedTempFile, Box<dyn Error>> {
    let mut file = NamedTempFile::new()?;
    file.write_all(contents.as_bytes())?;
    Ok(file)
}

#[test]
fn empty_file_gives_defaults() -> TestResult {
    init_tracing();
    let file = write_config("")?;
    let settings = load_and_validate(file.path())?;

    assert_eq!(settings.exec.poll_interval_ms, 100);
    assert_eq!(settings.exec.detach_grace_ms, 250);
    assert_eq!(settings.tailer.sync_every, 100);
    assert_eq!(settings.tailer.reconnect_interval_ms, 337);
    assert_eq!(settings.tailer.timestamp_format, "%Y-%m-%d %H:%M:%S%.3f");
    Ok(())
}

#[test]
fn sections_override_defaults() -> TestResult {
    init_tracing();
    let file = write_config(
        r#"
[exec]
poll_interval_ms = 50

[tailer]
sync_every = 10
timestamp_format = "%H:%M:%S"
"#,
    )?;
    let settings = load_and_validate(file.path())?;

    assert_eq!(settings.exec.poll_interval_ms, 50);
    assert_eq!(settings.exec.detach_grace_ms, 250);
    assert_eq!(settings.tailer.sync_every, 10);
    assert_eq!(settings.tailer.reconnect_interval_ms, 337);
    assert_eq!(settings.tailer.timestamp_format, "%H:%M:%S");

    let options = ExecOptions::from(&settings.exec);
    assert_eq!(options.poll_interval, Duration::from_millis(50));
    assert_eq!(options.detach_grace, Duration::from_millis(250));
    Ok(())
}

#[test]
fn zero_values_are_rejected() -> TestResult {
    init_tracing();
    for (toml, field) in [
        ("[exec]\npoll_interval_ms = 0\n", "exec.poll_interval_ms"),
        ("[tailer]\nsync_every = 0\n", "tailer.sync_every"),
        ("[tailer]\nreconnect_interval_ms = 0\n", "tailer.reconnect_interval_ms"),
    ] {
        let file = write_config(toml)?;
        // Parsing alone accepts it.
        load_from_path(file.path())?;

        match load_and_validate(file.path()) {
            Err(ZedamigoError::ConfigError(msg)) => assert!(msg.contains(field), "{msg}"),
            other => panic!("expected config error for {field}, got {other:?}"),
        }
    }
    Ok(())
}

#[test]
fn bad_timestamp_formats_are_rejected() {
    init_tracing();
    let mut settings = Settings::default();

    settings.tailer.timestamp_format = "   ".to_string();
    assert!(matches!(validate_settings(&settings), Err(ZedamigoError::ConfigError(_))));

    settings.tailer.timestamp_format = "%Y-%Q".to_string();
    assert!(matches!(validate_settings(&settings), Err(ZedamigoError::ConfigError(_))));
}

#[test]
fn malformed_toml_is_a_toml_error() -> TestResult {
    init_tracing();
    let file = write_config("[exec\npoll_interval_ms = ")?;
    assert!(matches!(load_from_path(file.path()), Err(ZedamigoError::TomlError(_))));
    Ok(())
}

#[test]
fn missing_file_is_an_io_error() {
    init_tracing();
    let res = load_from_path("/definitely/not/here/zedamigo.toml");
    assert!(matches!(res, Err(ZedamigoError::IoError(_))));
}

#[test]
fn load_or_default_without_path() -> TestResult {
    init_tracing();
    let settings = load_or_default(None)?;
    assert_eq!(settings.tailer.sync_every, 100);
    Ok(())
}
