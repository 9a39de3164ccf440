// src/config/model.rs

use serde::Deserialize;

/// Top-level settings as read from a TOML file.
///
/// ```toml
/// [exec]
/// poll_interval_ms = 100
/// detach_grace_ms = 250
///
/// [tailer]
/// sync_every = 100
/// reconnect_interval_ms = 337
/// timestamp_format = "%Y-%m-%d %H:%M:%S%.3f"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub exec: ExecSettings,

    #[serde(default)]
    pub tailer: TailerSettings,
}

/// `[exec]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ExecSettings {
    /// Interval between checks while waiting for a watched file to appear
    /// or grow.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// How long `run_detached` waits after spawning before it returns.
    #[serde(default = "default_detach_grace_ms")]
    pub detach_grace_ms: u64,
}

fn default_poll_interval_ms() -> u64 {
    100
}

fn default_detach_grace_ms() -> u64 {
    250
}

impl Default for ExecSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            detach_grace_ms: default_detach_grace_ms(),
        }
    }
}

/// `[tailer]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct TailerSettings {
    /// Number of lines written to a file sink between two `fsync` calls.
    #[serde(default = "default_sync_every")]
    pub sync_every: usize,

    /// Delay between connection attempts in client mode.
    #[serde(default = "default_reconnect_interval_ms")]
    pub reconnect_interval_ms: u64,

    /// `chrono` format string for the per-line timestamp prefix.
    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,
}

fn default_sync_every() -> usize {
    100
}

fn default_reconnect_interval_ms() -> u64 {
    337
}

fn default_timestamp_format() -> String {
    "%Y-%m-%d %H:%M:%S%.3f".to_string()
}

impl Default for TailerSettings {
    fn default() -> Self {
        Self {
            sync_every: default_sync_every(),
            reconnect_interval_ms: default_reconnect_interval_ms(),
            timestamp_format: default_timestamp_format(),
        }
    }
}
