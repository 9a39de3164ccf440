// src/config/validate.rs

use chrono::format::{Item, StrftimeItems};

use crate::config::model::Settings;
use crate::errors::{Result, ZedamigoError};

/// Check the values the engines rely on being non-degenerate.
pub fn validate_settings(settings: &Settings) -> Result<()> {
    if settings.exec.poll_interval_ms == 0 {
        return Err(ZedamigoError::ConfigError(
            "exec.poll_interval_ms must be greater than 0".to_string(),
        ));
    }

    if settings.tailer.sync_every == 0 {
        return Err(ZedamigoError::ConfigError(
            "tailer.sync_every must be greater than 0".to_string(),
        ));
    }

    if settings.tailer.reconnect_interval_ms == 0 {
        return Err(ZedamigoError::ConfigError(
            "tailer.reconnect_interval_ms must be greater than 0".to_string(),
        ));
    }

    if settings.tailer.timestamp_format.trim().is_empty() {
        return Err(ZedamigoError::ConfigError(
            "tailer.timestamp_format must not be empty".to_string(),
        ));
    }

    if StrftimeItems::new(&settings.tailer.timestamp_format).any(|item| matches!(item, Item::Error)) {
        return Err(ZedamigoError::ConfigError(format!(
            "tailer.timestamp_format {:?} is not a valid strftime format",
            settings.tailer.timestamp_format
        )));
    }

    Ok(())
}
