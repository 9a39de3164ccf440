// src/config/loader.rs

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::config::model::Settings;
use crate::config::validate::validate_settings;
use crate::errors::Result;

/// Load settings from a given path.
///
/// This only performs TOML deserialization; use [`load_and_validate`] to also
/// check the values.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<Settings> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let settings: Settings = toml::from_str(&contents)?;

    Ok(settings)
}

/// Load settings from path and validate them.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<Settings> {
    let settings = load_from_path(&path)?;
    validate_settings(&settings)?;
    Ok(settings)
}

/// Load and validate settings from `path` if one was given, otherwise return
/// the defaults.
pub fn load_or_default(path: Option<&Path>) -> Result<Settings> {
    match path {
        Some(p) => {
            debug!(path = ?p, "loading settings file");
            load_and_validate(p)
        }
        None => Ok(Settings::default()),
    }
}
