// src/config/mod.rs

//! Settings for the execution engines and the socket relay.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a settings file from disk (`loader.rs`).
//! - Reject values the engines cannot work with (`validate.rs`).
//!
//! Every field has a default, so an absent file and an empty file behave the
//! same.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, load_or_default};
pub use model::{ExecSettings, Settings, TailerSettings};
pub use validate::validate_settings;
