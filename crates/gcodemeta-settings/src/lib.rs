//! gcodemeta Settings Crate
//!
//! Loads, validates and saves the scan configuration from TOML or JSON files.

pub mod config;
pub mod error;

pub use config::{Settings, CONFIG_FILE_NAME};
pub use error::{SettingsError, SettingsResult};
