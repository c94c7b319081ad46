//! Error types for the settings crate.

use std::io;
use std::path::PathBuf;

use gcodemeta_core::ConfigError;
use thiserror::Error;

/// Errors that can occur while loading or saving settings.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// The file extension is neither `.toml` nor `.json`.
    #[error("Config file must be .json or .toml: {0:?}")]
    UnsupportedFormat(PathBuf),

    /// No per-user configuration directory exists on this platform.
    #[error("Config directory error: {0}")]
    ConfigDirectory(String),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// TOML deserialization error.
    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("TOML error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// The loaded scan configuration failed validation.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for settings operations.
pub type SettingsResult<T> = Result<T, SettingsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_error_display() {
        let err = SettingsError::UnsupportedFormat(PathBuf::from("gcodemeta.yaml"));
        assert_eq!(
            err.to_string(),
            "Config file must be .json or .toml: \"gcodemeta.yaml\""
        );

        let err = SettingsError::ConfigDirectory("no home".to_string());
        assert_eq!(err.to_string(), "Config directory error: no home");
    }

    #[test]
    fn test_config_error_conversion() {
        let err: SettingsError = ConfigError::EmptyCommentMarker.into();
        assert!(matches!(err, SettingsError::Config(_)));
        assert_eq!(
            err.to_string(),
            "Config error: Comment marker must not be empty"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "missing");
        let err: SettingsError = io_err.into();
        assert!(matches!(err, SettingsError::IoError(_)));
    }
}
