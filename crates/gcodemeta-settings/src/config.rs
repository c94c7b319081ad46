//! Settings file handling
//!
//! A settings file holds a `[scan]` table with the [`ScanConfig`] tunables
//! and a default log filter. Either TOML or JSON is accepted, chosen by the
//! file extension. Missing keys take their defaults.

use std::path::{Path, PathBuf};

use gcodemeta_core::{AttributeRegistry, ScanConfig};
use serde::{Deserialize, Serialize};

use crate::error::{SettingsError, SettingsResult};

/// File name looked up inside the per-user config directory
pub const CONFIG_FILE_NAME: &str = "config.toml";

const APP_DIR: &str = "gcodemeta";

/// Persisted settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Log filter used when `RUST_LOG` is not set
    pub log_filter: String,
    /// Extraction tunables
    pub scan: ScanConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_filter: "info".to_string(),
            scan: ScanConfig::default(),
        }
    }
}

enum Format {
    Json,
    Toml,
}

impl Format {
    fn from_path(path: &Path) -> SettingsResult<Self> {
        if path.extension().is_some_and(|ext| ext == "json") {
            Ok(Self::Json)
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            Ok(Self::Toml)
        } else {
            Err(SettingsError::UnsupportedFormat(path.to_path_buf()))
        }
    }
}

impl Settings {
    /// Default settings file location, `<config dir>/gcodemeta/config.toml`
    pub fn default_path() -> SettingsResult<PathBuf> {
        let base = dirs::config_dir().ok_or_else(|| {
            SettingsError::ConfigDirectory("no configuration directory on this platform".into())
        })?;
        Ok(base.join(APP_DIR).join(CONFIG_FILE_NAME))
    }

    /// Load settings from file (JSON or TOML) and validate them
    pub fn load_from_file(path: &Path, registry: &AttributeRegistry) -> SettingsResult<Self> {
        let format = Format::from_path(path)?;
        let content = std::fs::read_to_string(path)?;

        let settings: Self = match format {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        settings.validate(registry)?;
        Ok(settings)
    }

    /// Load the default settings file, or defaults when there is none
    pub fn load_or_default(registry: &AttributeRegistry) -> SettingsResult<Self> {
        match Self::default_path() {
            Ok(path) if path.is_file() => Self::load_from_file(&path, registry),
            _ => Ok(Self::default()),
        }
    }

    /// Save settings to file (JSON or TOML), creating parent directories
    pub fn save_to_file(&self, path: &Path, registry: &AttributeRegistry) -> SettingsResult<()> {
        self.validate(registry)?;

        let content = match Format::from_path(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Validate settings against the registry extraction will use
    pub fn validate(&self, registry: &AttributeRegistry) -> SettingsResult<()> {
        self.scan.validate(registry)?;
        Ok(())
    }
}
