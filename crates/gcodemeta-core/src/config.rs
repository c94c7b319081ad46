//! Scan configuration
//!
//! Window bounds, the comment marker and the completeness policy are all
//! injectable. The defaults read 400 KB from the start and 40 KB from the
//! end of a file, which covers the header and footer blocks of every
//! supported slicer, thumbnails included.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::registry::{attr, AttributeRegistry};

/// Default bytes read from the start of a file
pub const DEFAULT_HEAD_WINDOW: usize = 400_000;

/// Default bytes read from the end of a file
pub const DEFAULT_TAIL_WINDOW: usize = 40_000;

/// Largest accepted window (64 MiB)
pub const MAX_WINDOW: usize = 64 * 1024 * 1024;

/// Tunables for the quick/full extraction pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Bytes read from the start of the file by the quick parser
    pub head_window: usize,
    /// Bytes read from the end of the file by the quick parser
    pub tail_window: usize,
    /// Prefix identifying a comment line (after leading whitespace)
    pub comment_marker: String,
    /// Attributes that must be present for the quick parse to be complete
    pub required: Vec<String>,
    /// Decode embedded preview images while scanning
    pub thumbnails: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            head_window: DEFAULT_HEAD_WINDOW,
            tail_window: DEFAULT_TAIL_WINDOW,
            comment_marker: ";".to_string(),
            required: vec![
                attr::ESTIMATED_TIME.to_string(),
                attr::FILAMENT_USED_MM.to_string(),
            ],
            thumbnails: true,
        }
    }
}

impl ScanConfig {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the same bound for both windows
    pub fn with_window(mut self, bytes: usize) -> Self {
        self.head_window = bytes;
        self.tail_window = bytes;
        self
    }

    /// Replace the completeness policy
    pub fn with_required<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required = names.into_iter().map(Into::into).collect();
        self
    }

    /// Enable or disable thumbnail decoding
    pub fn with_thumbnails(mut self, enabled: bool) -> Self {
        self.thumbnails = enabled;
        self
    }

    /// Check whether `line` is a comment under this config
    pub fn is_comment(&self, line: &str) -> bool {
        line.trim_start().starts_with(self.comment_marker.as_str())
    }

    /// Validate against the registry the config will be used with
    pub fn validate(&self, registry: &AttributeRegistry) -> Result<(), ConfigError> {
        for (key, value) in [("head_window", self.head_window), ("tail_window", self.tail_window)] {
            if value == 0 || value > MAX_WINDOW {
                return Err(ConfigError::ValueOutOfRange {
                    key: key.to_string(),
                    value: value.to_string(),
                });
            }
        }

        if self.comment_marker.trim().is_empty() {
            return Err(ConfigError::EmptyCommentMarker);
        }
        // lines are compared after trim_start
        if self.comment_marker != self.comment_marker.trim_start() {
            return Err(ConfigError::PaddedCommentMarker(self.comment_marker.clone()));
        }

        if let Some(unknown) = self.required.iter().find(|name| !registry.contains(name)) {
            return Err(ConfigError::UnknownAttribute(unknown.clone()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ScanConfig::default();
        assert!(config.validate(&AttributeRegistry::standard()).is_ok());
        assert_eq!(config.head_window, 400_000);
        assert_eq!(config.tail_window, 40_000);
    }

    #[test]
    fn test_comment_detection() {
        let config = ScanConfig::default();
        assert!(config.is_comment(";TIME:3600"));
        assert!(config.is_comment("   ; indented"));
        assert!(!config.is_comment("G1 X10 ; trailing"));
        assert!(!config.is_comment(""));
    }

    #[test]
    fn test_invalid_configs() {
        let registry = AttributeRegistry::standard();

        let config = ScanConfig::default().with_window(0);
        assert!(matches!(
            config.validate(&registry),
            Err(ConfigError::ValueOutOfRange { .. })
        ));

        let config = ScanConfig {
            comment_marker: " ".to_string(),
            ..ScanConfig::default()
        };
        assert_eq!(config.validate(&registry), Err(ConfigError::EmptyCommentMarker));

        let config = ScanConfig {
            comment_marker: " ;".to_string(),
            ..ScanConfig::default()
        };
        assert!(!config.is_comment(" ; indented"));
        assert_eq!(
            config.validate(&registry),
            Err(ConfigError::PaddedCommentMarker(" ;".to_string()))
        );

        let config = ScanConfig {
            comment_marker: "//".to_string(),
            ..ScanConfig::default()
        };
        assert!(config.validate(&registry).is_ok());

        let config = ScanConfig::default().with_required(["spool_colour"]);
        assert_eq!(
            config.validate(&registry),
            Err(ConfigError::UnknownAttribute("spool_colour".to_string()))
        );
    }

    #[test]
    fn test_partial_config_deserializes_with_defaults() {
        let config: ScanConfig = serde_json::from_str(r#"{"head_window": 1024}"#).unwrap();
        assert_eq!(config.head_window, 1024);
        assert_eq!(config.tail_window, DEFAULT_TAIL_WINDOW);
        assert_eq!(config.comment_marker, ";");
        assert!(config.thumbnails);
    }
}
