//! Narration settings.
//!
//! Hosts usually keep these next to the rest of their mod settings, so they
//! can be read from and written to TOML or JSON.
//!
//! ```toml
//! announce_position = true
//! announce_level_changes = false
//! reject_priority = "normal"
//! ```

use std::path::Path;

use horizon_narrate_core::{Error, Result};
use serde::{Deserialize, Serialize};

use crate::announce::Priority;

/// What gets spoken and how loudly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrationConfig {
    /// Say "X of Y" after each item.
    pub announce_position: bool,
    /// Say "level N" when the depth changes.
    pub announce_level_changes: bool,
    /// Say "expanded" or "collapsed" on expandable items.
    pub announce_expansion_state: bool,
    /// Play audio cues.
    pub feedback_cues: bool,
    /// Priority of rejection messages.
    pub reject_priority: Priority,
}

impl Default for NarrationConfig {
    fn default() -> Self {
        Self {
            announce_position: true,
            announce_level_changes: true,
            announce_expansion_state: true,
            feedback_cues: true,
            reject_priority: Priority::High,
        }
    }
}

impl NarrationConfig {
    /// Parses settings from a TOML string. Missing keys take defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::config("TOML", e.to_string()))
    }

    /// Parses settings from a JSON string. Missing keys take defaults.
    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| Error::config("JSON", e.to_string()))
    }

    /// Loads settings from a TOML file.
    pub fn load_toml(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_toml_str(&read_text(path.as_ref())?)
    }

    /// Loads settings from a JSON file.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json_str(&read_text(path.as_ref())?)
    }

    /// Saves settings to a TOML file.
    pub fn save_toml(&self, path: impl AsRef<Path>) -> Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| Error::config("TOML", e.to_string()))?;
        write_text(path.as_ref(), &content)
    }

    /// Saves settings to a JSON file.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| Error::config("JSON", e.to_string()))?;
        write_text(path.as_ref(), &content)
    }
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| Error::io(path, e))
}

fn write_text(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content).map_err(|e| Error::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = NarrationConfig::default();
        assert!(config.announce_position);
        assert!(config.feedback_cues);
        assert_eq!(config.reject_priority, Priority::High);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = NarrationConfig::from_toml_str(
            "announce_level_changes = false\nreject_priority = \"low\"\n",
        )
        .unwrap();
        assert!(!config.announce_level_changes);
        assert!(config.announce_position);
        assert_eq!(config.reject_priority, Priority::Low);
    }

    #[test]
    fn test_invalid_json() {
        let err = NarrationConfig::from_json_str("{\"feedback_cues\": 3}");
        assert!(matches!(err, Err(Error::Config { format: "JSON", .. })));
    }

    #[test]
    fn test_toml_file_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("narration.toml");
        let config = NarrationConfig {
            announce_position: false,
            ..Default::default()
        };

        config.save_toml(&path).unwrap();
        assert_eq!(NarrationConfig::load_toml(&path).unwrap(), config);
    }

    #[test]
    fn test_json_file_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("narration.json");
        let config = NarrationConfig {
            feedback_cues: false,
            reject_priority: Priority::Normal,
            ..Default::default()
        };

        config.save_json(&path).unwrap();
        assert_eq!(NarrationConfig::load_json(&path).unwrap(), config);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let err = NarrationConfig::load_toml(dir.path().join("absent.toml"));
        assert!(matches!(err, Err(Error::Io { .. })));
    }
}
