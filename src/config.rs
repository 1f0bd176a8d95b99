//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.
//!
//! Every section and every field is optional; missing values fall back to
//! the `default_*` functions below, so an empty file is a valid config.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{OverlayError, Result};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub screen: ScreenConfig,
    #[serde(default)]
    pub overlay: OverlayConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub touchscreen: TouchscreenConfig,
}

/// Screen size the default layout is derived from
#[derive(Debug, Deserialize, Clone)]
pub struct ScreenConfig {
    #[serde(default = "default_width")]
    pub width: u32,

    #[serde(default = "default_height")]
    pub height: u32,
}

/// Overlay behaviour
#[derive(Debug, Deserialize, Clone)]
pub struct OverlayConfig {
    /// Movement pad edge threshold divisor (threshold = width / divisor)
    #[serde(default = "default_edge_divisor")]
    pub dpad_edge_divisor: f32,

    /// Face-button pad edge threshold divisor
    #[serde(default = "default_edge_divisor")]
    pub face_edge_divisor: f32,

    /// Spawn floating sticks on touches that hit nothing
    #[serde(default = "default_floating_sticks")]
    pub floating_sticks: bool,
}

/// Layout persistence
#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    #[serde(default = "default_store_path")]
    pub path: String,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Touchscreen input configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct TouchscreenConfig {
    /// Empty means auto-detect
    #[serde(default)]
    pub device_path: String,

    /// Raw X range; 0 means same as the screen
    #[serde(default)]
    pub max_x: u32,

    /// Raw Y range; 0 means same as the screen
    #[serde(default)]
    pub max_y: u32,
}

// Default value functions
fn default_width() -> u32 { 1920 }
fn default_height() -> u32 { 1080 }

fn default_edge_divisor() -> f32 { 3.5 }
fn default_floating_sticks() -> bool { true }

fn default_store_path() -> String { "./overlay_layout.json".to_string() }

fn default_log_level() -> String { "info".to_string() }

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
        }
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            dpad_edge_divisor: default_edge_divisor(),
            face_edge_divisor: default_edge_divisor(),
            floating_sticks: default_floating_sticks(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { path: default_store_path() }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level() }
    }
}

const MAX_SCREEN_SIDE: u32 = 16384;
const EDGE_DIVISOR_RANGE: std::ops::RangeInclusive<f32> = 1.5..=6.0;
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

fn invalid(message: impl std::fmt::Display) -> OverlayError {
    OverlayError::Config(toml::de::Error::custom(message))
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use pad_overlay::config::Config;
    ///
    /// let config = Config::load("config/overlay.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("width", self.screen.width), ("height", self.screen.height)] {
            if value == 0 || value > MAX_SCREEN_SIDE {
                return Err(invalid(format!("screen {} must be between 1 and {}", name, MAX_SCREEN_SIDE)));
            }
        }

        for (name, value) in [
            ("dpad_edge_divisor", self.overlay.dpad_edge_divisor),
            ("face_edge_divisor", self.overlay.face_edge_divisor),
        ] {
            if !EDGE_DIVISOR_RANGE.contains(&value) {
                return Err(invalid(format!("{} must be between 1.5 and 6.0", name)));
            }
        }

        if self.store.path.is_empty() {
            return Err(invalid("store path cannot be empty"));
        }

        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(invalid(format!("log level must be one of: {}", LOG_LEVELS.join(", "))));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Defaults Tests ====================

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.screen.width, 1920);
        assert_eq!(config.screen.height, 1080);
        assert_eq!(config.overlay.dpad_edge_divisor, 3.5);
        assert_eq!(config.overlay.face_edge_divisor, 3.5);
        assert!(config.overlay.floating_sticks);
        assert_eq!(config.store.path, "./overlay_layout.json");
        assert_eq!(config.logging.level, "info");
        assert!(config.touchscreen.device_path.is_empty());
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.screen.width, default_width());
        assert_eq!(config.overlay.dpad_edge_divisor, default_edge_divisor());
    }

    // ==================== Loading Tests ====================

    #[test]
    fn test_load_config_from_file() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let toml_content = r#"
[screen]
width = 2400
height = 1080

[overlay]
face_edge_divisor = 3.0
floating_sticks = false

[logging]
level = "debug"

[touchscreen]
device_path = "/dev/input/event3"
max_x = 4095
max_y = 4095
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = Config::load(temp_file.path()).unwrap();
        assert_eq!(config.screen.width, 2400);
        assert_eq!(config.overlay.face_edge_divisor, 3.0);
        assert_eq!(config.overlay.dpad_edge_divisor, 3.5);
        assert!(!config.overlay.floating_sticks);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.touchscreen.max_x, 4095);
        assert_eq!(config.store.path, default_store_path());
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"[screen]\nwidth = 0\n").unwrap();
        temp_file.flush().unwrap();

        let result = Config::load(temp_file.path());
        assert!(matches!(result, Err(OverlayError::Config(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::load(dir.path().join("missing.toml"));
        assert!(matches!(result, Err(OverlayError::Io(_))));
    }

    #[test]
    fn test_load_malformed_toml() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"[screen\nwidth = ").unwrap();
        temp_file.flush().unwrap();

        assert!(matches!(Config::load(temp_file.path()), Err(OverlayError::Config(_))));
    }

    // ==================== Validation Tests ====================

    #[test]
    fn test_screen_height_zero() {
        let mut config = Config::default();
        config.screen.height = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_screen_too_large() {
        let mut config = Config::default();
        config.screen.width = MAX_SCREEN_SIDE + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_edge_divisor_bounds() {
        let mut config = Config::default();
        config.overlay.dpad_edge_divisor = 1.5;
        config.overlay.face_edge_divisor = 6.0;
        assert!(config.validate().is_ok());

        config.overlay.dpad_edge_divisor = 1.4;
        assert!(config.validate().is_err());

        config.overlay.dpad_edge_divisor = 3.5;
        config.overlay.face_edge_divisor = 6.5;
        assert!(config.validate().is_err());

        config.overlay.face_edge_divisor = f32::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_store_path() {
        let mut config = Config::default();
        config.store.path = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "verbose".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("log level"));
    }
}
