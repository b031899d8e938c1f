//! Engine configuration system
//!
//! Provides configuration structures that applications can use to customize
//! engine behavior without hardcoding values, plus file loading in TOML and
//! RON formats.

use serde::{Serialize, Deserialize};
use std::str::FromStr;
use thiserror::Error;

use crate::foundation::math::Size2;

/// Configuration trait with file loading support
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(ConfigError::Io)?;

        // Try different formats
        if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, Default::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Unknown graphics driver name
    #[error("Unknown graphics driver: {0}")]
    UnknownDriver(String),
}

/// Graphics driver selection
///
/// Names the backend the renderer binds to. Only the headless device ships
/// with the engine crate; GPU drivers are provided by backend crates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Driver {
    /// Headless device (no GPU, validation and statistics only)
    Headless,
    /// OpenGL backend
    OpenGl,
    /// Direct3D 11 backend
    Direct3D11,
    /// Metal backend
    Metal,
}

impl FromStr for Driver {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "headless" => Ok(Self::Headless),
            "opengl" => Ok(Self::OpenGl),
            "direct3d11" | "d3d11" => Ok(Self::Direct3D11),
            "metal" => Ok(Self::Metal),
            other => Err(ConfigError::UnknownDriver(other.to_string())),
        }
    }
}

/// Window settings consumed by the renderer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowSettings {
    /// Back buffer width in pixels
    pub width: f32,
    /// Back buffer height in pixels
    pub height: f32,
    /// Window title
    pub title: String,
    /// Whether the window can be resized
    pub resizable: bool,
    /// Whether the window starts fullscreen
    pub fullscreen: bool,
}

impl WindowSettings {
    /// Window size as a `Size2`
    pub fn size(&self) -> Size2 {
        Size2::new(self.width, self.height)
    }
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            title: "ember".to_string(),
            resizable: false,
            fullscreen: false,
        }
    }
}

/// Device settings consumed by the renderer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceSettings {
    /// Graphics driver to bind
    pub driver: Driver,
    /// Background clear color [R, G, B, A] (0.0-1.0 range)
    pub clear_color: [f32; 4],
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            driver: Driver::Headless,
            clear_color: [0.005, 0.005, 0.005, 1.0], // Dark gray background
        }
    }
}

/// Top-level engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Window settings
    pub window: WindowSettings,
    /// Device settings
    pub device: DeviceSettings,
}

impl Config for EngineConfig {}

impl EngineConfig {
    /// Create a configuration with the given window title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            window: WindowSettings {
                title: title.into(),
                ..Default::default()
            },
            device: DeviceSettings::default(),
        }
    }

    /// Set the back buffer size
    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.window.width = width;
        self.window.height = height;
        self
    }

    /// Set the graphics driver
    pub fn with_driver(mut self, driver: Driver) -> Self {
        self.device.driver = driver;
        self
    }

    /// Set the background clear color [R, G, B, A] (0.0-1.0 range)
    pub fn with_clear_color(mut self, color: [f32; 4]) -> Self {
        self.device.clear_color = color;
        self
    }

    /// Enable or disable window resizing
    pub fn with_resizable(mut self, resizable: bool) -> Self {
        self.window.resizable = resizable;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_from_str() {
        assert_eq!(Driver::from_str("headless").unwrap(), Driver::Headless);
        assert_eq!(Driver::from_str("OpenGL").unwrap(), Driver::OpenGl);
        assert_eq!(Driver::from_str("d3d11").unwrap(), Driver::Direct3D11);
    }

    #[test]
    fn test_unknown_driver_names_offender() {
        let err = Driver::from_str("vulkan12").unwrap_err();
        assert!(err.to_string().contains("vulkan12"));
    }

    #[test]
    fn test_config_roundtrip_toml() {
        let config = EngineConfig::new("test window")
            .with_size(1024.0, 768.0)
            .with_driver(Driver::Headless);

        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: EngineConfig = toml::from_str(&serialized).unwrap();

        assert_eq!(deserialized.window.title, "test window");
        assert_eq!(deserialized.window.width, 1024.0);
        assert_eq!(deserialized.device.driver, Driver::Headless);
    }

    #[test]
    fn test_config_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.device.driver, Driver::Headless);
        assert!(!config.window.resizable);
        assert!(!config.window.fullscreen);
    }

    #[test]
    fn test_config_file_round_trip() {
        let path = std::env::temp_dir().join("ember_engine_config_test.toml");
        let path = path.to_str().unwrap();

        let config = EngineConfig::new("file test").with_resizable(true);
        config.save_to_file(path).unwrap();

        let loaded = EngineConfig::load_from_file(path).unwrap();
        assert_eq!(loaded.window.title, "file test");
        assert!(loaded.window.resizable);

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_unsupported_config_format() {
        let config = EngineConfig::default();
        assert!(matches!(
            config.save_to_file("config.yaml"),
            Err(ConfigError::UnsupportedFormat(_))
        ));
    }
}
