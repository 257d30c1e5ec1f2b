//! Application configuration
//!
//! Configuration is loaded from multiple sources with the following priority (lowest to highest):
//! 1. `config/default.toml` (version controlled)
//! 2. `config/user.toml` (gitignored, user overrides)
//! 3. Environment variables (`BRICKSTEP_SECTION__KEY`)

use brickstep_core::InterfaceColors;
use brickstep_math::{Vec3, Vec4};
use figment::{Figment, providers::{Format, Toml, Env}};
use serde::{Serialize, Deserialize};
use std::path::Path;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Interface drawing configuration
    #[serde(default)]
    pub interface: InterfaceConfig,
    /// Editing defaults
    #[serde(default)]
    pub editing: EditingConfig,
    /// Debug configuration
    #[serde(default)]
    pub debug: DebugConfig,
}

impl AppConfig {
    /// Load configuration from default locations
    ///
    /// Priority (lowest to highest):
    /// 1. `config/default.toml`
    /// 2. `config/user.toml`
    /// 3. Environment variables (`BRICKSTEP_*`)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific config directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();
        let default_path = config_dir.join("default.toml");
        let user_path = config_dir.join("user.toml");

        let mut figment = Figment::new();

        if default_path.exists() {
            figment = figment.merge(Toml::file(&default_path));
        }

        if user_path.exists() {
            figment = figment.merge(Toml::file(&user_path));
        }

        // BRICKSTEP_EDITING__ADD_KEYS=true -> editing.add_keys = true
        figment = figment.merge(Env::prefixed("BRICKSTEP_").split("__"));

        figment.extract().map_err(ConfigError::from)
    }
}

/// Colours and line width for editor handles
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InterfaceConfig {
    /// Base line width in pixels
    pub line_width: f32,
    /// Selected object colour [r, g, b, a]
    pub object_selected_color: [f32; 4],
    /// Focused object colour [r, g, b, a]
    pub object_focused_color: [f32; 4],
    pub light_color: [f32; 4],
    pub camera_color: [f32; 4],
    pub control_point_color: [f32; 4],
    pub control_point_focused_color: [f32; 4],
}

impl Default for InterfaceConfig {
    fn default() -> Self {
        let colors = InterfaceColors::default();
        Self {
            line_width: colors.line_width,
            object_selected_color: colors.object_selected.to_array(),
            object_focused_color: colors.object_focused.to_array(),
            light_color: colors.light.to_array(),
            camera_color: colors.camera.to_array(),
            control_point_color: colors.control_point.to_array(),
            control_point_focused_color: colors.control_point_focused.to_array(),
        }
    }
}

impl InterfaceConfig {
    /// Convert to the colour set used by interface drawing
    pub fn to_interface_colors(&self) -> InterfaceColors {
        InterfaceColors {
            line_width: self.line_width,
            object_selected: Vec4::from_array(self.object_selected_color),
            object_focused: Vec4::from_array(self.object_focused_color),
            light: Vec4::from_array(self.light_color),
            camera: Vec4::from_array(self.camera_color),
            control_point: Vec4::from_array(self.control_point_color),
            control_point_focused: Vec4::from_array(self.control_point_focused_color),
        }
    }
}

/// Editing defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditingConfig {
    /// Start with "add keys" enabled
    pub add_keys: bool,
    /// Position of newly created lights [x, y, z]
    pub default_light_position: [f32; 3],
    /// Position of newly created cameras [x, y, z]
    pub default_camera_position: [f32; 3],
    /// Target of newly created cameras [x, y, z]
    pub default_camera_target: [f32; 3],
}

impl Default for EditingConfig {
    fn default() -> Self {
        Self {
            add_keys: false,
            default_light_position: [0.0, -100.0, 100.0],
            default_camera_position: [-250.0, -250.0, 75.0],
            default_camera_target: [0.0, 0.0, 0.0],
        }
    }
}

impl EditingConfig {
    pub fn light_position(&self) -> Vec3 {
        Vec3::from(self.default_light_position)
    }

    pub fn camera_position(&self) -> Vec3 {
        Vec3::from(self.default_camera_position)
    }

    pub fn camera_target(&self) -> Vec3 {
        Vec3::from(self.default_camera_target)
    }
}

/// Debug configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Configuration error
#[derive(Debug)]
pub struct ConfigError {
    message: String,
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        ConfigError {
            message: e.to_string(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Configuration error: {}", self.message)
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.interface.line_width, 1.0);
        assert!(!config.editing.add_keys);
        assert_eq!(config.debug.log_level, "info");
    }

    #[test]
    fn test_interface_colors_round_trip_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.interface.to_interface_colors(), InterfaceColors::default());
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml = toml::to_string(&config).unwrap();
        assert!(toml.contains("object_selected_color"));
        assert!(toml.contains("add_keys"));
    }

    #[test]
    fn test_partial_section_uses_defaults() {
        let config: AppConfig = toml::from_str("[editing]\nadd_keys = true\n").unwrap();
        assert!(config.editing.add_keys);
        assert_eq!(config.editing.default_camera_target, [0.0, 0.0, 0.0]);
        assert_eq!(config.interface.line_width, 1.0);
    }

    #[test]
    fn test_load_from_missing_dir_uses_defaults() {
        let config = AppConfig::load_from("does/not/exist").unwrap();
        assert_eq!(config.editing.default_light_position, [0.0, -100.0, 100.0]);
    }
}
