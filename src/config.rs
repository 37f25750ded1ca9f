//! Editor configuration
//!
//! Read from a RON file (`roomcraft.ron` in the working directory, or the
//! path in `$ROOMCRAFT_CONFIG`). Every field has a default, so a missing
//! file or a partial one is fine.
//!
//! ```ron
//! (
//!     grid_size: 0.5,
//!     snap_enabled: true,
//!     camera_preset: isometric,
//!     log_level: "debug",
//! )
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::editor::placement::{SnapSettings, DEFAULT_GRID_SIZE};
use crate::viewport::CameraPreset;

pub const CONFIG_FILE: &str = "roomcraft.ron";
pub const CONFIG_ENV: &str = "ROOMCRAFT_CONFIG";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("invalid value: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Grid cell size in meters
    pub grid_size: f32,
    pub snap_enabled: bool,
    /// Where saved rooms and exports are kept
    pub storage_dir: PathBuf,
    pub camera_preset: CameraPreset,
    /// tracing max level: error, warn, info, debug, trace
    pub log_level: String,
    pub window_width: i32,
    pub window_height: i32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            snap_enabled: true,
            storage_dir: default_storage_dir(),
            camera_preset: CameraPreset::default(),
            log_level: "info".to_string(),
            window_width: 1280,
            window_height: 800,
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn default_storage_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("roomcraft"))
        .unwrap_or_else(|| PathBuf::from("userdata"))
}

#[cfg(target_arch = "wasm32")]
fn default_storage_dir() -> PathBuf {
    PathBuf::from("userdata")
}

impl EditorConfig {
    /// Parse and validate a config document
    pub fn from_ron(text: &str) -> Result<Self, ConfigError> {
        let config: EditorConfig = ron::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Self::from_ron(&fs::read_to_string(path)?)
    }

    /// Config path from the environment, or the default file name
    pub fn default_path() -> PathBuf {
        std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE))
    }

    /// Load from `path`, falling back to defaults.
    ///
    /// Returns the config plus a warning to log once logging is up: the
    /// subscriber depends on the config, so it cannot log here.
    pub fn load_or_default(path: &Path) -> (Self, Option<String>) {
        if !path.exists() {
            return (Self::default(), None);
        }
        match Self::load_from(path) {
            Ok(config) => (config, None),
            Err(e) => (Self::default(), Some(format!("ignoring config {}: {}", path.display(), e))),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.grid_size > 0.0) || !self.grid_size.is_finite() {
            return Err(ConfigError::Invalid(format!("grid_size must be positive, got {}", self.grid_size)));
        }
        if self.window_width <= 0 || self.window_height <= 0 {
            return Err(ConfigError::Invalid("window size must be positive".to_string()));
        }
        if self.max_level().is_none() {
            return Err(ConfigError::Invalid(format!("unknown log_level {:?}", self.log_level)));
        }
        Ok(())
    }

    pub fn snap(&self) -> SnapSettings {
        SnapSettings::new(self.snap_enabled, self.grid_size)
    }

    /// `log_level` as a tracing level
    pub fn max_level(&self) -> Option<tracing::Level> {
        self.log_level.parse().ok()
    }

    /// Directory for exported room files
    pub fn export_dir(&self) -> PathBuf {
        self.storage_dir.join("exports")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert!((config.grid_size - 0.5).abs() < 0.0001);
        assert!(config.snap_enabled);
        assert_eq!(config.max_level(), Some(tracing::Level::INFO));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_document() {
        let config = EditorConfig::from_ron("(grid_size: 0.25, camera_preset: top, log_level: \"debug\")").unwrap();
        assert!((config.grid_size - 0.25).abs() < 0.0001);
        assert_eq!(config.camera_preset, CameraPreset::Top);
        assert_eq!(config.max_level(), Some(tracing::Level::DEBUG));
        assert!(config.snap_enabled);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(EditorConfig::from_ron("(grid_size: 0.0)"), Err(ConfigError::Invalid(_))));
        assert!(matches!(EditorConfig::from_ron("(log_level: \"loud\")"), Err(ConfigError::Invalid(_))));
        assert!(matches!(EditorConfig::from_ron("(grid_size: "), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_or_default() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.ron");
        let (config, warning) = EditorConfig::load_or_default(&missing);
        assert_eq!(config, EditorConfig::default());
        assert!(warning.is_none());

        let broken = dir.path().join("broken.ron");
        fs::write(&broken, "(grid_size: \"big\")").unwrap();
        let (config, warning) = EditorConfig::load_or_default(&broken);
        assert_eq!(config, EditorConfig::default());
        assert!(warning.is_some());

        let good = dir.path().join("good.ron");
        fs::write(&good, "(snap_enabled: false)").unwrap();
        let (config, _) = EditorConfig::load_or_default(&good);
        assert!(!config.snap_enabled);
    }
}
