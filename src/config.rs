//! Configuration for the gesture detector and the zoom display.
//!
//! Everything is read once at startup and handed to the loops as an
//! immutable bundle.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration shared by the detector and the display.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Frame capture and preprocessing
    pub image: ImageConfig,

    /// Windowing, outlier filtering and trend thresholds
    pub data: DataConfig,

    /// Zoom animation parameters
    pub zoom: ZoomConfig,

    /// Run limits and logging
    pub misc: MiscConfig,

    /// Directory used as the gesture mailbox
    pub mailbox_path: PathBuf,

    /// Directory for end-of-run sample dumps
    pub data_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gesture-zoom");

        Self {
            image: ImageConfig::default(),
            data: DataConfig::default(),
            zoom: ZoomConfig::default(),
            misc: MiscConfig::default(),
            mailbox_path: data_dir.join("mailbox"),
            data_path: data_dir,
        }
    }
}

/// Frame capture settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    /// Side of the square frames in pixels
    pub resolution: u32,
    /// Gaussian blur kernel size applied to every frame
    pub blur_region: u32,
    /// Gray level at or above which a difference pixel counts as motion
    pub intensity_threshold: u8,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            resolution: 100,
            blur_region: 21,
            intensity_threshold: 25,
        }
    }
}

/// How the two axes of a window are filtered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterMode {
    /// Each axis is filtered on its own; lengths may differ.
    #[default]
    Independent,
    /// A sample pair is dropped when either coordinate is out of range.
    Joint,
}

/// Windowing and trend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Samples per detection window
    pub window_size: usize,
    /// Smallest sample value kept (inclusive)
    pub lower_cutoff: i32,
    /// Largest sample value kept (inclusive)
    pub upper_cutoff: i32,
    /// Horizontal trend strength needed for a swipe
    pub x_threshold: f64,
    /// Survivors required on each axis before a window is classified
    pub min_survivors: usize,
    /// Outlier filtering strategy
    pub filter_mode: FilterMode,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            window_size: 20,
            lower_cutoff: 5,
            upper_cutoff: 95,
            x_threshold: 10.0,
            min_survivors: 1,
            filter_mode: FilterMode::Independent,
        }
    }
}

/// Zoom display settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomConfig {
    /// Zoom factor published with every gesture
    pub scale_factor: f64,
    /// Animation sub-steps per gesture
    pub number_of_stages: usize,
    /// Horizontal center bias of the view transform (0-1)
    pub center_x: f64,
    /// Vertical center bias of the view transform (0-1)
    pub center_y: f64,
    pub screen_width: u32,
    pub screen_height: u32,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            scale_factor: 0.4,
            number_of_stages: 2,
            center_x: 0.3,
            center_y: 0.8,
            screen_width: 1280,
            screen_height: 720,
        }
    }
}

impl ZoomConfig {
    /// Crop fraction taken off each side per animation step.
    pub fn step_factor(&self) -> f64 {
        self.scale_factor / self.number_of_stages.max(1) as f64
    }
}

/// Run limits and logging.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MiscConfig {
    /// Samples processed before the detector stops and dumps its data
    pub frame_limit: u64,
    /// Log detected gestures and skipped windows
    pub debug: bool,
}

impl Default for MiscConfig {
    fn default() -> Self {
        Self {
            frame_limit: 500,
            debug: false,
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from a file, falling back to defaults when it is absent.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the given location.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gesture-zoom")
            .join("config.json")
    }

    /// Ensure all required directories exist.
    pub fn ensure_directories(&self) -> Result<(), ConfigError> {
        std::fs::create_dir_all(&self.mailbox_path)?;
        std::fs::create_dir_all(&self.data_path)?;
        Ok(())
    }

    /// Vertical trend threshold, a quarter of the frame resolution.
    pub fn y_threshold(&self) -> f64 {
        (0.25 * self.image.resolution as f64).trunc()
    }

    /// Reject combinations the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.image.resolution == 0 {
            return Err(ConfigError::Invalid("image.resolution must be positive".into()));
        }
        if self.data.window_size == 0 {
            return Err(ConfigError::Invalid("data.window_size must be positive".into()));
        }
        if self.data.lower_cutoff > self.data.upper_cutoff {
            return Err(ConfigError::Invalid(format!(
                "data.lower_cutoff ({}) exceeds data.upper_cutoff ({})",
                self.data.lower_cutoff, self.data.upper_cutoff
            )));
        }
        if self.data.min_survivors == 0 {
            return Err(ConfigError::Invalid("data.min_survivors must be at least 1".into()));
        }
        if self.zoom.number_of_stages == 0 {
            return Err(ConfigError::Invalid("zoom.number_of_stages must be positive".into()));
        }
        let step = self.zoom.step_factor();
        if !(step > 0.0 && step < 0.5) {
            return Err(ConfigError::Invalid(format!(
                "zoom.scale_factor / zoom.number_of_stages must lie in (0, 0.5), got {step}"
            )));
        }
        if !(0.0..=1.0).contains(&self.zoom.center_x) || !(0.0..=1.0).contains(&self.zoom.center_y)
        {
            return Err(ConfigError::Invalid("zoom center bias must lie in [0, 1]".into()));
        }
        if self.zoom.screen_width == 0 || self.zoom.screen_height == 0 {
            return Err(ConfigError::Invalid("zoom screen size must be positive".into()));
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.data.window_size, 20);
        assert_eq!(config.data.filter_mode, FilterMode::Independent);
        assert_eq!(config.zoom.number_of_stages, 2);
        assert!(!config.misc.debug);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_y_threshold_is_quarter_resolution() {
        let mut config = Config::default();
        config.image.resolution = 100;
        assert_eq!(config.y_threshold(), 25.0);

        config.image.resolution = 50;
        assert_eq!(config.y_threshold(), 12.0);
    }

    #[test]
    fn test_validate_rejects_inverted_cutoffs() {
        let mut config = Config::default();
        config.data.lower_cutoff = 90;
        config.data.upper_cutoff = 10;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_oversized_step() {
        let mut config = Config::default();
        config.zoom.scale_factor = 1.2;
        config.zoom.number_of_stages = 2;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{ "data": { "window_size": 10, "filter_mode": "joint" } }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.data.window_size, 10);
        assert_eq!(config.data.filter_mode, FilterMode::Joint);
        assert_eq!(config.data.lower_cutoff, 5);
        assert_eq!(config.image.resolution, 100);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = Config::default();
        config.misc.frame_limit = 42;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.misc.frame_limit, 42);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config.misc.frame_limit, 500);
    }
}
