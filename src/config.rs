//! Configuration management for CrabShot
//!
//! Provides configuration loading, saving, and layering for capture defaults,
//! output storage, encoder defaults and controller timing.

use crate::errors::CameraError;
use crate::recording::{AudioCodec, OutputFormat, VideoCodec};
use crate::types::{AspectRatio, Facing, Flash, Mode};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable prefix used by `load_layered`.
pub const ENV_PREFIX: &str = "CRABSHOT";

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrabShotConfig {
    pub camera: CameraConfig,
    pub storage: StorageConfig,
    pub recording: RecordingDefaults,
    pub advanced: AdvancedConfig,
}

/// Capture parameters applied before the first `start_preview`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    pub default_mode: Mode,
    pub default_facing: Facing,
    pub default_flash: Flash,
    pub auto_focus: bool,
    /// Preferred aspect ratio, e.g. "4:3"
    pub default_aspect_ratio: AspectRatio,
    /// Video sizes taller than this are not offered
    pub max_video_height: u32,
}

/// Output file placement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    pub output_directory: PathBuf,
    pub image_extension: String,
    pub video_extension: String,
    pub file_prefix: String,
}

/// Default encoder settings for `start_recording`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingDefaults {
    /// Bits per second
    pub bitrate: u32,
    pub fps: u32,
    pub video_codec: VideoCodec,
    pub audio_codec: AudioCodec,
    pub output_format: OutputFormat,
    pub record_audio: bool,
}

/// Controller timing and geometry knobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvancedConfig {
    /// Bound on waiting for the device open/close lock
    pub open_timeout_ms: u64,
    /// Side of the tap-to-focus metering square, in sensor units
    pub focus_area_size: u32,
    /// Zoom values closer than this are treated as equal
    pub zoom_epsilon: f32,
}

impl Default for CrabShotConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig {
                default_mode: Mode::Image,
                default_facing: Facing::Back,
                default_flash: Flash::Off,
                auto_focus: true,
                default_aspect_ratio: AspectRatio::of(4, 3),
                max_video_height: 1080,
            },
            storage: StorageConfig {
                output_directory: PathBuf::from("./captures"),
                image_extension: "jpg".to_string(),
                video_extension: "mp4".to_string(),
                file_prefix: "CRAB".to_string(),
            },
            recording: RecordingDefaults {
                bitrate: 10_000_000,
                fps: 30,
                video_codec: VideoCodec::H264,
                audio_codec: AudioCodec::Aac,
                output_format: OutputFormat::Mpeg4,
                record_audio: true,
            },
            advanced: AdvancedConfig {
                open_timeout_ms: 2500,
                focus_area_size: 300,
                zoom_epsilon: 1e-3,
            },
        }
    }
}

impl CrabShotConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, CameraError> {
        let path = path.as_ref();

        if !path.exists() {
            log::info!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|e| {
            CameraError::storage(format!("Failed to read config file: {}", e))
        })?;

        let config: CrabShotConfig = toml::from_str(&contents).map_err(|e| {
            CameraError::invalid_parameter(format!("Failed to parse config file: {}", e))
        })?;

        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), CameraError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                CameraError::storage(format!("Failed to create config directory: {}", e))
            })?;
        }

        let toml_string = toml::to_string_pretty(self).map_err(|e| {
            CameraError::invalid_parameter(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(path, toml_string).map_err(|e| {
            CameraError::storage(format!("Failed to write config file: {}", e))
        })?;

        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Defaults, overlaid by the TOML file at `path` (if present), overlaid
    /// by `CRABSHOT__<SECTION>__<KEY>` environment variables.
    pub fn load_layered<P: AsRef<Path>>(path: P) -> Result<Self, CameraError> {
        let defaults = toml::to_string(&Self::default()).map_err(|e| {
            CameraError::invalid_parameter(format!("Failed to serialize defaults: {}", e))
        })?;

        let settings = config::Config::builder()
            .add_source(config::File::from_str(&defaults, config::FileFormat::Toml))
            .add_source(config::File::from(path.as_ref()).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| CameraError::invalid_parameter(format!("Failed to load config: {}", e)))?;

        let loaded: CrabShotConfig = settings
            .try_deserialize()
            .map_err(|e| CameraError::invalid_parameter(format!("Invalid config: {}", e)))?;
        loaded.validate().map_err(CameraError::invalid_parameter)?;
        Ok(loaded)
    }

    /// Get default config file path
    pub fn default_path() -> PathBuf {
        PathBuf::from("crabshot.toml")
    }

    /// Load from default location or fall back to defaults
    pub fn load_or_default() -> Self {
        Self::load_from_file(Self::default_path()).unwrap_or_else(|e| {
            log::warn!("Failed to load config, using defaults: {}", e);
            Self::default()
        })
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.camera.max_video_height == 0 {
            return Err("max_video_height must be positive".to_string());
        }

        if self.storage.image_extension.is_empty() || self.storage.video_extension.is_empty() {
            return Err("file extensions must not be empty".to_string());
        }
        if self.storage.output_directory.as_os_str().is_empty() {
            return Err("output_directory must not be empty".to_string());
        }

        if self.recording.bitrate == 0 {
            return Err("Recording bitrate must be positive".to_string());
        }
        if self.recording.fps == 0 || self.recording.fps > 240 {
            return Err("Invalid recording FPS (must be 1-240)".to_string());
        }

        if self.advanced.open_timeout_ms == 0 {
            return Err("open_timeout_ms must be positive".to_string());
        }
        if self.advanced.focus_area_size < 2 {
            return Err("focus_area_size must be at least 2".to_string());
        }
        if !(self.advanced.zoom_epsilon > 0.0 && self.advanced.zoom_epsilon < 1.0) {
            return Err("zoom_epsilon must be in (0, 1)".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CrabShotConfig::default();
        assert_eq!(config.camera.default_aspect_ratio, AspectRatio::of(4, 3));
        assert_eq!(config.recording.bitrate, 10_000_000);
        assert_eq!(config.recording.fps, 30);
        assert_eq!(config.advanced.open_timeout_ms, 2500);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut bad = CrabShotConfig::default();
        bad.recording.fps = 0;
        assert!(bad.validate().is_err());

        let mut bad = CrabShotConfig::default();
        bad.advanced.zoom_epsilon = 0.0;
        assert!(bad.validate().is_err());

        let mut bad = CrabShotConfig::default();
        bad.storage.image_extension.clear();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_config_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("nested").join("crabshot.toml");

        let mut config = CrabShotConfig::default();
        config.camera.default_facing = Facing::Front;
        config.camera.default_aspect_ratio = AspectRatio::of(16, 9);
        config.save_to_file(&config_path).unwrap();

        let loaded = CrabShotConfig::load_from_file(&config_path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_config_toml_format() {
        let toml_string = toml::to_string_pretty(&CrabShotConfig::default()).unwrap();

        assert!(toml_string.contains("[camera]"));
        assert!(toml_string.contains("[storage]"));
        assert!(toml_string.contains("[recording]"));
        assert!(toml_string.contains("[advanced]"));
        assert!(toml_string.contains("default_aspect_ratio = \"4:3\""));
        assert!(toml_string.contains("video_codec = \"h264\""));
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = CrabShotConfig::load_from_file("nonexistent_crabshot.toml");
        assert_eq!(result.unwrap(), CrabShotConfig::default());
    }

    #[test]
    fn test_load_layered_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layered.toml");
        let mut config = CrabShotConfig::default();
        config.recording.fps = 24;
        config.save_to_file(&path).unwrap();

        let loaded = CrabShotConfig::load_layered(&path).unwrap();
        assert_eq!(loaded.recording.fps, 24);
        assert_eq!(loaded.recording.bitrate, 10_000_000);
    }

    #[test]
    fn test_load_layered_without_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = CrabShotConfig::load_layered(dir.path().join("missing.toml")).unwrap();
        assert_eq!(loaded.advanced.focus_area_size, 300);
    }
}
