//! Editor configuration
//!
//! Every section has defaults, so an empty or partial TOML file is valid.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;
use crate::ports::LogLevel;
use crate::timeline::TimelineGeometry;

/// Complete configuration for an editing session and its adapters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub timeline: TimelineGeometry,
    pub frames: FrameConfig,
    pub encoder: EncoderConfig,
    pub storage: StorageConfig,
    pub picker: PickerConfig,
    pub logging: LoggingConfig,
}

/// Thumbnail extraction settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    /// Sampling rate of the thumbnail strip
    pub frames_per_second: u32,
    /// Thumbnail width in pixels; height follows the aspect ratio
    pub thumbnail_width: u32,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            frames_per_second: 1,
            thumbnail_width: 80,
        }
    }
}

/// External encoder binaries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
        }
    }
}

/// Where session files live
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Temp scope for every file a session produces; emptied on discard
    pub scope_dir: PathBuf,
    /// Destination of shared assets
    pub export_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            scope_dir: std::env::temp_dir().join("scrubcut"),
            export_dir: PathBuf::from("."),
        }
    }
}

/// Picker limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickerConfig {
    pub max_photos: usize,
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self { max_photos: 7 }
    }
}

/// Logging output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl EditorConfig {
    /// Check every value an operation would otherwise trip over later
    pub fn validate(&self) -> Result<(), DomainError> {
        let timeline = &self.timeline;
        let positive = |value: f64| value.is_finite() && value > 0.0;
        if !positive(timeline.frames_per_second) || !positive(timeline.tile_width) {
            return Err(DomainError::ConfigInvalid(
                "timeline frames_per_second and tile_width must be positive".to_string(),
            ));
        }
        if !positive(timeline.duration_window_width) {
            return Err(DomainError::ConfigInvalid(
                "timeline duration_window_width must be positive".to_string(),
            ));
        }
        if !(0.0..=100.0).contains(&timeline.pop_line_position) {
            return Err(DomainError::ConfigInvalid(format!(
                "timeline pop_line_position must be within 0..=100, got {}",
                timeline.pop_line_position
            )));
        }
        if self.frames.frames_per_second == 0 || self.frames.thumbnail_width == 0 {
            return Err(DomainError::ConfigInvalid(
                "frames frames_per_second and thumbnail_width must be positive".to_string(),
            ));
        }
        if self.encoder.ffmpeg_path.trim().is_empty() || self.encoder.ffprobe_path.trim().is_empty() {
            return Err(DomainError::ConfigInvalid(
                "encoder binary paths cannot be empty".to_string(),
            ));
        }
        if self.picker.max_photos == 0 {
            return Err(DomainError::ConfigInvalid(
                "picker max_photos must be at least 1".to_string(),
            ));
        }
        LogLevel::parse(&self.logging.level)
            .map_err(|e| DomainError::ConfigInvalid(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = EditorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.picker.max_photos, 7);
        assert_eq!(config.frames.thumbnail_width, 80);
        assert_eq!(config.timeline.duration_window_width, 160.0);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: EditorConfig = toml::from_str(
            r#"
            [timeline]
            tile_width = 60.0

            [picker]
            max_photos = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.timeline.tile_width, 60.0);
        assert_eq!(config.timeline.pop_line_position, 50.0);
        assert_eq!(config.picker.max_photos, 3);
        assert_eq!(config.encoder.ffmpeg_path, "ffmpeg");
    }

    #[test]
    fn test_nan_timeline_rejected() {
        let config: EditorConfig = toml::from_str(
            r#"
            [timeline]
            frames_per_second = nan
            "#,
        )
        .unwrap();
        assert!(config.timeline.frames_per_second.is_nan());
        assert!(matches!(config.validate(), Err(DomainError::ConfigInvalid(_))));

        let mut config = EditorConfig::default();
        config.timeline.tile_width = f64::INFINITY;
        assert!(config.validate().is_err());
        config.timeline.tile_width = 40.0;
        config.timeline.duration_window_width = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_pop_line() {
        let mut config = EditorConfig::default();
        config.timeline.pop_line_position = 140.0;
        assert!(matches!(config.validate(), Err(DomainError::ConfigInvalid(_))));
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = EditorConfig::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_photos_rejected() {
        let mut config = EditorConfig::default();
        config.picker.max_photos = 0;
        assert!(config.validate().is_err());
    }
}
