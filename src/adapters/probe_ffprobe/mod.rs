//! FFprobe adapter for media file probing
//!
//! Runs `ffprobe -print_format json -show_format` and reads the container
//! duration from its output.

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tracing::debug;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::error::ScrubcutError;
use crate::ports::*;
use crate::utils::path::PathUtils;

/// FFprobe-based probe adapter
pub struct FfprobeAdapter {
    ffprobe_path: String,
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    format: ProbeFormat,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

impl FfprobeAdapter {
    pub fn new(ffprobe_path: &str) -> Self {
        Self {
            ffprobe_path: ffprobe_path.to_string(),
        }
    }

    /// Read the duration in seconds out of ffprobe's JSON report
    pub fn parse_duration(json: &str) -> Result<f64, DomainError> {
        let output: ProbeOutput = serde_json::from_str(json).map_err(ScrubcutError::from)?;
        let raw = output
            .format
            .duration
            .ok_or_else(|| DomainError::ProbeFailed("ffprobe reported no duration".to_string()))?;
        let duration: f64 = raw
            .trim()
            .parse()
            .map_err(|e| DomainError::ProbeFailed(format!("Invalid duration '{}': {}", raw, e)))?;
        if !duration.is_finite() || duration < 0.0 {
            return Err(DomainError::ProbeFailed(format!("Invalid duration {}", duration)));
        }
        Ok(duration)
    }
}

#[async_trait]
impl ProbePort for FfprobeAdapter {
    async fn probe(&self, uri: &str) -> Result<SourceAsset, DomainError> {
        let path = PathUtils::strip_file_scheme(uri);
        let output = Command::new(&self.ffprobe_path)
            .args(["-v", "error", "-print_format", "json", "-show_format", path])
            .output()
            .await
            .map_err(|e| {
                DomainError::EncoderUnavailable(format!("Failed to run {}: {}", self.ffprobe_path, e))
            })?;

        if !output.status.success() {
            return Err(DomainError::ProbeFailed(format!(
                "ffprobe failed for {}: {}",
                path,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let duration = Self::parse_duration(&String::from_utf8_lossy(&output.stdout))?;
        let file_name = PathUtils::file_name(path)
            .ok_or_else(|| DomainError::BadArgs(format!("No file name in {}", uri)))?;
        debug!(path = %path, duration, "Probed media");

        let asset = SourceAsset::new(path, duration, &file_name)?;
        Ok(match PathUtils::mime_type(path) {
            Some(mime) => asset.with_mime_type(mime),
            None => asset,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration() {
        let json = r#"{"format": {"filename": "a.mp4", "duration": "12.345000"}}"#;
        assert_eq!(FfprobeAdapter::parse_duration(json).unwrap(), 12.345);
    }

    #[test]
    fn test_missing_duration() {
        let json = r#"{"format": {"filename": "a.png"}}"#;
        assert!(matches!(
            FfprobeAdapter::parse_duration(json),
            Err(DomainError::ProbeFailed(_))
        ));
    }

    #[test]
    fn test_garbage_output() {
        assert!(FfprobeAdapter::parse_duration("not json").is_err());
    }
}
