// Preset picker adapter - Answers picker requests from pre-supplied selections

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;
use crate::utils::path::PathUtils;

/// Picker backed by selections made up front (command-line arguments).
///
/// An empty selection behaves like a dismissed picker.
pub struct PresetPicker {
    probe: Arc<dyn ProbePort>,
    video: Option<String>,
    photos: Vec<String>,
    image: Option<String>,
    audio: Option<String>,
}

impl PresetPicker {
    pub fn new(probe: Arc<dyn ProbePort>) -> Self {
        Self {
            probe,
            video: None,
            photos: Vec::new(),
            image: None,
            audio: None,
        }
    }

    pub fn with_video(mut self, uri: &str) -> Self {
        self.video = Some(uri.to_string());
        self
    }

    pub fn with_photos(mut self, uris: &[String]) -> Self {
        self.photos = uris.to_vec();
        self
    }

    pub fn with_image(mut self, uri: &str) -> Self {
        self.image = Some(uri.to_string());
        self
    }

    pub fn with_audio(mut self, uri: &str) -> Self {
        self.audio = Some(uri.to_string());
        self
    }
}

#[async_trait]
impl PickerPort for PresetPicker {
    async fn pick_video(&self) -> Result<Option<SourceAsset>, DomainError> {
        let Some(uri) = &self.video else {
            return Ok(None);
        };
        let asset = self.probe.probe(uri).await?;
        debug!(uri = %asset.uri, duration = asset.duration, "Picked video");
        Ok(Some(asset))
    }

    async fn pick_photos(&self, limit: usize) -> Result<Option<Vec<PickedPhoto>>, DomainError> {
        if self.photos.is_empty() {
            return Ok(None);
        }
        Ok(Some(
            self.photos
                .iter()
                .take(limit)
                .map(|uri| PickedPhoto::new(PathUtils::strip_file_scheme(uri)))
                .collect(),
        ))
    }

    async fn pick_image(&self) -> Result<Option<PickedFile>, DomainError> {
        Ok(self
            .image
            .as_deref()
            .map(|uri| PickedFile::new(PathUtils::strip_file_scheme(uri))))
    }

    async fn pick_audio(&self) -> Result<Option<PickedFile>, DomainError> {
        Ok(self
            .audio
            .as_deref()
            .map(|uri| PickedFile::new(PathUtils::strip_file_scheme(uri))))
    }
}
