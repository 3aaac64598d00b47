use std::sync::Arc;

use crate::adapters::{FfmpegCliAdapter, FfprobeAdapter, LocalFsAdapter, PresetPicker};
use crate::app::editor_interactor::EditorInteractor;
use crate::config::EditorConfig;
use crate::domain::errors::DomainError;
use crate::ports::{EncoderPort, FsPort, PickerPort, ProbePort};

/// Selections the picker collaborator answers with
#[derive(Debug, Clone, Default)]
pub struct PickerPresets {
    pub video: Option<String>,
    pub photos: Vec<String>,
    pub image: Option<String>,
    pub audio: Option<String>,
}

pub trait AppContainer: Send + Sync {
    fn editor_interactor(&self) -> Arc<EditorInteractor>;
}

pub struct DefaultAppContainer {
    editor_interactor: Arc<EditorInteractor>,
}

impl DefaultAppContainer {
    pub fn new(config: EditorConfig, presets: PickerPresets) -> Result<Self, DomainError> {
        config.validate()?;

        let probe_port: Arc<dyn ProbePort> = Arc::new(FfprobeAdapter::new(&config.encoder.ffprobe_path));
        let encoder_port = Arc::new(FfmpegCliAdapter::new(&config.encoder.ffmpeg_path));
        let fs_port = Arc::new(LocalFsAdapter::new(config.storage.export_dir.clone()));

        let mut picker = PresetPicker::new(probe_port).with_photos(&presets.photos);
        if let Some(video) = &presets.video {
            picker = picker.with_video(video);
        }
        if let Some(image) = &presets.image {
            picker = picker.with_image(image);
        }
        if let Some(audio) = &presets.audio {
            picker = picker.with_audio(audio);
        }

        let editor_interactor = Arc::new(EditorInteractor::new(
            encoder_port as Arc<dyn EncoderPort>,
            fs_port as Arc<dyn FsPort>,
            Arc::new(picker) as Arc<dyn PickerPort>,
            config,
        ));

        Ok(Self { editor_interactor })
    }
}

impl AppContainer for DefaultAppContainer {
    fn editor_interactor(&self) -> Arc<EditorInteractor> {
        Arc::clone(&self.editor_interactor)
    }
}
