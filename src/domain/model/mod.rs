// Domain models - Core types and data structures

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;

/// The originally picked video of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceAsset {
    pub id: String,
    pub uri: String,
    /// Duration in seconds
    pub duration: f64,
    /// Display name, used to derive every output file name
    pub file_name: String,
    pub mime_type: Option<String>,
}

impl SourceAsset {
    /// Create a new source asset with validation
    pub fn new(uri: &str, duration: f64, file_name: &str) -> Result<Self, DomainError> {
        if uri.trim().is_empty() {
            return Err(DomainError::BadArgs("Asset URI cannot be empty".to_string()));
        }
        if !duration.is_finite() || duration < 0.0 {
            return Err(DomainError::BadArgs(format!(
                "Asset duration must be a non-negative number of seconds, got {}",
                duration
            )));
        }
        if file_name.trim().is_empty() {
            return Err(DomainError::BadArgs("Asset file name cannot be empty".to_string()));
        }

        Ok(Self {
            id: uri.to_string(),
            uri: uri.to_string(),
            duration,
            file_name: file_name.to_string(),
            mime_type: None,
        })
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = id.to_string();
        self
    }

    pub fn with_mime_type(mut self, mime_type: &str) -> Self {
        self.mime_type = Some(mime_type.to_string());
        self
    }
}

/// One still image returned by the photo picker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickedPhoto {
    pub uri: String,
}

impl PickedPhoto {
    pub fn new(uri: &str) -> Self {
        Self { uri: uri.to_string() }
    }
}

/// A single file returned by the document/audio picker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickedFile {
    pub uri: String,
}

impl PickedFile {
    pub fn new(uri: &str) -> Self {
        Self { uri: uri.to_string() }
    }
}

/// Thumbnail readiness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameStatus {
    Loading,
    Ready,
}

/// One timeline thumbnail, addressed by position.
///
/// A `Ready` frame always carries a non-empty URI and a `Loading` frame never
/// does; the fields are private so only the two constructors can build one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    index: usize,
    status: FrameStatus,
    uri: Option<String>,
}

impl Frame {
    pub fn loading(index: usize) -> Self {
        Self {
            index,
            status: FrameStatus::Loading,
            uri: None,
        }
    }

    pub fn ready(index: usize, uri: &str) -> Result<Self, DomainError> {
        if uri.is_empty() {
            return Err(DomainError::BadArgs(format!(
                "Ready frame {} requires a URI",
                index
            )));
        }
        Ok(Self {
            index,
            status: FrameStatus::Ready,
            uri: Some(uri.to_string()),
        })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn status(&self) -> FrameStatus {
        self.status
    }

    pub fn uri(&self) -> Option<&str> {
        self.uri.as_deref()
    }

    pub fn is_ready(&self) -> bool {
        self.status == FrameStatus::Ready
    }
}

/// Session lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Nothing picked
    Empty,
    /// A video is picked, no edit applied yet
    Loaded,
    /// Photos picked for a slideshow, no video yet
    PhotosSelected,
    /// A job is in flight
    Editing,
    /// At least one job has produced the current asset
    Committed,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionPhase::Empty => "empty",
            SessionPhase::Loaded => "loaded",
            SessionPhase::PhotosSelected => "photos-selected",
            SessionPhase::Editing => "editing",
            SessionPhase::Committed => "committed",
        };
        write!(f, "{}", name)
    }
}

/// Kinds of encoder invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobKind {
    ExtractFrames,
    AttachAudio,
    IncreaseSpeed,
    CutSegment,
    AddWatermark,
    CreateSlideshow,
}

impl JobKind {
    /// Short tag used in output file names and logs
    pub fn tag(&self) -> &'static str {
        match self {
            JobKind::ExtractFrames => "frames",
            JobKind::AttachAudio => "audio",
            JobKind::IncreaseSpeed => "speed",
            JobKind::CutSegment => "cut",
            JobKind::AddWatermark => "watermark",
            JobKind::CreateSlideshow => "slideshow",
        }
    }

    /// Kinds that are expected to run more than once per session and so need
    /// a unique output name each time
    pub fn runs_repeatedly(&self) -> bool {
        matches!(self, JobKind::AddWatermark | JobKind::IncreaseSpeed)
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// A user-requested transformation of the current asset
#[derive(Debug, Clone, PartialEq)]
pub enum Transform {
    AttachAudio { audio_uri: String },
    IncreaseSpeed,
    /// `None` uses the start time selected by the last scrub
    CutSegment { start_time: Option<f64> },
    AddWatermark { image_uri: String },
    CreateSlideshow { audio_uri: String },
}

impl Transform {
    pub fn kind(&self) -> JobKind {
        match self {
            Transform::AttachAudio { .. } => JobKind::AttachAudio,
            Transform::IncreaseSpeed => JobKind::IncreaseSpeed,
            Transform::CutSegment { .. } => JobKind::CutSegment,
            Transform::AddWatermark { .. } => JobKind::AddWatermark,
            Transform::CreateSlideshow { .. } => JobKind::CreateSlideshow,
        }
    }
}

impl FromStr for Transform {
    type Err = DomainError;

    /// Parse `speed`, `cut`, `cut=<seconds>`, `audio=<file>`, `watermark=<file>`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, value) = match s.split_once('=') {
            Some((name, value)) => (name.trim(), Some(value.trim())),
            None => (s.trim(), None),
        };

        match (name.to_lowercase().as_str(), value) {
            ("speed", None) => Ok(Transform::IncreaseSpeed),
            ("cut", None) => Ok(Transform::CutSegment { start_time: None }),
            ("cut", Some(start)) => {
                let start_time = start
                    .parse::<f64>()
                    .map_err(|_| DomainError::BadArgs(format!("Invalid cut start: {}", start)))?;
                if !start_time.is_finite() || start_time < 0.0 {
                    return Err(DomainError::BadArgs("Cut start cannot be negative".to_string()));
                }
                Ok(Transform::CutSegment {
                    start_time: Some(start_time),
                })
            }
            ("audio", Some(uri)) if !uri.is_empty() => Ok(Transform::AttachAudio {
                audio_uri: uri.to_string(),
            }),
            ("watermark", Some(uri)) if !uri.is_empty() => Ok(Transform::AddWatermark {
                image_uri: uri.to_string(),
            }),
            _ => Err(DomainError::BadArgs(format!(
                "Invalid edit step '{}'. Valid steps: speed, cut[=start], audio=<file>, watermark=<file>",
                s
            ))),
        }
    }
}

/// Where an overlay is pinned on the main video
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayAnchor {
    BottomRight,
}

/// The opaque command description handed to the encoder
#[derive(Debug, Clone, PartialEq)]
pub enum EncodeOp {
    ExtractFrames {
        input: String,
        frame_count: usize,
        frames_per_second: u32,
        thumbnail_width: u32,
    },
    AttachAudio {
        video: String,
        audio: String,
        duration: f64,
    },
    ChangeSpeed {
        input: String,
        factor: f64,
    },
    CutSegment {
        input: String,
        start: f64,
        duration: f64,
    },
    Overlay {
        input: String,
        image: String,
        height_ratio: f64,
        anchor: OverlayAnchor,
    },
    Slideshow {
        list_file: String,
        audio: String,
    },
}

/// One encoder invocation: what to run and where the result lands.
///
/// For frame extraction `output` is a template containing the frame pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeRequest {
    pub op: EncodeOp,
    pub output: String,
}

impl EncodeRequest {
    pub fn new(op: EncodeOp, output: &str) -> Self {
        Self {
            op,
            output: output.to_string(),
        }
    }

    pub fn kind(&self) -> JobKind {
        match self.op {
            EncodeOp::ExtractFrames { .. } => JobKind::ExtractFrames,
            EncodeOp::AttachAudio { .. } => JobKind::AttachAudio,
            EncodeOp::ChangeSpeed { .. } => JobKind::IncreaseSpeed,
            EncodeOp::CutSegment { .. } => JobKind::CutSegment,
            EncodeOp::Overlay { .. } => JobKind::AddWatermark,
            EncodeOp::Slideshow { .. } => JobKind::CreateSlideshow,
        }
    }
}

/// Completion result reported by the encoder
#[derive(Debug, Clone, PartialEq)]
pub enum EncodeOutcome {
    Success { output: String },
    Failure { detail: String },
}

/// Result of a committed job
#[derive(Debug, Clone, PartialEq)]
pub struct JobReport {
    pub kind: JobKind,
    pub output: String,
    pub generation: u64,
}
