// Ports - Interface definitions (contracts)

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::EditorConfig;
use crate::domain::errors::*;
use crate::domain::model::*;

/// Callback slots of one encoder invocation.
///
/// Implementations may be called from any task; they must not block.
pub trait EncoderEvents: Send + Sync {
    /// Elapsed encode time, plus the 1-based number of frames written when known
    fn on_progress_tick(&self, elapsed_ms: u64, frame_count: Option<usize>);

    /// One diagnostic line from the encoder
    fn on_log(&self, message: &str);

    /// Called exactly once when the invocation ends
    fn on_complete(&self, outcome: EncodeOutcome);
}

/// Port for the external media encoder
#[async_trait]
pub trait EncoderPort: Send + Sync {
    /// Start one encoder invocation; returns once it is running.
    ///
    /// Everything after a successful start is reported through `events`.
    async fn execute(&self, request: EncodeRequest, events: Arc<dyn EncoderEvents>) -> Result<(), DomainError>;
}

/// Port for media file probing
#[async_trait]
pub trait ProbePort: Send + Sync {
    /// Read duration, display name and mime type of a media file
    async fn probe(&self, uri: &str) -> Result<SourceAsset, DomainError>;
}

/// Port for file system operations
#[async_trait]
pub trait FsPort: Send + Sync {
    /// Write a file; failure aborts whatever asked for it
    async fn write(&self, path: &str, content: &str) -> Result<(), DomainError>;

    /// Delete one file
    async fn delete(&self, path: &str) -> Result<(), DomainError>;

    /// Delete every file under a scope directory
    async fn delete_all(&self, scope_dir: &str) -> Result<(), DomainError>;

    /// Hand a file to the user; returns where it went
    async fn share(&self, path: &str) -> Result<String, DomainError>;

    /// Create a directory and its parents
    async fn ensure_dir(&self, dir_path: &str) -> Result<(), DomainError>;
}

/// Port for media and document pickers.
///
/// `None` means the user dismissed the picker.
#[async_trait]
pub trait PickerPort: Send + Sync {
    async fn pick_video(&self) -> Result<Option<SourceAsset>, DomainError>;

    /// At most `limit` photos
    async fn pick_photos(&self, limit: usize) -> Result<Option<Vec<PickedPhoto>>, DomainError>;

    async fn pick_image(&self) -> Result<Option<PickedFile>, DomainError>;

    async fn pick_audio(&self) -> Result<Option<PickedFile>, DomainError>;
}

/// Port for configuration management
#[async_trait]
pub trait ConfigPort: Send + Sync {
    /// Current configuration
    async fn config(&self) -> Result<EditorConfig, DomainError>;

    /// Load configuration from file, replacing the current one
    async fn load_config(&self, file_path: &str) -> Result<(), DomainError>;

    /// Save configuration to file
    async fn save_config(&self, file_path: &str) -> Result<(), DomainError>;

    /// Replace the current configuration
    async fn set_config(&self, config: EditorConfig) -> Result<(), DomainError>;

    /// Validate configuration
    async fn validate_config(&self) -> Result<(), DomainError>;
}

/// Log level enumeration
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Parse log level from string
    pub fn parse(level_str: &str) -> Result<Self, DomainError> {
        match level_str.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(DomainError::BadArgs(format!(
                "Invalid log level: {}. Valid levels: trace, debug, info, warn, error",
                level_str
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}
