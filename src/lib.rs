//! Scrubcut Library
//!
//! The core of a scrub-and-transcode video editor: an editing session state
//! machine, a single-slot transcode orchestrator driving an external ffmpeg,
//! a generation-guarded thumbnail extraction pipeline and the timeline
//! coordinate mapping behind scrubbing.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config;
pub mod config_initialization;
pub mod domain;
pub mod engine;
pub mod error;
pub mod ports;
pub mod timeline;
pub mod utils;

// Re-export commonly used types
pub use config::EditorConfig;
pub use domain::errors::DomainError;
pub use domain::model::{JobKind, SessionPhase, SourceAsset, Transform};
pub use error::{ScrubcutError, ScrubcutResult};
