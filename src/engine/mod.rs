//! Background services driven by session transitions
//!
//! The orchestrator runs transformation jobs, the frame extractor fills the
//! thumbnail strip and the reclaimer deletes what a transition leaves behind.

pub mod frames;
pub mod job;
pub mod orchestrator;
pub mod progress;
pub mod reclaim;

pub use frames::{ExtractionOutcome, FrameExtraction, FrameExtractor, FrameSink};
pub use job::{JobChannel, JobEvent};
pub use orchestrator::{JobUpdate, RunningJob, TranscodeOrchestrator};
pub use progress::ProgressNormalizer;
pub use reclaim::{ReclaimSummary, Reclaimer};
