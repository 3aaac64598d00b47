//! Frame extraction pipeline
//!
//! Extraction runs as its own encoder invocation and does not take the
//! transform job slot; every update it produces is tagged with the session
//! generation it was started for.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::job::{JobChannel, JobEvent};
use super::reclaim::Reclaimer;
use crate::domain::errors::DomainError;
use crate::domain::model::*;
use crate::domain::rules::FrameRule;
use crate::ports::EncoderPort;

/// Receiver of extraction results, typically the session.
///
/// Both methods return false when `generation` is stale.
pub trait FrameSink: Send + Sync + 'static {
    fn frame_ready(&self, generation: u64, count: usize, uri: &str) -> bool;

    fn frames_complete(&self, generation: u64, uris: &[String]) -> bool;
}

/// How an extraction ended
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionOutcome {
    /// Every frame was marked ready
    Completed { frames: usize },
    /// The session moved on; the extracted files were reclaimed
    Superseded,
    /// The encoder failed; placeholders stay in `Loading`, and a stale
    /// extraction's partial files are reclaimed
    Failed(String),
}

/// A running extraction
pub struct FrameExtraction {
    generation: u64,
    handle: JoinHandle<ExtractionOutcome>,
}

impl FrameExtraction {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Wait for the extraction task to finish
    pub async fn wait(self) -> Result<ExtractionOutcome, DomainError> {
        self.handle
            .await
            .map_err(|e| DomainError::JobFailed {
                kind: JobKind::ExtractFrames,
                detail: format!("extraction task aborted: {}", e),
            })
    }
}

/// Requests thumbnail strips from the encoder
pub struct FrameExtractor {
    encoder: Arc<dyn EncoderPort>,
    reclaimer: Arc<Reclaimer>,
    scope_dir: PathBuf,
    frames_per_second: u32,
    thumbnail_width: u32,
}

impl FrameExtractor {
    pub fn new(
        encoder: Arc<dyn EncoderPort>,
        reclaimer: Arc<Reclaimer>,
        scope_dir: impl Into<PathBuf>,
        frames_per_second: u32,
        thumbnail_width: u32,
    ) -> Self {
        Self {
            encoder,
            reclaimer,
            scope_dir: scope_dir.into(),
            frames_per_second,
            thumbnail_width,
        }
    }

    /// Output template for one generation's strip; distinct per generation so a
    /// re-picked asset never shares files with a superseded extraction
    pub fn template(&self, generation: u64, asset: &SourceAsset) -> String {
        FrameRule::template(&self.scope_dir, &format!("g{}_{}", generation, asset.file_name))
    }

    pub fn request(&self, generation: u64, asset: &SourceAsset, frame_count: usize) -> EncodeRequest {
        EncodeRequest::new(
            EncodeOp::ExtractFrames {
                input: asset.uri.clone(),
                frame_count,
                frames_per_second: self.frames_per_second,
                thumbnail_width: self.thumbnail_width,
            },
            &self.template(generation, asset),
        )
    }

    /// Start extracting `frame_count` thumbnails of `asset` into `sink`
    pub async fn start(
        &self,
        sink: Arc<dyn FrameSink>,
        generation: u64,
        asset: &SourceAsset,
        frame_count: usize,
    ) -> Result<FrameExtraction, DomainError> {
        let request = self.request(generation, asset, frame_count);
        let template = request.output.clone();
        let (channel, events) = JobChannel::open();

        info!(generation, frames = frame_count, input = %asset.uri, "Extracting frames");
        self.encoder.execute(request, channel).await?;

        let reclaimer = Arc::clone(&self.reclaimer);
        let handle = tokio::spawn(Self::drive(events, sink, reclaimer, generation, template, frame_count));
        Ok(FrameExtraction { generation, handle })
    }

    async fn drive(
        mut events: mpsc::UnboundedReceiver<JobEvent>,
        sink: Arc<dyn FrameSink>,
        reclaimer: Arc<Reclaimer>,
        generation: u64,
        template: String,
        frame_count: usize,
    ) -> ExtractionOutcome {
        let mut stale = false;
        while let Some(event) = events.recv().await {
            match event {
                JobEvent::Tick {
                    frame_count: Some(count),
                    ..
                } if !stale && count <= frame_count => {
                    let uri = FrameRule::frame_uri(&template, count);
                    if !sink.frame_ready(generation, count, &uri) && count > 0 {
                        debug!(generation, count, "Dropping stale frame tick");
                        stale = true;
                    }
                }
                JobEvent::Tick { .. } => {}
                JobEvent::Log(line) => debug!(job = "frames", generation, "{}", line),
                JobEvent::Complete(EncodeOutcome::Success { .. }) => {
                    let uris = FrameRule::all_uris(&template, frame_count);
                    if sink.frames_complete(generation, &uris) {
                        return ExtractionOutcome::Completed { frames: frame_count };
                    }
                    reclaimer.reclaim_files(&uris).await;
                    return ExtractionOutcome::Superseded;
                }
                JobEvent::Complete(EncodeOutcome::Failure { detail }) => {
                    warn!(generation, "Frame extraction failed: {}", detail);
                    if stale {
                        reclaimer.reclaim_files(&FrameRule::all_uris(&template, frame_count)).await;
                    }
                    return ExtractionOutcome::Failed(detail);
                }
            }
        }
        ExtractionOutcome::Failed("encoder stopped without reporting completion".to_string())
    }
}
