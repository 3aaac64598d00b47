//! Transcode job orchestrator
//!
//! Builds one encoder request per transformation, guards the single job slot
//! and turns the encoder's callbacks into normalized progress and a final
//! result.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{mpsc, OwnedSemaphorePermit, Semaphore};
use tracing::{debug, info, warn};

use super::job::{JobChannel, JobEvent};
use super::progress::ProgressNormalizer;
use crate::domain::errors::DomainError;
use crate::domain::model::*;
use crate::domain::rules::*;
use crate::domain::session::JobTicket;
use crate::ports::EncoderPort;

/// What a running job reports to its driver
#[derive(Debug, Clone, PartialEq)]
pub enum JobUpdate {
    /// Normalized percentage, never lower than the previous one
    Progress(f64),
    /// Output path on success, `JobFailed` otherwise
    Finished(Result<String, DomainError>),
}

/// One dispatched job. Holds the job slot until dropped.
pub struct RunningJob {
    kind: JobKind,
    generation: u64,
    output: String,
    events: mpsc::UnboundedReceiver<JobEvent>,
    progress: ProgressNormalizer,
    finished: bool,
    _permit: OwnedSemaphorePermit,
}

impl RunningJob {
    pub fn kind(&self) -> JobKind {
        self.kind
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    /// Wait for the next update; `None` once the job has finished
    pub async fn next(&mut self) -> Option<JobUpdate> {
        if self.finished {
            return None;
        }
        loop {
            let Some(event) = self.events.recv().await else {
                self.finished = true;
                return Some(JobUpdate::Finished(Err(DomainError::JobFailed {
                    kind: self.kind,
                    detail: "encoder stopped without reporting completion".to_string(),
                })));
            };
            match event {
                JobEvent::Tick { elapsed_ms, .. } => {
                    let before = self.progress.last();
                    let percent = self.progress.observe(elapsed_ms);
                    if percent > before {
                        return Some(JobUpdate::Progress(percent));
                    }
                }
                JobEvent::Log(line) => {
                    debug!(job = %self.kind, generation = self.generation, "{}", line);
                }
                JobEvent::Complete(outcome) => {
                    self.finished = true;
                    let result = match outcome {
                        EncodeOutcome::Success { output } => Ok(output),
                        EncodeOutcome::Failure { detail } => Err(DomainError::JobFailed {
                            kind: self.kind,
                            detail,
                        }),
                    };
                    return Some(JobUpdate::Finished(result));
                }
            }
        }
    }
}

/// Dispatches transformation jobs against the encoder, one at a time
pub struct TranscodeOrchestrator {
    encoder: Arc<dyn EncoderPort>,
    slot: Arc<Semaphore>,
    scope_dir: PathBuf,
}

impl TranscodeOrchestrator {
    pub fn new(encoder: Arc<dyn EncoderPort>, scope_dir: impl Into<PathBuf>) -> Self {
        Self {
            encoder,
            slot: Arc::new(Semaphore::new(1)),
            scope_dir: scope_dir.into(),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.slot.available_permits() == 0
    }

    /// Claim the single job slot, failing fast when a job is already running
    pub fn acquire_slot(&self) -> Result<OwnedSemaphorePermit, DomainError> {
        Arc::clone(&self.slot)
            .try_acquire_owned()
            .map_err(|_| DomainError::InvariantViolation("a transcode job is already active".to_string()))
    }

    /// Encoder request for a ticket issued by the session
    pub fn build_request(&self, ticket: &JobTicket, transform: &Transform) -> EncodeRequest {
        let output = OutputNaming::output_path(
            &self.scope_dir,
            ticket.kind,
            &ticket.file_name,
            &ticket.input,
            ticket.sequence,
            chrono::Utc::now().timestamp_millis(),
        );

        let op = match transform {
            Transform::AttachAudio { audio_uri } => EncodeOp::AttachAudio {
                video: ticket.input.clone(),
                audio: audio_uri.clone(),
                duration: ticket.duration,
            },
            Transform::IncreaseSpeed => EncodeOp::ChangeSpeed {
                input: ticket.input.clone(),
                factor: SPEED_FACTOR,
            },
            Transform::CutSegment { .. } => {
                let (start, duration) = ticket
                    .window
                    .unwrap_or_else(|| SegmentWindow::clamp(ticket.duration, 0.0, SEGMENT_LENGTH_SECS));
                EncodeOp::CutSegment {
                    input: ticket.input.clone(),
                    start,
                    duration,
                }
            }
            Transform::AddWatermark { image_uri } => EncodeOp::Overlay {
                input: ticket.input.clone(),
                image: image_uri.clone(),
                height_ratio: WATERMARK_HEIGHT_RATIO,
                anchor: OverlayAnchor::BottomRight,
            },
            Transform::CreateSlideshow { audio_uri } => EncodeOp::Slideshow {
                list_file: ticket.input.clone(),
                audio: audio_uri.clone(),
            },
        };

        EncodeRequest::new(op, &output)
    }

    /// Start the encoder for a ticket. The slot is released when the returned
    /// job is dropped, or right away if the encoder cannot start.
    pub async fn dispatch(
        &self,
        permit: OwnedSemaphorePermit,
        ticket: &JobTicket,
        request: EncodeRequest,
    ) -> Result<RunningJob, DomainError> {
        let reference = ProgressRule::reference_duration(ticket.kind, ticket.duration);
        let output = request.output.clone();
        let (channel, events) = JobChannel::open();

        info!(
            job = %ticket.kind,
            generation = ticket.generation,
            input = %ticket.input,
            output = %output,
            "Dispatching transcode job"
        );
        if let Err(e) = self.encoder.execute(request, channel).await {
            warn!(job = %ticket.kind, "Encoder did not start: {}", e);
            return Err(e);
        }

        Ok(RunningJob {
            kind: ticket.kind,
            generation: ticket.generation,
            output,
            events,
            progress: ProgressNormalizer::new(reference),
            finished: false,
            _permit: permit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::EncoderEvents;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Encoder that replays a fixed script of callbacks
    struct ScriptedEncoder {
        ticks: Vec<u64>,
        outcome: Option<EncodeOutcome>,
        requests: Mutex<Vec<EncodeRequest>>,
    }

    #[async_trait]
    impl EncoderPort for ScriptedEncoder {
        async fn execute(&self, request: EncodeRequest, events: Arc<dyn EncoderEvents>) -> Result<(), DomainError> {
            self.requests.lock().unwrap().push(request.clone());
            for elapsed in &self.ticks {
                events.on_progress_tick(*elapsed, None);
            }
            if let Some(outcome) = &self.outcome {
                events.on_complete(outcome.clone());
            }
            Ok(())
        }
    }

    fn encoder(ticks: Vec<u64>, outcome: Option<EncodeOutcome>) -> Arc<ScriptedEncoder> {
        Arc::new(ScriptedEncoder {
            ticks,
            outcome,
            requests: Mutex::new(Vec::new()),
        })
    }

    fn ticket(kind: JobKind, duration: f64, window: Option<(f64, f64)>) -> JobTicket {
        JobTicket {
            kind,
            generation: 3,
            input: "/videos/beach.mp4".to_string(),
            file_name: "beach.mp4".to_string(),
            duration,
            window,
            sequence: 1,
        }
    }

    async fn drain(job: &mut RunningJob) -> (Vec<f64>, Option<Result<String, DomainError>>) {
        let mut progress = Vec::new();
        while let Some(update) = job.next().await {
            match update {
                JobUpdate::Progress(p) => progress.push(p),
                JobUpdate::Finished(result) => return (progress, Some(result)),
            }
        }
        (progress, None)
    }

    #[test]
    fn test_build_speed_request() {
        let orchestrator = TranscodeOrchestrator::new(encoder(vec![], None), "/cache");
        let request = orchestrator.build_request(&ticket(JobKind::IncreaseSpeed, 12.0, None), &Transform::IncreaseSpeed);
        assert_eq!(
            request.op,
            EncodeOp::ChangeSpeed {
                input: "/videos/beach.mp4".to_string(),
                factor: 2.0
            }
        );
        assert!(request.output.starts_with("/cache/"));
        assert!(request.output.ends_with("-1_beach.mp4"));
    }

    #[test]
    fn test_build_cut_request_uses_window() {
        let orchestrator = TranscodeOrchestrator::new(encoder(vec![], None), "/cache");
        let request = orchestrator.build_request(
            &ticket(JobKind::CutSegment, 20.0, Some((5.0, 15.0))),
            &Transform::CutSegment { start_time: Some(5.0) },
        );
        assert_eq!(
            request.op,
            EncodeOp::CutSegment {
                input: "/videos/beach.mp4".to_string(),
                start: 5.0,
                duration: 15.0
            }
        );
        assert_eq!(request.output, "/cache/cut_beach.mp4");
    }

    #[test]
    fn test_build_watermark_request() {
        let orchestrator = TranscodeOrchestrator::new(encoder(vec![], None), "/cache");
        let request = orchestrator.build_request(
            &ticket(JobKind::AddWatermark, 12.0, None),
            &Transform::AddWatermark {
                image_uri: "/img/logo.png".to_string(),
            },
        );
        assert!(matches!(
            request.op,
            EncodeOp::Overlay {
                height_ratio,
                anchor: OverlayAnchor::BottomRight,
                ..
            } if height_ratio == 0.2
        ));
    }

    #[tokio::test]
    async fn test_slot_is_exclusive() {
        let orchestrator = TranscodeOrchestrator::new(encoder(vec![], None), "/cache");
        let permit = orchestrator.acquire_slot().unwrap();
        assert!(orchestrator.is_busy());

        let err = orchestrator.acquire_slot().unwrap_err();
        assert!(err.is_invariant_violation());

        drop(permit);
        assert!(!orchestrator.is_busy());
    }

    #[tokio::test]
    async fn test_progress_normalized_against_source_duration() {
        let fake = encoder(
            vec![1_000, 3_000, 2_000, 6_000, 9_000],
            Some(EncodeOutcome::Success {
                output: "/cache/out.mp4".to_string(),
            }),
        );
        let orchestrator = TranscodeOrchestrator::new(fake.clone(), "/cache");
        let ticket = ticket(JobKind::IncreaseSpeed, 12.0, None);
        let request = orchestrator.build_request(&ticket, &Transform::IncreaseSpeed);
        let permit = orchestrator.acquire_slot().unwrap();
        let mut job = orchestrator.dispatch(permit, &ticket, request).await.unwrap();

        let (progress, result) = drain(&mut job).await;
        assert_eq!(result, Some(Ok("/cache/out.mp4".to_string())));
        assert_eq!(progress.len(), 4);
        assert!((progress[0] - 100.0 / 12.0).abs() < 1e-9);
        assert_eq!(progress[1], 25.0);
        assert_eq!(progress[2], 50.0);
        assert_eq!(progress[3], 75.0);
        assert_eq!(job.next().await, None);
    }

    #[tokio::test]
    async fn test_cut_progress_uses_whole_source() {
        let fake = encoder(
            vec![15_000],
            Some(EncodeOutcome::Success {
                output: "/cache/cut.mp4".to_string(),
            }),
        );
        let orchestrator = TranscodeOrchestrator::new(fake, "/cache");
        let ticket = ticket(JobKind::CutSegment, 20.0, Some((5.0, 15.0)));
        let request = orchestrator.build_request(&ticket, &Transform::CutSegment { start_time: None });
        let permit = orchestrator.acquire_slot().unwrap();
        let mut job = orchestrator.dispatch(permit, &ticket, request).await.unwrap();

        let (progress, result) = drain(&mut job).await;
        assert_eq!(result, Some(Ok("/cache/cut.mp4".to_string())));
        assert_eq!(progress, vec![75.0]);
    }

    #[tokio::test]
    async fn test_slot_held_until_job_dropped() {
        let fake = encoder(vec![], Some(EncodeOutcome::Success { output: "/o.mp4".to_string() }));
        let orchestrator = TranscodeOrchestrator::new(fake, "/cache");
        let ticket = ticket(JobKind::IncreaseSpeed, 12.0, None);
        let request = orchestrator.build_request(&ticket, &Transform::IncreaseSpeed);
        let permit = orchestrator.acquire_slot().unwrap();
        let job = orchestrator.dispatch(permit, &ticket, request).await.unwrap();

        assert!(orchestrator.acquire_slot().is_err());
        drop(job);
        assert!(orchestrator.acquire_slot().is_ok());
    }

    #[tokio::test]
    async fn test_failure_becomes_job_failed() {
        let fake = encoder(
            vec![500],
            Some(EncodeOutcome::Failure {
                detail: "Invalid data found when processing input".to_string(),
            }),
        );
        let orchestrator = TranscodeOrchestrator::new(fake, "/cache");
        let ticket = ticket(JobKind::CutSegment, 20.0, Some((0.0, 20.0)));
        let request = orchestrator.build_request(&ticket, &Transform::CutSegment { start_time: None });
        let permit = orchestrator.acquire_slot().unwrap();
        let mut job = orchestrator.dispatch(permit, &ticket, request).await.unwrap();

        let (_, result) = drain(&mut job).await;
        match result {
            Some(Err(DomainError::JobFailed { kind, detail })) => {
                assert_eq!(kind, JobKind::CutSegment);
                assert!(detail.contains("Invalid data"));
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_silent_encoder_exit_is_failure() {
        let fake = encoder(vec![100], None);
        let orchestrator = TranscodeOrchestrator::new(fake, "/cache");
        let ticket = ticket(JobKind::AddWatermark, 12.0, None);
        let request = orchestrator.build_request(
            &ticket,
            &Transform::AddWatermark {
                image_uri: "/logo.png".to_string(),
            },
        );
        let permit = orchestrator.acquire_slot().unwrap();
        let mut job = orchestrator.dispatch(permit, &ticket, request).await.unwrap();

        let (_, result) = drain(&mut job).await;
        assert!(matches!(result, Some(Err(DomainError::JobFailed { .. }))));
    }

    #[tokio::test]
    async fn test_slideshow_progress_has_no_reference() {
        let fake = encoder(
            vec![1_000, 4_000],
            Some(EncodeOutcome::Success {
                output: "/cache/slideshow.mp4".to_string(),
            }),
        );
        let orchestrator = TranscodeOrchestrator::new(fake, "/cache");
        let mut ticket = ticket(JobKind::CreateSlideshow, 0.0, None);
        ticket.input = "/cache/slideshow_list.txt".to_string();
        let request = orchestrator.build_request(
            &ticket,
            &Transform::CreateSlideshow {
                audio_uri: "/a.mp3".to_string(),
            },
        );
        assert_eq!(request.output, "/cache/slideshow.mp4");
        let permit = orchestrator.acquire_slot().unwrap();
        let mut job = orchestrator.dispatch(permit, &ticket, request).await.unwrap();

        let (progress, result) = drain(&mut job).await;
        assert!(progress.is_empty());
        assert!(matches!(result, Some(Ok(_))));
    }
}
