//! Editing session tests against in-memory ports

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use scrubcut::app::EditorInteractor;
use scrubcut::config::EditorConfig;
use scrubcut::domain::errors::DomainError;
use scrubcut::domain::model::*;
use scrubcut::engine::ExtractionOutcome;
use scrubcut::ports::{EncoderEvents, EncoderPort, FsPort, PickerPort};

/// Encoder that completes every request on a spawned task.
///
/// Frame extraction ticks once per frame; other jobs tick at 25% and 50% of
/// a 12 second source, optionally waiting on `gate` first.
#[derive(Default)]
struct FakeEncoder {
    requests: Mutex<Vec<EncodeRequest>>,
    failing: HashSet<JobKind>,
    gate: Option<Arc<Notify>>,
}

impl FakeEncoder {
    fn failing(kind: JobKind) -> Self {
        Self {
            failing: [kind].into_iter().collect(),
            ..Self::default()
        }
    }

    fn gated(gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::default()
        }
    }

    fn job_requests(&self) -> Vec<EncodeRequest> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|request| request.kind() != JobKind::ExtractFrames)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl EncoderPort for FakeEncoder {
    async fn execute(&self, request: EncodeRequest, events: Arc<dyn EncoderEvents>) -> Result<(), DomainError> {
        self.requests.lock().unwrap().push(request.clone());
        let fail = self.failing.contains(&request.kind());
        let gate = self.gate.clone().filter(|_| request.kind() != JobKind::ExtractFrames);

        tokio::spawn(async move {
            if let Some(gate) = gate {
                gate.notified().await;
            }
            match &request.op {
                EncodeOp::ExtractFrames { frame_count, .. } => {
                    for count in 1..=*frame_count {
                        events.on_progress_tick(count as u64 * 1000, Some(count));
                    }
                }
                _ => {
                    events.on_progress_tick(3000, None);
                    events.on_log("frame=  90 fps=30 q=-1.0 size=256kB");
                    events.on_progress_tick(6000, None);
                }
            }
            if fail {
                events.on_complete(EncodeOutcome::Failure {
                    detail: "exit status: 1: Invalid data found when processing input".to_string(),
                });
            } else {
                events.on_complete(EncodeOutcome::Success {
                    output: request.output.clone(),
                });
            }
        });
        Ok(())
    }
}

#[derive(Default)]
struct MemoryFs {
    written: Mutex<Vec<(String, String)>>,
    deleted: Mutex<Vec<String>>,
    scope_clears: Mutex<usize>,
}

#[async_trait]
impl FsPort for MemoryFs {
    async fn write(&self, path: &str, content: &str) -> Result<(), DomainError> {
        self.written.lock().unwrap().push((path.to_string(), content.to_string()));
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<(), DomainError> {
        self.deleted.lock().unwrap().push(path.to_string());
        Ok(())
    }

    async fn delete_all(&self, _scope_dir: &str) -> Result<(), DomainError> {
        *self.scope_clears.lock().unwrap() += 1;
        Ok(())
    }

    async fn share(&self, path: &str) -> Result<String, DomainError> {
        Ok(format!("/exports/{}", path.rsplit('/').next().unwrap_or(path)))
    }

    async fn ensure_dir(&self, _dir_path: &str) -> Result<(), DomainError> {
        Ok(())
    }
}

#[derive(Default)]
struct FakePicker {
    video: Option<SourceAsset>,
    photos: Vec<PickedPhoto>,
    audio: Option<PickedFile>,
}

#[async_trait]
impl PickerPort for FakePicker {
    async fn pick_video(&self) -> Result<Option<SourceAsset>, DomainError> {
        Ok(self.video.clone())
    }

    async fn pick_photos(&self, limit: usize) -> Result<Option<Vec<PickedPhoto>>, DomainError> {
        if self.photos.is_empty() {
            return Ok(None);
        }
        Ok(Some(self.photos.iter().take(limit).cloned().collect()))
    }

    async fn pick_image(&self) -> Result<Option<PickedFile>, DomainError> {
        Ok(None)
    }

    async fn pick_audio(&self) -> Result<Option<PickedFile>, DomainError> {
        Ok(self.audio.clone())
    }
}

fn test_config() -> EditorConfig {
    let mut config = EditorConfig::default();
    config.storage.scope_dir = PathBuf::from("/scope");
    config
}

fn clip() -> SourceAsset {
    SourceAsset::new("file:///videos/clip.mp4", 12.0, "clip.mp4").unwrap()
}

fn editor(encoder: Arc<FakeEncoder>, fs: Arc<MemoryFs>, picker: FakePicker) -> EditorInteractor {
    EditorInteractor::new(encoder, fs, Arc::new(picker), test_config())
}

async fn load_clip(editor: &EditorInteractor) {
    let extraction = editor.load_video(clip()).await.unwrap();
    assert_eq!(extraction.wait().await.unwrap(), ExtractionOutcome::Completed { frames: 12 });
}

async fn wait_for_phase(editor: &EditorInteractor, phase: SessionPhase) {
    let mut snapshots = editor.subscribe();
    while snapshots.borrow_and_update().phase != phase {
        snapshots.changed().await.unwrap();
    }
}

#[tokio::test]
async fn test_load_extracts_strip_and_discard_reclaims_it() {
    let encoder = Arc::new(FakeEncoder::default());
    let fs = Arc::new(MemoryFs::default());
    let editor = editor(Arc::clone(&encoder), Arc::clone(&fs), FakePicker::default());

    load_clip(&editor).await;

    let snapshot = editor.snapshot().unwrap();
    assert_eq!(snapshot.phase, SessionPhase::Loaded);
    assert_eq!(snapshot.current_asset.as_deref(), Some("/videos/clip.mp4"));
    assert!(snapshot.frames.is_complete());
    let frames = snapshot.frames.ready_uris();
    assert_eq!(frames.len(), 12);
    assert!(frames[0].ends_with("clip.mp4_0001.png"), "{}", frames[0]);
    assert!(frames[11].ends_with("clip.mp4_0012.png"), "{}", frames[11]);

    let clears_before = *fs.scope_clears.lock().unwrap();
    let summary = editor.discard(false).await.unwrap();
    assert_eq!(summary.deleted, 12);
    assert_eq!(*fs.scope_clears.lock().unwrap(), clears_before + 1);

    let deleted = fs.deleted.lock().unwrap().clone();
    assert_eq!(deleted, frames);
    assert!(!deleted.iter().any(|path| path == "/videos/clip.mp4"));

    let snapshot = editor.snapshot().unwrap();
    assert_eq!(snapshot.phase, SessionPhase::Empty);
    assert!(snapshot.frames.is_empty());
}

#[tokio::test]
async fn test_second_job_is_rejected_while_one_runs() {
    let gate = Arc::new(Notify::new());
    let encoder = Arc::new(FakeEncoder::gated(Arc::clone(&gate)));
    let fs = Arc::new(MemoryFs::default());
    let editor = Arc::new(editor(Arc::clone(&encoder), fs, FakePicker::default()));
    load_clip(&editor).await;

    let first = {
        let editor = Arc::clone(&editor);
        tokio::spawn(async move { editor.apply(Transform::IncreaseSpeed).await })
    };
    wait_for_phase(&editor, SessionPhase::Editing).await;

    let second = editor.apply(Transform::CutSegment { start_time: Some(1.0) }).await;
    assert!(matches!(second, Err(DomainError::InvariantViolation(_))));
    assert!(editor.pick_video().await.is_err());

    gate.notify_one();
    let report = first.await.unwrap().unwrap();
    assert_eq!(report.kind, JobKind::IncreaseSpeed);
    assert_eq!(encoder.job_requests().len(), 1);

    let snapshot = editor.snapshot().unwrap();
    assert_eq!(snapshot.phase, SessionPhase::Committed);
    assert_eq!(snapshot.current_asset.as_deref(), Some(report.output.as_str()));
    assert_eq!(snapshot.progress, 100.0);
}

#[tokio::test]
async fn test_failed_job_restores_previous_state() {
    let encoder = Arc::new(FakeEncoder::failing(JobKind::IncreaseSpeed));
    let fs = Arc::new(MemoryFs::default());
    let editor = editor(Arc::clone(&encoder), fs, FakePicker::default());
    load_clip(&editor).await;

    let result = editor.apply(Transform::IncreaseSpeed).await;
    match result {
        Err(DomainError::JobFailed { kind, detail }) => {
            assert_eq!(kind, JobKind::IncreaseSpeed);
            assert!(detail.contains("Invalid data"));
        }
        other => panic!("expected a job failure, got {:?}", other),
    }

    let snapshot = editor.snapshot().unwrap();
    assert_eq!(snapshot.phase, SessionPhase::Loaded);
    assert_eq!(snapshot.current_asset.as_deref(), Some("/videos/clip.mp4"));
    assert_eq!(snapshot.progress, 0.0);

    // The slot is free again
    assert!(editor.apply(Transform::CutSegment { start_time: None }).await.is_ok());
}

#[tokio::test]
async fn test_scrub_selects_cut_start() {
    let encoder = Arc::new(FakeEncoder::default());
    let fs = Arc::new(MemoryFs::default());
    let editor = editor(Arc::clone(&encoder), fs, FakePicker::default());
    load_clip(&editor).await;

    // 12 tiles of 40px: 120px is a quarter of the strip
    let seek = editor.scrub(120.0).unwrap();
    assert_eq!(seek, 5.0);
    assert_eq!(editor.snapshot().unwrap().cut_start, 3.0);

    assert_eq!(editor.playback_progress(6.0).unwrap(), None);
    assert_eq!(editor.playback_progress(7.0).unwrap(), Some(3.0));
    assert_eq!(editor.playback_progress(7.5).unwrap(), None);

    let report = editor.apply(Transform::CutSegment { start_time: None }).await.unwrap();
    let requests = encoder.job_requests();
    assert_eq!(requests.len(), 1);
    match &requests[0].op {
        EncodeOp::CutSegment { input, start, duration } => {
            assert_eq!(input, "/videos/clip.mp4");
            assert_eq!(*start, 3.0);
            assert_eq!(*duration, 9.0);
        }
        other => panic!("unexpected op {:?}", other),
    }
    assert_eq!(requests[0].output, report.output);

    let snapshot = editor.snapshot().unwrap();
    assert_eq!(snapshot.cut_start, 0.0);
    // Edited previews do not loop
    assert_eq!(editor.playback_progress(100.0).unwrap(), None);
}

#[tokio::test]
async fn test_chained_edits_and_discard_reclaims_output() {
    let encoder = Arc::new(FakeEncoder::default());
    let fs = Arc::new(MemoryFs::default());
    let editor = editor(Arc::clone(&encoder), Arc::clone(&fs), FakePicker::default());
    load_clip(&editor).await;

    let speed = editor.apply(Transform::IncreaseSpeed).await.unwrap();
    let watermark = editor
        .apply(Transform::AddWatermark {
            image_uri: "/images/logo.png".to_string(),
        })
        .await
        .unwrap();

    let requests = encoder.job_requests();
    match &requests[1].op {
        EncodeOp::Overlay { input, image, .. } => {
            assert_eq!(input, &speed.output);
            assert_eq!(image, "/images/logo.png");
        }
        other => panic!("unexpected op {:?}", other),
    }

    let shared = editor.share().await.unwrap().unwrap();
    let output_name = watermark.output.rsplit('/').next().unwrap();
    assert_eq!(shared, format!("/exports/{}", output_name));

    editor.discard(true).await.unwrap();
    let deleted = fs.deleted.lock().unwrap().clone();
    assert!(deleted.contains(&watermark.output));
    assert!(deleted.contains(&speed.output));
    assert!(!deleted.iter().any(|path| path == "/videos/clip.mp4"));
}

#[tokio::test]
async fn test_job_finishing_after_discard_is_reclaimed() {
    let gate = Arc::new(Notify::new());
    let encoder = Arc::new(FakeEncoder::gated(Arc::clone(&gate)));
    let fs = Arc::new(MemoryFs::default());
    let editor = Arc::new(editor(Arc::clone(&encoder), Arc::clone(&fs), FakePicker::default()));
    load_clip(&editor).await;

    let job = {
        let editor = Arc::clone(&editor);
        tokio::spawn(async move {
            editor
                .apply(Transform::AttachAudio {
                    audio_uri: "/music/track.mp3".to_string(),
                })
                .await
        })
    };
    wait_for_phase(&editor, SessionPhase::Editing).await;
    assert!(editor.snapshot().unwrap().muted);

    editor.discard(true).await.unwrap();
    gate.notify_one();

    let result = job.await.unwrap();
    assert!(matches!(result, Err(DomainError::InvalidState(_))));

    let output = encoder.job_requests()[0].output.clone();
    assert!(fs.deleted.lock().unwrap().contains(&output));

    let snapshot = editor.snapshot().unwrap();
    assert_eq!(snapshot.phase, SessionPhase::Empty);
    assert_eq!(snapshot.current_asset, None);
}

#[tokio::test]
async fn test_slideshow_from_picked_photos() {
    let encoder = Arc::new(FakeEncoder::default());
    let fs = Arc::new(MemoryFs::default());
    let picker = FakePicker {
        photos: (1..=9).map(|i| PickedPhoto::new(&format!("/photos/{}.jpg", i))).collect(),
        audio: Some(PickedFile::new("/music/track.mp3")),
        ..FakePicker::default()
    };
    let editor = editor(Arc::clone(&encoder), Arc::clone(&fs), picker);

    assert_eq!(editor.pick_photos().await.unwrap(), Some(7));
    let snapshot = editor.snapshot().unwrap();
    assert_eq!(snapshot.phase, SessionPhase::PhotosSelected);
    assert_eq!(snapshot.pictures.len(), 7);

    let written = fs.written.lock().unwrap().clone();
    assert_eq!(written.len(), 1);
    assert_eq!(written[0].0, "/scope/slideshow_list.txt");
    assert!(written[0].1.starts_with("file '/photos/1.jpg'\nduration 2\nfile '/photos/2.jpg'"));
    assert!(!written[0].1.contains("/photos/8.jpg"));

    let report = editor.apply_picked(JobKind::CreateSlideshow).await.unwrap().unwrap();
    assert_eq!(report.output, "/scope/slideshow.mp4");
    match &encoder.job_requests()[0].op {
        EncodeOp::Slideshow { list_file, audio } => {
            assert_eq!(list_file, "/scope/slideshow_list.txt");
            assert_eq!(audio, "/music/track.mp3");
        }
        other => panic!("unexpected op {:?}", other),
    }

    let snapshot = editor.snapshot().unwrap();
    assert_eq!(snapshot.phase, SessionPhase::Committed);
    assert_eq!(snapshot.source.map(|source| source.duration), Some(14.0));
    assert!(snapshot.pictures.is_empty());
    assert!(!snapshot.muted);
}

#[tokio::test]
async fn test_dismissed_pickers_leave_state_unchanged() {
    let encoder = Arc::new(FakeEncoder::default());
    let fs = Arc::new(MemoryFs::default());
    let editor = editor(Arc::clone(&encoder), Arc::clone(&fs), FakePicker::default());

    assert!(editor.pick_video().await.unwrap().is_none());
    assert!(editor.pick_photos().await.unwrap().is_none());

    let snapshot = editor.snapshot().unwrap();
    assert_eq!(snapshot.phase, SessionPhase::Empty);
    assert_eq!(snapshot.generation, 0);
    assert!(encoder.requests.lock().unwrap().is_empty());
    assert_eq!(*fs.scope_clears.lock().unwrap(), 0);

    load_clip(&editor).await;
    assert!(editor.apply_picked(JobKind::AddWatermark).await.unwrap().is_none());
    assert_eq!(editor.snapshot().unwrap().phase, SessionPhase::Loaded);
    assert!(encoder.job_requests().is_empty());
}

#[tokio::test]
async fn test_playback_controls() {
    let editor = editor(
        Arc::new(FakeEncoder::default()),
        Arc::new(MemoryFs::default()),
        FakePicker::default(),
    );

    editor.touch_start().unwrap();
    assert!(editor.snapshot().unwrap().paused);
    editor.touch_end().unwrap();
    assert!(!editor.snapshot().unwrap().paused);

    assert!(editor.toggle_paused().unwrap());
    assert!(editor.toggle_muted().unwrap());
    assert!(!editor.toggle_muted().unwrap());
}
