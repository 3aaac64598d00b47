// Editor interactor - Orchestrates the editing session use cases

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tracing::{info, warn};

use crate::app::session_handle::SessionHandle;
use crate::config::EditorConfig;
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::*;
use crate::domain::session::SessionSnapshot;
use crate::engine::*;
use crate::ports::*;
use crate::timeline::ScrubLoop;
use crate::utils::path::PathUtils;

/// Interactor for the editing session: picking, transforming, scrubbing,
/// sharing and discarding
pub struct EditorInteractor {
    session: SessionHandle,
    orchestrator: TranscodeOrchestrator,
    extractor: FrameExtractor,
    reclaimer: Arc<Reclaimer>,
    fs_port: Arc<dyn FsPort>,
    picker_port: Arc<dyn PickerPort>,
    config: EditorConfig,
    scrub: Mutex<ScrubLoop>,
}

impl EditorInteractor {
    /// Create new editor interactor with injected ports
    pub fn new(
        encoder_port: Arc<dyn EncoderPort>,
        fs_port: Arc<dyn FsPort>,
        picker_port: Arc<dyn PickerPort>,
        config: EditorConfig,
    ) -> Self {
        let scope_dir = config.storage.scope_dir.clone();
        let reclaimer = Arc::new(Reclaimer::new(Arc::clone(&fs_port)));
        let orchestrator = TranscodeOrchestrator::new(Arc::clone(&encoder_port), scope_dir.clone());
        let extractor = FrameExtractor::new(
            encoder_port,
            Arc::clone(&reclaimer),
            scope_dir,
            config.frames.frames_per_second,
            config.frames.thumbnail_width,
        );

        Self {
            session: SessionHandle::new(),
            orchestrator,
            extractor,
            reclaimer,
            fs_port,
            picker_port,
            scrub: Mutex::new(ScrubLoop::new(config.timeline)),
            config,
        }
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    pub fn snapshot(&self) -> Result<SessionSnapshot, DomainError> {
        self.session.snapshot()
    }

    /// Observe session snapshots (progress, preview, frames)
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.session.subscribe()
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    fn scope_dir(&self) -> &Path {
        &self.config.storage.scope_dir
    }

    fn scope_str(&self) -> String {
        self.scope_dir().to_string_lossy().to_string()
    }

    fn slideshow_list_path(&self) -> PathBuf {
        self.scope_dir().join(SLIDESHOW_LIST_NAME)
    }

    fn ensure_not_editing(&self, operation: &str) -> Result<(), DomainError> {
        let phase = self.session.read(|s| s.phase())?;
        if phase == SessionPhase::Editing || self.orchestrator.is_busy() {
            return Err(DomainError::InvalidState(format!(
                "cannot {} while a job is running",
                operation
            )));
        }
        Ok(())
    }

    /// Ask the picker for a video and load it. `None` when the picker was dismissed.
    pub async fn pick_video(&self) -> Result<Option<FrameExtraction>, DomainError> {
        self.ensure_not_editing("pick a video")?;
        match self.picker_port.pick_video().await? {
            Some(asset) => self.load_video(asset).await.map(Some),
            None => {
                info!("Video picker dismissed");
                Ok(None)
            }
        }
    }

    /// Discard the current session and load `asset`, starting frame extraction
    pub async fn load_video(&self, mut asset: SourceAsset) -> Result<FrameExtraction, DomainError> {
        self.ensure_not_editing("load a video")?;
        asset.uri = PathUtils::strip_file_scheme(&asset.uri).to_string();

        self.discard(true).await?;
        self.fs_port.ensure_dir(&self.scope_str()).await?;

        let frame_count =
            FrameRule::frame_count(asset.duration * self.config.frames.frames_per_second as f64);
        let generation = self
            .session
            .update(|s| s.load_video(asset.clone(), frame_count))??;
        info!(
            generation,
            uri = %asset.uri,
            duration = asset.duration,
            frames = frame_count,
            "Video loaded"
        );

        let sink: Arc<dyn FrameSink> = Arc::new(self.session.clone());
        self.extractor.start(sink, generation, &asset, frame_count).await
    }

    /// Ask the picker for slideshow photos. Returns how many were kept, `None`
    /// when the picker was dismissed.
    pub async fn pick_photos(&self) -> Result<Option<usize>, DomainError> {
        self.ensure_not_editing("pick photos")?;
        let limit = self.config.picker.max_photos;
        let Some(mut photos) = self.picker_port.pick_photos(limit).await? else {
            info!("Photo picker dismissed");
            return Ok(None);
        };
        photos.truncate(limit);
        if photos.is_empty() {
            return Ok(None);
        }

        self.discard(true).await?;
        self.fs_port.ensure_dir(&self.scope_str()).await?;

        // A list that cannot be written aborts the pick
        let list_path = self.slideshow_list_path();
        self.fs_port
            .write(&list_path.to_string_lossy(), &SlideshowRule::file_list(&photos))
            .await?;

        let kept = self.session.update(|s| s.select_photos(photos, limit))??;
        info!(photos = kept, "Photos selected");
        Ok(Some(kept))
    }

    /// Run one transformation job to completion.
    ///
    /// Fails fast with `InvariantViolation` while another job holds the slot.
    pub async fn apply(&self, transform: Transform) -> Result<JobReport, DomainError> {
        let permit = self.orchestrator.acquire_slot()?;
        let list_path = self.slideshow_list_path().to_string_lossy().to_string();
        let slideshow_list = matches!(transform, Transform::CreateSlideshow { .. }).then_some(list_path.as_str());

        let ticket = self
            .session
            .update(|s| s.begin_job(&transform, slideshow_list))??;
        let request = self.orchestrator.build_request(&ticket, &transform);

        let mut job = match self.orchestrator.dispatch(permit, &ticket, request).await {
            Ok(job) => job,
            Err(e) => {
                self.session.update(|s| s.fail_job(ticket.generation))?;
                return Err(e);
            }
        };

        while let Some(update) = job.next().await {
            match update {
                JobUpdate::Progress(percent) => {
                    self.session
                        .update(|s| s.record_progress(ticket.generation, percent))?;
                }
                JobUpdate::Finished(Ok(output)) => {
                    let committed = self.session.update(|s| s.commit_job(ticket.generation, &output))?;
                    if !committed {
                        warn!(job = %ticket.kind, output = %output, "Session moved on, reclaiming job output");
                        self.reclaimer.reclaim_file(&output).await;
                        return Err(DomainError::InvalidState(format!(
                            "session was discarded while the {} job ran",
                            ticket.kind
                        )));
                    }
                    info!(job = %ticket.kind, output = %output, "Job committed");
                    return Ok(JobReport {
                        kind: ticket.kind,
                        output,
                        generation: ticket.generation,
                    });
                }
                JobUpdate::Finished(Err(e)) => {
                    self.session.update(|s| s.fail_job(ticket.generation))?;
                    warn!(job = %ticket.kind, "Job failed: {}", e);
                    return Err(e);
                }
            }
        }

        self.session.update(|s| s.fail_job(ticket.generation))?;
        Err(DomainError::JobFailed {
            kind: ticket.kind,
            detail: "job ended without a result".to_string(),
        })
    }

    /// Run a transformation whose file input comes from a picker.
    ///
    /// `None` when the picker was dismissed; state is then unchanged.
    pub async fn apply_picked(&self, kind: JobKind) -> Result<Option<JobReport>, DomainError> {
        let transform = match kind {
            JobKind::AttachAudio => match self.picker_port.pick_audio().await? {
                Some(file) => Transform::AttachAudio { audio_uri: file.uri },
                None => return Ok(None),
            },
            JobKind::AddWatermark => match self.picker_port.pick_image().await? {
                Some(file) => Transform::AddWatermark { image_uri: file.uri },
                None => return Ok(None),
            },
            JobKind::CreateSlideshow => match self.picker_port.pick_audio().await? {
                Some(file) => Transform::CreateSlideshow { audio_uri: file.uri },
                None => return Ok(None),
            },
            JobKind::IncreaseSpeed => Transform::IncreaseSpeed,
            JobKind::CutSegment => Transform::CutSegment { start_time: None },
            JobKind::ExtractFrames => {
                return Err(DomainError::BadArgs(
                    "frame extraction is started by loading a video".to_string(),
                ))
            }
        };
        self.apply(transform).await.map(Some)
    }

    /// Reset the session to `Empty` and reclaim its files.
    ///
    /// Reclamation failures are logged and never returned.
    pub async fn discard(&self, was_edited: bool) -> Result<ReclaimSummary, DomainError> {
        let plan = self.session.update(|s| s.reset(was_edited))?;
        if let Ok(mut scrub) = self.scrub.lock() {
            scrub.reset();
        }
        let summary = self.reclaimer.reclaim_plan(&plan, &self.scope_str()).await;
        info!(deleted = summary.deleted, failed = summary.failed, "Session discarded");
        Ok(summary)
    }

    /// Hand the current asset to the share collaborator.
    ///
    /// Returns where it went, or `None` if sharing failed.
    pub async fn share(&self) -> Result<Option<String>, DomainError> {
        let current = self
            .session
            .read(|s| s.current_asset().map(str::to_string))?
            .ok_or_else(|| DomainError::InvalidState("nothing to share".to_string()))?;
        match self.fs_port.share(&current).await {
            Ok(destination) => Ok(Some(destination)),
            Err(e) => {
                warn!(path = %current, "Share failed: {}", e);
                Ok(None)
            }
        }
    }

    /// Handle a timeline scroll: returns the time to seek playback to and
    /// stores the cut start the offset selects
    pub fn scrub(&self, scroll_offset: f64) -> Result<f64, DomainError> {
        let (duration, frame_count) = self.session.read(|s| {
            (
                s.source().map(|source| source.duration),
                s.frames().len(),
            )
        })?;
        let duration = duration.ok_or_else(|| DomainError::InvalidState("no video loaded".to_string()))?;

        let seek = self
            .scrub
            .lock()
            .map_err(|_| DomainError::InvalidState("scrub lock poisoned".to_string()))?
            .on_scroll(scroll_offset);
        let start_time = self
            .config
            .timeline
            .start_time_for_offset(scroll_offset, duration, frame_count);
        self.session.update(|s| s.record_scrub(scroll_offset, start_time))?;
        Ok(seek)
    }

    /// Handle a playback progress report; returns a seek target when the
    /// scrub loop wraps. Only the unedited preview loops.
    pub fn playback_progress(&self, current_time: f64) -> Result<Option<f64>, DomainError> {
        if self.session.read(|s| s.is_edited())? {
            return Ok(None);
        }
        Ok(self
            .scrub
            .lock()
            .map_err(|_| DomainError::InvalidState("scrub lock poisoned".to_string()))?
            .on_playback_progress(current_time))
    }

    pub fn touch_start(&self) -> Result<(), DomainError> {
        self.session.update(|s| s.set_paused(true))
    }

    pub fn touch_end(&self) -> Result<(), DomainError> {
        self.session.update(|s| s.set_paused(false))
    }

    pub fn toggle_paused(&self) -> Result<bool, DomainError> {
        self.session.update(|s| {
            let paused = !s.paused();
            s.set_paused(paused);
            paused
        })
    }

    pub fn toggle_muted(&self) -> Result<bool, DomainError> {
        self.session.update(|s| {
            let muted = !s.muted();
            s.set_muted(muted);
            muted
        })
    }
}
