// Session aggregate - the single source of truth for an editing session

use serde::Serialize;

use crate::domain::errors::DomainError;
use crate::domain::model::*;
use crate::domain::rules::*;

pub mod frames;

pub use frames::FrameStrip;


/// Everything a job needs from the session, captured when it begins
#[derive(Debug, Clone, PartialEq)]
pub struct JobTicket {
    pub kind: JobKind,
    pub generation: u64,
    /// URI the job reads (the current asset, or the slideshow list)
    pub input: String,
    /// Display name output paths are derived from
    pub file_name: String,
    /// Duration of the current asset in seconds
    pub duration: f64,
    /// Clamped `(start, duration)` for cut jobs
    pub window: Option<(f64, f64)>,
    /// Monotonic per-session output counter
    pub sequence: u64,
}

/// Files to delete after a reset
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReclaimPlan {
    pub frames: Vec<String>,
    /// The edited current asset, never the device original
    pub current: Option<String>,
    pub original_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
struct ActiveJob {
    kind: JobKind,
    generation: u64,
    resume_phase: SessionPhase,
    resume_muted: bool,
    window: Option<(f64, f64)>,
}

/// Read-only copy of the session for rendering
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub generation: u64,
    pub source: Option<SourceAsset>,
    pub current_asset: Option<String>,
    pub original_path: Option<String>,
    pub muted: bool,
    pub paused: bool,
    pub progress: f64,
    pub frames: FrameStrip,
    pub pictures: Vec<PickedPhoto>,
    pub cut_start: f64,
    pub scrub_offset: f64,
}

/// The editing session state machine.
///
/// `current_asset` only changes through [`Session::load_video`] and
/// [`Session::commit_job`]; every other field is likewise mutated only by the
/// named transitions below.
#[derive(Debug, Clone)]
pub struct Session {
    phase: SessionPhase,
    generation: u64,
    source: Option<SourceAsset>,
    original_path: Option<String>,
    current_asset: Option<String>,
    current_duration: f64,
    edited: bool,
    muted: bool,
    paused: bool,
    progress: f64,
    frames: FrameStrip,
    pictures: Vec<PickedPhoto>,
    active_job: Option<ActiveJob>,
    cut_start: f64,
    scrub_offset: f64,
    output_sequence: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            phase: SessionPhase::Empty,
            generation: 0,
            source: None,
            original_path: None,
            current_asset: None,
            current_duration: 0.0,
            edited: false,
            muted: false,
            paused: false,
            progress: 0.0,
            frames: FrameStrip::default(),
            pictures: Vec::new(),
            active_job: None,
            cut_start: 0.0,
            scrub_offset: 0.0,
            output_sequence: 0,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn source(&self) -> Option<&SourceAsset> {
        self.source.as_ref()
    }

    pub fn current_asset(&self) -> Option<&str> {
        self.current_asset.as_deref()
    }

    pub fn original_path(&self) -> Option<&str> {
        self.original_path.as_deref()
    }

    pub fn is_edited(&self) -> bool {
        self.edited
    }

    pub fn muted(&self) -> bool {
        self.muted
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn frames(&self) -> &FrameStrip {
        &self.frames
    }

    pub fn pictures(&self) -> &[PickedPhoto] {
        &self.pictures
    }

    pub fn cut_start(&self) -> f64 {
        self.cut_start
    }

    pub fn has_active_job(&self) -> bool {
        self.active_job.is_some()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase,
            generation: self.generation,
            source: self.source.clone(),
            current_asset: self.current_asset.clone(),
            original_path: self.original_path.clone(),
            muted: self.muted,
            paused: self.paused,
            progress: self.progress,
            frames: self.frames.clone(),
            pictures: self.pictures.clone(),
            cut_start: self.cut_start,
            scrub_offset: self.scrub_offset,
        }
    }

    /// Return to `Empty`, invalidating every in-flight callback.
    ///
    /// `was_edited` asks for the current asset to be reclaimed; it is only
    /// honoured when the current asset came out of a committed job.
    pub fn reset(&mut self, was_edited: bool) -> ReclaimPlan {
        let plan = ReclaimPlan {
            frames: self.frames.clear(),
            current: self
                .current_asset
                .clone()
                .filter(|current| was_edited && self.edited && Some(current) != self.original_path.as_ref()),
            original_path: self.original_path.clone(),
        };

        let sequence = self.output_sequence;
        *self = Self {
            generation: self.generation + 1,
            output_sequence: sequence,
            ..Self::new()
        };
        plan
    }

    /// Load a freshly picked video. Valid only from `Empty`; callers discard first.
    ///
    /// Returns the generation the frame extraction must be tagged with.
    pub fn load_video(&mut self, asset: SourceAsset, frame_count: usize) -> Result<u64, DomainError> {
        if self.phase != SessionPhase::Empty {
            return Err(DomainError::InvalidState(format!(
                "cannot load a video while the session is {}",
                self.phase
            )));
        }

        self.generation += 1;
        self.current_asset = Some(asset.uri.clone());
        self.current_duration = asset.duration;
        self.source = Some(asset);
        self.frames = FrameStrip::placeholders(self.generation, frame_count);
        self.muted = false;
        self.phase = SessionPhase::Loaded;
        Ok(self.generation)
    }

    /// Keep at most `max_count` photos for the slideshow path. Valid only from `Empty`.
    pub fn select_photos(&mut self, mut photos: Vec<PickedPhoto>, max_count: usize) -> Result<usize, DomainError> {
        if self.phase != SessionPhase::Empty {
            return Err(DomainError::InvalidState(format!(
                "cannot select photos while the session is {}",
                self.phase
            )));
        }
        photos.truncate(max_count);
        if photos.is_empty() {
            return Err(DomainError::BadArgs("No photos selected".to_string()));
        }

        self.generation += 1;
        self.pictures = photos;
        self.phase = SessionPhase::PhotosSelected;
        Ok(self.pictures.len())
    }

    /// Move into `Editing` for one job and capture what it needs.
    ///
    /// `slideshow_list` is the written concat file for slideshow jobs.
    pub fn begin_job(&mut self, transform: &Transform, slideshow_list: Option<&str>) -> Result<JobTicket, DomainError> {
        if let Some(active) = &self.active_job {
            return Err(DomainError::InvariantViolation(format!(
                "a {} job is already active",
                active.kind
            )));
        }

        let kind = transform.kind();
        let (input, file_name, duration) = match (kind, self.phase) {
            (JobKind::CreateSlideshow, SessionPhase::PhotosSelected) => {
                let list = slideshow_list.ok_or_else(|| {
                    DomainError::InvalidState("slideshow file list has not been written".to_string())
                })?;
                (list.to_string(), SLIDESHOW_FILE_NAME.to_string(), 0.0)
            }
            (JobKind::CreateSlideshow, phase) => {
                return Err(DomainError::InvalidState(format!(
                    "slideshow needs picked photos, session is {}",
                    phase
                )))
            }
            (_, SessionPhase::Loaded | SessionPhase::Committed) => {
                let (Some(source), Some(current)) = (&self.source, &self.current_asset) else {
                    return Err(DomainError::InvalidState("no current asset".to_string()));
                };
                (current.clone(), source.file_name.clone(), self.current_duration)
            }
            (_, phase) => {
                return Err(DomainError::InvalidState(format!(
                    "cannot start a {} job while the session is {}",
                    kind, phase
                )))
            }
        };

        let window = match transform {
            Transform::CutSegment { start_time } => {
                let start = start_time.unwrap_or(self.cut_start);
                let (start, length) = SegmentWindow::clamp(duration, start, SEGMENT_LENGTH_SECS);
                if length <= 0.0 {
                    return Err(DomainError::BadArgs(format!(
                        "cut start {:.2}s leaves nothing of a {:.2}s asset",
                        start, duration
                    )));
                }
                Some((start, length))
            }
            _ => None,
        };

        let resume_muted = self.muted;
        if matches!(kind, JobKind::AttachAudio | JobKind::CreateSlideshow) {
            self.muted = true;
        }
        self.output_sequence += 1;
        self.progress = 0.0;
        self.active_job = Some(ActiveJob {
            kind,
            generation: self.generation,
            resume_phase: self.phase,
            resume_muted,
            window,
        });
        self.phase = SessionPhase::Editing;

        Ok(JobTicket {
            kind,
            generation: self.generation,
            input,
            file_name,
            duration,
            window,
            sequence: self.output_sequence,
        })
    }

    fn is_current_job(&self, generation: u64) -> bool {
        self.active_job
            .as_ref()
            .is_some_and(|job| job.generation == generation && generation == self.generation)
    }

    /// Apply a progress percentage; never moves backwards, never exceeds 100
    pub fn record_progress(&mut self, generation: u64, percent: f64) -> bool {
        if !self.is_current_job(generation) || !percent.is_finite() {
            return false;
        }
        self.progress = self.progress.max(percent.clamp(0.0, 100.0));
        true
    }

    /// Commit a successful job's output as the current asset.
    ///
    /// Returns `false` if the job was superseded by a reset; its output is then
    /// not referenced by the session and belongs to the caller to reclaim.
    pub fn commit_job(&mut self, generation: u64, output: &str) -> bool {
        if !self.is_current_job(generation) {
            return false;
        }
        let Some(job) = self.active_job.take() else {
            return false;
        };

        match job.kind {
            JobKind::CreateSlideshow => {
                let duration = self.pictures.len() as f64 * SLIDESHOW_IMAGE_SECS as f64;
                self.source = Some(SourceAsset {
                    id: output.to_string(),
                    uri: output.to_string(),
                    duration,
                    file_name: SLIDESHOW_FILE_NAME.to_string(),
                    mime_type: Some("video/mp4".to_string()),
                });
                self.pictures.clear();
                self.current_duration = duration;
                self.original_path = Some(output.to_string());
            }
            JobKind::IncreaseSpeed => {
                self.current_duration /= SPEED_FACTOR;
                self.original_path = Some(output.to_string());
            }
            JobKind::CutSegment => {
                if let Some((_, length)) = job.window {
                    self.current_duration = length;
                }
                self.cut_start = 0.0;
                self.original_path = Some(output.to_string());
            }
            JobKind::AddWatermark => {}
            JobKind::AttachAudio | JobKind::ExtractFrames => {
                self.original_path = Some(output.to_string());
            }
        }

        self.current_asset = Some(output.to_string());
        self.edited = true;
        self.muted = false;
        self.progress = 100.0;
        self.phase = SessionPhase::Committed;
        true
    }

    /// Leave `Editing` after a failed job; state returns to what it was before it
    pub fn fail_job(&mut self, generation: u64) -> bool {
        if !self.is_current_job(generation) {
            return false;
        }
        if let Some(job) = self.active_job.take() {
            self.phase = job.resume_phase;
            self.muted = job.resume_muted;
        }
        self.progress = 0.0;
        true
    }

    /// Mark one extracted thumbnail ready (1-based encoder count)
    pub fn mark_frame_ready(&mut self, generation: u64, count: usize, uri: &str) -> bool {
        generation == self.generation && self.frames.mark_ready(generation, count, uri)
    }

    /// Mark the whole strip ready from index-ordered URIs
    pub fn fill_frames(&mut self, generation: u64, uris: &[String]) -> bool {
        generation == self.generation && self.frames.fill(generation, uris)
    }

    /// Remember the last scrub position and the cut start it selects
    pub fn record_scrub(&mut self, offset: f64, start_time: f64) {
        self.scrub_offset = offset;
        self.cut_start = start_time.max(0.0);
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }
}
