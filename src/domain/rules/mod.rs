// Domain rules - Business logic and policies

use std::path::Path;

use crate::domain::model::*;

/// Playback factor applied by the speed transformation
pub const SPEED_FACTOR: f64 = 2.0;

/// Length of the window kept by the cut transformation, in seconds
pub const SEGMENT_LENGTH_SECS: f64 = 30.0;

/// Watermark height as a fraction of the video height
pub const WATERMARK_HEIGHT_RATIO: f64 = 0.2;

/// How long each still is shown in a slideshow, in seconds
pub const SLIDESHOW_IMAGE_SECS: u32 = 2;

/// Output name of a synthesized slideshow
pub const SLIDESHOW_FILE_NAME: &str = "slideshow.mp4";

/// Concat list written when photos are picked
pub const SLIDESHOW_LIST_NAME: &str = "slideshow_list.txt";

/// Frame-number placeholder in thumbnail templates
pub const FRAME_PATTERN: &str = "%04d";

/// Business rules for the cut window
pub struct SegmentWindow;

impl SegmentWindow {
    /// Clamp a requested window to the source.
    ///
    /// Returns `(start, duration)` with `start + duration <= source_duration`
    /// and `duration >= 0`.
    pub fn clamp(source_duration: f64, start: f64, requested: f64) -> (f64, f64) {
        let source_duration = source_duration.max(0.0);
        let start = start.clamp(0.0, source_duration);
        let duration = requested.min(source_duration - start).max(0.0);
        (start, duration)
    }
}

/// Business rules for turning encoder time into a percentage
pub struct ProgressRule;

impl ProgressRule {
    /// `min(100, 100 * elapsed_ms / (reference_secs * 1000))`, or `None` when
    /// there is no usable reference duration
    pub fn percent(elapsed_ms: u64, reference_secs: Option<f64>) -> Option<f64> {
        let reference = reference_secs.filter(|secs| secs.is_finite() && *secs > 0.0)?;
        Some((elapsed_ms as f64 / (reference * 1000.0) * 100.0).min(100.0))
    }

    /// Progress reference for a job: the duration of its source, except for
    /// slideshows whose length is unknown until they are assembled
    pub fn reference_duration(kind: JobKind, source_duration: f64) -> Option<f64> {
        match kind {
            JobKind::CreateSlideshow => None,
            _ => Some(source_duration),
        }
    }
}

/// Business rules for thumbnail strips
pub struct FrameRule;

impl FrameRule {
    /// Number of thumbnails for a duration: one per started second
    pub fn frame_count(duration: f64) -> usize {
        if !duration.is_finite() || duration <= 0.0 {
            return 0;
        }
        duration.ceil() as usize
    }

    /// Output template for a strip, e.g. `<scope>/beach.mp4_%04d.png`
    pub fn template(scope_dir: &Path, file_name: &str) -> String {
        scope_dir
            .join(format!("{}_{}.png", file_name, FRAME_PATTERN))
            .to_string_lossy()
            .to_string()
    }

    /// Substitute a 1-based frame count into a template
    pub fn frame_uri(template: &str, count: usize) -> String {
        template.replacen(FRAME_PATTERN, &format!("{:04}", count), 1)
    }

    /// All `frame_count` URIs of a template, in index order
    pub fn all_uris(template: &str, frame_count: usize) -> Vec<String> {
        (1..=frame_count)
            .map(|count| Self::frame_uri(template, count))
            .collect()
    }
}

/// Business rules for naming job outputs
pub struct OutputNaming;

impl OutputNaming {
    /// Derive the output path of a job from the asset's display name.
    ///
    /// Kinds that run repeatedly get a `<millis>-<seq>` prefix; other kinds get a
    /// deterministic `<tag>_` prefix, falling back to the unique form if that
    /// would overwrite the job's own input.
    pub fn output_path(
        scope_dir: &Path,
        kind: JobKind,
        file_name: &str,
        input: &str,
        sequence: u64,
        now_millis: i64,
    ) -> String {
        if kind == JobKind::CreateSlideshow {
            return Self::join(scope_dir, SLIDESHOW_FILE_NAME);
        }

        let unique = Self::join(
            scope_dir,
            &format!("{}-{}_{}", now_millis, sequence, file_name),
        );
        if kind.runs_repeatedly() {
            return unique;
        }

        let deterministic = Self::join(scope_dir, &format!("{}_{}", kind.tag(), file_name));
        if deterministic == input {
            unique
        } else {
            deterministic
        }
    }

    fn join(scope_dir: &Path, name: &str) -> String {
        scope_dir.join(name).to_string_lossy().to_string()
    }
}

/// Business rules for slideshow assembly
pub struct SlideshowRule;

impl SlideshowRule {
    /// Concat-demuxer file list: each photo followed by its display duration
    pub fn file_list(photos: &[PickedPhoto]) -> String {
        photos
            .iter()
            .map(|photo| format!("file '{}'\nduration {}", photo.uri, SLIDESHOW_IMAGE_SECS))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
