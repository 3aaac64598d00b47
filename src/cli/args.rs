//! Command-line argument definitions

use std::path::PathBuf;

use clap::Args;
use clap_num::number_range;

use crate::domain::model::Transform;

/// Largest slideshow the photo picker allows
pub const MAX_SLIDESHOW_PHOTOS: usize = 7;

fn photo_limit(s: &str) -> Result<usize, String> {
    number_range(s, 1, MAX_SLIDESHOW_PHOTOS)
}

/// Arguments for the frames command
#[derive(Args, Debug)]
pub struct FramesArgs {
    /// Input video file path
    #[arg(short, long)]
    pub input: String,

    /// Output the session snapshot as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the edit command
#[derive(Args, Debug)]
pub struct EditArgs {
    /// Input video file path
    #[arg(short, long)]
    pub input: String,

    /// Edit step: speed, cut[=start], audio=<file> or watermark=<file>; repeatable, applied in order
    #[arg(short, long = "step", required = true)]
    pub steps: Vec<Transform>,

    /// Scroll offset (pixels) to scrub to before editing; selects the cut start
    #[arg(long, allow_hyphen_values = true)]
    pub scrub: Option<f64>,
}

/// Arguments for the slideshow command
#[derive(Args, Debug)]
pub struct SlideshowArgs {
    /// Photo file path; repeatable, shown in order
    #[arg(short, long = "photo", required = true)]
    pub photos: Vec<String>,

    /// Soundtrack file path
    #[arg(short, long)]
    pub audio: String,

    /// Photo limit (1-7); extra photos are dropped
    #[arg(long, value_parser = photo_limit)]
    pub max_photos: Option<usize>,
}

/// Arguments for the timeline command
#[derive(Args, Debug)]
pub struct TimelineArgs {
    /// Horizontal scroll offset in pixels
    #[arg(long, allow_hyphen_values = true)]
    pub offset: f64,

    /// Playback position to test against the scrub loop
    #[arg(long)]
    pub current_time: Option<f64>,
}

/// Arguments for the config command
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Write the configuration to this file instead of printing it
    #[arg(long)]
    pub write: Option<PathBuf>,
}
