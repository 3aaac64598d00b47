//! Timeline coordinate mapping and the bounded scrub loop
//!
//! The scrubber lays one tile of `tile_width` pixels per second of source at
//! `frames_per_second`. A fixed-width duration window sits over the strip and
//! the pop line marks the effective "current time" inside it. Nothing here is
//! clamped against the asset duration; keeping offsets in range is the
//! caller's job.

use serde::{Deserialize, Serialize};

/// The fixed constants every mapping is computed from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineGeometry {
    pub frames_per_second: f64,
    /// Pixels per tile
    pub tile_width: f64,
    /// Pixels spanned by the duration window
    pub duration_window_width: f64,
    /// Pop line offset inside the window, as a percentage
    pub pop_line_position: f64,
}

impl Default for TimelineGeometry {
    fn default() -> Self {
        Self {
            frames_per_second: 1.0,
            tile_width: 40.0,
            duration_window_width: 160.0,
            pop_line_position: 50.0,
        }
    }
}

impl TimelineGeometry {
    fn pixels_per_second(&self) -> f64 {
        self.frames_per_second * self.tile_width
    }

    pub fn time_at_left_edge(&self, scroll_offset: f64) -> f64 {
        scroll_offset / self.pixels_per_second()
    }

    pub fn time_at_right_edge(&self, scroll_offset: f64) -> f64 {
        (scroll_offset + self.duration_window_width) / self.pixels_per_second()
    }

    pub fn time_at_pop_line(&self, scroll_offset: f64) -> f64 {
        (scroll_offset + self.duration_window_width * self.pop_line_position / 100.0)
            / self.pixels_per_second()
    }

    /// Seconds of playback covered by the duration window
    pub fn window_duration(&self) -> f64 {
        self.duration_window_width / self.pixels_per_second()
    }

    /// Cut start selected by a scroll offset: the offset's share of the whole
    /// strip (`tile_width * frame_count` pixels) applied to the source duration
    pub fn start_time_for_offset(&self, scroll_offset: f64, source_duration: f64, frame_count: usize) -> f64 {
        let strip_width = self.tile_width * frame_count as f64;
        if strip_width <= 0.0 {
            return 0.0;
        }
        source_duration / strip_width * scroll_offset
    }
}

/// Bounded preview loop driven by scrubbing.
///
/// Each scroll seeks to the pop line and arms the loop; once playback reaches
/// the window's right edge it seeks back to the left edge exactly once and
/// disarms until the next scroll.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrubLoop {
    geometry: TimelineGeometry,
    offset: f64,
    armed: bool,
}

impl ScrubLoop {
    pub fn new(geometry: TimelineGeometry) -> Self {
        Self {
            geometry,
            offset: 0.0,
            armed: false,
        }
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Handle a scroll event; returns the time playback must seek to
    pub fn on_scroll(&mut self, scroll_offset: f64) -> f64 {
        self.offset = scroll_offset;
        self.armed = true;
        self.geometry.time_at_pop_line(scroll_offset)
    }

    /// Handle a playback progress report; returns a seek target when the loop wraps
    pub fn on_playback_progress(&mut self, current_time: f64) -> Option<f64> {
        if self.armed && current_time >= self.geometry.time_at_right_edge(self.offset) {
            self.armed = false;
            return Some(self.geometry.time_at_left_edge(self.offset));
        }
        None
    }

    /// Forget the position, e.g. when the session is discarded
    pub fn reset(&mut self) {
        self.offset = 0.0;
        self.armed = false;
    }
}
