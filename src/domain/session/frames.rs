// Frame strip - placeholder-to-ready thumbnail array

use serde::Serialize;

use crate::domain::model::Frame;

/// The session's thumbnail sequence, tagged with the generation that allocated it.
///
/// Updates are applied by index and only when their generation matches, so a
/// late tick from a superseded extraction can never write into a newer strip.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FrameStrip {
    generation: u64,
    frames: Vec<Frame>,
}

impl FrameStrip {
    /// An all-`Loading` strip of `count` frames
    pub fn placeholders(generation: u64, count: usize) -> Self {
        Self {
            generation,
            frames: (0..count).map(Frame::loading).collect(),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        !self.frames.is_empty() && self.frames.iter().all(Frame::is_ready)
    }

    /// Mark the frame for a 1-based encoder frame count as ready.
    ///
    /// Returns false for stale generations, out-of-range counts and empty URIs.
    pub fn mark_ready(&mut self, generation: u64, count: usize, uri: &str) -> bool {
        if generation != self.generation || count == 0 || count > self.frames.len() {
            return false;
        }
        let index = count - 1;
        match Frame::ready(index, uri) {
            Ok(frame) => {
                self.frames[index] = frame;
                true
            }
            Err(_) => false,
        }
    }

    /// Mark every frame ready in one pass, `uris` in index order
    pub fn fill(&mut self, generation: u64, uris: &[String]) -> bool {
        if generation != self.generation {
            return false;
        }
        for (count, uri) in uris.iter().enumerate().take(self.frames.len()) {
            self.mark_ready(generation, count + 1, uri);
        }
        true
    }

    /// URIs of every ready frame, in index order
    pub fn ready_uris(&self) -> Vec<String> {
        self.frames
            .iter()
            .filter_map(|frame| frame.uri().map(str::to_string))
            .collect()
    }

    /// Empty the strip, returning the URIs whose backing files must be deleted
    pub fn clear(&mut self) -> Vec<String> {
        let uris = self.ready_uris();
        self.frames.clear();
        uris
    }
}
