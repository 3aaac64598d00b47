//! Progress normalization for encoder jobs

use crate::domain::rules::ProgressRule;

/// Maps encoder elapsed time onto a 0-100 scale that never moves backwards.
///
/// Without a reference duration every tick reports the last known value.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressNormalizer {
    reference_secs: Option<f64>,
    last: f64,
}

impl ProgressNormalizer {
    pub fn new(reference_secs: Option<f64>) -> Self {
        Self {
            reference_secs,
            last: 0.0,
        }
    }

    /// Fold one tick in and return the normalized percentage
    pub fn observe(&mut self, elapsed_ms: u64) -> f64 {
        if let Some(percent) = ProgressRule::percent(elapsed_ms, self.reference_secs) {
            self.last = self.last.max(percent.clamp(0.0, 100.0));
        }
        self.last
    }

    pub fn last(&self) -> f64 {
        self.last
    }

    pub fn has_reference(&self) -> bool {
        ProgressRule::percent(0, self.reference_secs).is_some()
    }
}
