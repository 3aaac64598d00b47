//! Callback-to-channel bridge for encoder invocations

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::domain::model::EncodeOutcome;
use crate::ports::EncoderEvents;

/// One encoder callback, in arrival order
#[derive(Debug, Clone, PartialEq)]
pub enum JobEvent {
    Tick {
        elapsed_ms: u64,
        frame_count: Option<usize>,
    },
    Log(String),
    Complete(EncodeOutcome),
}

/// [`EncoderEvents`] implementation feeding an mpsc stream.
///
/// Events sent after the receiver is gone are dropped.
pub struct JobChannel {
    tx: mpsc::UnboundedSender<JobEvent>,
}

impl JobChannel {
    /// A fresh channel: the callback side for the encoder and the stream side
    /// for whoever drives the job
    pub fn open() -> (Arc<Self>, mpsc::UnboundedReceiver<JobEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { tx }), rx)
    }
}

impl EncoderEvents for JobChannel {
    fn on_progress_tick(&self, elapsed_ms: u64, frame_count: Option<usize>) {
        let _ = self.tx.send(JobEvent::Tick {
            elapsed_ms,
            frame_count,
        });
    }

    fn on_log(&self, message: &str) {
        let _ = self.tx.send(JobEvent::Log(message.to_string()));
    }

    fn on_complete(&self, outcome: EncodeOutcome) {
        let _ = self.tx.send(JobEvent::Complete(outcome));
    }
}
