// Session handle - The one update path into the session

use std::sync::{Arc, Mutex};

use tokio::sync::watch;

use crate::domain::errors::DomainError;
use crate::domain::session::{Session, SessionSnapshot};
use crate::engine::FrameSink;

/// Shared handle to the single live session.
///
/// Every mutation, whether from a caller or from an encoder callback, goes
/// through [`SessionHandle::update`], which serializes it and publishes a fresh
/// snapshot. The lock is never held across an `.await`.
#[derive(Clone)]
pub struct SessionHandle {
    session: Arc<Mutex<Session>>,
    snapshots: Arc<watch::Sender<SessionSnapshot>>,
}

impl Default for SessionHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionHandle {
    pub fn new() -> Self {
        let session = Session::new();
        let (snapshots, _) = watch::channel(session.snapshot());
        Self {
            session: Arc::new(Mutex::new(session)),
            snapshots: Arc::new(snapshots),
        }
    }

    /// Apply one transition and publish the resulting snapshot
    pub fn update<T>(&self, transition: impl FnOnce(&mut Session) -> T) -> Result<T, DomainError> {
        let mut session = self
            .session
            .lock()
            .map_err(|_| DomainError::InvalidState("session lock poisoned".to_string()))?;
        let result = transition(&mut session);
        self.snapshots.send_replace(session.snapshot());
        Ok(result)
    }

    /// Read without publishing
    pub fn read<T>(&self, query: impl FnOnce(&Session) -> T) -> Result<T, DomainError> {
        let session = self
            .session
            .lock()
            .map_err(|_| DomainError::InvalidState("session lock poisoned".to_string()))?;
        Ok(query(&session))
    }

    pub fn snapshot(&self) -> Result<SessionSnapshot, DomainError> {
        self.read(Session::snapshot)
    }

    /// Observe every published snapshot
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.subscribe()
    }
}

impl FrameSink for SessionHandle {
    fn frame_ready(&self, generation: u64, count: usize, uri: &str) -> bool {
        self.update(|session| session.mark_frame_ready(generation, count, uri))
            .unwrap_or(false)
    }

    fn frames_complete(&self, generation: u64, uris: &[String]) -> bool {
        self.update(|session| session.fill_frames(generation, uris))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::SourceAsset;

    #[test]
    fn test_update_publishes_snapshot() {
        let handle = SessionHandle::new();
        let rx = handle.subscribe();
        let asset = SourceAsset::new("/v/a.mp4", 2.0, "a.mp4").unwrap();

        let generation = handle.update(|s| s.load_video(asset, 2)).unwrap().unwrap();

        let snapshot = rx.borrow().clone();
        assert_eq!(snapshot.generation, generation);
        assert_eq!(snapshot.frames.len(), 2);
    }

    #[test]
    fn test_frame_sink_respects_generation() {
        let handle = SessionHandle::new();
        let asset = SourceAsset::new("/v/a.mp4", 2.0, "a.mp4").unwrap();
        let generation = handle.update(|s| s.load_video(asset, 2)).unwrap().unwrap();

        assert!(handle.frame_ready(generation, 1, "/c/1.png"));
        assert!(!handle.frame_ready(generation + 1, 2, "/c/2.png"));
        assert_eq!(handle.snapshot().unwrap().frames.ready_uris(), vec!["/c/1.png"]);
    }
}
