//! Resource reclamation
//!
//! Deletion failures are logged and swallowed; nothing here ever fails the
//! transition that asked for it.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::errors::DomainError;
use crate::domain::session::ReclaimPlan;
use crate::ports::FsPort;

/// Tally of one reclamation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReclaimSummary {
    pub deleted: usize,
    pub failed: usize,
}

impl ReclaimSummary {
    fn record(&mut self, ok: bool) {
        if ok {
            self.deleted += 1;
        } else {
            self.failed += 1;
        }
    }
}

/// Deletes session files through the filesystem port
pub struct Reclaimer {
    fs: Arc<dyn FsPort>,
}

impl Reclaimer {
    pub fn new(fs: Arc<dyn FsPort>) -> Self {
        Self { fs }
    }

    /// Delete one file; false if the delete failed
    pub async fn reclaim_file(&self, path: &str) -> bool {
        match self.fs.delete(path).await {
            Ok(()) => {
                debug!(path = %path, "Reclaimed");
                true
            }
            Err(e) => {
                let failure = DomainError::ReclaimFailed {
                    path: path.to_string(),
                    detail: e.to_string(),
                };
                warn!("{}", failure);
                false
            }
        }
    }

    pub async fn reclaim_files(&self, paths: &[String]) -> ReclaimSummary {
        let mut summary = ReclaimSummary::default();
        for path in paths {
            summary.record(self.reclaim_file(path).await);
        }
        summary
    }

    /// Execute a reset plan, then empty the session's temp scope
    pub async fn reclaim_plan(&self, plan: &ReclaimPlan, scope_dir: &str) -> ReclaimSummary {
        let mut summary = self.reclaim_files(&plan.frames).await;
        for path in plan.current.iter().chain(plan.original_path.iter()) {
            summary.record(self.reclaim_file(path).await);
        }
        if let Err(e) = self.fs.delete_all(scope_dir).await {
            warn!(
                "{}",
                DomainError::ReclaimFailed {
                    path: scope_dir.to_string(),
                    detail: e.to_string(),
                }
            );
            summary.failed += 1;
        }
        summary
    }
}
