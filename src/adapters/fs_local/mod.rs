// Local filesystem adapter - File system operations on the session temp scope

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::domain::errors::*;
use crate::ports::*;
use crate::utils::path::PathUtils;

/// Local filesystem adapter.
///
/// `share` copies into the export directory, standing in for a platform
/// share sheet.
pub struct LocalFsAdapter {
    export_dir: PathBuf,
}

impl LocalFsAdapter {
    pub fn new(export_dir: impl Into<PathBuf>) -> Self {
        Self {
            export_dir: export_dir.into(),
        }
    }

    /// Export destination for a file, timestamped when the plain name is taken
    fn share_destination(&self, file_name: &str) -> PathBuf {
        let plain = self.export_dir.join(file_name);
        if !plain.exists() {
            return plain;
        }
        let name = Path::new(file_name);
        let stem = name
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| file_name.to_string());
        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S%3f");
        match PathUtils::get_extension(file_name) {
            Some(ext) => self.export_dir.join(format!("{}_{}.{}", stem, stamp, ext)),
            None => self.export_dir.join(format!("{}_{}", stem, stamp)),
        }
    }

    /// Remove everything below `scope`, deepest entries first
    fn clear_scope(scope: &Path) -> Result<usize, DomainError> {
        let mut removed = 0;
        for entry in WalkDir::new(scope).min_depth(1).contents_first(true) {
            let entry = entry.map_err(|e| DomainError::FsFail(format!("Failed to walk {}: {}", scope.display(), e)))?;
            let result = if entry.file_type().is_dir() {
                std::fs::remove_dir(entry.path())
            } else {
                std::fs::remove_file(entry.path())
            };
            result.map_err(|e| {
                DomainError::FsFail(format!("Failed to delete {}: {}", entry.path().display(), e))
            })?;
            removed += 1;
        }
        Ok(removed)
    }
}

#[async_trait]
impl FsPort for LocalFsAdapter {
    async fn write(&self, path: &str, content: &str) -> Result<(), DomainError> {
        let path = Path::new(PathUtils::strip_file_scheme(path));
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                DomainError::FsFail(format!("Failed to create directory {}: {}", parent.display(), e))
            })?;
        }
        tokio::fs::write(path, content)
            .await
            .map_err(|e| DomainError::FsFail(format!("Failed to write {}: {}", path.display(), e)))
    }

    async fn delete(&self, path: &str) -> Result<(), DomainError> {
        let path = PathUtils::strip_file_scheme(path);
        tokio::fs::remove_file(path)
            .await
            .map_err(|e| DomainError::FsFail(format!("Failed to delete {}: {}", path, e)))
    }

    async fn delete_all(&self, scope_dir: &str) -> Result<(), DomainError> {
        let scope = PathBuf::from(PathUtils::strip_file_scheme(scope_dir));
        if !scope.is_dir() {
            return Ok(());
        }
        let removed = tokio::task::spawn_blocking(move || Self::clear_scope(&scope))
            .await
            .map_err(|e| DomainError::FsFail(format!("Scope cleanup task failed: {}", e)))??;
        debug!(scope = %scope_dir, removed, "Cleared temp scope");
        Ok(())
    }

    async fn share(&self, path: &str) -> Result<String, DomainError> {
        let source = PathUtils::strip_file_scheme(path);
        let file_name = PathUtils::file_name(source)
            .ok_or_else(|| DomainError::BadArgs(format!("No file name in {}", path)))?;
        tokio::fs::create_dir_all(&self.export_dir).await.map_err(|e| {
            DomainError::FsFail(format!("Failed to create {}: {}", self.export_dir.display(), e))
        })?;

        let destination = self.share_destination(&file_name);
        tokio::fs::copy(source, &destination).await.map_err(|e| {
            DomainError::FsFail(format!("Failed to share {} to {}: {}", source, destination.display(), e))
        })?;
        let destination = destination.to_string_lossy().to_string();
        info!(path = %destination, "Shared asset");
        Ok(destination)
    }

    async fn ensure_dir(&self, dir_path: &str) -> Result<(), DomainError> {
        tokio::fs::create_dir_all(PathUtils::strip_file_scheme(dir_path))
            .await
            .map_err(|e| DomainError::FsFail(format!("Failed to create directory {}: {}", dir_path, e)))
    }
}
