//! Path utilities for media URIs

use std::path::Path;

const FILE_SCHEME: &str = "file://";

/// Path utilities for picker URIs and temp-scope paths
pub struct PathUtils;

impl PathUtils {
    /// Strip a `file://` prefix; other strings pass through unchanged
    pub fn strip_file_scheme(uri: &str) -> &str {
        uri.strip_prefix(FILE_SCHEME).unwrap_or(uri)
    }

    /// Prefix a local path with `file://` unless it already has it
    pub fn to_file_uri(path: &str) -> String {
        if path.starts_with(FILE_SCHEME) {
            path.to_string()
        } else {
            format!("{}{}", FILE_SCHEME, path)
        }
    }

    /// Display name of a URI: its last path component
    pub fn file_name(uri: &str) -> Option<String> {
        Path::new(Self::strip_file_scheme(uri))
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
    }

    /// Get file extension from path
    pub fn get_extension(path: &str) -> Option<String> {
        Path::new(path)
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
    }

    /// Best-effort mime type from the file extension
    pub fn mime_type(path: &str) -> Option<&'static str> {
        let mime = match Self::get_extension(path)?.as_str() {
            "mp4" | "m4v" => "video/mp4",
            "mov" => "video/quicktime",
            "mkv" => "video/x-matroska",
            "webm" => "video/webm",
            "avi" => "video/x-msvideo",
            "mp3" => "audio/mpeg",
            "m4a" | "aac" => "audio/aac",
            "wav" => "audio/wav",
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            _ => return None,
        };
        Some(mime)
    }
}
