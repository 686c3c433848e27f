//! Shared file utility functions
//!
//! Extension checks used by the scanner and the per-album processors.

use std::ffi::OsStr;
use std::path::Path;

/// Audio file extension recognized as album content (exact match, no dot)
pub const AUDIO_EXTENSION: &str = "flac";

/// Extensions whose bytes are already JPEG and can be copied verbatim
pub const JPEG_EXTENSIONS: &[&str] = &["jpg", "jpeg"];

/// Lowercased extension of a path, without the dot
pub fn extension_lowercase(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
}

/// Check if a file is an album audio file based on extension
///
/// The match is case-sensitive: `02.FLAC` is not album content.
///
/// # Example
/// ```
/// use std::path::Path;
/// use albumpicker::services::file_utils::is_audio_file;
/// assert!(is_audio_file(Path::new("01 - Intro.flac")));
/// assert!(is_audio_file(Path::new("/music/album/02.flac")));
/// assert!(!is_audio_file(Path::new("/music/album/02.FLAC")));
/// assert!(!is_audio_file(Path::new("cover.jpg")));
/// ```
pub fn is_audio_file(path: &Path) -> bool {
    path.extension() == Some(OsStr::new(AUDIO_EXTENSION))
}

/// Check if a file has a JPEG extension (`.jpg` / `.jpeg`, any case)
pub fn is_jpeg_file(path: &Path) -> bool {
    extension_lowercase(path).is_some_and(|ext| JPEG_EXTENSIONS.contains(&ext.as_str()))
}
