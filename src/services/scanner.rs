//! Album scanner
//!
//! Walks a source tree and reports every directory that directly contains at
//! least one FLAC file. Once a directory is classified as an album its
//! subtree is not descended (bonus-disc or scan folders inside an album are
//! part of that album, not albums of their own).

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::file_utils::is_audio_file;

/// Failure of the traversal root itself; anything deeper is only a warning
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("cannot walk {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("cannot list {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Find every album directory under `root`
///
/// Entries are visited in file-name order so repeated scans of the same tree
/// yield the same sequence. Unreadable subdirectories are skipped with a
/// warning. An empty result is not an error here; callers decide whether
/// "no albums" is acceptable.
pub fn find_albums(root: &Path) -> Result<Vec<PathBuf>, ScanError> {
    let mut albums = Vec::new();
    let mut walker = WalkDir::new(root).sort_by_file_name().into_iter();

    while let Some(entry) = walker.next() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(ScanError::Walk {
                    path: root.to_path_buf(),
                    source: e,
                });
            }
            Err(e) => {
                warn!(
                    path = %e.path().unwrap_or(root).display(),
                    error = %e,
                    "Error accessing path, continuing scan"
                );
                continue;
            }
        };

        // walkdir reports a symlinked root as a link, not a directory
        let is_dir =
            entry.file_type().is_dir() || (entry.depth() == 0 && entry.path().is_dir());
        if !is_dir {
            continue;
        }

        match contains_audio(entry.path()) {
            Ok(true) => {
                debug!(path = %entry.path().display(), "Found album");
                albums.push(entry.into_path());
                walker.skip_current_dir();
            }
            Ok(false) => {}
            Err(source) if entry.depth() == 0 => {
                return Err(ScanError::ReadDir {
                    path: entry.into_path(),
                    source,
                });
            }
            Err(e) => {
                warn!(path = %entry.path().display(), error = %e, "Cannot list directory, skipping");
            }
        }
    }

    info!(root = %root.display(), albums = albums.len(), "Scan complete");
    Ok(albums)
}

/// True when `dir` directly holds a FLAC file (subdirectories are not checked)
pub fn contains_audio(dir: &Path) -> io::Result<bool> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() && is_audio_file(&entry.path()) {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Direct FLAC children of an album directory, sorted by file name
pub fn list_audio_files(album: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(album)? {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type()?.is_dir() && is_audio_file(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
