//! Album processing pipeline
//!
//! Each album goes through the same sequential stages:
//! 1. Guard: the album must lie strictly inside the source root
//! 2. Dedup: an existing destination directory means the album is skipped
//! 3. Materialize: create the destination directory
//! 4. Enumerate: list the album's FLAC files (none is fatal)
//! 5. Sanitize every FLAC file (failures become warnings)
//! 6. Process the cover (failures become warnings)
//!
//! Nothing is rolled back on error; a partially written destination album is
//! left in place. Batches run albums one at a time and collect per-album
//! errors instead of stopping at the first one.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{error, info, warn};

use super::artwork::{self, CoverOutcome};
use super::flac::{self, SanitizeOutcome};
use super::path_guard::{is_within, relative_within};
use super::scanner::list_audio_files;
use crate::config::Config;

/// Failures that abort a single album
#[derive(Debug, Error)]
pub enum AlbumError {
    #[error("album path {album} is not within source directory {source_root}")]
    OutsideSource { album: PathBuf, source_root: PathBuf },

    #[error("error creating destination directory {path}: {source}")]
    CreateDestination {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("error reading album directory {path}: {source}")]
    ReadAlbum {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("no FLAC files found in album: {}", .0.display())]
    NoAudioFiles(PathBuf),
}

/// Aggregate failure of a batch; every album was still attempted
#[derive(Debug, Error)]
#[error("{failed} of {total} albums failed to process")]
pub struct BatchError {
    pub failed: usize,
    pub total: usize,
    pub failures: Vec<(PathBuf, AlbumError)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlbumStatus {
    Processed,
    /// Destination already existed; nothing was written
    Skipped,
}

/// Result of processing a single album
#[derive(Debug, Clone)]
pub struct AlbumReport {
    pub album: PathBuf,
    pub relative_path: PathBuf,
    pub destination: PathBuf,
    pub status: AlbumStatus,
    pub audio_files: usize,
    /// Tracks rewritten without artwork
    pub stripped: usize,
    /// Tracks that fell back to a plain copy
    pub copied: usize,
    pub cover: Option<CoverOutcome>,
    pub warnings: Vec<String>,
}

impl AlbumReport {
    fn new(album: &Path, relative_path: PathBuf, destination: PathBuf, status: AlbumStatus) -> Self {
        Self {
            album: album.to_path_buf(),
            relative_path,
            destination,
            status,
            audio_files: 0,
            stripped: 0,
            copied: 0,
            cover: None,
            warnings: Vec::new(),
        }
    }
}

/// Totals for a batch that finished without album errors
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    pub total: usize,
    pub processed: usize,
    pub skipped: usize,
    pub reports: Vec<AlbumReport>,
}

/// Run the pipeline over one album
pub fn process_album(album: &Path, config: &Config) -> Result<AlbumReport, AlbumError> {
    let outside = || AlbumError::OutsideSource {
        album: album.to_path_buf(),
        source_root: config.source.clone(),
    };
    if !is_within(&config.source, album) {
        return Err(outside());
    }
    let relative = relative_within(&config.source, album).ok_or_else(outside)?;
    let destination = config.destination.join(&relative);

    if destination.exists() {
        info!(album = %relative.display(), "Skipping existing album");
        return Ok(AlbumReport::new(album, relative, destination, AlbumStatus::Skipped));
    }

    fs::create_dir_all(&destination).map_err(|source| AlbumError::CreateDestination {
        path: destination.clone(),
        source,
    })?;

    info!(album = %relative.display(), "Processing album");

    let audio_files = list_audio_files(album).map_err(|source| AlbumError::ReadAlbum {
        path: album.to_path_buf(),
        source,
    })?;
    info!(count = audio_files.len(), "Found FLAC files in album");
    if audio_files.is_empty() {
        return Err(AlbumError::NoAudioFiles(relative));
    }

    let mut report = AlbumReport::new(album, relative, destination, AlbumStatus::Processed);
    report.audio_files = audio_files.len();

    for file in &audio_files {
        match flac::sanitize_file(file, album, &report.destination) {
            Ok(SanitizeOutcome::Stripped { .. }) => report.stripped += 1,
            Ok(SanitizeOutcome::Copied { reason }) => {
                report.copied += 1;
                report
                    .warnings
                    .push(format!("{}: copied without stripping ({reason})", file.display()));
            }
            Err(e) => {
                warn!(file = %file.display(), error = %e, "Error processing FLAC file");
                report
                    .warnings
                    .push(format!("{}: {e}", file.display()));
            }
        }
    }

    match artwork::process_cover(album, &report.destination, config) {
        Ok(outcome) => report.cover = Some(outcome),
        Err(e) => {
            warn!(album = %album.display(), error = %e, "Error processing cover for album");
            report.warnings.push(format!("cover: {e}"));
        }
    }

    Ok(report)
}

/// Process albums sequentially, collecting failures into one aggregate error
pub fn process_albums(albums: &[PathBuf], config: &Config) -> Result<BatchSummary, BatchError> {
    let mut summary = BatchSummary {
        total: albums.len(),
        ..Default::default()
    };
    let mut failures = Vec::new();

    for album in albums {
        match process_album(album, config) {
            Ok(report) => {
                match report.status {
                    AlbumStatus::Processed => summary.processed += 1,
                    AlbumStatus::Skipped => summary.skipped += 1,
                }
                summary.reports.push(report);
            }
            Err(e) => failures.push((album.clone(), e)),
        }
    }

    if !failures.is_empty() {
        for (album, e) in &failures {
            error!(album = %album.display(), error = %e, "Error processing album");
        }
        return Err(BatchError {
            failed: failures.len(),
            total: albums.len(),
            failures,
        });
    }

    info!(
        processed = summary.processed,
        skipped = summary.skipped,
        "Successfully processed {} albums",
        albums.len()
    );
    Ok(summary)
}
