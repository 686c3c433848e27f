//! `pick` and `copy` command implementations

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::info;

use crate::config::Config;
use crate::services::{BatchSummary, find_albums, process_albums, select_albums};

/// Scan the source, pick `albums_count` albums at random and process them
pub fn run_pick(config: &Config, wipe: bool) -> Result<BatchSummary> {
    info!(source = %config.source.display(), "Scanning source directory for FLAC albums");
    let albums = find_albums(&config.source).context("error scanning source directory")?;
    if albums.is_empty() {
        bail!("no FLAC albums found in source directory");
    }
    info!("Found {} albums in total", albums.len());

    info!("Selecting {} random albums", config.albums_count);
    let selected = select_albums(&albums, config.albums_count);

    if wipe {
        info!(destination = %config.destination.display(), "Wiping destination directory");
        wipe_destination(&config.destination)?;
    }

    info!("Processing selected {} albums", selected.len());
    Ok(process_albums(&selected, config)?)
}

/// Process every album found at `album` (relative paths resolve against the source)
pub fn run_copy(config: &Config, album: &Path) -> Result<BatchSummary> {
    let path = if album.is_absolute() {
        album.to_path_buf()
    } else {
        config.source.join(album)
    };

    let albums = find_albums(&path)
        .with_context(|| format!("error scanning {} directory", path.display()))?;
    if albums.is_empty() {
        bail!("no FLAC albums found in {}", path.display());
    }

    Ok(process_albums(&albums, config)?)
}

/// Remove everything inside `destination`, keeping the directory itself
pub fn wipe_destination(destination: &Path) -> Result<()> {
    let entries = fs::read_dir(destination)
        .with_context(|| format!("error reading destination directory {}", destination.display()))?;

    for entry in entries {
        let entry = entry.context("error reading destination directory entry")?;
        let path = entry.path();
        let removed = if entry.file_type()?.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        removed.with_context(|| format!("failed to wipe {}", path.display()))?;
    }
    Ok(())
}
