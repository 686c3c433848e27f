//! Album cover processing
//!
//! Picks the album's cover from the configured candidate names, scales it to
//! the configured height and writes it as a JPEG under the output cover name.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ExtendedColorType, ImageError, ImageReader};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::file_utils::is_jpeg_file;
use crate::config::Config;

/// JPEG quality used for every written cover
pub const JPEG_QUALITY: u8 = 85;

#[derive(Debug, Error)]
pub enum CoverError {
    #[error("cannot decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: ImageError,
    },
    #[error("cannot encode JPEG from {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: ImageError,
    },
    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{path} has zero height")]
    EmptyImage { path: PathBuf },
}

/// What was written for an album's cover
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoverOutcome {
    /// No candidate file exists in the album
    Missing,
    /// Scaled to the target height and re-encoded
    Resized { source: PathBuf, width: u32, height: u32 },
    /// Resize failed and the source was already JPEG; bytes copied as-is
    Copied { source: PathBuf },
    /// Resize failed; re-encoded as JPEG at the original size
    Reencoded { source: PathBuf },
}

/// First candidate name that exists as a regular file directly in `album`
pub fn find_cover(album: &Path, candidates: &[String]) -> Option<PathBuf> {
    candidates
        .iter()
        .map(|name| album.join(name))
        .find(|path| path.is_file())
}

/// Width that keeps the aspect ratio at `target_height`
pub fn scaled_width(width: u32, height: u32, target_height: u32) -> u32 {
    let scaled = (target_height as f64 * width as f64 / height as f64).round();
    (scaled as u32).max(1)
}

/// Find, resize and write the album cover
///
/// A missing cover is not an error. When the resize path fails the cover is
/// either copied (JPEG sources) or re-encoded without resizing; only a failure
/// of that fallback is returned.
pub fn process_cover(
    src_album: &Path,
    dest_album: &Path,
    config: &Config,
) -> Result<CoverOutcome, CoverError> {
    let Some(cover) = find_cover(src_album, &config.cover_filenames) else {
        info!(album = %src_album.display(), "No cover file found");
        return Ok(CoverOutcome::Missing);
    };

    info!(cover = %file_name(&cover), "Found cover file");
    let dest = dest_album.join(&config.output_cover_filename);

    match resize_cover(&cover, &dest, config.cover_height) {
        Ok((width, height)) => Ok(CoverOutcome::Resized {
            source: cover,
            width,
            height,
        }),
        Err(e) => {
            warn!(
                cover = %cover.display(),
                error = %e,
                "Failed to resize cover, falling back to copy (cover will not be resized)"
            );
            fallback_cover(&cover, &dest)
        }
    }
}

/// Scale `cover` to `target_height` and write it to `dest` as JPEG
pub fn resize_cover(cover: &Path, dest: &Path, target_height: u32) -> Result<(u32, u32), CoverError> {
    debug!(cover = %cover.display(), target_height, "Resizing cover");

    let img = decode_image(cover)?;
    if img.height() == 0 || target_height == 0 {
        return Err(CoverError::EmptyImage {
            path: cover.to_path_buf(),
        });
    }

    let width = scaled_width(img.width(), img.height(), target_height);
    let resized = img.resize_exact(width, target_height, FilterType::Lanczos3);
    drop(img);

    let bytes = encode_jpeg(&resized).map_err(|source| CoverError::Encode {
        path: cover.to_path_buf(),
        source,
    })?;
    write_cover(dest, &bytes)?;

    Ok((resized.width(), resized.height()))
}

fn fallback_cover(cover: &Path, dest: &Path) -> Result<CoverOutcome, CoverError> {
    info!(cover = %file_name(cover), "Copying cover without resizing");

    if is_jpeg_file(cover) {
        fs::copy(cover, dest).map_err(|source| CoverError::Write {
            path: dest.to_path_buf(),
            source,
        })?;
        return Ok(CoverOutcome::Copied {
            source: cover.to_path_buf(),
        });
    }

    let img = decode_image(cover)?;
    let bytes = encode_jpeg(&img).map_err(|source| CoverError::Encode {
        path: cover.to_path_buf(),
        source,
    })?;
    write_cover(dest, &bytes)?;

    Ok(CoverOutcome::Reencoded {
        source: cover.to_path_buf(),
    })
}

/// Decode by content sniffing, falling back to the extension
fn decode_image(path: &Path) -> Result<DynamicImage, CoverError> {
    ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(ImageError::from)
        .and_then(|reader| reader.decode())
        .map_err(|source| CoverError::Decode {
            path: path.to_path_buf(),
            source,
        })
}

/// Encode as baseline JPEG; any alpha channel is dropped
pub fn encode_jpeg(img: &DynamicImage) -> Result<Vec<u8>, ImageError> {
    let rgb = img.to_rgb8();
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY).encode(
        rgb.as_raw(),
        rgb.width(),
        rgb.height(),
        ExtendedColorType::Rgb8,
    )?;
    Ok(buf)
}

fn write_cover(dest: &Path, bytes: &[u8]) -> Result<(), CoverError> {
    fs::write(dest, bytes).map_err(|source| CoverError::Write {
        path: dest.to_path_buf(),
        source,
    })
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}
