//! FLAC metadata stripping
//!
//! A FLAC stream is the `fLaC` marker, a chain of metadata blocks and then
//! the audio frames. Each block starts with a 4-byte header:
//!
//! ```text
//! bit 31      last-metadata-block flag
//! bits 24-30  block type
//! bits 0-23   body length in bytes
//! ```
//!
//! Sanitizing drops every PICTURE and PADDING block, keeps the other block
//! bodies byte-identical and in order, and streams the audio frames through
//! untouched. If the file cannot be parsed or rewritten it is copied verbatim
//! instead, so an album never loses a track.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

/// Stream marker at offset 0 of every native FLAC file
pub const FLAC_MARKER: &[u8; 4] = b"fLaC";

const LAST_BLOCK_FLAG: u32 = 0x8000_0000;
const MAX_BLOCK_LEN: usize = 0x00FF_FFFF;

#[derive(Debug, Error)]
pub enum FlacError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("missing fLaC stream marker")]
    InvalidSignature,
    #[error("metadata block {index} is truncated")]
    Truncated { index: usize },
    #[error("metadata block {index} has the invalid type 127")]
    InvalidBlockType { index: usize },
    #[error("first metadata block is {0:?}, expected STREAMINFO")]
    MissingStreamInfo(BlockType),
    #[error("metadata block body of {0} bytes does not fit a 24-bit length")]
    BlockTooLarge(usize),
}

/// Metadata block type as stored in bits 24-30 of the block header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockType {
    StreamInfo,
    Padding,
    Application,
    SeekTable,
    VorbisComment,
    CueSheet,
    Picture,
    Reserved(u8),
}

impl BlockType {
    pub fn from_u8(value: u8) -> Option<Self> {
        Some(match value {
            0 => BlockType::StreamInfo,
            1 => BlockType::Padding,
            2 => BlockType::Application,
            3 => BlockType::SeekTable,
            4 => BlockType::VorbisComment,
            5 => BlockType::CueSheet,
            6 => BlockType::Picture,
            127 => return None,
            other => BlockType::Reserved(other),
        })
    }

    pub fn as_u8(self) -> u8 {
        match self {
            BlockType::StreamInfo => 0,
            BlockType::Padding => 1,
            BlockType::Application => 2,
            BlockType::SeekTable => 3,
            BlockType::VorbisComment => 4,
            BlockType::CueSheet => 5,
            BlockType::Picture => 6,
            BlockType::Reserved(n) => n,
        }
    }

    /// Blocks removed from sanitized copies
    pub fn is_stripped(self) -> bool {
        matches!(self, BlockType::Picture | BlockType::Padding)
    }
}

/// One metadata block with its raw body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataBlock {
    pub block_type: BlockType,
    pub data: Vec<u8>,
}

impl MetadataBlock {
    pub fn new(block_type: BlockType, data: Vec<u8>) -> Self {
        Self { block_type, data }
    }
}

/// Read the marker and the full metadata chain, leaving `reader` at the
/// first audio frame
pub fn read_metadata<R: Read>(reader: &mut R) -> Result<Vec<MetadataBlock>, FlacError> {
    let mut marker = [0u8; 4];
    reader.read_exact(&mut marker).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => FlacError::InvalidSignature,
        _ => FlacError::Io(e),
    })?;
    if &marker != FLAC_MARKER {
        return Err(FlacError::InvalidSignature);
    }

    let mut blocks = Vec::new();
    loop {
        let index = blocks.len();
        let truncated = |e: io::Error| match e.kind() {
            io::ErrorKind::UnexpectedEof => FlacError::Truncated { index },
            _ => FlacError::Io(e),
        };

        let mut header = [0u8; 4];
        reader.read_exact(&mut header).map_err(truncated)?;
        let header = u32::from_be_bytes(header);

        let is_last = header & LAST_BLOCK_FLAG != 0;
        let type_code = ((header >> 24) & 0x7F) as u8;
        let length = (header & 0x00FF_FFFF) as usize;

        let block_type =
            BlockType::from_u8(type_code).ok_or(FlacError::InvalidBlockType { index })?;
        if index == 0 && block_type != BlockType::StreamInfo {
            return Err(FlacError::MissingStreamInfo(block_type));
        }

        let mut data = vec![0u8; length];
        reader.read_exact(&mut data).map_err(truncated)?;
        blocks.push(MetadataBlock { block_type, data });

        if is_last {
            break;
        }
    }

    Ok(blocks)
}

/// Write the marker and `blocks`, setting the last-block flag on the final one
pub fn write_metadata<W: Write>(blocks: &[MetadataBlock], writer: &mut W) -> Result<(), FlacError> {
    writer.write_all(FLAC_MARKER)?;
    for (i, block) in blocks.iter().enumerate() {
        if block.data.len() > MAX_BLOCK_LEN {
            return Err(FlacError::BlockTooLarge(block.data.len()));
        }
        let mut header = ((block.block_type.as_u8() as u32) << 24) | block.data.len() as u32;
        if i + 1 == blocks.len() {
            header |= LAST_BLOCK_FLAG;
        }
        writer.write_all(&header.to_be_bytes())?;
        writer.write_all(&block.data)?;
    }
    Ok(())
}

/// Read only the metadata chain of a file on disk
pub fn read_metadata_from_path(path: &Path) -> Result<Vec<MetadataBlock>, FlacError> {
    let mut reader = BufReader::new(File::open(path)?);
    read_metadata(&mut reader)
}

/// How a track reached the destination
#[derive(Debug)]
pub enum SanitizeOutcome {
    /// Rewritten without PICTURE/PADDING blocks
    Stripped { removed_blocks: usize },
    /// Copied byte-for-byte because the rewrite failed
    Copied { reason: FlacError },
}

#[derive(Debug, Error)]
pub enum SanitizeError {
    #[error("{path} is not inside album directory {album}")]
    OutsideAlbum { path: PathBuf, album: PathBuf },
    #[error("cannot create {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("fallback copy of {path} failed: {source}")]
    Copy {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Copy one album track into `dest_album`, stripping embedded artwork
///
/// The destination keeps the file's path relative to `src_album`. Any
/// parse or write failure falls back to a plain copy of the same file; only
/// a failing copy is reported as an error.
pub fn sanitize_file(
    src_file: &Path,
    src_album: &Path,
    dest_album: &Path,
) -> Result<SanitizeOutcome, SanitizeError> {
    let relative = src_file
        .strip_prefix(src_album)
        .map_err(|_| SanitizeError::OutsideAlbum {
            path: src_file.to_path_buf(),
            album: src_album.to_path_buf(),
        })?;
    let dest_file = dest_album.join(relative);

    if let Some(parent) = dest_file.parent() {
        fs::create_dir_all(parent).map_err(|source| SanitizeError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    info!(file = %relative.display(), "Processing FLAC file");

    match strip_artwork(src_file, &dest_file) {
        Ok(removed_blocks) => {
            debug!(file = %relative.display(), removed_blocks, "Stripped metadata blocks");
            Ok(SanitizeOutcome::Stripped { removed_blocks })
        }
        Err(reason) => {
            warn!(
                file = %relative.display(),
                error = %reason,
                "Failed to rewrite FLAC, falling back to plain copy (PICTURE blocks will not be removed)"
            );
            fs::copy(src_file, &dest_file).map_err(|source| SanitizeError::Copy {
                path: src_file.to_path_buf(),
                source,
            })?;
            Ok(SanitizeOutcome::Copied { reason })
        }
    }
}

/// Rewrite `src` to `dest` without PICTURE/PADDING blocks; returns how many
/// blocks were dropped
fn strip_artwork(src: &Path, dest: &Path) -> Result<usize, FlacError> {
    let mut reader = BufReader::new(File::open(src)?);
    let blocks = read_metadata(&mut reader)?;

    let total = blocks.len();
    let kept: Vec<MetadataBlock> = blocks
        .into_iter()
        .filter(|b| !b.block_type.is_stripped())
        .collect();

    let mut writer = BufWriter::new(File::create(dest)?);
    write_metadata(&kept, &mut writer)?;
    io::copy(&mut reader, &mut writer)?;
    writer.flush()?;

    Ok(total - kept.len())
}
