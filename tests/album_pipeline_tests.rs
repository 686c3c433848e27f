//! Integration tests for the album pipeline
//!
//! These tests build small libraries on disk and run them through the
//! public API:
//! - Discovery of album directories
//! - Random selection and batch processing
//! - Artwork stripping with byte-copy fallback
//! - Cover resizing
//! - Re-runs against an existing destination

use std::fs;
use std::path::{Path, PathBuf};

use albumpicker::commands::{run_copy, run_pick, wipe_destination};
use albumpicker::config::Config;
use albumpicker::services::flac::{BlockType, MetadataBlock, read_metadata_from_path, write_metadata};
use albumpicker::services::{
    AlbumStatus, BatchError, CoverOutcome, find_albums, process_album, process_albums,
};
use assert_matches::assert_matches;
use image::{GenericImageView, RgbImage};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const AUDIO_FRAMES: &[u8] = &[0xFF, 0xF8, 0x69, 0x08, 0x00, 0x00, 0x01, 0x02, 0x03];

/// A temporary library/player pair
struct Library {
    _tmp: TempDir,
    config: Config,
}

impl Library {
    fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("library");
        let destination = tmp.path().join("player");
        fs::create_dir_all(&source).unwrap();
        fs::create_dir_all(&destination).unwrap();

        let config = Config {
            source,
            destination,
            albums_count: 10,
            cover_filenames: vec![
                "album.jpg".to_string(),
                "album.png".to_string(),
                "cover.jpg".to_string(),
                "cover.png".to_string(),
            ],
            output_cover_filename: "cover.jpg".to_string(),
            cover_height: 240,
        };
        Self { _tmp: tmp, config }
    }

    fn source(&self) -> &Path {
        &self.config.source
    }

    fn destination(&self) -> &Path {
        &self.config.destination
    }

    fn album(&self, relative: &str) -> PathBuf {
        let dir = self.source().join(relative);
        fs::create_dir_all(&dir).unwrap();
        dir
    }
}

/// A FLAC file with STREAMINFO, an embedded picture and padding
fn write_flac_with_artwork(path: &Path) {
    let blocks = vec![
        MetadataBlock::new(BlockType::StreamInfo, vec![0x11; 34]),
        MetadataBlock::new(BlockType::VorbisComment, b"\x05\x00\x00\x00tests\x00\x00\x00\x00".to_vec()),
        MetadataBlock::new(BlockType::Picture, vec![0xAB; 2048]),
        MetadataBlock::new(BlockType::Padding, vec![0; 1024]),
    ];
    let mut bytes = Vec::new();
    write_metadata(&blocks, &mut bytes).unwrap();
    bytes.extend_from_slice(AUDIO_FRAMES);
    fs::write(path, bytes).unwrap();
}

fn write_cover(path: &Path, width: u32, height: u32) {
    RgbImage::from_pixel(width, height, image::Rgb([200, 40, 90]))
        .save(path)
        .unwrap();
}

// ============================================================================
// Discovery Tests
// ============================================================================

mod discovery {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_only_directories_with_flac_are_albums() {
        let lib = Library::new();
        write_flac_with_artwork(&lib.album("Artist/Album").join("01.flac"));
        fs::write(lib.album("Artist/Scans").join("booklet.pdf"), b"pdf").unwrap();
        fs::write(lib.album("Other").join("notes.txt"), b"txt").unwrap();

        let albums = find_albums(lib.source()).unwrap();
        assert_eq!(albums, vec![lib.source().join("Artist/Album")]);
    }

    #[test]
    fn test_album_subdirectories_are_not_separate_albums() {
        let lib = Library::new();
        let album = lib.album("Box Set");
        write_flac_with_artwork(&album.join("01.flac"));
        write_flac_with_artwork(&lib.album("Box Set/CD2").join("01.flac"));

        let albums = find_albums(lib.source()).unwrap();
        assert_eq!(albums, vec![album]);
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let lib = Library::new();
        assert!(find_albums(&lib.source().join("missing")).is_err());
    }
}

// ============================================================================
// Pick / Copy Tests
// ============================================================================

mod pick_and_copy {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_pick_one_of_two_albums() {
        let mut lib = Library::new();
        let album1 = lib.album("album1");
        write_flac_with_artwork(&album1.join("a.flac"));
        write_flac_with_artwork(&album1.join("b.flac"));
        let album2 = lib.album("album2");
        write_flac_with_artwork(&album2.join("c.flac"));
        write_cover(&album2.join("cover.jpg"), 600, 600);
        lib.config.albums_count = 1;

        let summary = run_pick(&lib.config, false).unwrap();
        assert_eq!(summary.total, 1);
        assert_eq!(summary.processed, 1);

        let copied: Vec<_> = ["album1", "album2"]
            .iter()
            .filter(|name| lib.destination().join(name).exists())
            .collect();
        assert_eq!(copied.len(), 1, "exactly one album should be copied");

        match *copied[0] {
            "album1" => {
                assert!(lib.destination().join("album1/a.flac").is_file());
                assert!(lib.destination().join("album1/b.flac").is_file());
                assert!(!lib.destination().join("album1/cover.jpg").exists());
            }
            _ => {
                assert!(lib.destination().join("album2/c.flac").is_file());
                let cover = image::open(lib.destination().join("album2/cover.jpg")).unwrap();
                assert_eq!(cover.dimensions(), (240, 240));
            }
        }
    }

    #[test]
    fn test_pick_more_than_available_takes_all() {
        let lib = Library::new();
        for name in ["A/one", "A/two", "B/three"] {
            write_flac_with_artwork(&lib.album(name).join("01.flac"));
        }

        let summary = run_pick(&lib.config, false).unwrap();
        assert_eq!(summary.processed, 3);
        for name in ["A/one", "A/two", "B/three"] {
            assert!(lib.destination().join(name).join("01.flac").is_file());
        }
    }

    #[test]
    fn test_pick_empty_library_fails() {
        let lib = Library::new();
        fs::write(lib.album("NotMusic").join("readme.txt"), b"hi").unwrap();

        let err = run_pick(&lib.config, false).unwrap_err();
        assert!(err.to_string().contains("no FLAC albums"));
    }

    #[test]
    fn test_pick_with_wipe_clears_destination() {
        let lib = Library::new();
        write_flac_with_artwork(&lib.album("Album").join("01.flac"));
        fs::create_dir_all(lib.destination().join("Old/Album")).unwrap();
        fs::write(lib.destination().join("Old/Album/01.flac"), b"old").unwrap();

        run_pick(&lib.config, true).unwrap();
        assert!(!lib.destination().join("Old").exists());
        assert!(lib.destination().join("Album/01.flac").is_file());
    }

    #[test]
    fn test_copy_relative_album() {
        let lib = Library::new();
        write_flac_with_artwork(&lib.album("Artist/Album").join("01.flac"));
        write_flac_with_artwork(&lib.album("Artist/Other").join("01.flac"));

        let summary = run_copy(&lib.config, Path::new("Artist/Album")).unwrap();
        assert_eq!(summary.processed, 1);
        assert!(lib.destination().join("Artist/Album/01.flac").is_file());
        assert!(!lib.destination().join("Artist/Other").exists());
    }

    #[test]
    fn test_copy_artist_directory_takes_every_album() {
        let lib = Library::new();
        write_flac_with_artwork(&lib.album("Artist/Album").join("01.flac"));
        write_flac_with_artwork(&lib.album("Artist/Other").join("01.flac"));

        let summary = run_copy(&lib.config, &lib.source().join("Artist")).unwrap();
        assert_eq!(summary.processed, 2);
    }

    #[test]
    fn test_wipe_then_empty() {
        let lib = Library::new();
        fs::write(lib.destination().join("file"), b"x").unwrap();
        wipe_destination(lib.destination()).unwrap();
        assert_eq!(fs::read_dir(lib.destination()).unwrap().count(), 0);
    }
}

// ============================================================================
// Track Sanitizing Tests
// ============================================================================

mod sanitizing {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_artwork_stripped_and_audio_preserved() {
        let lib = Library::new();
        let album = lib.album("Album");
        let src = album.join("01.flac");
        write_flac_with_artwork(&src);

        let report = process_album(&album, &lib.config).unwrap();
        assert_eq!(report.stripped, 1);
        assert_eq!(report.copied, 0);

        let dest = lib.destination().join("Album/01.flac");
        let src_len = fs::metadata(&src).unwrap().len();
        let dest_len = fs::metadata(&dest).unwrap().len();
        assert!(dest_len < src_len);

        let blocks = read_metadata_from_path(&dest).unwrap();
        let types: Vec<_> = blocks.iter().map(|b| b.block_type).collect();
        assert_eq!(types, vec![BlockType::StreamInfo, BlockType::VorbisComment]);

        let bytes = fs::read(&dest).unwrap();
        assert!(bytes.ends_with(AUDIO_FRAMES));
    }

    #[test]
    fn test_unparseable_track_copied_verbatim() {
        let lib = Library::new();
        let album = lib.album("Album");
        let src = album.join("broken.flac");
        fs::write(&src, b"definitely not a flac stream").unwrap();

        let report = process_album(&album, &lib.config).unwrap();
        assert_eq!(report.copied, 1);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(
            fs::read(lib.destination().join("Album/broken.flac")).unwrap(),
            fs::read(&src).unwrap()
        );
    }

    #[test]
    fn test_non_audio_files_not_copied() {
        let lib = Library::new();
        let album = lib.album("Album");
        write_flac_with_artwork(&album.join("01.flac"));
        fs::write(album.join("album.cue"), b"cue").unwrap();
        fs::write(album.join("log.txt"), b"log").unwrap();

        process_album(&album, &lib.config).unwrap();
        let dest = lib.destination().join("Album");
        assert!(dest.join("01.flac").is_file());
        assert!(!dest.join("album.cue").exists());
        assert!(!dest.join("log.txt").exists());
    }
}

// ============================================================================
// Cover Tests
// ============================================================================

mod covers {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cover_resized_preserving_aspect() {
        let lib = Library::new();
        let album = lib.album("Album");
        write_flac_with_artwork(&album.join("01.flac"));
        write_cover(&album.join("cover.jpg"), 1000, 500);

        let report = process_album(&album, &lib.config).unwrap();
        assert_matches!(
            report.cover,
            Some(CoverOutcome::Resized { width: 480, height: 240, .. })
        );

        let cover = image::open(lib.destination().join("Album/cover.jpg")).unwrap();
        assert_eq!(cover.dimensions(), (480, 240));
    }

    #[test]
    fn test_cover_priority_order() {
        let lib = Library::new();
        let album = lib.album("Album");
        write_flac_with_artwork(&album.join("01.flac"));
        write_cover(&album.join("cover.jpg"), 300, 300);
        RgbImage::from_pixel(200, 100, image::Rgb([0, 0, 0]))
            .save(album.join("album.png"))
            .unwrap();

        let report = process_album(&album, &lib.config).unwrap();
        assert_matches!(
            report.cover,
            Some(CoverOutcome::Resized { ref source, width: 480, .. }) if source.ends_with("album.png")
        );
    }

    #[test]
    fn test_custom_output_name() {
        let mut lib = Library::new();
        lib.config.output_cover_filename = "folder.jpg".to_string();
        lib.config.cover_height = 100;
        let album = lib.album("Album");
        write_flac_with_artwork(&album.join("01.flac"));
        write_cover(&album.join("album.jpg"), 50, 50);

        process_album(&album, &lib.config).unwrap();
        let cover = image::open(lib.destination().join("Album/folder.jpg")).unwrap();
        assert_eq!(cover.dimensions(), (100, 100));
        assert!(!lib.destination().join("Album/cover.jpg").exists());
    }

    #[test]
    fn test_no_cover_is_not_an_error() {
        let lib = Library::new();
        let album = lib.album("Album");
        write_flac_with_artwork(&album.join("01.flac"));

        let report = process_album(&album, &lib.config).unwrap();
        assert_matches!(report.cover, Some(CoverOutcome::Missing));
        assert!(report.warnings.is_empty());
    }
}

// ============================================================================
// Re-run and Failure Tests
// ============================================================================

mod reruns {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_second_run_skips_existing_albums() {
        let lib = Library::new();
        let album = lib.album("Album");
        write_flac_with_artwork(&album.join("01.flac"));
        let albums = vec![album.clone()];

        let first = process_albums(&albums, &lib.config).unwrap();
        assert_eq!(first.processed, 1);

        let dest_file = lib.destination().join("Album/01.flac");
        let before = fs::read(&dest_file).unwrap();
        // Changes in the source must not reach an existing destination album
        write_flac_with_artwork(&album.join("02.flac"));

        let second = process_albums(&albums, &lib.config).unwrap();
        assert_eq!(second.processed, 0);
        assert_eq!(second.skipped, 1);
        assert_eq!(second.reports[0].status, AlbumStatus::Skipped);
        assert_eq!(fs::read(&dest_file).unwrap(), before);
        assert!(!lib.destination().join("Album/02.flac").exists());
    }

    #[test]
    fn test_batch_continues_past_failures() {
        let lib = Library::new();
        let good = lib.album("Good");
        write_flac_with_artwork(&good.join("01.flac"));
        let empty = lib.album("Empty");
        let outside = lib._tmp.path().join("elsewhere");
        fs::create_dir_all(&outside).unwrap();

        let err = process_albums(&[empty, outside, good], &lib.config).unwrap_err();
        assert_matches!(err, BatchError { failed: 2, total: 3, .. });
        assert!(lib.destination().join("Good/01.flac").is_file());
    }

    #[test]
    fn test_source_root_itself_is_rejected() {
        let lib = Library::new();
        write_flac_with_artwork(&lib.source().join("01.flac"));
        assert!(process_album(lib.source(), &lib.config).is_err());
    }
}
