//! Album discovery, selection and per-album processing

pub mod album_processor;
pub mod artwork;
pub mod file_utils;
pub mod flac;
pub mod logging;
pub mod path_guard;
pub mod scanner;
pub mod selector;

pub use album_processor::{
    AlbumError, AlbumReport, AlbumStatus, BatchError, BatchSummary, process_album, process_albums,
};
pub use artwork::{CoverError, CoverOutcome, process_cover};
pub use flac::{FlacError, SanitizeError, SanitizeOutcome, sanitize_file};
pub use logging::{LogFormat, init_logging};
pub use path_guard::is_within;
pub use scanner::{ScanError, find_albums};
pub use selector::select_albums;
