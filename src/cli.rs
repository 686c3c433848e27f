//! Command-line parsing
//!
//! Every flag can also come from an `ALBUMPICKER_*` environment variable
//! (including ones loaded from `.env`). Flags and environment both override
//! the config file.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Overrides;
use crate::services::LogFormat;

/// Utility for randomly selecting and copying FLAC albums
///
/// Picks albums from a FLAC library, strips embedded pictures from the
/// tracks and writes a single resized JPEG cover per album.
#[derive(Debug, Parser)]
#[command(name = "albumpicker", version)]
pub struct Cli {
    /// Config file (default is $HOME/.config/albumpicker/config.yaml)
    #[arg(short, long, global = true, env = "ALBUMPICKER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Source directory with FLAC albums
    #[arg(short, long, global = true, env = "ALBUMPICKER_SOURCE")]
    pub source: Option<PathBuf>,

    /// Destination directory for copied albums
    #[arg(short, long, global = true, env = "ALBUMPICKER_DESTINATION")]
    pub destination: Option<PathBuf>,

    /// Cover image height in pixels (default 240)
    #[arg(long, global = true, env = "ALBUMPICKER_COVER_HEIGHT")]
    pub height: Option<u32>,

    /// Output cover file name (default cover.jpg)
    #[arg(long = "cover-name", global = true, env = "ALBUMPICKER_COVER_NAME")]
    pub cover_name: Option<String>,

    /// Log output format
    #[arg(
        long,
        global = true,
        value_enum,
        default_value_t = LogFormat::Pretty,
        env = "ALBUMPICKER_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Randomly select and copy FLAC albums
    Pick {
        /// Number of albums to select (default 10)
        #[arg(short = 'n', long, env = "ALBUMPICKER_COUNT")]
        count: Option<usize>,

        /// Wipe destination directory before copying albums. Destructive!
        #[arg(long)]
        wipe: bool,
    },

    /// Copy a single FLAC album, or every album under a directory
    Copy {
        /// Album path, absolute or relative to the source directory
        album: PathBuf,
    },

    /// Write the default config file if it does not exist and print its path
    InitConfig,
}

impl Cli {
    /// Flag/environment values to layer over the config file
    pub fn overrides(&self) -> Overrides {
        let albums_count = match &self.command {
            Command::Pick { count, .. } => *count,
            _ => None,
        };
        Overrides {
            source: self.source.clone(),
            destination: self.destination.clone(),
            albums_count,
            output_cover_filename: self.cover_name.clone(),
            cover_height: self.height,
        }
    }
}
