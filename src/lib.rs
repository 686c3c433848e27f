//! albumpicker
//!
//! Randomly picks FLAC albums from a music library and mirrors them into a
//! destination (typically a portable player). Tracks are copied without
//! embedded pictures or padding and each album gets one resized JPEG cover.

pub mod cli;
pub mod commands;
pub mod config;
pub mod services;

pub use config::Config;
