//! Application configuration management
//!
//! Settings are layered: built-in defaults, then the YAML config file, then
//! overrides from the environment and the command line. [`Settings::validate`]
//! turns the merged settings into the immutable [`Config`] the processing
//! code runs with.

use std::fs;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Directory under the user config dir holding `config.yaml`
pub const APP_DIR: &str = "albumpicker";
pub const CONFIG_FILE: &str = "config.yaml";

/// Validated configuration for a run
#[derive(Debug, Clone)]
pub struct Config {
    /// Root of the library to pick albums from (exists, is a directory)
    pub source: PathBuf,

    /// Root the picked albums are mirrored into (exists after validation)
    pub destination: PathBuf,

    /// How many albums `pick` selects
    pub albums_count: usize,

    /// Cover file names to look for, in priority order
    pub cover_filenames: Vec<String>,

    /// File name of the written cover inside each destination album
    pub output_cover_filename: String,

    /// Height of the written cover in pixels
    pub cover_height: u32,
}

/// Raw settings as stored in the config file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub albums_count: usize,
    pub cover_filenames: Vec<String>,
    pub output_cover_filename: String,
    pub cover_height: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            source: PathBuf::new(),
            destination: PathBuf::new(),
            albums_count: 10,
            cover_filenames: ["album.jpg", "album.png", "cover.jpg", "cover.png"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            output_cover_filename: "cover.jpg".to_string(),
            cover_height: 240,
        }
    }
}

/// Values supplied by flags or environment; `None` keeps the file value
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub source: Option<PathBuf>,
    pub destination: Option<PathBuf>,
    pub albums_count: Option<usize>,
    pub output_cover_filename: Option<String>,
    pub cover_height: Option<u32>,
}

/// Default config file location (`~/.config/albumpicker/config.yaml` on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}

impl Settings {
    /// Load settings from a YAML file; missing keys take their defaults
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&contents)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Write settings as YAML, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {}", parent.display()))?;
        }
        let yaml = serde_yaml::to_string(self).context("Failed to serialize settings")?;
        fs::write(path, yaml)
            .with_context(|| format!("Failed to write config file {}", path.display()))
    }

    /// Resolve and load the config file
    ///
    /// An explicit path must exist. Without one, the default location is used
    /// and seeded with defaults on first run. Returns the settings and the
    /// file they came from, if any.
    pub fn load_or_init(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>)> {
        if let Some(path) = explicit {
            let settings = Self::load(path)?;
            info!(path = %path.display(), "Config file loaded");
            return Ok((settings, Some(path.to_path_buf())));
        }

        let Some(path) = default_config_path() else {
            warn!("Could not determine config directory, using defaults");
            return Ok((Self::default(), None));
        };
        Self::init_at(&path)
    }

    /// Seed `path` with defaults if it does not exist, then load it
    pub fn init_at(path: &Path) -> Result<(Self, Option<PathBuf>)> {
        if !path.exists() {
            if let Err(e) = Self::default().save(path) {
                warn!(path = %path.display(), error = %e, "Could not create default config");
                return Ok((Self::default(), None));
            }
            info!(path = %path.display(), "Wrote default config file");
        }
        let settings = Self::load(path)?;
        info!(path = %path.display(), "Config file loaded");
        Ok((settings, Some(path.to_path_buf())))
    }

    pub fn apply(&mut self, overrides: &Overrides) {
        if let Some(source) = &overrides.source {
            self.source = source.clone();
        }
        if let Some(destination) = &overrides.destination {
            self.destination = destination.clone();
        }
        if let Some(count) = overrides.albums_count {
            self.albums_count = count;
        }
        if let Some(name) = &overrides.output_cover_filename {
            self.output_cover_filename = name.clone();
        }
        if let Some(height) = overrides.cover_height {
            self.cover_height = height;
        }
    }

    /// Check the settings and create the destination directory if needed
    pub fn validate(self) -> Result<Config> {
        if self.source.as_os_str().is_empty() {
            bail!("source directory not specified");
        }
        if self.destination.as_os_str().is_empty() {
            bail!("destination directory not specified");
        }

        let source = self.source;
        if !source.exists() {
            bail!("source directory does not exist: {}", source.display());
        }
        if !source.is_dir() {
            bail!("source is not a directory: {}", source.display());
        }

        if self.cover_height == 0 {
            bail!("cover height must be greater than zero");
        }
        if !is_bare_file_name(&self.output_cover_filename) {
            bail!(
                "output cover filename must be a plain file name: {:?}",
                self.output_cover_filename
            );
        }

        let destination = self.destination;
        if !destination.exists() {
            fs::create_dir_all(&destination).with_context(|| {
                format!("Failed to create destination directory {}", destination.display())
            })?;
        }

        Ok(Config {
            source,
            destination,
            albums_count: self.albums_count,
            cover_filenames: self.cover_filenames,
            output_cover_filename: self.output_cover_filename,
            cover_height: self.cover_height,
        })
    }
}

fn is_bare_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}
