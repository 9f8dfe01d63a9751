use crate::error::{BulkError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_BATCH_SIZE: usize = 3;

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Commands per static block.
    /// Default: 3, values below 1 are raised to 1
    pub batch_size: Option<i64>,
    /// Directory receiving `bulk<timestamp>.log` files.
    /// Default: current directory
    pub log_dir: Option<PathBuf>,
    /// File to read commands from instead of stdin.
    pub input: Option<PathBuf>,
}

impl Config {
    /// Load configuration from ~/.config/bulk/config.toml
    ///
    /// - File missing: returns default config (Ok)
    /// - File exists but invalid TOML: returns Err so caller can show warning
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|source| BulkError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| BulkError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|d| d.join(".config").join("bulk").join("config.toml"))
    }
}

/// Values given on the command line; each one overrides the config file.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub batch_size: Option<i64>,
    pub log_dir: Option<PathBuf>,
    pub input: Option<PathBuf>,
}

/// Where the input source was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputOrigin {
    /// Nothing set, stdin is read.
    #[default]
    Stdin,
    CommandLine,
    ConfigFile,
}

/// Fully resolved run settings, immutable for the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub batch_size: usize,
    pub log_dir: PathBuf,
    /// `None` reads stdin.
    pub input: Option<PathBuf>,
    pub input_origin: InputOrigin,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            log_dir: PathBuf::from("."),
            input: None,
            input_origin: InputOrigin::Stdin,
        }
    }
}

impl Settings {
    pub fn resolve(config: Config, overrides: Overrides) -> Self {
        let batch_size = overrides
            .batch_size
            .or(config.batch_size)
            .map(clamp_batch_size)
            .unwrap_or(DEFAULT_BATCH_SIZE);

        let (input, input_origin) = match (overrides.input, config.input) {
            (Some(path), _) => (Some(path), InputOrigin::CommandLine),
            (None, Some(path)) => (Some(path), InputOrigin::ConfigFile),
            (None, None) => (None, InputOrigin::Stdin),
        };

        Self {
            batch_size,
            log_dir: overrides
                .log_dir
                .or(config.log_dir)
                .unwrap_or_else(|| PathBuf::from(".")),
            input,
            input_origin,
        }
    }
}

fn clamp_batch_size(n: i64) -> usize {
    usize::try_from(n).unwrap_or(0).max(1)
}
