//! Configuration for `palswap.toml`
//!
//! Holds the defaults a host would persist across invocations: the palette
//! directory, the match tolerance, and the check-widths toggle. CLI flags
//! override file values; a missing file just yields the defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "palswap.toml";

/// Error type for config loading failures
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Persisted tool defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Directory holding the palette PNG files
    #[serde(default = "default_palette_dir")]
    pub palette_dir: PathBuf,
    /// Default per-channel match tolerance, 0-255
    #[serde(default)]
    pub tolerance: u8,
    /// Ask before swapping between palettes of different widths
    #[serde(default = "default_check_widths")]
    pub check_widths: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            palette_dir: default_palette_dir(),
            tolerance: 0,
            check_widths: default_check_widths(),
        }
    }
}

fn default_palette_dir() -> PathBuf {
    PathBuf::from("palettes")
}

fn default_check_widths() -> bool {
    true
}

impl Config {
    /// Load from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `palswap.toml` from the working directory if present, defaults
    /// otherwise. A malformed file is still an error.
    pub fn load_or_default() -> Result<Self, ConfigError> {
        let path = Path::new(CONFIG_FILE);
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}
