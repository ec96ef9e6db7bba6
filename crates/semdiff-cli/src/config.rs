use std::path::{Path, PathBuf};

use semdiff_diff::DiffOptions;
use semdiff_fetch::FetchConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = ".semdiff.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Settings read from the TOML config file.
///
/// ```toml
/// [diff]
/// max_semantic_size = 524288
/// context_lines = 5
///
/// [fetch]
/// max_file_size = 1048576
/// require_text = true
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub diff: DiffOptions,
    pub fetch: FetchConfig,
}

impl CliConfig {
    /// Load `explicit` if given, else the default file if it exists, else
    /// built-in defaults.
    pub fn load(explicit: Option<&Path>) -> ConfigResult<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))
            }
            None => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
