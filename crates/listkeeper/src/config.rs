//! # Configuration
//!
//! Store configuration is managed by [`confique`], which handles layered
//! loading from a TOML file, environment variables and compiled defaults.
//!
//! ## Resolution Order
//!
//! 1. **Environment variables**: `LISTKEEPER_DATA_DIR`, `LISTKEEPER_FILE_EXT`.
//! 2. **Config file**: the TOML file passed to [`StoreConfig::load`], if it exists.
//! 3. **Compiled Defaults**: built-in fallbacks via `#[config(default = ...)]`.
//!
//! When no data directory is configured anywhere, the platform data directory
//! (via the `directories` crate) is used.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `data_dir` | platform data dir + `/lists` | Directory holding one file per list |
//! | `file_ext` | `.json` | Extension of list files |

use crate::error::{Result, StoreError};
use confique::Config;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "listkeeper";

#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Directory holding the list files.
    #[config(env = "LISTKEEPER_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Extension for list files (e.g. ".json").
    #[config(env = "LISTKEEPER_FILE_EXT", default = ".json")]
    pub file_ext: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            file_ext: ".json".to_string(),
        }
    }
}

impl StoreConfig {
    /// Config rooted at an explicit directory, everything else default.
    pub fn with_data_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: Some(dir.into()),
            ..Default::default()
        }
    }

    /// Loads env over `file` (skipped when missing) over defaults.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut builder = Self::builder().env();
        if let Some(path) = file {
            builder = builder.file(path);
        }
        builder
            .load()
            .map_err(|err| StoreError::Config(err.to_string()))
    }

    /// Get the file extension, normalized to start with a dot.
    pub fn file_ext(&self) -> String {
        if self.file_ext.starts_with('.') {
            self.file_ext.clone()
        } else {
            format!(".{}", self.file_ext)
        }
    }

    /// The configured directory, or the platform default.
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        ProjectDirs::from("", "", APP_NAME)
            .map(|dirs| dirs.data_dir().join("lists"))
            .ok_or_else(|| {
                StoreError::Config(
                    "no data_dir configured and no home directory to default to".to_string(),
                )
            })
    }
}
