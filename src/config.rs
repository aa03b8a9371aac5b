// SPDX-License-Identifier: MIT
//
// User configuration, read from `<config dir>/nib/config.json`.
//
// Every field has a default, so a partial file only overrides what it names.
// A missing file is the normal first-run case; a broken one is logged and
// ignored rather than keeping the editor from starting.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

const APP_DIR: &str = "nib";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where notes live; the scratch note is created here.
    pub notes_dir: PathBuf,
    /// Undo entries kept per session.
    pub history_depth: usize,
    /// Display width of a tab.
    pub tab_width: usize,
    /// Require a second Ctrl+Q to quit with unsaved changes.
    pub confirm_quit: bool,
    /// Rows kept visible above and below the cursor when scrolling.
    pub scroll_margin: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            notes_dir: default_notes_dir(),
            history_depth: nib_editor::history::DEFAULT_MAX_DEPTH,
            tab_width: 4,
            confirm_quit: true,
            scroll_margin: 2,
        }
    }
}

impl Config {
    /// Load from `path`, or the default location when `None`. Falls back to
    /// defaults (with a warning in the log) when the file cannot be used.
    #[must_use]
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path.map(Path::to_path_buf).or_else(config_file) else {
            tracing::debug!("no config directory, using defaults");
            return Self::default();
        };
        match Self::load_from(&path) {
            Ok(Some(config)) => {
                tracing::info!(path = %path.display(), "loaded config");
                config
            }
            Ok(None) => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                Self::default()
            }
            Err(e) => {
                tracing::warn!("{e}; using defaults");
                Self::default()
            }
        }
    }

    /// Read and parse `path`. `Ok(None)` when the file does not exist.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Read`] for I/O failures, [`ConfigError::Parse`] for
    /// malformed JSON or mistyped fields.
    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        let mut config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.sanitize();
        Ok(Some(config))
    }

    fn sanitize(&mut self) {
        self.history_depth = self.history_depth.max(1);
        self.tab_width = self.tab_width.clamp(1, 16);
    }
}

/// `<config dir>/nib/config.json`
#[must_use]
pub fn config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.json"))
}

/// `<data dir>/nib`, under the working directory when there is no data dir.
#[must_use]
pub fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

fn default_notes_dir() -> PathBuf {
    data_dir().join("notes")
}
