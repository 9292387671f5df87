//! User settings stored at `~/.config/romshelf/settings.toml`.
//!
//! Every field is optional. A missing file, section or key falls back to
//! the defaults, so an empty file is a valid configuration.

use std::io;
use std::path::{Path, PathBuf};

use romshelf_core::Platform;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::hasher::{ChecksumMode, ChecksumPolicy, DEFAULT_CONTENT_LIMIT, DEFAULT_CONTENT_READS};
use crate::pipeline::ScanOptions;
use crate::scanner::DEFAULT_MAX_CONCURRENCY;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub scan: ScanSettings,
    pub export: ExportSettings,
}

/// The `[scan]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSettings {
    pub roots: Vec<String>,
    /// Empty means every extension the classifier knows.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extensions: Vec<String>,
    pub max_concurrency: usize,
    pub max_content_reads: usize,
    pub checksum: ChecksumMode,
    pub content_limit_bytes: u64,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            roots: Vec::new(),
            extensions: Vec::new(),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            max_content_reads: DEFAULT_CONTENT_READS,
            checksum: ChecksumMode::default(),
            content_limit_bytes: DEFAULT_CONTENT_LIMIT,
        }
    }
}

impl ScanSettings {
    /// Extensions to scan for, falling back to [`Platform::known_extensions`].
    pub fn extensions(&self) -> Vec<String> {
        if self.extensions.is_empty() {
            Platform::known_extensions()
                .into_iter()
                .map(str::to_string)
                .collect()
        } else {
            self.extensions.clone()
        }
    }

    pub fn options(&self) -> ScanOptions {
        ScanOptions {
            max_concurrency: self.max_concurrency.max(1),
            max_content_reads: self.max_content_reads.max(1),
            checksum: ChecksumPolicy {
                mode: self.checksum,
                content_limit_bytes: self.content_limit_bytes,
            },
        }
    }
}

/// The `[export]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// Where the catalog snapshot is written.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl From<&Settings> for ScanOptions {
    fn from(settings: &Settings) -> Self {
        settings.scan.options()
    }
}

/// Canonical path to the settings file.
pub fn settings_path() -> PathBuf {
    let config = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    config.join("romshelf").join("settings.toml")
}

/// Load settings from [`settings_path`], or defaults if there is no file.
pub fn load_settings() -> Result<Settings, SettingsError> {
    load_settings_from(&settings_path())
}

/// Load settings from `path`. A missing file yields the defaults; a file
/// that exists but does not parse is an error.
pub fn load_settings_from(path: &Path) -> Result<Settings, SettingsError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::debug!("No settings at {}, using defaults", path.display());
            return Ok(Settings::default());
        }
        Err(source) => {
            return Err(SettingsError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    toml::from_str(&contents).map_err(|source| SettingsError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Save settings to [`settings_path`].
pub fn save_settings(settings: &Settings) -> Result<(), SettingsError> {
    save_settings_to(&settings_path(), settings)
}

/// Write `settings` to `path` atomically, creating parent directories.
pub fn save_settings_to(path: &Path, settings: &Settings) -> Result<(), SettingsError> {
    let io_err = |source| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    let serialized = toml::to_string_pretty(settings)?;
    let tmp = path.with_extension("toml.tmp");
    std::fs::write(&tmp, &serialized).map_err(io_err)?;
    std::fs::rename(&tmp, path).map_err(io_err)?;

    log::debug!("Saved settings to {}", path.display());
    Ok(())
}
