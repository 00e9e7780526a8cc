//! Shared settings (cache compression, store location, API credentials).
//!
//! The settings file is always `~/.config/ggdb/settings.toml`. The library
//! reads the `[cache]` table; the scraper crate reads `[igdb]` from the same
//! file.

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cache::CacheCodec;
use crate::store::{FileStore, default_store_dir};

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Invalid settings file: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Canonical path to the settings file: `~/.config/ggdb/settings.toml`.
pub fn settings_path() -> PathBuf {
    let config = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    config.join("ggdb").join("settings.toml")
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub cache: CacheSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheSettings {
    /// Compress slots on save. Worth enabling once a large library hits the quota.
    #[serde(default)]
    pub compress: bool,
    #[serde(default)]
    pub quota_bytes: Option<u64>,
    /// Store directory, defaults to `~/.cache/ggdb/store/`.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl Settings {
    /// Load from the canonical path. A missing or broken file yields defaults.
    pub fn load() -> Self {
        let path = settings_path();
        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(SettingsError::Io(e)) if e.kind() == io::ErrorKind::NotFound => Self::default(),
            Err(e) => {
                log::warn!("Ignoring settings file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    pub fn codec(&self) -> CacheCodec {
        CacheCodec::new(self.cache.compress)
    }

    pub fn file_store(&self) -> FileStore {
        let dir = self.cache.dir.clone().unwrap_or_else(default_store_dir);
        FileStore::new(dir).with_quota(self.cache.quota_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn parses_cache_table() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("settings.toml");
        std::fs::write(
            &path,
            "[cache]\ncompress = true\nquota_bytes = 5242880\n\n[igdb]\nclient_id = \"abc\"\n",
        )
        .unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert!(settings.cache.compress);
        assert_eq!(settings.cache.quota_bytes, Some(5_242_880));
        assert!(settings.codec().compress);
    }

    #[test]
    fn empty_file_is_default() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("settings.toml");
        std::fs::write(&path, "").unwrap();
        assert_eq!(Settings::load_from(&path).unwrap(), Settings::default());
    }
}
