//! Durable key-value settings
//!
//! Stored at `~/.config/rollcall/settings.toml` as a flat string table.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Key of the "disclaimer already acknowledged" flag
pub const DISCLAIMER_SEEN_KEY: &str = "1";
/// Stored value meaning the disclaimer was acknowledged
pub const DISCLAIMER_SEEN_VALUE: &str = "true";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("could not find a config directory")]
    NoConfigDir,
    #[error("failed to write settings to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode settings: {0}")]
    Encode(#[from] toml::ser::Error),
}

pub trait SettingsStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError>;
}

/// Whether the disclaimer-seen flag is set; anything but `"true"` means no
pub fn disclaimer_seen(store: &dyn SettingsStore) -> bool {
    store.get(DISCLAIMER_SEEN_KEY).as_deref() == Some(DISCLAIMER_SEEN_VALUE)
}

pub fn mark_disclaimer_seen(store: &mut dyn SettingsStore) -> Result<(), SettingsError> {
    store.set(DISCLAIMER_SEEN_KEY, DISCLAIMER_SEEN_VALUE)
}

/// Settings persisted to a TOML file, re-read on every `get`
#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    /// Store under the user's config directory
    pub fn open_default() -> Result<Self, SettingsError> {
        let dir = dirs::config_dir()
            .ok_or(SettingsError::NoConfigDir)?
            .join("rollcall");
        Ok(Self::at(dir.join("settings.toml")))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> BTreeMap<String, String> {
        if !self.path.exists() {
            return BTreeMap::new();
        }
        match std::fs::read_to_string(&self.path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(map) => map,
                Err(e) => {
                    tracing::warn!("Failed to parse settings {}: {}", self.path.display(), e);
                    BTreeMap::new()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read settings {}: {}", self.path.display(), e);
                BTreeMap::new()
            }
        }
    }
}

impl SettingsStore for FileSettingsStore {
    fn get(&self, key: &str) -> Option<String> {
        self.read_all().remove(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        let mut map = self.read_all();
        map.insert(key.to_string(), value.to_string());
        let content = toml::to_string(&map)?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| SettingsError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(&self.path, content).map_err(|source| SettingsError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

/// In-process store, lost on exit
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct MemorySettingsStore {
    values: BTreeMap<String, String>,
}

#[cfg(test)]
impl SettingsStore for MemorySettingsStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
