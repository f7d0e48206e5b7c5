// src/settings/store.rs
// =============================================================================
// Key-value storage for viewer settings.
//
// Two stores implement the SettingsStore trait:
// - FileSettingsStore:   a small TOML file, rewritten atomically on every set
// - MemorySettingsStore: a map in memory, used for one-off --repo overrides
//                        and in tests
//
// Values are plain strings. Typed access (defaults, validation) lives one
// level up in Settings.
// =============================================================================

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;

/// Errors from settings storage.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("cannot read settings: {0}")]
    Read(String),

    #[error("cannot write settings: {0}")]
    Write(String),

    #[error("settings file is not valid TOML: {0}")]
    Parse(String),
}

/// Get/set of string values by key.
///
/// `set_many` writes several keys in one step; stores that can do that
/// atomically should override it.
pub trait SettingsStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, SettingsError>;

    fn set(&self, key: &str, value: &str) -> Result<(), SettingsError>;

    fn set_many(&self, pairs: &[(&str, &str)]) -> Result<(), SettingsError> {
        for (key, value) in pairs {
            self.set(key, value)?;
        }
        Ok(())
    }
}

/// Settings kept in a TOML file, e.g. `~/.config/repodocs/settings.toml`.
#[derive(Debug)]
pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, SettingsError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let content = fs::read_to_string(&self.path)
            .map_err(|e| SettingsError::Read(format!("{}: {}", self.path.display(), e)))?;

        toml::from_str(&content).map_err(|e| SettingsError::Parse(e.to_string()))
    }

    // Writes to a temp file next to the real one, then renames over it, so
    // a crash never leaves a half-written settings file behind.
    fn write_all(&self, values: &BTreeMap<String, String>) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| SettingsError::Write(format!("cannot create directory: {}", e)))?;
        }

        let content = toml::to_string_pretty(values)
            .map_err(|e| SettingsError::Write(format!("cannot serialize settings: {}", e)))?;

        let temp_path = self.path.with_extension("tmp");
        {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .map_err(|e| SettingsError::Write(format!("cannot create temp file: {}", e)))?;

            file.write_all(content.as_bytes())
                .map_err(|e| SettingsError::Write(e.to_string()))?;

            file.sync_all()
                .map_err(|e| SettingsError::Write(format!("cannot sync to disk: {}", e)))?;
        }

        fs::rename(&temp_path, &self.path)
            .map_err(|e| SettingsError::Write(format!("cannot rename temp file: {}", e)))
    }
}

impl SettingsStore for FileSettingsStore {
    fn get(&self, key: &str) -> Result<Option<String>, SettingsError> {
        Ok(self.read_all()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SettingsError> {
        self.set_many(&[(key, value)])
    }

    // One read and one atomic write for all keys
    fn set_many(&self, pairs: &[(&str, &str)]) -> Result<(), SettingsError> {
        let mut values = self.read_all()?;
        for (key, value) in pairs {
            values.insert(key.to_string(), value.to_string());
        }
        self.write_all(&values)
    }
}

/// Settings that only live as long as the process.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn values(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        // A panic elsewhere cannot leave a half-updated BTreeMap behind
        self.values.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SettingsStore for MemorySettingsStore {
    fn get(&self, key: &str) -> Result<Option<String>, SettingsError> {
        Ok(self.values().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SettingsError> {
        self.values().insert(key.to_string(), value.to_string());
        Ok(())
    }
}
