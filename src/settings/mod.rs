// src/settings/mod.rs
// =============================================================================
// The settings service: typed access on top of a key-value store.
//
// Keys (names kept compatible with the browser version's localStorage):
//   repoOwner  -> selected repository owner  (default: pratyanch-github)
//   repoName   -> selected repository name   (default: Obsidian)
//
// Settings is cheap to clone; every clone shares the same store.
// =============================================================================

mod store;

use std::sync::Arc;

use crate::github::RepositoryRef;

pub use store::{FileSettingsStore, MemorySettingsStore, SettingsError, SettingsStore};

pub const KEY_REPO_OWNER: &str = "repoOwner";
pub const KEY_REPO_NAME: &str = "repoName";

pub const DEFAULT_REPO_OWNER: &str = "pratyanch-github";
pub const DEFAULT_REPO_NAME: &str = "Obsidian";

#[derive(Clone)]
pub struct Settings {
    store: Arc<dyn SettingsStore>,
}

impl Settings {
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        Self { store }
    }

    /// The saved repository, with defaults for missing (or empty) keys.
    pub fn repository(&self) -> Result<RepositoryRef, SettingsError> {
        let owner = self.read_or(KEY_REPO_OWNER, DEFAULT_REPO_OWNER)?;
        let name = self.read_or(KEY_REPO_NAME, DEFAULT_REPO_NAME)?;
        Ok(RepositoryRef::new(owner, name))
    }

    /// Saves owner and name together.
    pub fn set_repository(&self, repo: &RepositoryRef) -> Result<(), SettingsError> {
        self.store.set_many(&[
            (KEY_REPO_OWNER, repo.owner.as_str()),
            (KEY_REPO_NAME, repo.name.as_str()),
        ])
    }

    fn read_or(&self, key: &str, default: &str) -> Result<String, SettingsError> {
        Ok(self
            .store
            .get(key)?
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| default.to_string()))
    }
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings").finish_non_exhaustive()
    }
}
