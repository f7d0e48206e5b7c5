// src/nav/selection.rs
// =============================================================================
// Which repository is selected right now.
//
// The selection is published through a tokio `watch` channel:
// - readers call subscribe() once and then borrow() the latest snapshot
// - a snapshot always holds owner AND name from the same switch, so nobody
//   can see the owner of one repository next to the name of another
// - every effective switch bumps `generation`; the sidebar and the document
//   view compare it when a request finishes, and throw the result away if
//   the repository changed while they were waiting
//
// A switch is saved to the settings store first and only published once the
// write succeeded.
// =============================================================================

use serde::Serialize;
use std::sync::Mutex;
use thiserror::Error;
use tokio::sync::watch;
use tracing::info;

use crate::github::RepositoryRef;
use crate::settings::{Settings, SettingsError};

/// The selected repository plus the staleness token that goes with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoSnapshot {
    pub repo: RepositoryRef,
    pub generation: u64,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("repository owner and name must both be non-empty")]
    EmptyField,

    #[error(transparent)]
    Settings(#[from] SettingsError),
}

#[derive(Debug)]
pub struct RepoSelection {
    settings: Settings,
    tx: watch::Sender<RepoSnapshot>,
    // Serializes save + publish so two switches cannot interleave
    switching: Mutex<()>,
}

impl RepoSelection {
    /// Starts from whatever the settings store has saved (or the defaults).
    pub fn load(settings: Settings) -> Result<Self, SettingsError> {
        let repo = settings.repository()?;
        let (tx, _rx) = watch::channel(RepoSnapshot { repo, generation: 0 });
        Ok(Self {
            settings,
            tx,
            switching: Mutex::new(()),
        })
    }

    pub fn current(&self) -> RepoSnapshot {
        self.tx.borrow().clone()
    }

    pub fn repository(&self) -> RepositoryRef {
        self.tx.borrow().repo.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<RepoSnapshot> {
        self.tx.subscribe()
    }

    /// Selects another repository.
    ///
    /// Selecting the repository that is already selected changes nothing,
    /// including the generation.
    pub fn switch_repository(&self, owner: &str, name: &str) -> Result<RepoSnapshot, SelectionError> {
        let owner = owner.trim();
        let name = name.trim();
        if owner.is_empty() || name.is_empty() {
            return Err(SelectionError::EmptyField);
        }

        let _guard = self
            .switching
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let repo = RepositoryRef::new(owner, name);
        if self.tx.borrow().repo == repo {
            return Ok(self.current());
        }

        self.settings.set_repository(&repo)?;

        self.tx.send_modify(|snapshot| {
            snapshot.repo = repo;
            snapshot.generation += 1;
        });

        let current = self.current();
        info!(repo = %current.repo, generation = current.generation, "switched repository");
        Ok(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{MemorySettingsStore, SettingsStore, KEY_REPO_NAME, KEY_REPO_OWNER};
    use std::sync::Arc;

    fn selection() -> (Arc<MemorySettingsStore>, RepoSelection) {
        let store = Arc::new(MemorySettingsStore::new());
        let selection = RepoSelection::load(Settings::new(store.clone())).unwrap();
        (store, selection)
    }

    // A store whose writes always fail
    struct ReadOnly;

    impl SettingsStore for ReadOnly {
        fn get(&self, _key: &str) -> Result<Option<String>, SettingsError> {
            Ok(None)
        }
        fn set(&self, _key: &str, _value: &str) -> Result<(), SettingsError> {
            Err(SettingsError::Write("read-only".to_string()))
        }
    }

    #[test]
    fn test_starts_from_defaults_at_generation_zero() {
        let (_store, selection) = selection();
        let snapshot = selection.current();
        assert_eq!(snapshot.generation, 0);
        assert_eq!(snapshot.repo, RepositoryRef::new("pratyanch-github", "Obsidian"));
    }

    #[test]
    fn test_switch_persists_and_publishes_both_fields() {
        let (store, selection) = selection();
        let rx = selection.subscribe();

        let snapshot = selection.switch_repository("octo", "handbook").unwrap();

        assert_eq!(snapshot.generation, 1);
        assert_eq!(*rx.borrow(), snapshot);
        assert_eq!(store.get(KEY_REPO_OWNER).unwrap().as_deref(), Some("octo"));
        assert_eq!(store.get(KEY_REPO_NAME).unwrap().as_deref(), Some("handbook"));
    }

    #[test]
    fn test_same_repository_is_a_no_op() {
        let (_store, selection) = selection();
        selection.switch_repository("octo", "handbook").unwrap();
        let again = selection.switch_repository("octo", "handbook").unwrap();
        assert_eq!(again.generation, 1);
    }

    #[test]
    fn test_empty_fields_are_rejected() {
        let (_store, selection) = selection();
        assert_eq!(
            selection.switch_repository("octo", "  "),
            Err(SelectionError::EmptyField)
        );
        assert_eq!(selection.current().generation, 0);
    }

    #[test]
    fn test_failed_save_leaves_selection_untouched() {
        let selection = RepoSelection::load(Settings::new(Arc::new(ReadOnly))).unwrap();
        let before = selection.current();

        let result = selection.switch_repository("octo", "handbook");

        assert!(matches!(result, Err(SelectionError::Settings(_))));
        assert_eq!(selection.current(), before);
    }

    #[test]
    fn test_restart_picks_up_saved_repository() {
        let (store, selection) = selection();
        selection.switch_repository("octo", "handbook").unwrap();

        let restarted = RepoSelection::load(Settings::new(store)).unwrap();
        assert_eq!(restarted.repository(), RepositoryRef::new("octo", "handbook"));
    }
}
