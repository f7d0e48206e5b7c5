// src/nav/switcher.rs
// =============================================================================
// Changing the repository from the command line.
//
// Two steps, same as the settings dialog in the browser version:
// 1. PasskeyGate::unlock  - type the shared passkey
// 2. RepoSwitcher::switch - paste a https://github.com/owner/repo link
//
// The passkey is a speed bump against accidental switches, nothing more.
// It is not a security boundary: anyone with the binary can read it.
// =============================================================================

use thiserror::Error;
use tracing::debug;

use super::selection::{RepoSelection, RepoSnapshot, SelectionError};
use crate::error::SourceError;
use crate::github::{parse_github_url, ContentSource, RepoUrlError};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SwitchError {
    #[error("Incorrect passkey.")]
    IncorrectPasskey,

    #[error(transparent)]
    InvalidUrl(#[from] RepoUrlError),

    #[error("Repository not found or is private. Please check the URL.")]
    RepositoryNotFound,

    #[error("Failed to fetch repository: {0}")]
    Source(#[from] SourceError),

    #[error(transparent)]
    Selection(#[from] SelectionError),
}

/// Proof that the passkey was entered. Only PasskeyGate can make one.
#[derive(Debug)]
pub struct Unlocked {
    _private: (),
}

#[derive(Debug, Clone)]
pub struct PasskeyGate {
    expected: String,
}

impl PasskeyGate {
    pub fn new(expected: impl Into<String>) -> Self {
        Self {
            expected: expected.into(),
        }
    }

    pub fn unlock(&self, attempt: &str) -> Result<Unlocked, SwitchError> {
        if attempt == self.expected {
            Ok(Unlocked { _private: () })
        } else {
            Err(SwitchError::IncorrectPasskey)
        }
    }
}

pub struct RepoSwitcher<'a> {
    source: &'a dyn ContentSource,
    selection: &'a RepoSelection,
}

impl<'a> RepoSwitcher<'a> {
    pub fn new(source: &'a dyn ContentSource, selection: &'a RepoSelection) -> Self {
        Self { source, selection }
    }

    /// Parses `url`, checks the repository is public, then selects it.
    pub async fn switch(&self, _unlocked: &Unlocked, url: &str) -> Result<RepoSnapshot, SwitchError> {
        let repo = parse_github_url(url)?;
        debug!(%repo, "checking repository before switching");

        if !self.source.repository_exists(&repo).await? {
            return Err(SwitchError::RepositoryNotFound);
        }

        Ok(self.selection.switch_repository(&repo.owner, &repo.name)?)
    }
}
