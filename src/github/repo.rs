// src/github/repo.rs
// =============================================================================
// RepositoryRef: which GitHub repository we are looking at.
//
// Also parses repository links typed by the user, e.g.
//   https://github.com/rust-lang/rust
//   https://github.com/user/repo.git
//
// The empty pair ("", "") is a valid value that means "nothing selected".
// =============================================================================

use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Owner + name of a GitHub repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryRef {
    pub owner: String,
    pub name: String,
}

impl RepositoryRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Both halves filled in. Resolvers refuse to run otherwise.
    pub fn is_set(&self) -> bool {
        !self.owner.is_empty() && !self.name.is_empty()
    }

    pub fn web_url(&self) -> String {
        format!("https://github.com/{}/{}", self.owner, self.name)
    }
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Why a repository link was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepoUrlError {
    #[error("Please enter a valid GitHub URL.")]
    NotGitHub,
    #[error("URL must be in the format github.com/owner/repo.")]
    MissingRepo,
}

// Parses a GitHub URL to extract owner and repository name
//
// Supported formats:
//   - https://github.com/owner/repo
//   - https://github.com/owner/repo.git
//   - https://github.com/owner/repo/tree/main/docs (extra segments ignored)
//   - github.com/owner/repo (scheme added for you)
pub fn parse_github_url(input: &str) -> Result<RepositoryRef, RepoUrlError> {
    let input = input.trim();
    let with_scheme = if input.contains("://") {
        input.to_string()
    } else {
        format!("https://{}", input)
    };

    let url = Url::parse(&with_scheme).map_err(|_| RepoUrlError::NotGitHub)?;
    if url.host_str() != Some("github.com") {
        return Err(RepoUrlError::NotGitHub);
    }

    // Skip empty segments so "https://github.com//owner/repo/" still works
    let parts: Vec<&str> = url
        .path_segments()
        .map(|segments| segments.filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();

    if parts.len() < 2 {
        return Err(RepoUrlError::MissingRepo);
    }

    let owner = parts[0];
    let name = parts[1].strip_suffix(".git").unwrap_or(parts[1]);
    if name.is_empty() {
        return Err(RepoUrlError::MissingRepo);
    }

    Ok(RepositoryRef::new(owner, name))
}
