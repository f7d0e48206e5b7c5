// src/github/mod.rs
// =============================================================================
// Everything that talks to (or describes) GitHub.
//
// - client: the ContentSource trait and its reqwest implementation
// - types:  ContentEntry / Contents, the shapes of API responses
// - repo:   RepositoryRef and parsing of https://github.com/owner/repo links
// - memory: an in-memory ContentSource used by the tests
// =============================================================================

mod client;
mod repo;
mod types;

#[cfg(test)]
pub mod memory;

pub use client::{ContentSource, GitHubClient, DEFAULT_API_BASE};
pub use repo::{parse_github_url, RepoUrlError, RepositoryRef};
pub use types::{strip_markdown_ext, ContentEntry, Contents, EntryKind};
