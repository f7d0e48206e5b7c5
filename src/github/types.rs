// src/github/types.rs
// =============================================================================
// Data shapes returned by the GitHub contents API.
//
// GET /repos/{owner}/{repo}/contents/{path} answers with either:
// - a JSON array  -> the path is a directory, one object per child
// - a JSON object -> the path is a single file (its metadata)
//
// We only keep the fields the viewer actually uses. serde ignores the rest
// (url, html_url, git_url, _links, ...).
// =============================================================================

use serde::{Deserialize, Serialize};

/// What kind of node a content entry is.
///
/// GitHub calls directories "dir". Symlinks and submodules also show up in
/// listings; we never navigate into them, so they collapse into `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    #[serde(rename = "dir")]
    Directory,
    #[serde(other)]
    Other,
}

/// One node from a directory listing (or a single file's metadata).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentEntry {
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub sha: String,
    #[serde(default)]
    pub size: u64,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    /// Raw download location. GitHub only fills this in for files.
    #[serde(default)]
    pub download_url: Option<String>,
}

impl ContentEntry {
    pub fn is_directory(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    /// True for `.md` / `.mdx` files, the only entries that become links.
    pub fn is_markdown(&self) -> bool {
        self.kind == EntryKind::File && is_markdown_name(&self.name)
    }
}

/// The two response shapes of the contents endpoint.
///
/// `#[serde(untagged)]` tries each variant in order, so an array becomes
/// `Listing` and an object becomes `File`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Contents {
    Listing(Vec<ContentEntry>),
    File(ContentEntry),
}

/// Checks a file name for a Markdown extension.
pub fn is_markdown_name(name: &str) -> bool {
    name.ends_with(".md") || name.ends_with(".mdx")
}

/// Removes a trailing `.md` or `.mdx` (only one of them, only at the end).
pub fn strip_markdown_ext(name: &str) -> &str {
    name.strip_suffix(".mdx")
        .or_else(|| name.strip_suffix(".md"))
        .unwrap_or(name)
}
