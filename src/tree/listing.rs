// src/tree/listing.rs
// =============================================================================
// One directory listing, cleaned up for the sidebar.
//
// list_children() makes exactly one contents request and then:
// - drops anything named `blog` or `.blog` (blog posts have their own index)
// - sorts directories first, then files, each group by case-insensitive name
//
// Non-Markdown files stay in the listing so that counts and ordering match
// the repository, but EntryView marks them as not navigable.
// =============================================================================

use serde::Serialize;
use std::cmp::Ordering;
use tracing::debug;

use crate::document::humanize;
use crate::error::ResolveError;
use crate::github::{strip_markdown_ext, ContentEntry, ContentSource, Contents, RepositoryRef};

/// Names that never show up in the tree, at any depth.
const HIDDEN: [&str; 2] = ["blog", ".blog"];

/// Lists the immediate children of `path` ("" is the repository root).
pub async fn list_children(
    source: &dyn ContentSource,
    repo: &RepositoryRef,
    path: &str,
) -> Result<Vec<ContentEntry>, ResolveError> {
    let contents = source
        .contents(repo, path)
        .await
        .map_err(|e| ResolveError::from_source(e, "Directory not found in repository."))?;

    let mut entries = match contents {
        Contents::Listing(entries) => entries,
        Contents::File(_) => {
            return Err(ResolveError::InvalidTarget(
                "Path is a file, not a directory.".to_string(),
            ))
        }
    };

    entries.retain(|entry| !HIDDEN.contains(&entry.name.as_str()));
    sort_entries(&mut entries);

    debug!(%repo, path, count = entries.len(), "listed directory");
    Ok(entries)
}

/// Directories before everything else, then by name ignoring case.
pub fn sort_entries(entries: &mut [ContentEntry]) {
    entries.sort_by(compare_entries);
}

fn compare_entries(a: &ContentEntry, b: &ContentEntry) -> Ordering {
    b.is_directory()
        .cmp(&a.is_directory())
        .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        // Keeps "Readme.md" and "README.md" in a stable order
        .then_with(|| a.name.cmp(&b.name))
}

/// What the presentation layer needs for one row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryView {
    pub name: String,
    pub path: String,
    /// Text to display: humanized directory name, or the file name
    /// without its Markdown extension
    pub label: String,
    pub is_directory: bool,
    /// True only for files ending in .md / .mdx, the only navigable leaves
    pub is_markdown: bool,
}

impl From<&ContentEntry> for EntryView {
    fn from(entry: &ContentEntry) -> Self {
        let is_directory = entry.is_directory();
        let is_markdown = entry.is_markdown();
        let label = if is_directory {
            humanize(&entry.name)
        } else if is_markdown {
            strip_markdown_ext(&entry.name).to_string()
        } else {
            entry.name.clone()
        };

        Self {
            name: entry.name.clone(),
            path: entry.path.clone(),
            label,
            is_directory,
            is_markdown,
        }
    }
}
