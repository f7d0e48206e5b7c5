// src/document/resolve.rs
// =============================================================================
// Turns "a path in the repo" or "a blog slug" into text we can render.
//
// Doc mode (resolve_doc), e.g. docs/guides/getting-started.md:
//   1. fetch the file's metadata from the contents API
//   2. make sure it is a file with a download_url
//   3. download the raw text
//   4. title = file name without .md/.mdx, dashes and underscores as spaces
//
// Slug mode (resolve_slug), e.g. "hello-world":
//   try blog/hello-world.md, and only if that fails blog/hello-world.mdx.
//   The two attempts run one after the other, never in parallel.
//
// Any failure aborts the whole resolution. There is never a "half" document.
// =============================================================================

use serde::Serialize;
use tracing::{debug, warn};

use super::title::{doc_title, slug_title};
use crate::error::ResolveError;
use crate::github::{strip_markdown_ext, ContentEntry, ContentSource, Contents, EntryKind, RepositoryRef};

/// Directory that holds blog posts. Hidden from the docs tree.
pub const BLOG_DIR: &str = "blog";

/// Extensions tried for a blog slug, in this order.
const POST_EXTENSIONS: [&str; 2] = [".md", ".mdx"];

/// The text of one document plus the title to show above it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedDocument {
    pub content: String,
    pub title: String,
}

/// One entry on the blog index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostSummary {
    pub slug: String,
    pub title: String,
    pub path: String,
}

impl PostSummary {
    fn from_entry(entry: &ContentEntry) -> Self {
        let slug = strip_markdown_ext(&entry.name).to_string();
        Self {
            title: slug_title(&slug),
            slug,
            path: entry.path.clone(),
        }
    }
}

// What we need from file metadata before downloading
struct FileMeta {
    name: String,
    download_url: String,
}

/// Resolves a document path.
///
/// Returns `Ok(None)` without touching the network when there is nothing to
/// resolve (empty path or no repository selected).
pub async fn resolve_doc(
    source: &dyn ContentSource,
    repo: &RepositoryRef,
    path: &str,
) -> Result<Option<ResolvedDocument>, ResolveError> {
    if path.is_empty() || !repo.is_set() {
        debug!(%repo, path, "nothing to resolve");
        return Ok(None);
    }

    let meta = file_metadata(source, repo, path).await?;
    let content = download(source, &meta.download_url).await?;

    Ok(Some(ResolvedDocument {
        content,
        title: doc_title(&meta.name),
    }))
}

/// Resolves a blog slug to `blog/<slug>.md` or `blog/<slug>.mdx`.
pub async fn resolve_slug(
    source: &dyn ContentSource,
    repo: &RepositoryRef,
    slug: &str,
) -> Result<Option<ResolvedDocument>, ResolveError> {
    if slug.is_empty() || !repo.is_set() {
        debug!(%repo, slug, "nothing to resolve");
        return Ok(None);
    }

    for ext in POST_EXTENSIONS {
        let path = format!("{}/{}{}", BLOG_DIR, slug, ext);
        match file_metadata(source, repo, &path).await {
            Ok(meta) => {
                let content = download(source, &meta.download_url).await?;
                return Ok(Some(ResolvedDocument {
                    content,
                    title: slug_title(slug),
                }));
            }
            Err(e) => debug!(%path, error = %e, "no post at this path"),
        }
    }

    Err(ResolveError::NotFound(
        "Could not find blog post file (.md or .mdx).".to_string(),
    ))
}

/// Lists Markdown files in the `blog/` directory, in API order.
pub async fn list_posts(
    source: &dyn ContentSource,
    repo: &RepositoryRef,
) -> Result<Vec<PostSummary>, ResolveError> {
    if !repo.is_set() {
        return Ok(Vec::new());
    }

    match source.contents(repo, BLOG_DIR).await {
        Ok(Contents::Listing(entries)) => Ok(entries
            .iter()
            .filter(|entry| entry.is_markdown())
            .map(PostSummary::from_entry)
            .collect()),
        Ok(Contents::File(_)) => Err(ResolveError::InvalidTarget(
            "'blog' is a file, not a directory.".to_string(),
        )),
        Err(e) => match ResolveError::from_source(e, "No 'blog' directory found in this repository.") {
            ResolveError::FetchFailed(reason) => {
                warn!(%repo, %reason, "blog listing failed");
                Err(ResolveError::FetchFailed(format!(
                    "Failed to fetch blog posts: {}",
                    reason
                )))
            }
            other => Err(other),
        },
    }
}

async fn file_metadata(
    source: &dyn ContentSource,
    repo: &RepositoryRef,
    path: &str,
) -> Result<FileMeta, ResolveError> {
    let contents = source
        .contents(repo, path)
        .await
        .map_err(|e| ResolveError::from_source(e, "File not found in repository."))?;

    match contents {
        Contents::File(ContentEntry {
            name,
            kind: EntryKind::File,
            download_url: Some(download_url),
            ..
        }) => Ok(FileMeta { name, download_url }),
        _ => Err(ResolveError::InvalidTarget(
            "Path does not point to a valid file.".to_string(),
        )),
    }
}

async fn download(source: &dyn ContentSource, url: &str) -> Result<String, ResolveError> {
    source.download(url).await.map_err(|e| {
        warn!(%url, error = %e, "raw download failed");
        ResolveError::DownloadFailed("Could not download file content.".to_string())
    })
}
