// src/github/memory.rs
// =============================================================================
// In-memory ContentSource for tests.
//
// Holds a few fake repositories as flat maps of "path -> file text" and
// answers contents/download calls the way GitHub would:
// - a file path returns that file's metadata
// - a directory path (or "") returns its immediate children
// - anything else is NotFound
//
// It also records every request and lets a test:
// - fail a path with an HTTP status
// - break a file's download
// - hold a request open on a gate until the test releases it, which is how
//   the out-of-order arrival tests are written
// =============================================================================

use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use super::client::ContentSource;
use super::repo::RepositoryRef;
use super::types::{ContentEntry, Contents, EntryKind};
use crate::error::SourceError;

const DOWNLOAD_SCHEME: &str = "mem://";

#[derive(Debug, Default)]
pub struct MemorySource {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    repos: HashMap<RepositoryRef, BTreeMap<String, String>>,
    failures: HashMap<(RepositoryRef, String), u16>,
    broken_downloads: HashSet<String>,
    gates: HashMap<(RepositoryRef, String), Arc<Notify>>,
    requests: Vec<String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a file. Parent directories exist implicitly.
    pub fn with_file(self, repo: &RepositoryRef, path: &str, text: &str) -> Self {
        self.lock()
            .repos
            .entry(repo.clone())
            .or_default()
            .insert(path.to_string(), text.to_string());
        self
    }

    /// Makes every contents request for `path` answer with `status`.
    pub fn fail_path(&self, repo: &RepositoryRef, path: &str, status: u16) {
        self.lock()
            .failures
            .insert((repo.clone(), path.to_string()), status);
    }

    /// Makes the raw download of `path` fail with a 500.
    pub fn break_download(&self, repo: &RepositoryRef, path: &str) {
        self.lock().broken_downloads.insert(download_url(repo, path));
    }

    /// Holds contents requests for `path` until the returned Notify fires.
    pub fn gate(&self, repo: &RepositoryRef, path: &str) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.lock()
            .gates
            .insert((repo.clone(), path.to_string()), notify.clone());
        notify
    }

    /// Every request seen so far, as "contents owner/name:path" or
    /// "download <url>".
    pub fn requests(&self) -> Vec<String> {
        self.lock().requests.clone()
    }

    /// How many contents requests hit `path` in `repo`.
    pub fn contents_calls(&self, repo: &RepositoryRef, path: &str) -> usize {
        let key = format!("contents {}:{}", repo, path);
        self.lock().requests.iter().filter(|r| **r == key).count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("memory source lock poisoned")
    }

    fn answer(&self, repo: &RepositoryRef, path: &str) -> Result<Contents, SourceError> {
        let inner = self.lock();

        if let Some(status) = inner.failures.get(&(repo.clone(), path.to_string())) {
            return Err(match status {
                404 => SourceError::NotFound(path.to_string()),
                s => SourceError::Status {
                    status: *s,
                    url: path.to_string(),
                },
            });
        }

        let files = inner
            .repos
            .get(repo)
            .ok_or_else(|| SourceError::NotFound(repo.to_string()))?;

        if let Some(text) = files.get(path) {
            return Ok(Contents::File(file_entry(repo, path, text.len())));
        }

        let prefix = if path.is_empty() {
            String::new()
        } else {
            format!("{}/", path)
        };

        let mut child_files = Vec::new();
        let mut child_dirs = BTreeSet::new();
        for (file_path, text) in files.range(prefix.clone()..) {
            let Some(rest) = file_path.strip_prefix(&prefix) else {
                break;
            };
            match rest.split_once('/') {
                Some((dir, _)) => {
                    child_dirs.insert(dir.to_string());
                }
                None => child_files.push(file_entry(repo, file_path, text.len())),
            }
        }

        if child_files.is_empty() && child_dirs.is_empty() {
            return Err(SourceError::NotFound(path.to_string()));
        }

        // Files first on purpose: callers are expected to do their own sorting
        let mut entries = child_files;
        entries.extend(child_dirs.into_iter().map(|name| ContentEntry {
            path: format!("{}{}", prefix, name),
            name,
            sha: String::new(),
            size: 0,
            kind: EntryKind::Directory,
            download_url: None,
        }));
        Ok(Contents::Listing(entries))
    }
}

#[async_trait]
impl ContentSource for MemorySource {
    async fn contents(&self, repo: &RepositoryRef, path: &str) -> Result<Contents, SourceError> {
        let gate = {
            let mut inner = self.lock();
            inner.requests.push(format!("contents {}:{}", repo, path));
            inner.gates.get(&(repo.clone(), path.to_string())).cloned()
        };
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.answer(repo, path)
    }

    async fn download(&self, url: &str) -> Result<String, SourceError> {
        let text = {
            let mut inner = self.lock();
            inner.requests.push(format!("download {}", url));
            if inner.broken_downloads.contains(url) {
                return Err(SourceError::Status {
                    status: 500,
                    url: url.to_string(),
                });
            }
            inner
                .repos
                .iter()
                .find_map(|(repo, files)| {
                    let rest = url.strip_prefix(DOWNLOAD_SCHEME)?;
                    let path = rest.strip_prefix(&format!("{}/", repo))?;
                    files.get(path).cloned()
                })
        };
        text.ok_or_else(|| SourceError::NotFound(url.to_string()))
    }

    async fn repository_exists(&self, repo: &RepositoryRef) -> Result<bool, SourceError> {
        let mut inner = self.lock();
        inner.requests.push(format!("repo {}", repo));
        Ok(inner.repos.contains_key(repo))
    }
}

fn download_url(repo: &RepositoryRef, path: &str) -> String {
    format!("{}{}/{}", DOWNLOAD_SCHEME, repo, path)
}

fn file_entry(repo: &RepositoryRef, path: &str, size: usize) -> ContentEntry {
    let name = path.rsplit('/').next().unwrap_or(path).to_string();
    ContentEntry {
        name,
        path: path.to_string(),
        sha: format!("sha-{}", path),
        size: size as u64,
        kind: EntryKind::File,
        download_url: Some(download_url(repo, path)),
    }
}
