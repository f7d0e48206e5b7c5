// src/document/view.rs
// =============================================================================
// The document currently on screen, and the rules for replacing it.
//
// Every navigate() call:
//   1. bumps a request counter and clears whatever was shown before
//      (status becomes Loading, the old document is dropped right away)
//   2. resolves the target without holding any lock
//   3. applies the result ONLY if nobody navigated since, and the selected
//      repository is still the one we started with
//
// So responses can arrive in any order: a slow answer for an old path or an
// old repository is dropped on the floor instead of overwriting the page.
// Nothing is aborted on the wire; late results are simply ignored.
// =============================================================================

use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;
use tracing::debug;

use super::resolve::{resolve_doc, resolve_slug, ResolvedDocument};
use crate::error::ResolveError;
use crate::github::ContentSource;
use crate::markdown::{extract_toc, TocEntry};
use crate::nav::RepoSnapshot;

/// What the user asked to look at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", content = "target", rename_all = "snake_case")]
pub enum DocumentTarget {
    /// A file path inside the repository, e.g. `guides/setup.md`
    Doc(String),
    /// A blog post slug, e.g. `hello-world`
    Post(String),
}

impl DocumentTarget {
    fn is_empty(&self) -> bool {
        match self {
            DocumentTarget::Doc(path) => path.is_empty(),
            DocumentTarget::Post(slug) => slug.is_empty(),
        }
    }
}

/// A resolved document together with its outline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadedDocument {
    pub target: DocumentTarget,
    pub document: ResolvedDocument,
    pub toc: Vec<TocEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DocumentStatus {
    Idle,
    Loading { target: DocumentTarget },
    Ready { loaded: Arc<LoadedDocument> },
    Failed { target: DocumentTarget, error: ResolveError },
}

/// What happened to one navigate() call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigateOutcome {
    /// The result (document or error) is now what the view shows.
    Applied,
    /// Something newer happened while we waited; the result was dropped.
    Stale,
    /// Nothing to resolve (no repository or empty target); view untouched.
    Skipped,
}

struct ViewState {
    request: u64,
    status: DocumentStatus,
}

pub struct DocumentView {
    source: Arc<dyn ContentSource>,
    selection: watch::Receiver<RepoSnapshot>,
    state: Mutex<ViewState>,
}

impl DocumentView {
    pub fn new(source: Arc<dyn ContentSource>, selection: watch::Receiver<RepoSnapshot>) -> Self {
        Self {
            source,
            selection,
            state: Mutex::new(ViewState {
                request: 0,
                status: DocumentStatus::Idle,
            }),
        }
    }

    pub fn status(&self) -> DocumentStatus {
        self.lock().status.clone()
    }

    /// Shows `target`, replacing whatever was shown before.
    pub async fn navigate(&self, target: DocumentTarget) -> NavigateOutcome {
        let snapshot = self.selection.borrow().clone();
        if target.is_empty() || !snapshot.repo.is_set() {
            return NavigateOutcome::Skipped;
        }

        let request = {
            let mut state = self.lock();
            state.request += 1;
            state.status = DocumentStatus::Loading {
                target: target.clone(),
            };
            state.request
        };

        let source = self.source.as_ref();
        let result = match &target {
            DocumentTarget::Doc(path) => resolve_doc(source, &snapshot.repo, path).await,
            DocumentTarget::Post(slug) => resolve_slug(source, &snapshot.repo, slug).await,
        };

        let mut state = self.lock();
        let generation = self.selection.borrow().generation;
        if state.request != request || generation != snapshot.generation {
            debug!(?target, request, "dropping stale document result");
            return NavigateOutcome::Stale;
        }

        state.status = match result {
            Ok(Some(document)) => {
                let toc = extract_toc(&document.content);
                DocumentStatus::Ready {
                    loaded: Arc::new(LoadedDocument {
                        target,
                        document,
                        toc,
                    }),
                }
            }
            // Only reachable if the input checks above and in the resolvers drift apart
            Ok(None) => DocumentStatus::Idle,
            Err(error) => DocumentStatus::Failed { target, error },
        };
        NavigateOutcome::Applied
    }

    fn lock(&self) -> MutexGuard<'_, ViewState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
