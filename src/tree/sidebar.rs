// src/tree/sidebar.rs
// =============================================================================
// Drives TreeState against a ContentSource.
//
// TreeState decides WHAT to fetch (it hands out LoadTickets); Sidebar does
// the fetching and hands results back. Two rules keep the cache honest:
//
// 1. Before every read or write of the state, compare the selected
//    repository's generation with the one the state was built for. If the
//    repository changed, drop every node first.
// 2. Results are applied through TreeState::complete, which ignores any
//    ticket issued for an older generation.
//
// Together they mean a listing that was in flight during a switch can never
// land in the new repository's tree.
//
// Sibling directories are fetched concurrently, at most
// MAX_CONCURRENT_LISTINGS at a time (same buffer_unordered pattern as the
// rest of the async code).
// =============================================================================

use futures::stream::{self, StreamExt};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;
use tracing::{debug, info};

use super::listing::list_children;
use super::state::{Completion, DirectoryListing, LoadTicket, TreeRow, TreeState};
use crate::github::ContentSource;
use crate::nav::RepoSnapshot;

/// How many directory listings may be in flight at once.
pub const MAX_CONCURRENT_LISTINGS: usize = 8;

pub struct Sidebar {
    source: Arc<dyn ContentSource>,
    selection: watch::Receiver<RepoSnapshot>,
    state: Mutex<TreeState>,
}

impl Sidebar {
    pub fn new(source: Arc<dyn ContentSource>, selection: watch::Receiver<RepoSnapshot>) -> Self {
        let state = TreeState::new(&selection.borrow());
        Self {
            source,
            selection,
            state: Mutex::new(state),
        }
    }

    /// Loads the root listing (and any directories on the active path).
    pub async fn load_root(&self) {
        let ticket = self.state().start_root();
        self.run(ticket.into_iter().collect()).await;
    }

    /// Expands or collapses `path`, fetching it if it has never loaded.
    pub async fn toggle(&self, path: &str) {
        let ticket = self.state().toggle(path);
        self.run(ticket.into_iter().collect()).await;
    }

    /// Loads the root, then expands every directory up to `depth` levels
    /// deep, one level at a time.
    pub async fn expand_to_depth(&self, depth: usize) {
        self.load_root().await;
        loop {
            let tickets = self.state().expand_within(depth);
            if tickets.is_empty() {
                break;
            }
            self.run(tickets).await;
        }
    }

    pub fn set_active_path(&self, path: &str) {
        self.state().set_active_path(path);
    }

    pub fn rows(&self) -> Vec<TreeRow> {
        self.state().rows()
    }

    pub fn listing(&self, path: &str) -> Option<DirectoryListing> {
        self.state().listing(path)
    }

    // Fetches every ticket, plus whatever follow-up tickets the results ask for
    async fn run(&self, mut tickets: Vec<LoadTicket>) {
        let source = self.source.as_ref();

        while !tickets.is_empty() {
            let mut results = stream::iter(std::mem::take(&mut tickets))
                .map(|ticket| async move {
                    let result = list_children(source, &ticket.repo, &ticket.path).await;
                    (ticket, result)
                })
                .buffer_unordered(MAX_CONCURRENT_LISTINGS);

            while let Some((ticket, result)) = results.next().await {
                match self.state().complete(&ticket, result) {
                    Completion::Applied(follow_up) => tickets.extend(follow_up),
                    Completion::Stale => {
                        debug!(path = %ticket.path, generation = ticket.generation, "dropping stale listing")
                    }
                }
            }
        }
    }

    // Locks the state, resetting it first if the repository changed
    fn state(&self) -> MutexGuard<'_, TreeState> {
        let mut state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let snapshot = self.selection.borrow();
        if snapshot.generation != state.generation() {
            info!(repo = %snapshot.repo, generation = snapshot.generation, "repository changed, clearing tree");
            state.reset(&snapshot);
        }
        drop(snapshot);
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::memory::MemorySource;
    use crate::github::RepositoryRef;
    use crate::nav::RepoSelection;
    use crate::settings::{MemorySettingsStore, Settings};
    use crate::tree::LoadStatus;

    fn repo_a() -> RepositoryRef {
        RepositoryRef::new("octo", "handbook")
    }

    fn repo_b() -> RepositoryRef {
        RepositoryRef::new("octo", "cookbook")
    }

    fn setup() -> (Arc<MemorySource>, RepoSelection, Sidebar) {
        let source = Arc::new(
            MemorySource::new()
                .with_file(&repo_a(), "README.md", "a")
                .with_file(&repo_a(), "api/index.md", "api")
                .with_file(&repo_a(), "guides/setup/intro.md", "intro")
                .with_file(&repo_a(), "guides/faq.md", "faq")
                .with_file(&repo_b(), "recipes/soup.md", "soup"),
        );
        let selection =
            RepoSelection::load(Settings::new(Arc::new(MemorySettingsStore::new()))).unwrap();
        selection
            .switch_repository(&repo_a().owner, &repo_a().name)
            .unwrap();
        let sidebar = Sidebar::new(source.clone(), selection.subscribe());
        (source, selection, sidebar)
    }

    fn root_names(sidebar: &Sidebar) -> Vec<String> {
        sidebar
            .listing("")
            .map(|l| l.entries.into_iter().map(|e| e.name).collect())
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn test_root_is_cached_until_repository_switch() {
        let (source, selection, sidebar) = setup();

        sidebar.load_root().await;
        sidebar.load_root().await;
        assert_eq!(source.contents_calls(&repo_a(), ""), 1);
        assert_eq!(root_names(&sidebar), vec!["api", "guides", "README.md"]);

        selection
            .switch_repository(&repo_b().owner, &repo_b().name)
            .unwrap();
        assert!(sidebar.listing("").is_none());
        sidebar.load_root().await;
        assert_eq!(root_names(&sidebar), vec!["recipes"]);

        selection
            .switch_repository(&repo_a().owner, &repo_a().name)
            .unwrap();
        sidebar.load_root().await;
        assert_eq!(source.contents_calls(&repo_a(), ""), 2);
    }

    #[tokio::test]
    async fn test_late_listing_for_old_repository_is_dropped() {
        let (source, selection, sidebar) = setup();
        let gate = source.gate(&repo_a(), "");

        tokio::join!(sidebar.load_root(), async {
            selection
                .switch_repository(&repo_b().owner, &repo_b().name)
                .unwrap();
            gate.notify_one();
        });

        // The repo A answer arrived after the switch and was thrown away
        assert!(sidebar.listing("").is_none());

        sidebar.load_root().await;
        assert_eq!(root_names(&sidebar), vec!["recipes"]);
    }

    #[tokio::test]
    async fn test_active_path_loads_its_ancestors() {
        let (source, _selection, sidebar) = setup();
        sidebar.set_active_path("guides/setup/intro.md");

        sidebar.load_root().await;

        assert_eq!(source.contents_calls(&repo_a(), "guides"), 1);
        assert_eq!(source.contents_calls(&repo_a(), "guides/setup"), 1);
        assert_eq!(source.contents_calls(&repo_a(), "api"), 0);

        let paths: Vec<String> = sidebar.rows().into_iter().map(|r| r.entry.path).collect();
        assert_eq!(
            paths,
            vec![
                "api",
                "guides",
                "guides/setup",
                "guides/setup/intro.md",
                "guides/faq.md",
                "README.md"
            ]
        );
    }

    #[tokio::test]
    async fn test_toggle_fetches_once() {
        let (source, _selection, sidebar) = setup();
        sidebar.load_root().await;

        sidebar.toggle("api").await;
        sidebar.toggle("api").await;
        sidebar.toggle("api").await;

        assert_eq!(source.contents_calls(&repo_a(), "api"), 1);
        let listing = sidebar.listing("api").unwrap();
        assert!(listing.expanded);
        assert_eq!(listing.status, LoadStatus::Loaded);
    }

    #[tokio::test]
    async fn test_failed_listing_is_reported() {
        let (source, _selection, sidebar) = setup();
        source.fail_path(&repo_a(), "", 500);

        sidebar.load_root().await;

        let listing = sidebar.listing("").unwrap();
        assert!(matches!(listing.status, LoadStatus::Failed(_)));
        assert!(listing.entries.is_empty());
    }

    #[tokio::test]
    async fn test_expand_to_depth() {
        let (source, _selection, sidebar) = setup();

        sidebar.expand_to_depth(1).await;

        assert_eq!(source.contents_calls(&repo_a(), "api"), 1);
        assert_eq!(source.contents_calls(&repo_a(), "guides"), 1);
        assert_eq!(source.contents_calls(&repo_a(), "guides/setup"), 0);

        sidebar.expand_to_depth(2).await;
        assert_eq!(source.contents_calls(&repo_a(), "guides/setup"), 1);
        assert_eq!(source.contents_calls(&repo_a(), ""), 1);
    }
}
