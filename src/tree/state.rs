// src/tree/state.rs
// =============================================================================
// The sidebar tree as plain data: no I/O, no async.
//
// Nodes live in a HashMap keyed by directory path ("" is the root), so the
// depth of the repository never turns into call-stack depth. Each node runs
// a small state machine:
//
//   Idle --expand--> Loading --complete--> Loaded | Failed
//
// Anything that needs the network hands back a LoadTicket. The caller does
// the fetch and passes the ticket back to complete(), which drops the result
// if the repository changed in the meantime (different repo or generation).
//
// Cached children survive collapse. Only reset() (a repository switch)
// throws them away.
// =============================================================================

use serde::Serialize;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

use super::listing::EntryView;
use crate::error::ResolveError;
use crate::github::{ContentEntry, RepositoryRef};
use crate::nav::RepoSnapshot;

/// Path of the repository root node.
pub const ROOT: &str = "";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "error", rename_all = "snake_case")]
pub enum LoadStatus {
    Idle,
    Loading,
    Loaded,
    Failed(ResolveError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub path: String,
    pub expanded: bool,
    pub status: LoadStatus,
    /// Sorted, filtered listing. None until a load succeeds.
    pub children: Option<Vec<ContentEntry>>,
}

impl TreeNode {
    fn new(path: &str, expanded: bool) -> Self {
        Self {
            path: path.to_string(),
            expanded,
            status: LoadStatus::Idle,
            children: None,
        }
    }

    fn needs_load(&self) -> bool {
        self.children.is_none() && self.status != LoadStatus::Loading
    }

    // Directories and Markdown files; other files are never shown
    fn visible_children(&self) -> impl DoubleEndedIterator<Item = &ContentEntry> + '_ {
        self.children
            .iter()
            .flatten()
            .filter(|entry| entry.is_directory() || entry.is_markdown())
    }
}

/// A directory listing the caller still has to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub repo: RepositoryRef,
    pub generation: u64,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// Result stored. Carries listings that should be fetched next
    /// (directories pre-expanded because the active path is inside them).
    Applied(Vec<LoadTicket>),
    /// The ticket belongs to an older repository selection; nothing changed.
    Stale,
}

/// One directory as the presentation layer sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryListing {
    pub path: String,
    pub expanded: bool,
    pub status: LoadStatus,
    pub entries: Vec<EntryView>,
}

/// One visible line of the flattened tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeRow {
    /// 0 for children of the root
    pub depth: usize,
    #[serde(flatten)]
    pub entry: EntryView,
    pub expanded: bool,
    /// Load status for directories that have a node, None otherwise
    pub status: Option<LoadStatus>,
}

#[derive(Debug)]
pub struct TreeState {
    repo: RepositoryRef,
    generation: u64,
    active_path: String,
    nodes: HashMap<String, TreeNode>,
}

impl TreeState {
    pub fn new(snapshot: &RepoSnapshot) -> Self {
        Self {
            repo: snapshot.repo.clone(),
            generation: snapshot.generation,
            active_path: String::new(),
            nodes: HashMap::new(),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Forgets every node and starts over for another repository.
    pub fn reset(&mut self, snapshot: &RepoSnapshot) {
        self.repo = snapshot.repo.clone();
        self.generation = snapshot.generation;
        self.nodes.clear();
    }

    /// Directories created from now on start expanded if this path is inside
    /// them. Nodes that already exist keep their state.
    pub fn set_active_path(&mut self, path: &str) {
        self.active_path = path.trim_matches('/').to_string();
    }

    #[cfg(test)]
    pub fn node(&self, path: &str) -> Option<&TreeNode> {
        self.nodes.get(path)
    }

    /// Expands the root and asks for its listing unless it is already loaded
    /// or on its way.
    pub fn start_root(&mut self) -> Option<LoadTicket> {
        if !self.repo.is_set() {
            return None;
        }

        let root = self
            .nodes
            .entry(ROOT.to_string())
            .or_insert_with(|| TreeNode::new(ROOT, true));
        root.expanded = true;
        if !root.needs_load() {
            return None;
        }
        root.status = LoadStatus::Loading;
        Some(self.ticket(ROOT))
    }

    /// Expands a collapsed directory or collapses an expanded one.
    ///
    /// Returns a ticket only when expanding a directory that has no cached
    /// children and no load in flight. Unknown paths and the root are ignored.
    pub fn toggle(&mut self, path: &str) -> Option<LoadTicket> {
        if path == ROOT {
            return None;
        }
        let node = self.nodes.get_mut(path)?;

        if node.expanded {
            node.expanded = false;
            return None;
        }

        node.expanded = true;
        if !node.needs_load() {
            return None;
        }
        node.status = LoadStatus::Loading;
        Some(self.ticket(path))
    }

    /// Stores the outcome of a listing fetch.
    pub fn complete(
        &mut self,
        ticket: &LoadTicket,
        result: Result<Vec<ContentEntry>, ResolveError>,
    ) -> Completion {
        if ticket.repo != self.repo || ticket.generation != self.generation {
            return Completion::Stale;
        }
        let Some(node) = self.nodes.get_mut(&ticket.path) else {
            return Completion::Stale;
        };
        if node.status != LoadStatus::Loading {
            return Completion::Stale;
        }

        let children = match result {
            Ok(children) => children,
            Err(error) => {
                node.status = LoadStatus::Failed(error);
                node.children = None;
                return Completion::Applied(Vec::new());
            }
        };

        let directories: Vec<String> = children
            .iter()
            .filter(|entry| entry.is_directory())
            .map(|entry| entry.path.clone())
            .collect();
        node.status = LoadStatus::Loaded;
        node.children = Some(children);

        let mut follow_up = Vec::new();
        for dir in directories {
            if let Entry::Vacant(slot) = self.nodes.entry(dir.clone()) {
                let on_active_path = self.active_path.starts_with(&format!("{}/", dir));
                let mut node = TreeNode::new(&dir, on_active_path);
                if on_active_path {
                    node.status = LoadStatus::Loading;
                    follow_up.push(LoadTicket {
                        repo: self.repo.clone(),
                        generation: self.generation,
                        path: dir,
                    });
                }
                slot.insert(node);
            }
        }
        Completion::Applied(follow_up)
    }

    /// Expands every known directory at most `max_depth` levels below the
    /// root, and returns tickets for the ones never loaded.
    ///
    /// Failed directories are left alone so repeated calls always settle.
    pub fn expand_within(&mut self, max_depth: usize) -> Vec<LoadTicket> {
        let mut tickets = Vec::new();
        for node in self.nodes.values_mut() {
            if node.path == ROOT || path_depth(&node.path) > max_depth {
                continue;
            }
            match node.status {
                LoadStatus::Loaded => node.expanded = true,
                LoadStatus::Idle => {
                    node.expanded = true;
                    node.status = LoadStatus::Loading;
                    tickets.push(LoadTicket {
                        repo: self.repo.clone(),
                        generation: self.generation,
                        path: node.path.clone(),
                    });
                }
                LoadStatus::Loading | LoadStatus::Failed(_) => {}
            }
        }
        tickets.sort_by(|a, b| a.path.cmp(&b.path));
        tickets
    }

    pub fn listing(&self, path: &str) -> Option<DirectoryListing> {
        let node = self.nodes.get(path)?;
        Some(DirectoryListing {
            path: node.path.clone(),
            expanded: node.expanded,
            status: node.status.clone(),
            entries: node.children.iter().flatten().map(EntryView::from).collect(),
        })
    }

    /// Flattens the expanded part of the tree, depth first, in display order.
    pub fn rows(&self) -> Vec<TreeRow> {
        let mut rows = Vec::new();
        let Some(root) = self.nodes.get(ROOT) else {
            return rows;
        };

        // Explicit stack; pushed in reverse so pops come out in order
        let mut stack: Vec<(usize, &ContentEntry)> =
            root.visible_children().rev().map(|entry| (0, entry)).collect();

        while let Some((depth, entry)) = stack.pop() {
            let node = if entry.is_directory() {
                self.nodes.get(&entry.path)
            } else {
                None
            };

            rows.push(TreeRow {
                depth,
                entry: EntryView::from(entry),
                expanded: node.map_or(false, |n| n.expanded),
                status: node.map(|n| n.status.clone()),
            });

            if let Some(node) = node.filter(|n| n.expanded) {
                stack.extend(node.visible_children().rev().map(|child| (depth + 1, child)));
            }
        }
        rows
    }

    fn ticket(&self, path: &str) -> LoadTicket {
        LoadTicket {
            repo: self.repo.clone(),
            generation: self.generation,
            path: path.to_string(),
        }
    }
}

// "guides" -> 1, "guides/setup" -> 2
fn path_depth(path: &str) -> usize {
    path.split('/').count()
}
