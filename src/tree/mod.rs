// src/tree/mod.rs
// =============================================================================
// The repository tree shown in the sidebar.
//
// - listing: one directory request, filtered and sorted
// - state:   the node arena and its expand/collapse state machine (no I/O)
// - sidebar: runs the fetches TreeState asks for, drops stale results
// =============================================================================

mod listing;
mod sidebar;
mod state;

pub use sidebar::Sidebar;
pub use state::{LoadStatus, TreeRow, ROOT};
