// src/document/mod.rs
// =============================================================================
// Documents: resolving a path or blog slug to text, and the view that shows
// exactly one of them at a time.
//
// - title:   display titles from file names and slugs
// - resolve: resolve_doc / resolve_slug / list_posts
// - view:    DocumentView, which drops results that arrive too late
// =============================================================================

mod resolve;
mod title;
mod view;

pub use resolve::list_posts;
pub use title::humanize;
pub use view::{DocumentStatus, DocumentTarget, DocumentView, LoadedDocument, NavigateOutcome};
