// src/markdown/mod.rs
// =============================================================================
// Markdown handling for fetched documents.
//
// Submodules:
// - toc:    scans ## / ### headings into an ordered, uniquely-id'd outline
// - render: turns Markdown into HTML with matching heading anchors and a
//           pluggable code block hook
// =============================================================================

mod render;
mod toc;

pub use render::{render_markdown, CodeBlockTransformer, LanguageTagged, PlainCodeBlocks};
pub use toc::{extract_toc, TocEntry};
