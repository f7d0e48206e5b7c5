// src/document/title.rs
// Display names derived from file names and slugs.

use crate::github::strip_markdown_ext;

/// Replaces `-` and `_` with spaces: "my_post" -> "my post".
pub fn humanize(name: &str) -> String {
    name.replace(['-', '_'], " ")
}

/// "getting-started.md" -> "getting started"
pub fn doc_title(file_name: &str) -> String {
    humanize(strip_markdown_ext(file_name))
}

/// Blog slugs carry no extension, so this is just humanize.
pub fn slug_title(slug: &str) -> String {
    humanize(slug)
}
