// src/markdown/toc.rs
// =============================================================================
// Builds the "On this page" outline from a Markdown document.
//
// Only level 2 (##) and level 3 (###) headings are indexed. The scan is
// line based on purpose: a heading is a line that starts with exactly ## or
// ### followed by whitespace and some text.
//
// Every entry gets an anchor id:
//   "Getting Started"  -> getting-started
//   "Setup" (2nd time) -> setup-1
//   "Setup" (3rd time) -> setup-2
//
// The renderer takes its heading ids from locate_toc, keyed by the byte
// offset of the heading line, so a rendered anchor always carries the id its
// TOC entry links to. A `##` line that does not render as a heading (inside
// a fenced code block, say) still gets an entry and still consumes its
// duplicate suffix; it just has no anchor to land on.
// =============================================================================

use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::OnceLock;

/// One entry in the table of contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocEntry {
    /// 2 for `##`, 3 for `###`
    pub level: u8,
    /// Heading text, trimmed, markup left as written
    pub text: String,
    /// Anchor id, unique within the document
    pub id: String,
}

// `#{2,3}` followed by at least one space/tab. `.` never crosses a newline,
// so the text is always the rest of one line.
fn heading_regex() -> &'static Regex {
    static HEADING: OnceLock<Regex> = OnceLock::new();
    HEADING.get_or_init(|| Regex::new(r"(?m)^(#{2,3})[ \t]+(.+)$").expect("valid heading regex"))
}

/// Extracts `##` / `###` headings in document order.
pub fn extract_toc(markdown: &str) -> Vec<TocEntry> {
    locate_toc(markdown).into_iter().map(|(_, entry)| entry).collect()
}

// Same entries as extract_toc, each paired with the byte offset where its
// heading line starts
pub(super) fn locate_toc(markdown: &str) -> Vec<(usize, TocEntry)> {
    let mut slugger = Slugger::default();

    heading_regex()
        .captures_iter(markdown)
        .filter_map(|caps| {
            let start = caps.get(0)?.start();
            let level = caps[1].len() as u8;
            let text = caps[2].trim();
            if text.is_empty() {
                return None;
            }
            let entry = TocEntry {
                level,
                text: text.to_string(),
                id: slugger.unique(text),
            };
            Some((start, entry))
        })
        .collect()
}

// Turns heading text into an anchor id
//
// Steps (in this order):
//   1. lowercase and trim
//   2. whitespace becomes '-'
//   3. anything that is not [a-z0-9_-] is dropped
//   4. runs of '-' collapse to one
//
// Example: "Hello, World! " -> "hello-world"
pub fn slugify(text: &str) -> String {
    let lowered = text.to_lowercase();
    let mut slug = String::with_capacity(lowered.len());

    for c in lowered.trim().chars() {
        let c = if c.is_whitespace() { '-' } else { c };
        if c == '-' {
            if !slug.ends_with('-') {
                slug.push('-');
            }
        } else if c.is_ascii_alphanumeric() || c == '_' {
            slug.push(c);
        }
    }

    slug
}

/// Hands out unique ids for a single document.
///
/// The first time a slug is seen it is returned as is; the Nth time it comes
/// back as `<slug>-<N-1>`.
///
/// Suffixed ids are not checked against bare slugs: "Setup", "Setup",
/// "Setup 1" yields `setup`, `setup-1`, `setup-1`.
#[derive(Debug, Default)]
pub struct Slugger {
    seen: HashMap<String, usize>,
}

impl Slugger {
    pub fn unique(&mut self, text: &str) -> String {
        let base = slugify(text);
        let count = self.seen.entry(base.clone()).or_insert(0);
        *count += 1;
        if *count == 1 {
            base
        } else {
            format!("{}-{}", base, *count - 1)
        }
    }
}
