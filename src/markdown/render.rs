// src/markdown/render.rs
// =============================================================================
// Renders a Markdown document to HTML.
//
// We use the `pulldown-cmark` crate which:
// - Parses Markdown into events (heading, paragraph, code block, etc.)
// - Follows the CommonMark specification, plus GitHub extensions
//   (tables, strikethrough, task lists, footnotes)
//
// We sit between the parser and the HTML writer to do two things:
// 1. Give every ## / ### heading an id="" that matches the table of contents
// 2. Hand fenced code blocks to a pluggable CodeBlockTransformer, so callers
//    can swap in their own highlighting
// =============================================================================

use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, HeadingLevel, Options, Parser, Tag};
use std::collections::HashMap;

use super::toc::locate_toc;

/// Hook for code blocks.
///
/// Return `Some(html)` to replace the block entirely, or `None` to let
/// pulldown-cmark render its usual `<pre><code>`.
pub trait CodeBlockTransformer {
    fn transform(&self, language: Option<&str>, code: &str) -> Option<String>;
}

/// Leaves every block to the default renderer.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainCodeBlocks;

impl CodeBlockTransformer for PlainCodeBlocks {
    fn transform(&self, _language: Option<&str>, _code: &str) -> Option<String> {
        None
    }
}

/// Wraps blocks that name a language in a container a highlighter (or a
/// stylesheet) can pick up. Blocks without a language are left alone.
#[derive(Debug, Default, Clone, Copy)]
pub struct LanguageTagged;

impl CodeBlockTransformer for LanguageTagged {
    fn transform(&self, language: Option<&str>, code: &str) -> Option<String> {
        // Only the leading word characters count, "rust,ignore" -> "rust"
        let lang: String = language?
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
            .collect();
        if lang.is_empty() {
            return None;
        }

        // Let pulldown-cmark do the escaping by rendering a lone Text event
        let mut escaped = String::new();
        let body = code.strip_suffix('\n').unwrap_or(code);
        html::push_html(&mut escaped, std::iter::once(Event::Text(CowStr::Borrowed(body))));

        Some(format!(
            "<div class=\"code-block\" data-language=\"{lang}\"><pre><code class=\"language-{lang}\">{escaped}</code></pre></div>\n"
        ))
    }
}

// A code block held back until its End event, so the transformer can see it
// whole
struct PendingCode<'a> {
    language: Option<String>,
    code: String,
    events: Vec<Event<'a>>,
}

fn markdown_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_FOOTNOTES);
    options
}

/// Renders `markdown` to an HTML fragment.
///
/// An h2/h3 heading gets the id of the TOC entry scanned from the same source
/// line. Headings with no such entry (blank, indented, setext, inside a
/// blockquote) get no id.
pub fn render_markdown(markdown: &str, transformer: &dyn CodeBlockTransformer) -> String {
    let ids: HashMap<usize, String> = locate_toc(markdown)
        .into_iter()
        .map(|(start, entry)| (start, entry.id))
        .collect();

    let mut out: Vec<Event> = Vec::new();
    let mut pending: Option<PendingCode> = None;
    let mut open_heading: Option<&'static str> = None;

    for (event, range) in Parser::new_ext(markdown, markdown_options()).into_offset_iter() {
        if let Some(mut block) = pending.take() {
            if let Event::End(Tag::CodeBlock(_)) = event {
                match transformer.transform(block.language.as_deref(), &block.code) {
                    Some(replacement) => out.push(Event::Html(replacement.into())),
                    None => {
                        out.extend(block.events);
                        out.push(event);
                    }
                }
            } else {
                if let Event::Text(t) = &event {
                    block.code.push_str(t);
                }
                block.events.push(event);
                pending = Some(block);
            }
            continue;
        }

        match event {
            Event::Start(Tag::Heading(level, _, _))
                if matches!(level, HeadingLevel::H2 | HeadingLevel::H3) =>
            {
                let tag = if level == HeadingLevel::H2 { "h2" } else { "h3" };
                let open = match ids.get(&range.start) {
                    Some(id) => format!("<{} id=\"{}\">", tag, id),
                    None => format!("<{}>", tag),
                };
                out.push(Event::Html(open.into()));
                open_heading = Some(tag);
            }
            end @ Event::End(Tag::Heading(..)) => match open_heading.take() {
                Some(tag) => out.push(Event::Html(format!("</{}>\n", tag).into())),
                None => out.push(end),
            },
            Event::Start(Tag::CodeBlock(kind)) => {
                let language = match &kind {
                    CodeBlockKind::Fenced(info) => info
                        .split_whitespace()
                        .next()
                        .map(|word| word.to_string()),
                    CodeBlockKind::Indented => None,
                };
                pending = Some(PendingCode {
                    language,
                    code: String::new(),
                    events: vec![Event::Start(Tag::CodeBlock(kind))],
                });
            }
            other => out.push(other),
        }
    }

    let mut rendered = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut rendered, out.into_iter());
    rendered
}
