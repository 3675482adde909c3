//! Content processor for fetched pages
//!
//! This module turns raw HTML into clean plain text and splits it into
//! bounded chunks, the unit of embedding and indexing:
//! - Visible-text extraction (script/style/noscript dropped)
//! - Whitespace and punctuation normalization
//! - Deterministic chunking with a minimum-length filter

mod chunker;

pub use chunker::{chunk_page, chunk_text, ContentChunk};

use scraper::{Html, Node};

/// Elements whose text content is never visible page content.
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Extracts the visible text of an HTML document.
///
/// Walks the parsed tree collecting text nodes in document order, skipping
/// non-content elements, and hands the result to [`clean_text`].
pub fn extract_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut out = String::new();

    let mut stack = vec![document.tree.root()];
    while let Some(node) = stack.pop() {
        match node.value() {
            Node::Text(text) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    if !out.is_empty() {
                        out.push('\n');
                    }
                    out.push_str(trimmed);
                }
            }
            Node::Element(element) if SKIPPED_ELEMENTS.contains(&element.name()) => {
                continue;
            }
            _ => {}
        }

        // Reverse so the leftmost child is popped first (document order).
        let children: Vec<_> = node.children().collect();
        stack.extend(children.into_iter().rev());
    }

    clean_text(&out)
}

/// Normalizes whitespace and punctuation in extracted text.
///
/// Collapses whitespace runs to single spaces, collapses repeated periods
/// and commas, and removes space before closing punctuation.
pub fn clean_text(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");

    let mut out = String::with_capacity(collapsed.len());
    let mut chars = collapsed.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '.' | ',' => {
                if out.ends_with(' ') {
                    out.pop();
                }
                out.push(c);
                // Swallow repeats of the same mark.
                while chars.peek() == Some(&c) {
                    chars.next();
                }
            }
            ';' | ':' | '!' | '?' => {
                if out.ends_with(' ') {
                    out.pop();
                }
                out.push(c);
            }
            _ => out.push(c),
        }
    }

    out
}
