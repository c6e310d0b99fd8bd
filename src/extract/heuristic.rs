//! Main-body text extraction for article pages.
//!
//! Navigation chrome, forms, scripts, and comment threads are pruned from the parsed page first.
//! `readability` then scores what is left and returns the markup of its top candidate, which is
//! rendered to text block by block so paragraphs keep their word spacing.

use scraper::{ElementRef, Html, Node, Selector};
use std::io::Cursor;
use url::Url;

const BLOCK_SELECTOR: &str = "p, h1, h2, h3, h4, h5, h6, li, pre, blockquote";

const BLOCK_TAGS: &[&str] = &[
    "p",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "li",
    "pre",
    "blockquote",
];

const EXCLUDED_TAGS: &[&str] = &[
    "head", "nav", "header", "footer", "aside", "form", "script", "style", "noscript",
    "template", "iframe", "svg", "button",
];

/// Markers in `id`/`class` attributes that identify comment threads.
const COMMENT_MARKERS: &[&str] = &["comment", "disqus", "respond", "discussion"];

/// Document-level elements whose classes often mention comments without being a thread.
const STRUCTURAL_TAGS: &[&str] = &["html", "body"];

/// Extract the main article text from a raw page, or `None` when nothing usable remains.
///
/// `url` is the page location; readability resolves relative links against it.
pub fn extract_main_text(raw: &str, url: &Url) -> Option<String> {
    if !looks_like_html(raw) {
        return plain_text(raw);
    }

    let pruned = prune_page(raw);
    let mut reader = Cursor::new(pruned.into_bytes());
    let product = match readability::extractor::extract(&mut reader, url) {
        Ok(product) => product,
        Err(error) => {
            tracing::debug!(url = %url, error = ?error, "Readability could not score page");
            return None;
        }
    };

    render_text(&product.content)
}

/// Accept a non-HTML body as text unless it carries decoding damage or binary control bytes.
pub fn plain_text(raw: &str) -> Option<String> {
    if raw.chars().any(is_binary_marker) {
        return None;
    }
    let lines: Vec<String> = raw
        .lines()
        .map(collapse_whitespace)
        .filter(|line| !line.is_empty())
        .collect();
    non_empty(lines.join("\n"))
}

fn is_binary_marker(c: char) -> bool {
    c == char::REPLACEMENT_CHARACTER || (c.is_control() && !c.is_whitespace())
}

fn looks_like_html(raw: &str) -> bool {
    let head = raw.trim_start();
    head.starts_with('<') || head.contains("<html") || head.contains("<body")
}

/// Serialize the page with chrome and comment subtrees detached.
fn prune_page(raw: &str) -> String {
    let mut document = Html::parse_document(raw);
    let excluded: Vec<_> = document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|element| is_excluded(element))
        .map(|element| element.id())
        .collect();

    for id in excluded {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }
    document.html()
}

fn render_text(content: &str) -> Option<String> {
    let fragment = Html::parse_fragment(content);
    let root = fragment.root_element();

    let blocks = collect_blocks(root);
    if !blocks.is_empty() {
        return non_empty(blocks.join("\n\n"));
    }

    non_empty(collapse_whitespace(&loose_text(root)))
}

fn collect_blocks(root: ElementRef<'_>) -> Vec<String> {
    let Ok(selector) = Selector::parse(BLOCK_SELECTOR) else {
        return Vec::new();
    };

    root.select(&selector)
        .filter(|element| !has_block_ancestor_within(element, root))
        .map(|element| collapse_whitespace(&loose_text(element)))
        .filter(|text| !text.is_empty())
        .collect()
}

fn loose_text(root: ElementRef<'_>) -> String {
    let mut out = String::new();
    for node in root.descendants() {
        if let Node::Text(text) = node.value() {
            out.push_str(text);
            out.push(' ');
        }
    }
    out
}

fn has_block_ancestor_within(element: &ElementRef<'_>, root: ElementRef<'_>) -> bool {
    element
        .ancestors()
        .take_while(|ancestor| ancestor.id() != root.id())
        .filter_map(ElementRef::wrap)
        .any(|ancestor| BLOCK_TAGS.contains(&ancestor.value().name()))
}

fn is_excluded(element: &ElementRef<'_>) -> bool {
    let value = element.value();
    if EXCLUDED_TAGS.contains(&value.name()) {
        return true;
    }
    if STRUCTURAL_TAGS.contains(&value.name()) {
        return false;
    }
    value
        .id()
        .into_iter()
        .chain(value.classes())
        .any(is_comment_marker)
}

fn is_comment_marker(token: &str) -> bool {
    let token = token.to_ascii_lowercase();
    COMMENT_MARKERS.iter().any(|marker| token.contains(marker))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn non_empty(text: String) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
