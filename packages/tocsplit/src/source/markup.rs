//! Markup documents: one or more XHTML parts in reading order.

use std::sync::LazyLock;

use regex::Regex;
use roxmltree::Node;

use crate::error::Result;
use crate::types::{Block, Run};
use crate::xml::{find_child, get_tag_name, get_text, parse_document, replace_html_entities};

/// Elements that delimit content blocks.
pub const BLOCK_TAGS: &[&str] = &[
    "p",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "li",
    "blockquote",
    "pre",
    "div",
    "dt",
    "dd",
    "td",
    "th",
    "figcaption",
];

/// Elements whose text is never document content.
const SKIPPED_TAGS: &[&str] = &["script", "style", "head"];

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// One XHTML document of a markup source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupPart {
    /// Path of the part inside its container, or the file name.
    pub href: String,
    /// Serialized content with HTML entities already made XML-safe.
    pub content: String,
}

impl MarkupPart {
    /// Create a part, rewriting named HTML entities so it parses as XML.
    #[must_use]
    pub fn new(href: impl Into<String>, content: &str) -> Self {
        Self {
            href: href.into(),
            content: replace_html_entities(content).into_owned(),
        }
    }
}

/// A markup document. Positions are byte offsets into the concatenation of
/// all part contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkupDocument {
    pub title: Option<String>,
    pub creator: Option<String>,
    pub language: Option<String>,
    pub parts: Vec<MarkupPart>,
}

impl MarkupDocument {
    /// Single-part document, typically a standalone `.xhtml` file.
    #[must_use]
    pub fn single(href: impl Into<String>, content: &str) -> Self {
        let part = MarkupPart::new(href, content);
        let title = document_title(&part.content);
        Self {
            title,
            parts: vec![part],
            ..Self::default()
        }
    }

    /// Total length of all parts in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parts.iter().map(|p| p.content.len()).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Parts paired with the global offset of their first byte.
    pub fn parts_with_offsets(&self) -> impl Iterator<Item = (usize, &MarkupPart)> + '_ {
        self.parts.iter().scan(0usize, |offset, part| {
            let start = *offset;
            *offset += part.content.len();
            Some((start, part))
        })
    }

    /// Leaf block elements of every part, in reading order.
    ///
    /// A part that fails to parse contributes no blocks.
    #[must_use]
    pub fn blocks(&self) -> Vec<Block> {
        let mut blocks = Vec::new();
        for (offset, part) in self.parts_with_offsets() {
            match extract_blocks(&part.content, offset) {
                Ok(found) => blocks.extend(found),
                Err(e) => {
                    tracing::warn!(href = %part.href, error = %e, "skipping unparseable part");
                }
            }
        }
        blocks
    }
}

/// Text of `<head><title>`, if present and non-empty.
fn document_title(content: &str) -> Option<String> {
    let doc = parse_document(content).ok()?;
    let head = find_child(doc.root_element(), "head")?;
    let title = get_text(find_child(head, "title")?);
    (!title.is_empty()).then_some(title)
}

/// True for elements that delimit blocks.
pub fn is_block_element(node: Node<'_, '_>) -> bool {
    node.is_element() && BLOCK_TAGS.contains(&get_tag_name(node))
}

/// True when no descendant of `node` is itself a block element.
pub fn is_leaf_block(node: Node<'_, '_>) -> bool {
    !node.descendants().skip(1).any(is_block_element)
}

/// The `<body>` element, or the root when there is none.
pub fn content_root<'a, 'input>(doc: &'a roxmltree::Document<'input>) -> Node<'a, 'input> {
    doc.root_element()
        .descendants()
        .find(|n| n.is_element() && get_tag_name(*n) == "body")
        .unwrap_or_else(|| doc.root_element())
}

/// True when the node sits inside `<script>`, `<style>` or `<head>`.
fn in_skipped_element(node: Node<'_, '_>) -> bool {
    node.ancestors()
        .any(|a| a.is_element() && SKIPPED_TAGS.contains(&get_tag_name(a)))
}

fn extract_blocks(content: &str, offset: usize) -> Result<Vec<Block>> {
    let doc = parse_document(content)?;
    let root = content_root(&doc);

    let blocks = root
        .descendants()
        .filter(|n| is_block_element(*n) && is_leaf_block(*n) && !in_skipped_element(*n))
        .filter_map(|node| {
            let runs = block_runs(node);
            if runs.is_empty() {
                return None;
            }
            Some(Block::new(
                offset + node.range().start,
                Some(get_tag_name(node).to_string()),
                runs,
            ))
        })
        .collect();

    Ok(blocks)
}

/// Inline formatting in effect for a text node inside `block`.
fn inline_format(text: Node<'_, '_>, block: Node<'_, '_>) -> (bool, bool, bool) {
    let (mut bold, mut italic, mut underline) = (false, false, false);
    for ancestor in text.ancestors().take_while(|a| *a != block) {
        match get_tag_name(ancestor) {
            "b" | "strong" => bold = true,
            "i" | "em" => italic = true,
            "u" => underline = true,
            _ => {}
        }
    }
    (bold, italic, underline)
}

/// Formatted runs of a block with whitespace collapsed and the ends trimmed.
///
/// Adjacent text with the same formatting merges into one run.
pub fn block_runs(block: Node<'_, '_>) -> Vec<Run> {
    let mut runs: Vec<Run> = Vec::new();

    for node in block.descendants().filter(|n| n.is_text()) {
        let raw = node.text().unwrap_or_default();
        let mut text = WHITESPACE_RUN.replace_all(raw, " ").into_owned();
        if text.is_empty() {
            continue;
        }
        let (bold, italic, underline) = inline_format(node, block);

        let previous_ends_with_space = runs.last().map_or(true, |r| r.text.ends_with(' '));
        if previous_ends_with_space && text.starts_with(' ') {
            text.remove(0);
            if text.is_empty() {
                continue;
            }
        }

        match runs.last_mut() {
            Some(last)
                if last.bold == bold && last.italic == italic && last.underline == underline =>
            {
                last.text.push_str(&text);
            }
            _ => runs.push(
                Run::plain(text)
                    .bold(bold)
                    .italic(italic)
                    .underline(underline),
            ),
        }
    }

    if let Some(last) = runs.last_mut() {
        let trimmed_len = last.text.trim_end().len();
        last.text.truncate(trimmed_len);
    }
    runs.retain(|r| !r.text.is_empty());
    runs
}
