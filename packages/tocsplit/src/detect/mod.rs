//! Heading detection for paragraph streams and markup documents.
//!
//! Detection never fails: unknown style names, malformed parts and
//! unmatched elements simply produce no entries.

mod rules;
mod text;

use std::collections::HashSet;

use roxmltree::{Node, NodeId};

use crate::classify::HeadingClassifier;
use crate::source::markup::{content_root, is_leaf_block};
use crate::source::{MarkupDocument, ParagraphDocument, SourceDocument};
use crate::types::{DetectionMethod, TocEntry};
use crate::xml::{collect_text, get_tag_name, parse_document};

pub use rules::{
    default_heuristic_rules, default_selector_groups, HeuristicRule, Selector, SelectorGroup,
};
pub use text::{clean_heading_text, collapse_whitespace};

/// Elements considered by heuristic detection.
const HEURISTIC_TAGS: &[&str] = &["p", "div", "span"];

/// Heading elements whose text titles an enclosing container match.
const HEADING_TAGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

/// Detects headings in a source document.
///
/// Entries come back ordered by `source_position`.
#[derive(Debug, Clone)]
pub struct StructureDetector {
    classifier: HeadingClassifier,
    selector_groups: Vec<SelectorGroup>,
    heuristic_rules: Vec<HeuristicRule>,
}

impl Default for StructureDetector {
    fn default() -> Self {
        Self::new(HeadingClassifier::default())
    }
}

impl StructureDetector {
    /// Detector with the default selectors and heuristics.
    #[must_use]
    pub fn new(classifier: HeadingClassifier) -> Self {
        Self {
            classifier,
            selector_groups: default_selector_groups(),
            heuristic_rules: default_heuristic_rules(),
        }
    }

    /// Replace the structural selector groups.
    #[must_use]
    pub fn with_selector_groups(mut self, groups: Vec<SelectorGroup>) -> Self {
        self.selector_groups = groups;
        self
    }

    /// Replace the heuristic rules.
    #[must_use]
    pub fn with_heuristic_rules(mut self, rules: Vec<HeuristicRule>) -> Self {
        self.heuristic_rules = rules;
        self
    }

    /// Detect headings in either document shape.
    pub fn detect(&self, document: &SourceDocument) -> Vec<TocEntry> {
        match document {
            SourceDocument::Paragraphs(doc) => self.detect_paragraphs(doc),
            SourceDocument::Markup(doc) => self.detect_markup(doc),
        }
    }

    /// One entry per non-empty paragraph whose style classifies to a level.
    pub fn detect_paragraphs(&self, document: &ParagraphDocument) -> Vec<TocEntry> {
        let levels = self.classifier.detect_heading_styles(document.used_styles());

        let entries: Vec<TocEntry> = document
            .paragraphs
            .iter()
            .enumerate()
            .filter_map(|(index, paragraph)| {
                let level = *levels.get(&paragraph.style)?;
                let text = collapse_whitespace(&paragraph.text());
                if text.is_empty() {
                    return None;
                }
                Some(TocEntry::new(text, level, index, DetectionMethod::StyleName))
            })
            .collect();

        tracing::debug!(
            paragraphs = document.len(),
            heading_styles = levels.len(),
            entries = entries.len(),
            "detected paragraph headings"
        );
        entries
    }

    /// Structural and heuristic headings across all parts, by byte offset.
    pub fn detect_markup(&self, document: &MarkupDocument) -> Vec<TocEntry> {
        let mut entries = Vec::new();

        for (offset, part) in document.parts_with_offsets() {
            let doc = match parse_document(&part.content) {
                Ok(doc) => doc,
                Err(e) => {
                    tracing::warn!(href = %part.href, error = %e, "skipping unparseable part");
                    continue;
                }
            };
            let root = content_root(&doc);

            let mut matched = HashSet::new();
            let structural = self.structural_entries(root, offset, &mut matched);
            let heuristic = self.heuristic_entries(root, offset, &matched);

            tracing::debug!(
                href = %part.href,
                structural = structural.len(),
                heuristic = heuristic.len(),
                "detected markup headings"
            );

            let mut part_entries = structural;
            part_entries.extend(heuristic);
            part_entries.sort_by_key(|e| e.source_position);
            entries.extend(
                part_entries
                    .into_iter()
                    .map(|entry| entry.with_source_href(part.href.as_str())),
            );
        }

        entries
    }

    /// First matching selector group wins per element.
    ///
    /// A container match (`div.chapter`) takes its title from its first
    /// heading element, which then yields no entry of its own.
    fn structural_entries(
        &self,
        root: Node<'_, '_>,
        offset: usize,
        matched: &mut HashSet<NodeId>,
    ) -> Vec<TocEntry> {
        let mut entries = Vec::new();

        for node in root.descendants().filter(Node::is_element) {
            if matched.contains(&node.id()) {
                continue;
            }
            let Some(group) = self.selector_groups.iter().find(|g| g.matches(node)) else {
                continue;
            };
            matched.insert(node.id());

            let title_node = if HEADING_TAGS.contains(&get_tag_name(node)) {
                node
            } else {
                match node
                    .descendants()
                    .skip(1)
                    .find(|n| n.is_element() && HEADING_TAGS.contains(&get_tag_name(*n)))
                {
                    Some(heading) => {
                        matched.insert(heading.id());
                        heading
                    }
                    None => node,
                }
            };

            if let Some(text) = clean_heading_text(&collect_text(title_node)) {
                entries.push(TocEntry::new(
                    text,
                    group.level,
                    offset + node.range().start,
                    DetectionMethod::StructuralTag,
                ));
            }
        }

        entries
    }

    /// Leaf `p`/`div`/`span` text matched against the numbering rules.
    fn heuristic_entries(
        &self,
        root: Node<'_, '_>,
        offset: usize,
        matched: &HashSet<NodeId>,
    ) -> Vec<TocEntry> {
        root.descendants()
            .filter(|n| n.is_element() && HEURISTIC_TAGS.contains(&get_tag_name(*n)))
            .filter(|n| !matched.contains(&n.id()) && is_leaf_block(*n))
            .filter(|n| !inside_heading_or_paragraph(*n))
            .filter_map(|node| {
                let text = collapse_whitespace(&collect_text(node));
                if text.is_empty() {
                    return None;
                }
                let rule = self.heuristic_rules.iter().find(|r| r.pattern.is_match(&text))?;
                if text.chars().count() >= rule.max_length {
                    return None;
                }
                let cleaned = clean_heading_text(&text)?;
                Some(TocEntry::new(
                    cleaned,
                    rule.level,
                    offset + node.range().start,
                    DetectionMethod::HeuristicPattern,
                ))
            })
            .collect()
    }
}

/// Spans inside a paragraph or block are part of that block's text; any
/// element inside a heading belongs to the heading.
fn inside_heading_or_paragraph(node: Node<'_, '_>) -> bool {
    let is_span = get_tag_name(node) == "span";
    node.ancestors().skip(1).filter(|a| a.is_element()).any(|a| {
        let tag = get_tag_name(a);
        HEADING_TAGS.contains(&tag) || (is_span && (tag == "p" || tag == "div"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MarkupPart;
    use pretty_assertions::assert_eq;

    fn markup(body: &str) -> MarkupDocument {
        let content = format!(
            r#"<?xml version="1.0" encoding="utf-8"?><html xmlns="http://www.w3.org/1999/xhtml"><head><title>T</title></head><body>{body}</body></html>"#
        );
        MarkupDocument::single("test.xhtml", &content)
    }

    fn summary(entries: &[TocEntry]) -> Vec<(String, u32, DetectionMethod)> {
        entries
            .iter()
            .map(|e| (e.text.clone(), e.level, e.detection_method))
            .collect()
    }

    #[test]
    fn test_detect_paragraphs_by_style() {
        let doc = ParagraphDocument::from_pairs([
            ("Heading 1", "Intro"),
            ("Normal", "Body text"),
            ("Heading 2", "  Scope   and aims "),
            ("Heading 2", "   "),
            ("Title", "Next"),
        ]);
        let entries = StructureDetector::default().detect_paragraphs(&doc);

        assert_eq!(
            summary(&entries),
            vec![
                ("Intro".to_string(), 1, DetectionMethod::StyleName),
                ("Scope and aims".to_string(), 2, DetectionMethod::StyleName),
                ("Next".to_string(), 1, DetectionMethod::StyleName),
            ]
        );
        let positions: Vec<usize> = entries.iter().map(|e| e.source_position).collect();
        assert_eq!(positions, vec![0, 2, 4]);
        assert!(entries.iter().all(|e| e.source_href.is_none()));
    }

    #[test]
    fn test_detect_paragraphs_unknown_styles() {
        let doc = ParagraphDocument::from_pairs([("RandomStyle7", "x"), ("Normal", "y")]);
        assert!(StructureDetector::default().detect_paragraphs(&doc).is_empty());
    }

    #[test]
    fn test_structural_levels() {
        let doc = markup("<h1>Part One</h1><p>text</p><h2>Scope</h2><h3>Detail</h3>");
        let entries = StructureDetector::default().detect_markup(&doc);

        assert_eq!(
            summary(&entries),
            vec![
                ("Part One".to_string(), 1, DetectionMethod::StructuralTag),
                ("Scope".to_string(), 2, DetectionMethod::StructuralTag),
                ("Detail".to_string(), 3, DetectionMethod::StructuralTag),
            ]
        );
    }

    #[test]
    fn test_structural_discards_single_character() {
        let doc = markup("<h1>A</h1><h1>Real heading</h1>");
        let entries = StructureDetector::default().detect_markup(&doc);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].text, "Real heading");
    }

    #[test]
    fn test_container_takes_heading_title() {
        let doc = markup(r#"<div class="chapter"><h1>第1章はじめに</h1><p>Body</p></div>"#);
        let entries = StructureDetector::default().detect_markup(&doc);

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].text, "第1章　はじめに");
        assert_eq!(entries[0].level, 1);
        let content = &doc.parts[0].content;
        assert_eq!(entries[0].source_position, content.find("<div").unwrap());
    }

    #[test]
    fn test_section_class_is_level_two() {
        let doc = markup(r#"<div class="section">Methods used</div>"#);
        let entries = StructureDetector::default().detect_markup(&doc);
        assert_eq!(summary(&entries), vec![("Methods used".to_string(), 2, DetectionMethod::StructuralTag)]);
    }

    #[test]
    fn test_heuristic_patterns() {
        let doc = markup(
            "<p>Chapter 2 The Journey</p><p>2.1 Departure</p><p>(3) Notes</p><p>Plain paragraph.</p>",
        );
        let entries = StructureDetector::default().detect_markup(&doc);

        assert_eq!(
            summary(&entries),
            vec![
                ("Chapter 2 The Journey".to_string(), 1, DetectionMethod::HeuristicPattern),
                ("2.1 Departure".to_string(), 2, DetectionMethod::HeuristicPattern),
                ("(3) Notes".to_string(), 3, DetectionMethod::HeuristicPattern),
            ]
        );
    }

    #[test]
    fn test_heuristic_first_pattern_only() {
        // matches the chapter pattern but is too long, so no section fallback
        let long = format!("Chapter 1 mentions 1.2 {}", "x".repeat(100));
        let doc = markup(&format!("<p>{long}</p>"));
        assert!(StructureDetector::default().detect_markup(&doc).is_empty());
    }

    #[test]
    fn test_heuristic_length_limit() {
        let long = format!("1.2 {}", "y".repeat(80));
        let doc = markup(&format!("<p>{long}</p><p>1.3 Short</p>"));
        let entries = StructureDetector::default().detect_markup(&doc);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].text, "1.3 Short");
    }

    #[test]
    fn test_heuristic_skips_matched_and_nested() {
        let doc = markup(
            r#"<h2>1.1 Matched</h2><p>See <span>1.2 inline</span></p><div><p>1.4 Leaf</p></div>"#,
        );
        let entries = StructureDetector::default().detect_markup(&doc);

        // the span yields nothing of its own; its paragraph carries the match
        assert_eq!(
            summary(&entries),
            vec![
                ("1.1 Matched".to_string(), 2, DetectionMethod::StructuralTag),
                ("See 1.2 inline".to_string(), 2, DetectionMethod::HeuristicPattern),
                ("1.4 Leaf".to_string(), 2, DetectionMethod::HeuristicPattern),
            ]
        );
    }

    #[test]
    fn test_union_is_position_ordered_across_parts() {
        let first = r#"<html><body><p>Chapter 1 Start</p><h1>Second</h1></body></html>"#;
        let second = r#"<html><body><h1>Third</h1></body></html>"#;
        let doc = MarkupDocument {
            parts: vec![MarkupPart::new("a.xhtml", first), MarkupPart::new("b.xhtml", second)],
            ..MarkupDocument::default()
        };
        let entries = StructureDetector::default().detect_markup(&doc);

        let texts: Vec<&str> = entries.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["Chapter 1 Start", "Second", "Third"]);
        assert!(entries.windows(2).all(|w| w[0].source_position <= w[1].source_position));
        assert!(entries[2].source_position >= first.len());

        let hrefs: Vec<Option<&str>> = entries.iter().map(|e| e.source_href.as_deref()).collect();
        assert_eq!(hrefs, vec![Some("a.xhtml"), Some("a.xhtml"), Some("b.xhtml")]);
    }

    #[test]
    fn test_malformed_part_is_skipped() {
        let doc = MarkupDocument {
            parts: vec![
                MarkupPart::new("bad.xhtml", "<html><body><h1>Broken"),
                MarkupPart::new("good.xhtml", "<html><body><h1>Fine title</h1></body></html>"),
            ],
            ..MarkupDocument::default()
        };
        let entries = StructureDetector::default().detect_markup(&doc);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].text, "Fine title");
    }
}
