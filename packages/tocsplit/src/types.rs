//! Core data types: detected headings, level statistics, split ranges and
//! the block/run content model shared by loaders, materializer and writers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Which detector produced a heading entry.
///
/// Kept for diagnostics only; ordering never depends on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMethod {
    /// Matched a structural selector (`h1`, `div.chapter`, ...).
    StructuralTag,
    /// Matched a chapter/section/subsection numbering pattern.
    HeuristicPattern,
    /// Paragraph style name classified as a heading.
    StyleName,
}

impl DetectionMethod {
    /// Get the string value used in reports.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StructuralTag => "structural_tag",
            Self::HeuristicPattern => "heuristic_pattern",
            Self::StyleName => "style_name",
        }
    }
}

/// One detected heading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocEntry {
    /// Normalized heading text, never empty.
    pub text: String,

    /// Heading rank, 1 = most significant.
    pub level: u32,

    /// Locator in the source: paragraph index or byte offset.
    pub source_position: usize,

    /// Detector that produced this entry.
    pub detection_method: DetectionMethod,

    /// Full path of the nearest preceding entry with a lower level number.
    ///
    /// Filled in by [`crate::hierarchy::build_hierarchy`]; empty for roots.
    pub parent_path: String,

    /// Container part the heading was found in (EPUB spine item).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_href: Option<String>,
}

impl TocEntry {
    /// Create an entry with no parent.
    #[must_use]
    pub fn new(
        text: impl Into<String>,
        level: u32,
        source_position: usize,
        detection_method: DetectionMethod,
    ) -> Self {
        Self {
            text: text.into(),
            level,
            source_position,
            detection_method,
            parent_path: String::new(),
            source_href: None,
        }
    }

    /// Record the container part the heading came from.
    #[must_use]
    pub fn with_source_href(mut self, href: impl Into<String>) -> Self {
        self.source_href = Some(href.into());
        self
    }

    /// Hierarchical path: `parent_path/text`, or `text` for roots.
    #[must_use]
    pub fn full_path(&self) -> String {
        if self.parent_path.is_empty() {
            self.text.clone()
        } else {
            format!("{}/{}", self.parent_path, self.text)
        }
    }
}

/// Count of entries per heading level.
///
/// Always derived from an entry list, never edited by hand.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LevelStatistics {
    counts: BTreeMap<u32, usize>,
}

impl LevelStatistics {
    /// Count entries per level.
    #[must_use]
    pub fn from_entries(entries: &[TocEntry]) -> Self {
        let mut counts = BTreeMap::new();
        for entry in entries {
            *counts.entry(entry.level).or_insert(0) += 1;
        }
        Self { counts }
    }

    /// Number of entries at `level` (0 if none).
    #[must_use]
    pub fn count(&self, level: u32) -> usize {
        self.counts.get(&level).copied().unwrap_or(0)
    }

    /// Highest level number observed, 0 when empty.
    #[must_use]
    pub fn max_level(&self) -> u32 {
        self.counts.keys().next_back().copied().unwrap_or(0)
    }

    /// True when no entries were counted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Total number of entries counted.
    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Iterate `(level, count)` pairs in ascending level order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, usize)> + '_ {
        self.counts.iter().map(|(level, count)| (*level, *count))
    }
}

/// A half-open `[start, end)` span of the source with the title of the
/// heading that opened it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitRange {
    pub start: usize,
    pub end: usize,
    /// Empty for leading content and for documents without split-level headings.
    pub title: String,
}

impl SplitRange {
    #[must_use]
    pub fn new(start: usize, end: usize, title: impl Into<String>) -> Self {
        Self {
            start,
            end,
            title: title.into(),
        }
    }

    /// True when `position` falls inside the range.
    #[must_use]
    pub fn contains(&self, position: usize) -> bool {
        self.start <= position && position < self.end
    }

    /// Width of the range in source units.
    #[must_use]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A span of text with uniform inline formatting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Run {
    pub text: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub italic: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub underline: bool,
}

impl Run {
    /// Create an unformatted run.
    #[must_use]
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    #[must_use]
    pub fn italic(mut self, italic: bool) -> Self {
        self.italic = italic;
        self
    }

    #[must_use]
    pub fn underline(mut self, underline: bool) -> Self {
        self.underline = underline;
        self
    }

    /// True when the run carries any formatting.
    #[must_use]
    pub fn is_formatted(&self) -> bool {
        self.bold || self.italic || self.underline
    }
}

/// A paragraph-like unit of content.
///
/// `position` uses the same units as [`TocEntry::source_position`] for the
/// document it came from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub position: usize,
    /// Paragraph style name (DOCX) or tag name (markup).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    pub runs: Vec<Run>,
}

impl Block {
    #[must_use]
    pub fn new(position: usize, style: Option<String>, runs: Vec<Run>) -> Self {
        Self {
            position,
            style,
            runs,
        }
    }

    /// Concatenated text of all runs.
    #[must_use]
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

/// A standalone section ready for encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Title from the opening heading; empty for untitled leading content.
    pub title: String,
    pub blocks: Vec<Block>,
}

impl Section {
    #[must_use]
    pub fn new(title: impl Into<String>, blocks: Vec<Block>) -> Self {
        Self {
            title: title.into(),
            blocks,
        }
    }

    /// Plain text of every block, one entry per block.
    #[must_use]
    pub fn paragraphs(&self) -> Vec<String> {
        self.blocks.iter().map(Block::text).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_path_root() {
        let entry = TocEntry::new("Intro", 1, 0, DetectionMethod::StyleName);
        assert_eq!(entry.full_path(), "Intro");
    }

    #[test]
    fn test_full_path_with_parent() {
        let mut entry = TocEntry::new("Scope", 2, 3, DetectionMethod::StyleName);
        entry.parent_path = "Intro".to_string();
        assert_eq!(entry.full_path(), "Intro/Scope");
    }

    #[test]
    fn test_level_statistics() {
        let entries = vec![
            TocEntry::new("A", 1, 0, DetectionMethod::StructuralTag),
            TocEntry::new("B", 2, 1, DetectionMethod::StructuralTag),
            TocEntry::new("C", 2, 2, DetectionMethod::HeuristicPattern),
            TocEntry::new("D", 4, 3, DetectionMethod::HeuristicPattern),
        ];
        let stats = LevelStatistics::from_entries(&entries);

        assert_eq!(stats.count(1), 1);
        assert_eq!(stats.count(2), 2);
        assert_eq!(stats.count(3), 0);
        assert_eq!(stats.max_level(), 4);
        assert_eq!(stats.total(), 4);
    }

    #[test]
    fn test_level_statistics_empty() {
        let stats = LevelStatistics::from_entries(&[]);
        assert!(stats.is_empty());
        assert_eq!(stats.max_level(), 0);
    }

    #[test]
    fn test_split_range_contains() {
        let range = SplitRange::new(10, 20, "A");
        assert!(range.contains(10));
        assert!(range.contains(19));
        assert!(!range.contains(20));
        assert_eq!(range.len(), 10);
    }

    #[test]
    fn test_block_text() {
        let block = Block::new(
            0,
            None,
            vec![Run::plain("Hello "), Run::plain("world").bold(true)],
        );
        assert_eq!(block.text(), "Hello world");
    }
}
