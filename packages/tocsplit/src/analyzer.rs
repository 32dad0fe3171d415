//! Document analysis: detection, hierarchy, recommendation and report.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::advisor::{ChapterCountPolicy, SplitLevelPolicy};
use crate::config::PREVIEW_SUBSECTION_LIMIT;
use crate::detect::StructureDetector;
use crate::error::Result;
#[cfg(feature = "docx")]
use crate::export::{ContainerWriter, DocxWriter, ExportMetadata};
use crate::hierarchy::{build_hierarchy, HierarchySummary};
use crate::source::SourceDocument;
use crate::types::{Block, DetectionMethod, Run, Section, TocEntry};

const REPORT_TITLE: &str = "Table of contents report";

/// Deepest level listed in the per-level part of the DOCX report.
const REPORT_LEVELS: u32 = 3;

/// Owns the per-document pipeline from detection to recommendation.
///
/// Each analysis produces fresh entries; nothing is shared between runs.
#[derive(Debug, Clone)]
pub struct TocAnalyzer<P: SplitLevelPolicy = ChapterCountPolicy> {
    detector: StructureDetector,
    policy: P,
}

impl TocAnalyzer {
    /// Analyzer with the default detector and [`ChapterCountPolicy`].
    #[must_use]
    pub fn standard() -> Self {
        Self::new(StructureDetector::default(), ChapterCountPolicy::default())
    }
}

impl Default for TocAnalyzer {
    fn default() -> Self {
        Self::standard()
    }
}

impl<P: SplitLevelPolicy> TocAnalyzer<P> {
    /// Create an analyzer with a detector and split level policy.
    #[must_use]
    pub fn new(detector: StructureDetector, policy: P) -> Self {
        Self { detector, policy }
    }

    /// Detect headings, build the hierarchy and recommend a split level.
    pub fn analyze(&self, document: &SourceDocument) -> DocumentAnalysis {
        let mut entries = self.detector.detect(document);
        let summary = build_hierarchy(&mut entries);
        let recommended_split_level = self.policy.recommend(&summary.level_stats);

        tracing::debug!(
            entries = entries.len(),
            max_depth = summary.max_depth,
            recommended_split_level,
            "analyzed document"
        );

        DocumentAnalysis {
            title: document.title().map(str::to_string),
            document_length: document.len(),
            entries,
            summary,
            recommended_split_level,
        }
    }
}

/// Result of analyzing one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentAnalysis {
    pub title: Option<String>,
    pub document_length: usize,
    /// Entries ordered by position, with parent paths filled in.
    pub entries: Vec<TocEntry>,
    pub summary: HierarchySummary,
    pub recommended_split_level: u32,
}

impl DocumentAnalysis {
    /// Number of entries per detection method.
    #[must_use]
    pub fn detection_counts(&self) -> BTreeMap<DetectionMethod, usize> {
        let mut counts = BTreeMap::new();
        for entry in &self.entries {
            *counts.entry(entry.detection_method).or_insert(0) += 1;
        }
        counts
    }

    /// Sections a split at `split_level` would open, with the deeper
    /// entries folded into each.
    ///
    /// Entries before the first split-level entry are not listed.
    #[must_use]
    pub fn split_preview(&self, split_level: u32) -> Vec<PreviewSection> {
        let mut preview: Vec<PreviewSection> = Vec::new();
        let mut current: Option<(&TocEntry, Vec<&TocEntry>)> = None;

        for entry in &self.entries {
            if entry.level == split_level {
                if let Some((opening, folded)) = current.take() {
                    preview.push(PreviewSection::new(opening, &folded));
                }
                current = Some((entry, Vec::new()));
            } else if entry.level > split_level {
                if let Some((_, folded)) = current.as_mut() {
                    folded.push(entry);
                }
            }
        }
        if let Some((opening, folded)) = current {
            preview.push(PreviewSection::new(opening, &folded));
        }

        preview
    }

    /// Build the report at the recommended split level.
    #[must_use]
    pub fn report(&self) -> AnalysisReport {
        AnalysisReport {
            title: self.title.clone(),
            total_entries: self.entries.len(),
            max_depth: self.summary.max_depth,
            level_stats: self.summary.level_stats.iter().collect(),
            recommended_split_level: self.recommended_split_level,
            detection_counts: self
                .detection_counts()
                .into_iter()
                .map(|(method, count)| (method.as_str().to_string(), count))
                .collect(),
            entries: report_entries(&self.entries),
            split_preview: self.split_preview(self.recommended_split_level),
        }
    }
}

/// One section of a split preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewSection {
    pub title: String,
    /// Number of deeper entries folded into this section.
    pub subsections: usize,
    /// Titles of the first few folded entries.
    pub subsection_list: Vec<String>,
}

impl PreviewSection {
    fn new(opening: &TocEntry, folded: &[&TocEntry]) -> Self {
        Self {
            title: opening.text.clone(),
            subsections: folded.len(),
            subsection_list: folded
                .iter()
                .take(PREVIEW_SUBSECTION_LIMIT)
                .map(|e| e.text.clone())
                .collect(),
        }
    }
}

/// Entry as listed in a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub text: String,
    pub level: u32,
    pub full_path: String,
    pub detection_method: DetectionMethod,
    /// Spine item the heading was found in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_href: Option<String>,
    /// Most recent level 1 heading, for entries below level 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_level_1: Option<String>,
    /// Most recent level 2 heading since that level 1, for entries below level 2.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_level_2: Option<String>,
}

impl From<&TocEntry> for ReportEntry {
    fn from(entry: &TocEntry) -> Self {
        Self {
            text: entry.text.clone(),
            level: entry.level,
            full_path: entry.full_path(),
            detection_method: entry.detection_method,
            source_href: entry.source_href.clone(),
            parent_level_1: None,
            parent_level_2: None,
        }
    }
}

/// Report entries with their level 1 and level 2 ancestors filled in.
///
/// A level 1 heading clears the remembered level 2 heading.
fn report_entries(entries: &[TocEntry]) -> Vec<ReportEntry> {
    let mut level_1: Option<&str> = None;
    let mut level_2: Option<&str> = None;

    entries
        .iter()
        .map(|entry| {
            let mut report = ReportEntry::from(entry);
            match entry.level {
                1 => {
                    level_1 = Some(&entry.text);
                    level_2 = None;
                }
                2 => {
                    report.parent_level_1 = level_1.map(str::to_string);
                    level_2 = Some(&entry.text);
                }
                _ => {
                    report.parent_level_1 = level_1.map(str::to_string);
                    report.parent_level_2 = level_2.map(str::to_string);
                }
            }
            report
        })
        .collect()
}

fn labelled(position: usize, label: &str, value: impl Into<String>) -> Block {
    Block::new(
        position,
        Some("Normal".to_string()),
        vec![Run::plain(format!("{label}: ")).bold(true), Run::plain(value)],
    )
}

/// Serializable analysis report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub total_entries: usize,
    pub max_depth: u32,
    pub level_stats: BTreeMap<u32, usize>,
    pub recommended_split_level: u32,
    pub detection_counts: BTreeMap<String, usize>,
    pub entries: Vec<ReportEntry>,
    pub split_preview: Vec<PreviewSection>,
}

impl AnalysisReport {
    /// Serialize as a YAML document.
    pub fn to_yaml(&self) -> Result<String> {
        let yaml = serde_yaml_ng::to_string(self)?;
        Ok(format!("---\n{yaml}"))
    }

    /// Report laid out for a word processor: a summary section, then one
    /// section per populated level up to level 3.
    #[must_use]
    pub fn to_sections(&self) -> Vec<Section> {
        let mut summary = Vec::new();
        if let Some(title) = &self.title {
            summary.push(labelled(summary.len(), "Document", title.as_str()));
        }
        let generated = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        summary.push(labelled(summary.len(), "Generated", generated));
        summary.push(labelled(summary.len(), "Entries", self.total_entries.to_string()));
        for (level, count) in &self.level_stats {
            summary.push(labelled(summary.len(), &format!("Level {level} entries"), count.to_string()));
        }
        summary.push(labelled(
            summary.len(),
            "Recommended split level",
            self.recommended_split_level.to_string(),
        ));
        if !self.detection_counts.is_empty() {
            let methods: Vec<String> = self
                .detection_counts
                .iter()
                .map(|(method, count)| format!("{method} {count}"))
                .collect();
            summary.push(labelled(summary.len(), "Detection", methods.join(", ")));
        }

        let mut sections = vec![Section::new(REPORT_TITLE, summary)];
        for level in 1..=REPORT_LEVELS {
            let entries: Vec<&ReportEntry> = self.entries.iter().filter(|e| e.level == level).collect();
            if entries.is_empty() {
                continue;
            }
            let mut blocks = Vec::new();
            for entry in entries {
                blocks.push(Block::new(
                    blocks.len(),
                    Some("List Number".to_string()),
                    vec![Run::plain(entry.text.as_str()).bold(true)],
                ));

                let parents: Vec<String> = [
                    ("Parent level 1", &entry.parent_level_1),
                    ("Parent level 2", &entry.parent_level_2),
                ]
                .into_iter()
                .filter_map(|(label, parent)| parent.as_ref().map(|p| format!("{label}: {p}")))
                .collect();
                if !parents.is_empty() {
                    blocks.push(Block::new(
                        blocks.len(),
                        Some("List Bullet 2".to_string()),
                        vec![Run::plain(parents.join("\n"))],
                    ));
                }

                let mut details = Vec::new();
                if let Some(href) = &entry.source_href {
                    details.push(format!("File: {href}"));
                }
                details.push(format!("Detection: {}", entry.detection_method.as_str()));
                blocks.push(Block::new(
                    blocks.len(),
                    Some("List Bullet 3".to_string()),
                    vec![Run::plain(details.join("   "))],
                ));
            }
            sections.push(Section::new(format!("Level {level} headings"), blocks));
        }
        sections
    }

    /// Encode [`Self::to_sections`] as a `.docx` package.
    #[cfg(feature = "docx")]
    pub fn to_docx(&self) -> Result<Vec<u8>> {
        let title = match &self.title {
            Some(title) => format!("{REPORT_TITLE}: {title}"),
            None => REPORT_TITLE.to_string(),
        };
        let metadata = ExportMetadata::default().with_title(title);
        DocxWriter.encode_combined(&self.to_sections(), &metadata)
    }

    /// Render a human-readable report.
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        if let Some(title) = &self.title {
            let _ = writeln!(out, "Document: {title}");
        }
        let _ = writeln!(
            out,
            "Entries: {} (max depth {})",
            self.total_entries, self.max_depth
        );

        let _ = writeln!(out, "Level statistics:");
        if self.level_stats.is_empty() {
            let _ = writeln!(out, "  (no headings detected)");
        }
        for (level, count) in &self.level_stats {
            let _ = writeln!(out, "  Level {level}: {count}");
        }

        if !self.detection_counts.is_empty() {
            let methods: Vec<String> = self
                .detection_counts
                .iter()
                .map(|(method, count)| format!("{method} {count}"))
                .collect();
            let _ = writeln!(out, "Detection: {}", methods.join(", "));
        }

        let _ = writeln!(out, "Recommended split level: {}", self.recommended_split_level);

        if !self.split_preview.is_empty() {
            let _ = writeln!(out, "Split preview:");
            for (i, section) in self.split_preview.iter().enumerate() {
                let _ = writeln!(
                    out,
                    "  {}. {} ({} subsections)",
                    i + 1,
                    section.title,
                    section.subsections
                );
                for sub in &section.subsection_list {
                    let _ = writeln!(out, "     - {sub}");
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::ParagraphDocument;
    use pretty_assertions::assert_eq;

    fn document() -> SourceDocument {
        ParagraphDocument::from_pairs([
            ("Heading 1", "Intro"),
            ("Heading 2", "A"),
            ("Heading 3", "A.1"),
            ("Normal", "text"),
            ("Heading 2", "B"),
            ("Heading 1", "Middle"),
            ("Heading 1", "End"),
            ("Heading 2", "C"),
        ])
        .with_title("Handbook")
        .into()
    }

    #[test]
    fn test_analyze_fills_paths_and_recommendation() {
        let analysis = TocAnalyzer::standard().analyze(&document());

        assert_eq!(analysis.entries.len(), 7);
        assert_eq!(analysis.entries[2].full_path(), "Intro/A/A.1");
        assert_eq!(analysis.summary.max_depth, 3);
        assert_eq!(analysis.recommended_split_level, 1);
        assert_eq!(analysis.document_length, 8);
    }

    #[test]
    fn test_split_preview() {
        let analysis = TocAnalyzer::standard().analyze(&document());
        let preview = analysis.split_preview(1);

        assert_eq!(
            preview,
            vec![
                PreviewSection {
                    title: "Intro".to_string(),
                    subsections: 3,
                    subsection_list: vec!["A".to_string(), "A.1".to_string(), "B".to_string()],
                },
                PreviewSection {
                    title: "Middle".to_string(),
                    subsections: 0,
                    subsection_list: Vec::new(),
                },
                PreviewSection {
                    title: "End".to_string(),
                    subsections: 1,
                    subsection_list: vec!["C".to_string()],
                },
            ]
        );
    }

    #[test]
    fn test_split_preview_limits_list() {
        let mut pairs = vec![("Heading 1", "Only".to_string())];
        for i in 0..8 {
            pairs.push(("Heading 2", format!("S{i}")));
        }
        let doc: SourceDocument = ParagraphDocument::from_pairs(pairs).into();
        let preview = TocAnalyzer::standard().analyze(&doc).split_preview(1);

        assert_eq!(preview[0].subsections, 8);
        assert_eq!(preview[0].subsection_list.len(), PREVIEW_SUBSECTION_LIMIT);
    }

    #[test]
    fn test_report_yaml_and_text() {
        let report = TocAnalyzer::standard().analyze(&document()).report();

        assert_eq!(report.detection_counts.get("style_name"), Some(&7));
        assert_eq!(report.level_stats.get(&1), Some(&3));

        let yaml = report.to_yaml().unwrap();
        assert!(yaml.starts_with("---\n"));
        let parsed: AnalysisReport = serde_yaml_ng::from_str(&yaml).unwrap();
        assert_eq!(parsed, report);

        let text = report.render_text();
        assert!(text.contains("Document: Handbook"));
        assert!(text.contains("Recommended split level: 1"));
        assert!(text.contains("  1. Intro (3 subsections)"));
    }

    #[test]
    fn test_report_entries_carry_parents() {
        let report = TocAnalyzer::standard().analyze(&document()).report();
        let parents: Vec<(&str, Option<&str>, Option<&str>)> = report
            .entries
            .iter()
            .map(|e| (e.text.as_str(), e.parent_level_1.as_deref(), e.parent_level_2.as_deref()))
            .collect();

        assert_eq!(
            parents,
            vec![
                ("Intro", None, None),
                ("A", Some("Intro"), None),
                ("A.1", Some("Intro"), Some("A")),
                ("B", Some("Intro"), None),
                ("Middle", None, None),
                ("End", None, None),
                ("C", Some("End"), None),
            ]
        );
        assert!(report.entries.iter().all(|e| e.source_href.is_none()));
    }

    #[test]
    fn test_report_entries_forget_level_two_at_new_chapter() {
        let doc: SourceDocument = ParagraphDocument::from_pairs([
            ("Heading 1", "One"),
            ("Heading 2", "One.A"),
            ("Heading 1", "Two"),
            ("Heading 3", "Deep"),
        ])
        .into();
        let report = TocAnalyzer::standard().analyze(&doc).report();

        assert_eq!(report.entries[3].parent_level_1.as_deref(), Some("Two"));
        assert_eq!(report.entries[3].parent_level_2, None);
    }

    #[test]
    fn test_report_sections_per_level() {
        let sections = TocAnalyzer::standard().analyze(&document()).report().to_sections();

        let titles: Vec<&str> = sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "Table of contents report",
                "Level 1 headings",
                "Level 2 headings",
                "Level 3 headings"
            ]
        );
        assert!(sections[0].paragraphs().contains(&"Document: Handbook".to_string()));
        assert!(sections[0].paragraphs().contains(&"Level 2 entries: 3".to_string()));

        let deepest = &sections[3];
        let styles: Vec<Option<&str>> = deepest.blocks.iter().map(|b| b.style.as_deref()).collect();
        assert_eq!(
            styles,
            vec![Some("List Number"), Some("List Bullet 2"), Some("List Bullet 3")]
        );
        assert_eq!(
            deepest.paragraphs(),
            vec![
                "A.1".to_string(),
                "Parent level 1: Intro\nParent level 2: A".to_string(),
                "Detection: style_name".to_string(),
            ]
        );
        assert!(deepest.blocks[0].runs[0].bold);
    }

    #[cfg(feature = "docx")]
    #[test]
    fn test_report_docx() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.docx");
        let report = TocAnalyzer::standard().analyze(&document()).report();
        std::fs::write(&path, report.to_docx().unwrap()).unwrap();

        let reloaded = crate::source::load_document(&path).unwrap();
        assert_eq!(reloaded.title(), Some("Table of contents report: Handbook"));
        let texts: Vec<String> = reloaded.blocks().iter().map(Block::text).collect();
        assert!(texts.contains(&"Level 3 headings".to_string()));
        assert!(texts.contains(&"A.1".to_string()));
        assert!(texts.contains(&"Recommended split level: 1".to_string()));
    }

    #[test]
    fn test_empty_document_report() {
        let doc: SourceDocument = ParagraphDocument::default().into();
        let report = TocAnalyzer::standard().analyze(&doc).report();

        assert_eq!(report.total_entries, 0);
        assert_eq!(report.recommended_split_level, 1);
        assert!(report.render_text().contains("(no headings detected)"));
    }
}
