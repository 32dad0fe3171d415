//! End-to-end tests for the analyze and split pipeline.
//!
//! Sources are DOCX and EPUB containers built in a temporary directory.

mod common;

use std::fs;
use std::path::PathBuf;

use pretty_assertions::assert_eq;
use tocsplit::source::SourceDocument;
use tocsplit::types::DetectionMethod;
use tocsplit::{
    load_document, split_document, OutputFormat, SplitConfig, TocAnalyzer, TocSplitError,
};

fn file_names(paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect()
}

fn block_texts(document: &SourceDocument) -> Vec<String> {
    document.blocks().iter().map(|b| b.text()).collect()
}

#[test]
fn test_analyze_docx_report() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("report.docx");
    common::write_report_docx(&source);

    let document = load_document(&source).unwrap();
    assert_eq!(document.title(), Some("Annual Report"));
    assert_eq!(document.len(), common::REPORT_PARAGRAPHS.len());

    let analysis = TocAnalyzer::standard().analyze(&document);
    let texts: Vec<&str> = analysis.entries.iter().map(|e| e.text.as_str()).collect();
    let levels: Vec<u32> = analysis.entries.iter().map(|e| e.level).collect();

    assert_eq!(texts, vec!["Introduction", "Background", "Methods", "Results"]);
    assert_eq!(levels, vec![1, 2, 1, 1]);
    assert_eq!(analysis.entries[1].full_path(), "Introduction/Background");
    assert!(analysis
        .entries
        .iter()
        .all(|e| e.detection_method == DetectionMethod::StyleName));
    assert_eq!(analysis.recommended_split_level, 1);
}

#[test]
fn test_analysis_report_serializes() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("report.docx");
    common::write_report_docx(&source);

    let document = load_document(&source).unwrap();
    let report = TocAnalyzer::standard().analyze(&document).report();
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["total_entries"], 4);
    assert_eq!(json["max_depth"], 2);
    assert_eq!(json["recommended_split_level"], 1);
    assert_eq!(json["split_preview"][0]["title"], "Introduction");
    assert_eq!(json["split_preview"][0]["subsections"], 1);

    let yaml = report.to_yaml().unwrap();
    assert!(yaml.starts_with("---\n"));
    assert!(yaml.contains("full_path: Introduction/Background"));
}

#[test]
fn test_split_docx_to_markdown() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("report.docx");
    common::write_report_docx(&source);

    let config = SplitConfig::default()
        .with_output_format(OutputFormat::Markdown)
        .with_output_directory(dir.path().join("out"));
    let written = split_document(&source, &config).unwrap();

    assert_eq!(
        file_names(&written),
        vec!["Introduction_1.md", "Methods_2.md", "Results_3.md"]
    );
    assert_eq!(
        fs::read_to_string(&written[0]).unwrap(),
        "# Introduction\n\nWelcome text.\n\n### Background\n\nHistory.\n"
    );
    assert_eq!(
        fs::read_to_string(&written[2]).unwrap(),
        "# Results\n\nIt worked.\n"
    );
}

#[test]
fn test_split_docx_sections_reload() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("report.docx");
    common::write_report_docx(&source);

    let config = SplitConfig::default()
        .with_output_format(OutputFormat::Docx)
        .with_output_directory(dir.path().join("out"))
        .with_filename_pattern("{index:02}_{title}");
    let written = split_document(&source, &config).unwrap();

    assert_eq!(
        file_names(&written),
        vec!["01_Introduction.docx", "02_Methods.docx", "03_Results.docx"]
    );

    let first = load_document(&written[0]).unwrap();
    assert_eq!(
        block_texts(&first),
        vec!["Introduction", "Welcome text.", "Background", "History."]
    );

    // The written section is itself a splittable document
    let analysis = TocAnalyzer::standard().analyze(&first);
    let texts: Vec<&str> = analysis.entries.iter().map(|e| e.text.as_str()).collect();
    assert_eq!(texts, vec!["Introduction", "Background"]);
}

#[test]
fn test_split_plain_text_drops_formatting() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("report.docx");
    common::write_report_docx(&source);

    let config = SplitConfig::default()
        .with_output_format(OutputFormat::Markdown)
        .with_output_directory(dir.path().join("out"))
        .with_preserve_formatting(false);
    let written = split_document(&source, &config).unwrap();

    // Without styles the subsection heading is an ordinary paragraph
    assert_eq!(
        fs::read_to_string(&written[0]).unwrap(),
        "# Introduction\n\nWelcome text.\n\nBackground\n\nHistory.\n"
    );
}

#[test]
fn test_analyze_epub_skips_navigation() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("book.epub");
    common::write_book_epub(&source);

    let document = load_document(&source).unwrap();
    assert_eq!(document.title(), Some("Sample Book"));

    let analysis = TocAnalyzer::standard().analyze(&document);
    let texts: Vec<&str> = analysis.entries.iter().map(|e| e.text.as_str()).collect();

    assert_eq!(
        texts,
        vec!["Chapter One", "Details", "Chapter Two", "Chapter Three"]
    );
    assert!(analysis
        .entries
        .windows(2)
        .all(|w| w[0].source_position < w[1].source_position));
    assert_eq!(analysis.recommended_split_level, 1);

    let report = analysis.report();
    let hrefs: Vec<&str> = report
        .entries
        .iter()
        .filter_map(|e| e.source_href.as_deref())
        .collect();
    assert_eq!(
        hrefs,
        vec!["OEBPS/ch1.xhtml", "OEBPS/ch1.xhtml", "OEBPS/ch2.xhtml", "OEBPS/ch3.xhtml"]
    );
    assert_eq!(report.entries[1].parent_level_1.as_deref(), Some("Chapter One"));
}

#[test]
fn test_split_epub_to_markdown() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("book.epub");
    common::write_book_epub(&source);

    let config = SplitConfig::default()
        .with_output_format(OutputFormat::Markdown)
        .with_output_directory(dir.path().join("out"));
    let written = split_document(&source, &config).unwrap();

    assert_eq!(
        file_names(&written),
        vec![
            "Chapter_One_1.md",
            "Chapter_Two_2.md",
            "Chapter_Three_3.md"
        ]
    );
    assert_eq!(
        fs::read_to_string(&written[0]).unwrap(),
        "# Chapter One\n\nAlpha.\n\n### Details\n\nBeta.\n"
    );
}

#[test]
fn test_split_epub_at_level_two_keeps_leading_content() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("book.epub");
    common::write_book_epub(&source);

    let config = SplitConfig::default()
        .with_split_level(2)
        .with_output_format(OutputFormat::Markdown)
        .with_output_directory(dir.path().join("out"));
    let written = split_document(&source, &config).unwrap();

    assert_eq!(file_names(&written), vec!["section_1.md", "Details_2.md"]);
    assert_eq!(
        fs::read_to_string(&written[0]).unwrap(),
        "## Chapter One\n\nAlpha.\n"
    );
    let details = fs::read_to_string(&written[1]).unwrap();
    assert!(details.starts_with("# Details\n\nBeta.\n"));
    assert!(details.contains("## Chapter Three"));
}

#[test]
fn test_split_epub_to_epub_sections() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("book.epub");
    common::write_book_epub(&source);

    let config = SplitConfig::default()
        .with_output_format(OutputFormat::Epub)
        .with_output_directory(dir.path().join("out"));
    let written = split_document(&source, &config).unwrap();
    assert_eq!(written.len(), 3);

    let second = load_document(&written[1]).unwrap();
    assert_eq!(second.title(), Some("Chapter Two"));
    assert!(block_texts(&second).contains(&"Gamma.".to_string()));
}

#[test]
fn test_document_without_headings_stays_whole() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("notes.docx");
    common::write_docx(
        &source,
        "Notes",
        &[("Normal", "First line."), ("Normal", "Second line.")],
    );

    let document = load_document(&source).unwrap();
    let analysis = TocAnalyzer::standard().analyze(&document);
    assert!(analysis.entries.is_empty());
    assert_eq!(analysis.recommended_split_level, 1);

    let config = SplitConfig::default()
        .with_output_format(OutputFormat::Markdown)
        .with_output_directory(dir.path().join("out"));
    let written = split_document(&source, &config).unwrap();

    assert_eq!(file_names(&written), vec!["section_1.md"]);
    assert_eq!(
        fs::read_to_string(&written[0]).unwrap(),
        "First line.\n\nSecond line.\n"
    );
}

#[cfg(feature = "pdf")]
#[test]
fn test_split_docx_to_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("report.docx");
    common::write_report_docx(&source);

    let config = SplitConfig::default()
        .with_output_format(OutputFormat::Pdf)
        .with_output_directory(dir.path().join("out"));
    let written = split_document(&source, &config).unwrap();

    assert_eq!(
        file_names(&written),
        vec!["Introduction_1.pdf", "Methods_2.pdf", "Results_3.pdf"]
    );
    for path in &written {
        let pdf = lopdf::Document::load(path).unwrap();
        assert_eq!(pdf.get_pages().len(), 1);
    }
}

#[cfg(not(feature = "pdf"))]
#[test]
fn test_pdf_output_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("report.docx");
    common::write_report_docx(&source);

    let config = SplitConfig::default()
        .with_output_format(OutputFormat::Pdf)
        .with_output_directory(dir.path().join("out"));
    let result = split_document(&source, &config);

    assert!(matches!(result, Err(TocSplitError::FormatUnsupported { .. })));
    assert!(!dir.path().join("out").exists());
}

#[test]
fn test_unsupported_and_corrupt_sources() {
    let dir = tempfile::tempdir().unwrap();

    let text = dir.path().join("notes.txt");
    fs::write(&text, "plain").unwrap();
    assert!(matches!(
        load_document(&text),
        Err(TocSplitError::UnsupportedSource { .. })
    ));

    let broken = dir.path().join("broken.docx");
    fs::write(&broken, "not a zip archive").unwrap();
    assert!(matches!(
        load_document(&broken),
        Err(TocSplitError::SourceUnreadable { .. })
    ));
}
