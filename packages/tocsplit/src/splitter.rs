//! Split pipeline that ties loading, analysis, splitting and export together.

use std::path::{Path, PathBuf};

use crate::analyzer::{DocumentAnalysis, TocAnalyzer};
use crate::config::SplitConfig;
use crate::error::Result;
use crate::export::{ExportMetadata, MultiFormatExporter};
use crate::source::{load_document, SourceDocument};
use crate::splitting::SplitEngine;

/// Load, analyze and split a document, writing one file per section.
///
/// # Arguments
/// * `path` - Source document (`.docx`, `.epub`, `.xhtml`, `.html`)
/// * `config` - Split settings; `config.split_level` is used as given
///
/// # Returns
/// Paths of the written sections, in document order
pub fn split_document(path: &Path, config: &SplitConfig) -> Result<Vec<PathBuf>> {
    // Reject unsupported formats before touching the source
    let exporter = MultiFormatExporter::new(config)?;

    let document = load_document(path)?;
    let analysis = TocAnalyzer::standard().analyze(&document);

    write_sections(&document, &analysis, config, &exporter)
}

/// Split an already loaded and analyzed document.
pub fn split_source(
    document: &SourceDocument,
    analysis: &DocumentAnalysis,
    config: &SplitConfig,
) -> Result<Vec<PathBuf>> {
    let exporter = MultiFormatExporter::new(config)?;
    write_sections(document, analysis, config, &exporter)
}

/// Split an already analyzed document into a single combined file.
pub fn split_source_combined(
    document: &SourceDocument,
    analysis: &DocumentAnalysis,
    config: &SplitConfig,
    file_stem: &str,
) -> Result<PathBuf> {
    let exporter = MultiFormatExporter::new(config)?;
    let engine = SplitEngine::new(config)?;
    let sections = engine.split(&analysis.entries, document)?;
    exporter.export_combined(&sections, &ExportMetadata::from(document), file_stem)
}

fn write_sections(
    document: &SourceDocument,
    analysis: &DocumentAnalysis,
    config: &SplitConfig,
    exporter: &MultiFormatExporter,
) -> Result<Vec<PathBuf>> {
    let engine = SplitEngine::new(config)?;
    let sections = engine.split(&analysis.entries, document)?;
    let written = exporter.export_sections(&sections, &ExportMetadata::from(document))?;

    tracing::info!(
        split_level = config.split_level,
        format = %exporter.format(),
        files = written.len(),
        "split complete"
    );
    Ok(written)
}
