//! Section export to Markdown, YAML, DOCX, EPUB and PDF.
//!
//! Every format is encoded in memory by a [`ContainerWriter`] and written
//! atomically. DOCX, EPUB and PDF encoders sit behind the `docx`, `epub` and
//! `pdf` cargo features.

mod atomic;
#[cfg(feature = "docx")]
mod docx;
#[cfg(feature = "epub")]
mod epub;
mod markdown;
mod markup;
#[cfg(feature = "pdf")]
mod pdf;
mod text;
mod yaml;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::SplitConfig;
use crate::error::{Result, TocSplitError};
use crate::source::SourceDocument;
use crate::splitting::section_file_stem;
use crate::types::Section;

pub use atomic::write_atomic;
#[cfg(feature = "docx")]
pub use docx::DocxWriter;
#[cfg(feature = "epub")]
pub use epub::EpubWriter;
pub use markdown::MarkdownWriter;
pub use markup::escape_xml;
#[cfg(feature = "pdf")]
pub use pdf::PdfWriter;
pub use text::{heading_level, paragraph_style_name, wrap_text};
pub use yaml::YamlWriter;

/// Target container format for written sections.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Markdown,
    Yaml,
    #[default]
    Docx,
    Epub,
    Pdf,
}

impl OutputFormat {
    /// File extension without the dot.
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Markdown => "md",
            Self::Yaml => "yaml",
            Self::Docx => "docx",
            Self::Epub => "epub",
            Self::Pdf => "pdf",
        }
    }

    /// Get the string value used in configuration files.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Markdown => "markdown",
            Self::Yaml => "yaml",
            Self::Docx => "docx",
            Self::Epub => "epub",
            Self::Pdf => "pdf",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = TocSplitError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "markdown" | "md" => Ok(Self::Markdown),
            "yaml" | "yml" => Ok(Self::Yaml),
            "docx" => Ok(Self::Docx),
            "epub" => Ok(Self::Epub),
            "pdf" => Ok(Self::Pdf),
            other => Err(TocSplitError::unsupported_format(other, "unknown output format")),
        }
    }
}

/// Document-level metadata carried into written containers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl ExportMetadata {
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

impl From<&SourceDocument> for ExportMetadata {
    fn from(document: &SourceDocument) -> Self {
        match document {
            SourceDocument::Paragraphs(doc) => Self {
                title: doc.title.clone(),
                ..Self::default()
            },
            SourceDocument::Markup(doc) => Self {
                title: doc.title.clone(),
                creator: doc.creator.clone(),
                language: doc.language.clone(),
            },
        }
    }
}

/// Trait for format encoders.
///
/// Implementations turn sections into the bytes of one file.
pub trait ContainerWriter {
    /// Format produced by this writer.
    fn format(&self) -> OutputFormat;

    /// Encode a single section as a standalone file.
    fn encode_section(&self, section: &Section, metadata: &ExportMetadata) -> Result<Vec<u8>>;

    /// Encode all sections into one file.
    fn encode_combined(&self, sections: &[Section], metadata: &ExportMetadata) -> Result<Vec<u8>>;
}

/// Get the writer for a format.
///
/// Fails with [`TocSplitError::FormatUnsupported`] when this build has no
/// encoder for it.
pub fn writer_for(format: OutputFormat) -> Result<Box<dyn ContainerWriter>> {
    match format {
        OutputFormat::Markdown => Ok(Box::new(MarkdownWriter::default())),
        OutputFormat::Yaml => Ok(Box::new(YamlWriter)),
        #[cfg(feature = "docx")]
        OutputFormat::Docx => Ok(Box::new(DocxWriter)),
        #[cfg(not(feature = "docx"))]
        OutputFormat::Docx => Err(TocSplitError::unsupported_format(
            "docx",
            "built without the `docx` feature",
        )),
        #[cfg(feature = "epub")]
        OutputFormat::Epub => Ok(Box::new(EpubWriter)),
        #[cfg(not(feature = "epub"))]
        OutputFormat::Epub => Err(TocSplitError::unsupported_format(
            "epub",
            "built without the `epub` feature",
        )),
        #[cfg(feature = "pdf")]
        OutputFormat::Pdf => Ok(Box::new(PdfWriter)),
        #[cfg(not(feature = "pdf"))]
        OutputFormat::Pdf => Err(TocSplitError::unsupported_format(
            "pdf",
            "built without the `pdf` feature",
        )),
    }
}

/// Writes sections to the configured directory in the configured format.
pub struct MultiFormatExporter {
    config: SplitConfig,
    writer: Box<dyn ContainerWriter>,
}

impl fmt::Debug for MultiFormatExporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiFormatExporter")
            .field("format", &self.writer.format())
            .field("output_directory", &self.config.output_directory)
            .finish()
    }
}

impl MultiFormatExporter {
    /// Create an exporter, failing early when the format has no encoder.
    pub fn new(config: &SplitConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            writer: writer_for(config.output_format)?,
            config: config.clone(),
        })
    }

    pub fn format(&self) -> OutputFormat {
        self.writer.format()
    }

    /// Write one file per section, named from the filename pattern.
    ///
    /// Returns the written paths in section order.
    pub fn export_sections(
        &self,
        sections: &[Section],
        metadata: &ExportMetadata,
    ) -> Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(sections.len());
        for (i, section) in sections.iter().enumerate() {
            let stem = section_file_stem(&self.config, i + 1, &section.title)?;
            let path = self.target_path(&stem);
            let bytes = self.writer.encode_section(section, metadata)?;
            write_atomic(&path, &bytes)?;
            tracing::info!(path = %path.display(), title = %section.title, "wrote section");
            written.push(path);
        }
        Ok(written)
    }

    /// Write every section into a single file named `file_stem`.
    pub fn export_combined(
        &self,
        sections: &[Section],
        metadata: &ExportMetadata,
        file_stem: &str,
    ) -> Result<PathBuf> {
        let path = self.target_path(file_stem);
        let bytes = self.writer.encode_combined(sections, metadata)?;
        write_atomic(&path, &bytes)?;
        tracing::info!(path = %path.display(), sections = sections.len(), "wrote combined document");
        Ok(path)
    }

    fn target_path(&self, stem: &str) -> PathBuf {
        let file_name = format!("{stem}.{}", self.writer.format().extension());
        Path::new(&self.config.output_directory).join(file_name)
    }
}
