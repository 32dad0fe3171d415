//! Source documents and the loaders that produce them.
//!
//! Two shapes reach the detector: paragraph streams (DOCX) and markup
//! (EPUB spine documents, standalone XHTML). [`load_document`] picks the
//! loader from the file extension.

pub mod docx;
pub mod epub;
pub mod markup;
pub mod paragraphs;

use std::fs;
use std::io::{Read, Seek};
use std::path::Path;

use zip::result::ZipError;
use zip::ZipArchive;

use crate::error::{Result, TocSplitError};
use crate::types::Block;

pub use markup::{MarkupDocument, MarkupPart};
pub use paragraphs::{Paragraph, ParagraphDocument};

/// A loaded source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceDocument {
    Paragraphs(ParagraphDocument),
    Markup(MarkupDocument),
}

impl SourceDocument {
    /// Document length in position units: paragraph count or total bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Paragraphs(doc) => doc.len(),
            Self::Markup(doc) => doc.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Content blocks in reading order.
    #[must_use]
    pub fn blocks(&self) -> Vec<Block> {
        match self {
            Self::Paragraphs(doc) => doc.blocks(),
            Self::Markup(doc) => doc.blocks(),
        }
    }

    /// Document title from its metadata, if any.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        match self {
            Self::Paragraphs(doc) => doc.title.as_deref(),
            Self::Markup(doc) => doc.title.as_deref(),
        }
    }
}

impl From<ParagraphDocument> for SourceDocument {
    fn from(doc: ParagraphDocument) -> Self {
        Self::Paragraphs(doc)
    }
}

impl From<MarkupDocument> for SourceDocument {
    fn from(doc: MarkupDocument) -> Self {
        Self::Markup(doc)
    }
}

/// Load a document, choosing the loader by file extension.
///
/// `.docx` and `.epub` are containers; `.xhtml`, `.html` and `.htm` load as
/// a single markup part.
pub fn load_document(path: &Path) -> Result<SourceDocument> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "docx" => docx::load_docx(path).map(SourceDocument::from),
        "epub" => epub::load_epub(path).map(SourceDocument::from),
        "xhtml" | "html" | "htm" => {
            let content = fs::read_to_string(path).map_err(|e| TocSplitError::unreadable(path, e))?;
            let href = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            Ok(MarkupDocument::single(href, &content).into())
        }
        _ => Err(TocSplitError::UnsupportedSource {
            path: path.to_path_buf(),
            extension,
        }),
    }
}

/// Read a UTF-8 archive entry, reporting absence as [`TocSplitError::MissingPart`].
pub(crate) fn read_entry<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<String> {
    read_optional_entry(archive, name)?.ok_or_else(|| TocSplitError::MissingPart {
        part: name.to_string(),
        context: "archive".to_string(),
    })
}

/// Read a UTF-8 archive entry that may legitimately be absent.
pub(crate) fn read_optional_entry<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<Option<String>> {
    let mut entry = match archive.by_name(name) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut content = String::new();
    entry.read_to_string(&mut content)?;
    Ok(Some(content))
}
