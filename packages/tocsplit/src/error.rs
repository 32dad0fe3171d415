//! Error types for tocsplit.
//!
//! Detection, hierarchy building and split-level advice are total functions
//! and never produce these errors. Only configuration checks, source loading
//! and section writing can fail.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the tocsplit library.
#[derive(Debug, Error)]
pub enum TocSplitError {
    /// Split configuration is invalid (e.g. split level below 1).
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The requested output format has no encoder available in this build.
    #[error("Output format '{format}' is not supported: {reason}")]
    FormatUnsupported { format: String, reason: String },

    /// The source document could not be read or is structurally broken.
    #[error("Source '{}' is unreadable: {reason}", .path.display())]
    SourceUnreadable { path: PathBuf, reason: String },

    /// The source file extension is not a known document type.
    #[error("Unsupported source type '{extension}' for {}. Expected .docx, .epub, .xhtml or .html", .path.display())]
    UnsupportedSource { path: PathBuf, extension: String },

    /// A required part is missing from a container.
    #[error("Missing part {part} in {context}")]
    MissingPart { part: String, context: String },

    /// XML parsing failed.
    #[error("XML parsing failed: {0}")]
    XmlParse(#[from] roxmltree::Error),

    /// Zip container could not be read or written.
    #[error("Zip container error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// PDF document could not be assembled.
    #[cfg(feature = "pdf")]
    #[error("PDF encoding failed: {0}")]
    Pdf(#[from] lopdf::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error.
    #[error("YAML serialization failed: {0}")]
    YamlSerialization(#[from] serde_yaml_ng::Error),

    /// Filename pattern contains an unknown placeholder.
    #[error("Invalid filename pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

impl TocSplitError {
    /// Build a `SourceUnreadable` error for a path.
    pub fn unreadable(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        Self::SourceUnreadable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Build a `FormatUnsupported` error.
    pub fn unsupported_format(format: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::FormatUnsupported {
            format: format.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for tocsplit operations.
pub type Result<T> = std::result::Result<T, TocSplitError>;
