//! tocsplit - Infer the heading structure of EPUB and DOCX documents and
//! split them into standalone sections.
//!
//! Headings are detected from paragraph style names (DOCX) or from
//! structural tags and numbering patterns (XHTML/EPUB). The flat heading
//! list is turned into a hierarchy, a split level is recommended from the
//! level counts, and the document is cut into contiguous ranges that are
//! written as Markdown, YAML, DOCX, EPUB or PDF.
//!
//! # Example
//!
//! ```
//! use tocsplit::source::{ParagraphDocument, SourceDocument};
//! use tocsplit::TocAnalyzer;
//!
//! let document: SourceDocument = ParagraphDocument::from_pairs([
//!     ("Heading 1", "Intro"),
//!     ("Heading 2", "Scope"),
//!     ("Normal", "Body text"),
//!     ("Heading 1", "Next"),
//! ])
//! .into();
//!
//! let analysis = TocAnalyzer::standard().analyze(&document);
//! assert_eq!(analysis.entries[1].full_path(), "Intro/Scope");
//! assert_eq!(analysis.recommended_split_level, 1);
//! ```
//!
//! # Architecture
//!
//! - [`config`]: Constants, split settings and file name helpers
//! - [`types`]: Core data types (TocEntry, SplitRange, Section, etc.)
//! - [`error`]: Error types and Result alias
//! - [`xml`]: XML utilities
//! - [`source`]: Document model and DOCX/EPUB/XHTML loaders
//! - [`classify`]: Style name to heading level classification
//! - [`detect`]: Heading detection
//! - [`hierarchy`]: Parent paths and level statistics
//! - [`advisor`]: Split level recommendation
//! - [`splitting`]: Split point resolution and section materialization
//! - [`export`]: Output formats and atomic writes
//! - [`analyzer`]: Per-document analysis and reports
//! - [`splitter`]: End-to-end split pipeline
//! - [`cli`]: Command-line interface

pub mod advisor;
pub mod analyzer;
pub mod classify;
pub mod cli;
pub mod config;
pub mod detect;
pub mod error;
pub mod export;
pub mod hierarchy;
pub mod source;
pub mod splitter;
pub mod splitting;
pub mod types;
pub mod xml;

// Re-export main functions
pub use splitter::split_document;

// Re-export commonly used items
pub use analyzer::{AnalysisReport, DocumentAnalysis, TocAnalyzer};
pub use config::SplitConfig;
pub use error::{Result, TocSplitError};
pub use export::OutputFormat;
pub use source::{load_document, SourceDocument};
pub use types::{DetectionMethod, Section, SplitRange, TocEntry};
