//! Paragraph-stream documents (word-processor files).

use crate::types::{Block, Run};

/// Style name python-docx and Word report for paragraphs without a style.
pub const DEFAULT_PARAGRAPH_STYLE: &str = "Normal";

/// One paragraph with its named style and formatted runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paragraph {
    pub style: String,
    pub runs: Vec<Run>,
}

impl Paragraph {
    #[must_use]
    pub fn new(style: impl Into<String>, runs: Vec<Run>) -> Self {
        Self {
            style: style.into(),
            runs,
        }
    }

    /// Paragraph with a single unformatted run.
    #[must_use]
    pub fn plain(style: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(style, vec![Run::plain(text)])
    }

    /// Concatenated run text.
    #[must_use]
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

/// A document given as paragraphs in reading order.
///
/// Positions are paragraph indices; the document length is the paragraph count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParagraphDocument {
    pub title: Option<String>,
    pub paragraphs: Vec<Paragraph>,
}

impl ParagraphDocument {
    #[must_use]
    pub fn new(paragraphs: Vec<Paragraph>) -> Self {
        Self {
            title: None,
            paragraphs,
        }
    }

    /// Build from `(style, text)` pairs.
    #[must_use]
    pub fn from_pairs<S, T>(pairs: impl IntoIterator<Item = (S, T)>) -> Self
    where
        S: Into<String>,
        T: Into<String>,
    {
        Self::new(
            pairs
                .into_iter()
                .map(|(style, text)| Paragraph::plain(style, text))
                .collect(),
        )
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Number of paragraphs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paragraphs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty()
    }

    /// Style names of paragraphs with non-empty text, in document order.
    pub fn used_styles(&self) -> impl Iterator<Item = &str> + '_ {
        self.paragraphs
            .iter()
            .filter(|p| !p.text().trim().is_empty())
            .map(|p| p.style.as_str())
    }

    /// Paragraphs as content blocks positioned by index.
    #[must_use]
    pub fn blocks(&self) -> Vec<Block> {
        self.paragraphs
            .iter()
            .enumerate()
            .map(|(index, p)| Block::new(index, Some(p.style.clone()), p.runs.clone()))
            .collect()
    }
}
