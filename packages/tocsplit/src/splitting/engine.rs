//! Split engine that cuts a document into sections at one heading level.

use super::materializer::SectionMaterializer;
use super::resolver::resolve_split_points;
use crate::config::SplitConfig;
use crate::error::Result;
use crate::source::SourceDocument;
use crate::types::{Section, SplitRange, TocEntry};

/// Engine for splitting a document using detected entries.
///
/// Resolves ranges at the configured split level and materializes one
/// section per range.
#[derive(Debug, Clone)]
pub struct SplitEngine {
    split_level: u32,
    materializer: SectionMaterializer,
}

impl SplitEngine {
    /// Create an engine from a validated configuration.
    pub fn new(config: &SplitConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            split_level: config.split_level,
            materializer: SectionMaterializer::new(config.preserve_formatting),
        })
    }

    /// Ranges covering the whole document.
    pub fn plan(&self, entries: &[TocEntry], document: &SourceDocument) -> Result<Vec<SplitRange>> {
        resolve_split_points(entries, self.split_level, document.len())
    }

    /// Split a document into sections.
    ///
    /// Untitled ranges without any content (markup preamble before the first
    /// heading, for instance) are dropped.
    pub fn split(&self, entries: &[TocEntry], document: &SourceDocument) -> Result<Vec<Section>> {
        let ranges = self.plan(entries, document)?;
        let blocks = document.blocks();

        let sections: Vec<Section> = self
            .materializer
            .materialize_all(&ranges, &blocks)
            .into_iter()
            .filter(|section| {
                let keep = !section.title.is_empty() || !section.blocks.is_empty();
                if !keep {
                    tracing::debug!("dropping empty untitled section");
                }
                keep
            })
            .collect();

        tracing::debug!(
            split_level = self.split_level,
            ranges = ranges.len(),
            sections = sections.len(),
            "split document"
        );
        Ok(sections)
    }
}
