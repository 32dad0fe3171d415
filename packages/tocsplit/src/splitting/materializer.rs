//! Turn split ranges into standalone sections.

use crate::config::{render_filename, sanitize_filename, SplitConfig};
use crate::detect::{clean_heading_text, collapse_whitespace};
use crate::error::Result;
use crate::types::{Block, Run, Section, SplitRange};

/// Copies the blocks of a range into a [`Section`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionMaterializer {
    preserve_formatting: bool,
}

impl SectionMaterializer {
    #[must_use]
    pub fn new(preserve_formatting: bool) -> Self {
        Self {
            preserve_formatting,
        }
    }

    /// Build a section from the blocks positioned inside `range`.
    ///
    /// The section title becomes the synthesized heading of the written
    /// file, so the first block of the range is left out when its text is
    /// the title. A container match such as `div.chapter` opens the range
    /// before its heading block, and detected titles are cleaned, so the
    /// comparison goes through the same cleanup as detection. Without
    /// `preserve_formatting` each block is reduced to one plain run and
    /// loses its style name.
    pub fn materialize(&self, range: &SplitRange, blocks: &[Block]) -> Section {
        let mut inside = blocks
            .iter()
            .filter(|b| range.contains(b.position))
            .peekable();
        if inside.next_if(|b| is_opening_heading(b, range)).is_some() {
            tracing::trace!(title = %range.title, "omitting opening heading block");
        }

        let content = inside.map(|b| self.copy_block(b)).collect();
        Section::new(range.title.clone(), content)
    }

    /// Materialize every range, in order.
    pub fn materialize_all(&self, ranges: &[SplitRange], blocks: &[Block]) -> Vec<Section> {
        ranges.iter().map(|r| self.materialize(r, blocks)).collect()
    }

    fn copy_block(&self, block: &Block) -> Block {
        if self.preserve_formatting {
            return block.clone();
        }
        Block::new(block.position, None, vec![Run::plain(block.text())])
    }
}

/// True when `block` carries the heading that titles `range`.
fn is_opening_heading(block: &Block, range: &SplitRange) -> bool {
    if range.title.is_empty() {
        return false;
    }
    let text = block.text();
    collapse_whitespace(&text) == range.title
        || clean_heading_text(&text).is_some_and(|cleaned| cleaned == range.title)
}

/// File name stem for the section at 1-based `index`.
///
/// # Examples
/// ```
/// use tocsplit::config::SplitConfig;
/// use tocsplit::splitting::section_file_stem;
///
/// let config = SplitConfig::default();
/// assert_eq!(section_file_stem(&config, 2, "Ch:1 Intro").unwrap(), "Ch_1_Intro_2");
/// assert_eq!(section_file_stem(&config, 1, "").unwrap(), "section_1");
/// ```
pub fn section_file_stem(config: &SplitConfig, index: usize, title: &str) -> Result<String> {
    let safe_title = sanitize_filename(title, config.max_filename_length);
    render_filename(&config.filename_pattern, index, &safe_title)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn blocks() -> Vec<Block> {
        vec![
            Block::new(0, Some("Heading 1".to_string()), vec![Run::plain("Intro")]),
            Block::new(
                1,
                Some("Normal".to_string()),
                vec![Run::plain("Hello "), Run::plain("world").bold(true)],
            ),
            Block::new(2, Some("Heading 1".to_string()), vec![Run::plain("Next")]),
            Block::new(3, Some("Normal".to_string()), vec![Run::plain("Bye")]),
        ]
    }

    #[test]
    fn test_materialize_preserves_formatting() {
        let materializer = SectionMaterializer::new(true);
        let section = materializer.materialize(&SplitRange::new(0, 2, "Intro"), &blocks());

        assert_eq!(section.title, "Intro");
        assert_eq!(section.blocks.len(), 1);
        assert_eq!(section.blocks[0].style.as_deref(), Some("Normal"));
        assert!(section.blocks[0].runs[1].bold);
    }

    #[test]
    fn test_materialize_plain_text() {
        let materializer = SectionMaterializer::new(false);
        let section = materializer.materialize(&SplitRange::new(0, 2, "Intro"), &blocks());

        assert_eq!(section.blocks[0].style, None);
        assert_eq!(section.blocks[0].runs, vec![Run::plain("Hello world")]);
    }

    #[test]
    fn test_untitled_range_keeps_all_blocks() {
        let materializer = SectionMaterializer::new(true);
        let section = materializer.materialize(&SplitRange::new(0, 4, ""), &blocks());
        assert_eq!(section.paragraphs(), vec!["Intro", "Hello world", "Next", "Bye"]);
    }

    #[test]
    fn test_materialize_all_covers_every_block_once() {
        let materializer = SectionMaterializer::new(true);
        let ranges = vec![SplitRange::new(0, 2, "Intro"), SplitRange::new(2, 4, "Next")];
        let sections = materializer.materialize_all(&ranges, &blocks());

        assert_eq!(sections.len(), 2);
        assert_eq!(sections[1].paragraphs(), vec!["Bye"]);
    }

    #[test]
    fn test_opening_heading_matched_after_cleanup() {
        let blocks = vec![
            Block::new(0, Some("h1".to_string()), vec![Run::plain("第1章はじめに")]),
            Block::new(20, Some("p".to_string()), vec![Run::plain("a")]),
        ];
        let section = SectionMaterializer::new(true)
            .materialize(&SplitRange::new(0, 40, "第1章\u{3000}はじめに"), &blocks);

        assert_eq!(section.paragraphs(), vec!["a"]);
    }

    #[test]
    fn test_opening_heading_after_range_start() {
        // A container chapter opens its range at the <div>, before the <h1> block
        let blocks = vec![
            Block::new(12, Some("h1".to_string()), vec![Run::plain("Opening")]),
            Block::new(30, Some("p".to_string()), vec![Run::plain("a")]),
        ];
        let section = SectionMaterializer::new(true)
            .materialize(&SplitRange::new(0, 40, "Opening"), &blocks);

        assert_eq!(section.paragraphs(), vec!["a"]);
    }

    #[test]
    fn test_only_first_block_can_be_the_opening_heading() {
        let blocks = vec![
            Block::new(0, Some("p".to_string()), vec![Run::plain("Lead")]),
            Block::new(5, Some("h2".to_string()), vec![Run::plain("Intro")]),
        ];
        let section = SectionMaterializer::new(true)
            .materialize(&SplitRange::new(0, 10, "Intro"), &blocks);

        assert_eq!(section.paragraphs(), vec!["Lead", "Intro"]);
    }

    #[test]
    fn test_section_file_stem_pattern() {
        let config = SplitConfig::default()
            .with_filename_pattern("{index:02}_{title}")
            .with_max_filename_length(5);
        assert_eq!(section_file_stem(&config, 3, "Chapter One").unwrap(), "03_Chapt");
    }
}
