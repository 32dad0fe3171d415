//! Markdown writer.

use super::text::{heading_level, wrap_text};
use super::{ContainerWriter, ExportMetadata, OutputFormat};
use crate::config::TEXT_WRAP_WIDTH;
use crate::error::Result;
use crate::types::{Block, Run, Section};

/// Renders sections as Markdown with wrapped paragraphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkdownWriter {
    pub width: usize,
}

impl Default for MarkdownWriter {
    fn default() -> Self {
        Self {
            width: TEXT_WRAP_WIDTH,
        }
    }
}

impl MarkdownWriter {
    /// Render one section: the title as `#` heading, then every block.
    pub fn render_section(&self, section: &Section) -> String {
        let mut parts = Vec::with_capacity(section.blocks.len() + 1);
        if !section.title.is_empty() {
            parts.push(format!("# {}", section.title));
        }
        parts.extend(section.blocks.iter().map(|b| self.render_block(b)));
        let mut rendered = parts.join("\n\n");
        rendered.push('\n');
        rendered
    }

    fn render_block(&self, block: &Block) -> String {
        let text: String = block.runs.iter().map(render_run).collect();
        match block.style.as_deref().and_then(heading_level) {
            Some(level) => format!("{} {}", "#".repeat((level as usize + 1).min(6)), text),
            None => wrap_text(&text, self.width),
        }
    }
}

fn render_run(run: &Run) -> String {
    let text = run.text.as_str();
    let trimmed = text.trim();
    if trimmed.is_empty() || !run.is_formatted() {
        return text.to_string();
    }

    // Emphasis markers must hug the text, so surrounding spaces stay outside
    let leading = &text[..text.len() - text.trim_start().len()];
    let trailing = &text[text.trim_end().len()..];

    let mut marked = trimmed.to_string();
    if run.underline {
        marked = format!("<u>{marked}</u>");
    }
    if run.italic {
        marked = format!("*{marked}*");
    }
    if run.bold {
        marked = format!("**{marked}**");
    }
    format!("{leading}{marked}{trailing}")
}

impl ContainerWriter for MarkdownWriter {
    fn format(&self) -> OutputFormat {
        OutputFormat::Markdown
    }

    fn encode_section(&self, section: &Section, _metadata: &ExportMetadata) -> Result<Vec<u8>> {
        Ok(self.render_section(section).into_bytes())
    }

    fn encode_combined(&self, sections: &[Section], _metadata: &ExportMetadata) -> Result<Vec<u8>> {
        let rendered: Vec<String> = sections.iter().map(|s| self.render_section(s)).collect();
        Ok(rendered.join("\n---\n\n").into_bytes())
    }
}
