//! YAML writer.

use serde::Serialize;

use super::{ContainerWriter, ExportMetadata, OutputFormat};
use crate::error::Result;
use crate::types::{Block, Run, Section};

/// Block representation for YAML serialization.
#[derive(Debug, Serialize)]
struct YamlBlock<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    style: Option<&'a str>,
    text: String,
    /// Only present when at least one run carries formatting.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    runs: Vec<&'a Run>,
}

impl<'a> From<&'a Block> for YamlBlock<'a> {
    fn from(block: &'a Block) -> Self {
        let formatted = block.runs.iter().any(Run::is_formatted);
        Self {
            style: block.style.as_deref(),
            text: block.text(),
            runs: if formatted {
                block.runs.iter().collect()
            } else {
                Vec::new()
            },
        }
    }
}

/// Section representation for YAML serialization.
#[derive(Debug, Serialize)]
struct YamlSection<'a> {
    title: &'a str,
    blocks: Vec<YamlBlock<'a>>,
}

impl<'a> From<&'a Section> for YamlSection<'a> {
    fn from(section: &'a Section) -> Self {
        Self {
            title: &section.title,
            blocks: section.blocks.iter().map(YamlBlock::from).collect(),
        }
    }
}

/// Combined document representation for YAML serialization.
#[derive(Debug, Serialize)]
struct YamlDocument<'a> {
    #[serde(flatten)]
    metadata: &'a ExportMetadata,
    sections: Vec<YamlSection<'a>>,
}

/// Indent sequence items under their parent key.
///
/// serde_yaml_ng places `- ` at the same indent as the key that owns the
/// sequence; this shifts every item two spaces per open sequence.
fn indent_yaml_sequences(yaml: &str) -> String {
    let mut result: Vec<String> = Vec::new();
    let mut seq_indents: Vec<usize> = Vec::new();

    for line in yaml.lines() {
        let trimmed = line.trim_start();
        if trimmed.is_empty() {
            result.push(line.to_string());
            continue;
        }
        let indent = line.len() - trimmed.len();

        while let Some(&seq_indent) = seq_indents.last() {
            if indent < seq_indent || (indent == seq_indent && !trimmed.starts_with("- ")) {
                seq_indents.pop();
            } else {
                break;
            }
        }

        if trimmed.starts_with("- ") && seq_indents.last() != Some(&indent) {
            seq_indents.push(indent);
        }

        let extra = seq_indents.len() * 2;
        result.push(format!("{}{trimmed}", " ".repeat(indent + extra)));
    }

    result.join("\n")
}

/// Serialize, indent sequences, add the document start marker and strip
/// trailing whitespace.
fn to_yaml_document<T: Serialize>(value: &T) -> Result<String> {
    let yaml = serde_yaml_ng::to_string(value)?;
    let yaml = indent_yaml_sequences(&yaml);
    let lines: Vec<&str> = yaml.lines().map(str::trim_end).collect();
    Ok(format!("---\n{}\n", lines.join("\n")))
}

/// Writes sections as YAML documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct YamlWriter;

impl ContainerWriter for YamlWriter {
    fn format(&self) -> OutputFormat {
        OutputFormat::Yaml
    }

    fn encode_section(&self, section: &Section, _metadata: &ExportMetadata) -> Result<Vec<u8>> {
        Ok(to_yaml_document(&YamlSection::from(section))?.into_bytes())
    }

    fn encode_combined(&self, sections: &[Section], metadata: &ExportMetadata) -> Result<Vec<u8>> {
        let document = YamlDocument {
            metadata,
            sections: sections.iter().map(YamlSection::from).collect(),
        };
        Ok(to_yaml_document(&document)?.into_bytes())
    }
}
