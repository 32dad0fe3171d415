//! WordprocessingML (`.docx`) loading.
//!
//! Only the parts needed for structure detection are read: `word/styles.xml`
//! for style names, `word/document.xml` for paragraphs and runs, and the
//! optional `docProps/core.xml` for the document title.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use roxmltree::Node;
use zip::ZipArchive;

use super::paragraphs::{Paragraph, ParagraphDocument, DEFAULT_PARAGRAPH_STYLE};
use super::{read_entry, read_optional_entry};
use crate::error::{Result, TocSplitError};
use crate::types::Run;
use crate::xml::{find_child, get_text, local_attribute, parse_document};

/// WordprocessingML main namespace.
pub const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

pub const DOCUMENT_PART: &str = "word/document.xml";
pub const STYLES_PART: &str = "word/styles.xml";
pub const CORE_PROPERTIES_PART: &str = "docProps/core.xml";

/// Paragraph style names keyed by style id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleSheet {
    names: HashMap<String, String>,
    default_paragraph: Option<String>,
}

impl StyleSheet {
    /// Parse `word/styles.xml`.
    pub fn parse(xml: &str) -> Result<Self> {
        let doc = parse_document(xml)?;
        let mut sheet = Self::default();

        for style in doc.root_element().children().filter(|n| is_w(*n, "style")) {
            let Some(id) = local_attribute(style, "styleId") else {
                continue;
            };
            let name = w_child(style, "name")
                .and_then(|n| local_attribute(n, "val"))
                .map_or_else(|| id.to_string(), display_style_name);

            let is_paragraph = local_attribute(style, "type").map_or(true, |t| t == "paragraph");
            let is_default = local_attribute(style, "default").is_some_and(|v| v == "1" || v == "true");
            if is_paragraph && is_default {
                sheet.default_paragraph = Some(name.clone());
            }
            sheet.names.insert(id.to_string(), name);
        }

        Ok(sheet)
    }

    /// Display name for a style id; unknown ids are returned as-is.
    #[must_use]
    pub fn name_for(&self, id: &str) -> String {
        self.names
            .get(id)
            .cloned()
            .unwrap_or_else(|| id.to_string())
    }

    /// Style name of paragraphs without an explicit style.
    #[must_use]
    pub fn default_paragraph_style(&self) -> &str {
        self.default_paragraph
            .as_deref()
            .unwrap_or(DEFAULT_PARAGRAPH_STYLE)
    }
}

/// Map a built-in lowercase style name to the name Word displays.
///
/// # Examples
/// ```
/// use tocsplit::source::docx::display_style_name;
///
/// assert_eq!(display_style_name("heading 2"), "Heading 2");
/// assert_eq!(display_style_name("title"), "Title");
/// assert_eq!(display_style_name("見出し 1"), "見出し 1");
/// ```
pub fn display_style_name(name: &str) -> String {
    if let Some(rest) = name.strip_prefix("heading ") {
        return format!("Heading {rest}");
    }
    match name {
        "title" => "Title".to_string(),
        "subtitle" => "Subtitle".to_string(),
        "normal" => "Normal".to_string(),
        _ => name.to_string(),
    }
}

/// Load a `.docx` file as a paragraph stream.
///
/// Every failure is reported as [`TocSplitError::SourceUnreadable`].
pub fn load_docx(path: &Path) -> Result<ParagraphDocument> {
    read_docx(path).map_err(|e| TocSplitError::unreadable(path, e))
}

fn read_docx(path: &Path) -> Result<ParagraphDocument> {
    let file = File::open(path)?;
    let mut archive = ZipArchive::new(BufReader::new(file))?;

    let styles = match read_optional_entry(&mut archive, STYLES_PART)? {
        Some(xml) => StyleSheet::parse(&xml)?,
        None => StyleSheet::default(),
    };
    let document = read_entry(&mut archive, DOCUMENT_PART)?;
    let paragraphs = parse_paragraphs(&document, &styles)?;

    let title = read_optional_entry(&mut archive, CORE_PROPERTIES_PART)?
        .and_then(|xml| core_title(&xml));

    tracing::debug!(path = %path.display(), paragraphs = paragraphs.len(), "loaded docx");

    Ok(ParagraphDocument { title, paragraphs })
}

/// Parse the body paragraphs of `word/document.xml` in document order.
///
/// Paragraphs inside tables are included; paragraphs nested in text boxes
/// of another paragraph are folded into their host.
pub fn parse_paragraphs(xml: &str, styles: &StyleSheet) -> Result<Vec<Paragraph>> {
    let doc = parse_document(xml)?;
    let body = w_child(doc.root_element(), "body").ok_or_else(|| TocSplitError::MissingPart {
        part: "w:body".to_string(),
        context: DOCUMENT_PART.to_string(),
    })?;

    let paragraphs = body
        .descendants()
        .filter(|n| is_w(*n, "p") && owning_paragraph(*n).is_none())
        .map(|p| {
            let style = w_child(p, "pPr")
                .and_then(|ppr| w_child(ppr, "pStyle"))
                .and_then(|s| local_attribute(s, "val"))
                .map_or_else(
                    || styles.default_paragraph_style().to_string(),
                    |id| styles.name_for(id),
                );
            Paragraph::new(style, paragraph_runs(p))
        })
        .collect();

    Ok(paragraphs)
}

fn paragraph_runs(paragraph: Node<'_, '_>) -> Vec<Run> {
    paragraph
        .descendants()
        .filter(|n| is_w(*n, "r") && owning_paragraph(*n) == Some(paragraph))
        .filter_map(|r| {
            let text = run_text(r);
            if text.is_empty() {
                return None;
            }
            let props = w_child(r, "rPr");
            let bold = props.and_then(|p| w_child(p, "b")).is_some_and(toggle_on);
            let italic = props.and_then(|p| w_child(p, "i")).is_some_and(toggle_on);
            let underline = props
                .and_then(|p| w_child(p, "u"))
                .is_some_and(|u| local_attribute(u, "val").map_or(true, |v| v != "none"));
            Some(
                Run::plain(text)
                    .bold(bold)
                    .italic(italic)
                    .underline(underline),
            )
        })
        .collect()
}

fn run_text(run: Node<'_, '_>) -> String {
    let mut text = String::new();
    for child in run.children().filter(|n| n.tag_name().namespace() == Some(W_NS)) {
        match child.tag_name().name() {
            "t" => text.push_str(child.text().unwrap_or_default()),
            "tab" => text.push('\t'),
            "br" | "cr" => text.push('\n'),
            _ => {}
        }
    }
    text
}

/// A toggle property is on unless its `w:val` says otherwise.
fn toggle_on(node: Node<'_, '_>) -> bool {
    local_attribute(node, "val").map_or(true, |v| !matches!(v, "0" | "false" | "off"))
}

/// Nearest enclosing `w:p` of a node, excluding the node itself.
fn owning_paragraph<'a, 'input>(node: Node<'a, 'input>) -> Option<Node<'a, 'input>> {
    node.ancestors().skip(1).find(|a| is_w(*a, "p"))
}

fn is_w(node: Node<'_, '_>, tag: &str) -> bool {
    node.is_element() && node.tag_name().namespace() == Some(W_NS) && node.tag_name().name() == tag
}

fn w_child<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|c| is_w(*c, tag))
}

/// `dc:title` from `docProps/core.xml`, if present and non-empty.
fn core_title(xml: &str) -> Option<String> {
    let doc = parse_document(xml).ok()?;
    let title = get_text(find_child(doc.root_element(), "title")?);
    (!title.is_empty()).then_some(title)
}
