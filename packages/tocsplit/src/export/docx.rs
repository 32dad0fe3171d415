//! WordprocessingML writer.
//!
//! Produces a minimal package: content types, relationships, core
//! properties, a style part declaring every paragraph style in use, and the
//! document body.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;
use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use super::markup::escape_xml;
use super::text::{heading_level, paragraph_style_name};
use super::{ContainerWriter, ExportMetadata, OutputFormat};
use crate::error::Result;
use crate::types::{Block, Run, Section};

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
<Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>
<Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>
</Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/>
</Relationships>"#;

const DOCUMENT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
</Relationships>"#;

/// Style id for a display name: alphanumerics only, `Normal` when empty.
///
/// `Heading 1` becomes `Heading1`, matching Word's built-in ids.
fn style_id(name: &str) -> String {
    let id: String = name.chars().filter(|c| c.is_alphanumeric()).collect();
    if id.is_empty() {
        "Normal".to_string()
    } else {
        id
    }
}

/// Name stored in `w:name`; built-in styles use Word's lowercase names.
fn stored_style_name(name: &str) -> String {
    match heading_level(name) {
        Some(level) if name.starts_with("Heading ") => format!("heading {level}"),
        _ => match name {
            "Title" => "title".to_string(),
            "Subtitle" => "subtitle".to_string(),
            "Normal" => "Normal".to_string(),
            other => other.to_string(),
        },
    }
}

fn is_builtin_style(name: &str) -> bool {
    matches!(name, "Normal" | "Title" | "Subtitle") || name.starts_with("Heading ")
}

/// One style per id. Names that collapse to the same id ("Heading 1" and
/// "Heading1") share a declaration, and a built-in name wins the id.
fn styles_by_id(names: &BTreeSet<String>) -> BTreeMap<String, &str> {
    let mut by_id: BTreeMap<String, &str> = BTreeMap::new();
    for name in names {
        let id = style_id(name);
        let keep_existing = by_id
            .get(&id)
            .is_some_and(|existing| is_builtin_style(existing) || !is_builtin_style(name));
        if !keep_existing {
            by_id.insert(id, name.as_str());
        }
    }
    by_id
}

fn styles_xml(names: &BTreeSet<String>) -> String {
    let mut styles = String::new();
    for (id, name) in styles_by_id(names) {
        let stored = escape_xml(&stored_style_name(name));
        let default = if id == "Normal" { r#" w:default="1""# } else { "" };
        let run_props = match heading_level(name) {
            Some(level) => {
                let size = 32u32.saturating_sub(level * 4).max(22);
                format!(r#"<w:rPr><w:b/><w:sz w:val="{size}"/></w:rPr>"#)
            }
            None => String::new(),
        };
        let based_on = if id == "Normal" {
            ""
        } else {
            r#"<w:basedOn w:val="Normal"/>"#
        };
        let _ = write!(
            styles,
            r#"<w:style w:type="paragraph"{default} w:styleId="{id}"><w:name w:val="{stored}"/>{based_on}{run_props}</w:style>"#,
            id = escape_xml(&id),
        );
    }
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="{W_NS}">{styles}</w:styles>"#
    )
}

fn core_xml(metadata: &ExportMetadata, title: &str) -> String {
    let created = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
    let creator = metadata
        .creator
        .as_deref()
        .map(|c| format!("<dc:creator>{}</dc:creator>", escape_xml(c)))
        .unwrap_or_default();
    let language = metadata
        .language
        .as_deref()
        .map(|l| format!("<dc:language>{}</dc:language>", escape_xml(l)))
        .unwrap_or_default();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><dc:title>{title}</dc:title>{creator}{language}<dcterms:created xsi:type="dcterms:W3CDTF">{created}</dcterms:created></cp:coreProperties>"#,
        title = escape_xml(title),
    )
}

fn run_xml(run: &Run) -> String {
    let mut props = String::new();
    if run.bold {
        props.push_str("<w:b/>");
    }
    if run.italic {
        props.push_str("<w:i/>");
    }
    if run.underline {
        props.push_str(r#"<w:u w:val="single"/>"#);
    }
    let props = if props.is_empty() {
        props
    } else {
        format!("<w:rPr>{props}</w:rPr>")
    };

    let mut content = String::new();
    for (i, line) in run.text.split('\n').enumerate() {
        if i > 0 {
            content.push_str("<w:br/>");
        }
        for (j, piece) in line.split('\t').enumerate() {
            if j > 0 {
                content.push_str("<w:tab/>");
            }
            if !piece.is_empty() {
                let _ = write!(content, r#"<w:t xml:space="preserve">{}</w:t>"#, escape_xml(piece));
            }
        }
    }
    format!("<w:r>{props}{content}</w:r>")
}

fn paragraph_xml(style: &str, runs: &[Run]) -> String {
    let runs: String = runs.iter().map(run_xml).collect();
    format!(
        r#"<w:p><w:pPr><w:pStyle w:val="{}"/></w:pPr>{runs}</w:p>"#,
        escape_xml(&style_id(style))
    )
}

const PAGE_BREAK: &str = r#"<w:p><w:r><w:br w:type="page"/></w:r></w:p>"#;

/// Body paragraphs for one section, collecting the styles it uses.
fn section_body(section: &Section, styles: &mut BTreeSet<String>) -> String {
    let mut body = String::new();
    if !section.title.is_empty() {
        styles.insert("Heading 1".to_string());
        body.push_str(&paragraph_xml("Heading 1", &[Run::plain(section.title.clone())]));
    }
    for block in &section.blocks {
        let style = block_style(block);
        body.push_str(&paragraph_xml(&style, &block.runs));
        styles.insert(style);
    }
    body
}

fn block_style(block: &Block) -> String {
    paragraph_style_name(block.style.as_deref())
}

fn package(body: &str, styles: &BTreeSet<String>, metadata: &ExportMetadata, title: &str) -> Result<Vec<u8>> {
    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="{W_NS}"><w:body>{body}<w:sectPr/></w:body></w:document>"#
    );

    let mut buffer = Cursor::new(Vec::new());
    {
        let mut zip = ZipWriter::new(&mut buffer);
        let options = SimpleFileOptions::default();
        let parts = [
            ("[Content_Types].xml", CONTENT_TYPES.to_string()),
            ("_rels/.rels", PACKAGE_RELS.to_string()),
            ("word/_rels/document.xml.rels", DOCUMENT_RELS.to_string()),
            ("word/document.xml", document),
            ("word/styles.xml", styles_xml(styles)),
            ("docProps/core.xml", core_xml(metadata, title)),
        ];
        for (name, content) in parts {
            zip.start_file(name, options)?;
            zip.write_all(content.as_bytes())?;
        }
        zip.finish()?;
    }
    Ok(buffer.into_inner())
}

/// Writes sections as `.docx` packages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DocxWriter;

impl ContainerWriter for DocxWriter {
    fn format(&self) -> OutputFormat {
        OutputFormat::Docx
    }

    fn encode_section(&self, section: &Section, metadata: &ExportMetadata) -> Result<Vec<u8>> {
        let mut styles = BTreeSet::from(["Normal".to_string()]);
        let body = section_body(section, &mut styles);
        package(&body, &styles, metadata, &section.title)
    }

    /// One heading per section, separated by page breaks.
    fn encode_combined(&self, sections: &[Section], metadata: &ExportMetadata) -> Result<Vec<u8>> {
        let mut styles = BTreeSet::from(["Normal".to_string()]);
        let mut body = String::new();
        for (i, section) in sections.iter().enumerate() {
            if i > 0 {
                body.push_str(PAGE_BREAK);
            }
            body.push_str(&section_body(section, &mut styles));
        }
        let title = metadata.title.as_deref().unwrap_or_default();
        package(&body, &styles, metadata, title)
    }
}
