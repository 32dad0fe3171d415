//! PDF writer.
//!
//! Lays sections out on A4 pages with the PDF standard fonts: Helvetica for
//! text that fits WinAnsi, and a non-embedded Japanese CID font for anything
//! else. Each section starts on a new page with its title, followed by its
//! blocks. Inline run formatting is not carried over.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};

use super::text::heading_level;
use super::{ContainerWriter, ExportMetadata, OutputFormat};
use crate::error::Result;
use crate::types::{Block, Section};

const PAGE_WIDTH: f32 = 595.0;
const PAGE_HEIGHT: f32 = 842.0;
const MARGIN: f32 = 56.0;
const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;
const LINE_SPACING: f32 = 1.4;

const REGULAR_FONT: &str = "F1";
const BOLD_FONT: &str = "F2";
const CJK_FONT: &str = "F3";
const CJK_BASE_FONT: &str = "HeiseiKakuGo-W5";
const CJK_ENCODING: &str = "UniJIS-UCS2-H";

/// Font size and weight of one kind of paragraph.
#[derive(Debug, Clone, Copy)]
struct TextStyle {
    size: f32,
    bold: bool,
    space_after: f32,
}

const TITLE_STYLE: TextStyle = TextStyle {
    size: 18.0,
    bold: true,
    space_after: 12.0,
};

const HEADING_STYLE: TextStyle = TextStyle {
    size: 14.0,
    bold: true,
    space_after: 6.0,
};

const BODY_STYLE: TextStyle = TextStyle {
    size: 11.0,
    bold: false,
    space_after: 6.0,
};

fn is_win_ansi(text: &str) -> bool {
    text.chars().all(|c| (c as u32) < 0x100)
}

/// Font resource and encoded string for one line of text.
///
/// WinAnsi lines use single bytes; everything else goes to the CID font as
/// UCS-2, with characters outside the BMP replaced by `?`.
fn encode_line(line: &str, bold: bool) -> (&'static str, Object) {
    if is_win_ansi(line) {
        let bytes = line.chars().map(|c| c as u8).collect();
        let font = if bold { BOLD_FONT } else { REGULAR_FONT };
        return (font, Object::String(bytes, StringFormat::Literal));
    }
    let bytes = line
        .chars()
        .map(|c| if (c as u32) > 0xFFFF { '?' } else { c })
        .collect::<String>()
        .encode_utf16()
        .flat_map(u16::to_be_bytes)
        .collect();
    (CJK_FONT, Object::String(bytes, StringFormat::Hexadecimal))
}

/// PDF text string for the document information dictionary.
fn info_string(text: &str) -> Object {
    if text.is_ascii() {
        return Object::string_literal(text);
    }
    let mut bytes = vec![0xFE, 0xFF];
    bytes.extend(text.encode_utf16().flat_map(u16::to_be_bytes));
    Object::String(bytes, StringFormat::Hexadecimal)
}

/// Flows paragraphs top to bottom, opening pages as needed.
#[derive(Debug, Default)]
struct PageLayout {
    pages: Vec<Vec<Operation>>,
    current: Vec<Operation>,
    y: f32,
}

impl PageLayout {
    fn new() -> Self {
        Self {
            y: PAGE_HEIGHT - MARGIN,
            ..Self::default()
        }
    }

    /// Start a new page. A page with nothing drawn on it is reused.
    fn page_break(&mut self) {
        if !self.current.is_empty() {
            self.pages.push(std::mem::take(&mut self.current));
        }
        self.y = PAGE_HEIGHT - MARGIN;
    }

    fn paragraph(&mut self, text: &str, style: TextStyle) {
        let text = text.replace('\t', "    ");
        // One column is about half an em; wide characters count as two
        let columns = ((CONTENT_WIDTH / (style.size * 0.5)) as usize).max(1);
        let leading = style.size * LINE_SPACING;

        for line in textwrap::wrap(&text, columns) {
            if self.y - leading < MARGIN {
                self.page_break();
            }
            self.y -= leading;
            if !line.trim().is_empty() {
                self.show(&line, style);
            }
        }
        self.y -= style.space_after;
    }

    fn show(&mut self, line: &str, style: TextStyle) {
        let (font, string) = encode_line(line, style.bold);
        self.current.extend([
            Operation::new("BT", vec![]),
            Operation::new(
                "Tf",
                vec![Object::Name(font.as_bytes().to_vec()), Object::from(style.size)],
            ),
            Operation::new("Td", vec![Object::from(MARGIN), Object::from(self.y)]),
            Operation::new("Tj", vec![string]),
            Operation::new("ET", vec![]),
        ]);
    }

    fn section(&mut self, section: &Section) {
        if !section.title.is_empty() {
            self.paragraph(&section.title, TITLE_STYLE);
        }
        for block in &section.blocks {
            self.paragraph(&block.text(), block_style(block));
        }
    }

    /// Content of every page; an empty layout still yields one blank page.
    fn finish(mut self) -> Vec<Vec<Operation>> {
        self.page_break();
        if self.pages.is_empty() {
            self.pages.push(Vec::new());
        }
        self.pages
    }
}

fn block_style(block: &Block) -> TextStyle {
    match block.style.as_deref().and_then(heading_level) {
        Some(_) => HEADING_STYLE,
        None => BODY_STYLE,
    }
}

/// Font resources shared by every page.
fn font_resources(doc: &mut Document) -> ObjectId {
    let regular = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let bold = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });

    let descriptor = doc.add_object(dictionary! {
        "Type" => "FontDescriptor",
        "FontName" => CJK_BASE_FONT,
        "Flags" => Object::Integer(4),
        "FontBBox" => vec![
            Object::Integer(-92),
            Object::Integer(-250),
            Object::Integer(1010),
            Object::Integer(922),
        ],
        "ItalicAngle" => Object::Integer(0),
        "Ascent" => Object::Integer(880),
        "Descent" => Object::Integer(-120),
        "CapHeight" => Object::Integer(880),
        "StemV" => Object::Integer(93),
    });
    let descendant = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "CIDFontType0",
        "BaseFont" => CJK_BASE_FONT,
        "CIDSystemInfo" => dictionary! {
            "Registry" => Object::string_literal("Adobe"),
            "Ordering" => Object::string_literal("Japan1"),
            "Supplement" => Object::Integer(2),
        },
        "FontDescriptor" => descriptor,
        "DW" => Object::Integer(1000),
    });
    let cjk = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type0",
        "BaseFont" => format!("{CJK_BASE_FONT}-{CJK_ENCODING}").as_str(),
        "Encoding" => CJK_ENCODING,
        "DescendantFonts" => vec![Object::Reference(descendant)],
    });

    doc.add_object(dictionary! {
        "Font" => dictionary! {
            REGULAR_FONT => regular,
            BOLD_FONT => bold,
            CJK_FONT => cjk,
        },
    })
}

/// Assemble a document from laid-out pages.
fn render(layout: PageLayout, metadata: &ExportMetadata, title: &str) -> Result<Vec<u8>> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let resources_id = font_resources(&mut doc);

    let mut kids = Vec::new();
    for operations in layout.finish() {
        let content = Content { operations }.encode()?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => Object::Integer(count),
        "Resources" => resources_id,
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::from(PAGE_WIDTH),
            Object::from(PAGE_HEIGHT),
        ],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut info = dictionary! {
        "Producer" => Object::string_literal("tocsplit"),
    };
    if !title.is_empty() {
        info.set("Title", info_string(title));
    }
    if let Some(creator) = metadata.creator.as_deref() {
        info.set("Author", info_string(creator));
    }
    let info_id = doc.add_object(info);
    doc.trailer.set("Info", info_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)?;
    Ok(buffer)
}

/// Writes sections as PDF documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PdfWriter;

impl ContainerWriter for PdfWriter {
    fn format(&self) -> OutputFormat {
        OutputFormat::Pdf
    }

    fn encode_section(&self, section: &Section, metadata: &ExportMetadata) -> Result<Vec<u8>> {
        let mut layout = PageLayout::new();
        layout.section(section);
        render(layout, metadata, &section.title)
    }

    /// Every section starts on a new page.
    fn encode_combined(&self, sections: &[Section], metadata: &ExportMetadata) -> Result<Vec<u8>> {
        let mut layout = PageLayout::new();
        for section in sections {
            layout.page_break();
            layout.section(section);
        }
        let title = metadata.title.as_deref().unwrap_or_default();
        render(layout, metadata, title)
    }
}
