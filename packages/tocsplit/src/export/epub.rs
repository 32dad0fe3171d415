//! EPUB 3 writer.

use std::fmt::Write as _;
use std::io::{Cursor, Write};

use chrono::Utc;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::markup::{escape_xml, section_xhtml};
use super::{ContainerWriter, ExportMetadata, OutputFormat};
use crate::error::Result;
use crate::types::Section;

const DEFAULT_TITLE: &str = "Split Document";
const DEFAULT_LANGUAGE: &str = "ja";
const DEFAULT_CREATOR: &str = "Unknown";

const CONTAINER_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#;

fn chapter_file(index: usize) -> String {
    format!("chapter_{index}.xhtml")
}

/// Label shown in the navigation document for a section.
fn nav_label(section: &Section, index: usize) -> String {
    if section.title.is_empty() {
        format!("Section {index}")
    } else {
        section.title.clone()
    }
}

fn content_opf(sections: &[Section], title: &str, language: &str, creator: &str) -> String {
    let now = Utc::now();
    let identifier = format!("tocsplit_{}", now.format("%Y%m%d_%H%M%S"));
    let modified = now.format("%Y-%m-%dT%H:%M:%SZ");

    let mut manifest = String::new();
    let mut spine = String::new();
    for index in 1..=sections.len() {
        let _ = writeln!(
            manifest,
            r#"    <item id="chapter_{index}" href="{}" media-type="application/xhtml+xml"/>"#,
            chapter_file(index)
        );
        let _ = writeln!(spine, r#"    <itemref idref="chapter_{index}"/>"#);
    }

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="3.0" unique-identifier="book-id">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
    <dc:identifier id="book-id">{identifier}</dc:identifier>
    <dc:title>{title}</dc:title>
    <dc:language>{language}</dc:language>
    <dc:creator>{creator}</dc:creator>
    <meta property="dcterms:modified">{modified}</meta>
  </metadata>
  <manifest>
    <item id="nav" href="nav.xhtml" media-type="application/xhtml+xml" properties="nav"/>
{manifest}  </manifest>
  <spine>
{spine}  </spine>
</package>
"#,
        title = escape_xml(title),
        language = escape_xml(language),
        creator = escape_xml(creator),
    )
}

fn nav_xhtml(sections: &[Section], title: &str, language: &str) -> String {
    let mut items = String::new();
    for (i, section) in sections.iter().enumerate() {
        let _ = writeln!(
            items,
            r#"      <li><a href="{}">{}</a></li>"#,
            chapter_file(i + 1),
            escape_xml(&nav_label(section, i + 1))
        );
    }
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml" xmlns:epub="http://www.idpf.org/2007/ops" xml:lang="{language}" lang="{language}">
<head><title>{title}</title></head>
<body>
  <nav epub:type="toc" id="toc">
    <h1>{title}</h1>
    <ol>
{items}    </ol>
  </nav>
</body>
</html>
"#,
        title = escape_xml(title),
        language = escape_xml(language),
    )
}

/// Build the archive. `mimetype` goes first and uncompressed.
fn package(sections: &[Section], metadata: &ExportMetadata, fallback_title: &str) -> Result<Vec<u8>> {
    let title = metadata
        .title
        .as_deref()
        .filter(|t| !t.is_empty())
        .unwrap_or(fallback_title);
    let language = metadata.language.as_deref().unwrap_or(DEFAULT_LANGUAGE);
    let creator = metadata.creator.as_deref().unwrap_or(DEFAULT_CREATOR);

    let mut buffer = Cursor::new(Vec::new());
    {
        let mut zip = ZipWriter::new(&mut buffer);
        let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        let deflated = SimpleFileOptions::default();

        zip.start_file("mimetype", stored)?;
        zip.write_all(b"application/epub+zip")?;

        zip.start_file("META-INF/container.xml", deflated)?;
        zip.write_all(CONTAINER_XML.as_bytes())?;

        zip.start_file("OEBPS/content.opf", deflated)?;
        zip.write_all(content_opf(sections, title, language, creator).as_bytes())?;

        zip.start_file("OEBPS/nav.xhtml", deflated)?;
        zip.write_all(nav_xhtml(sections, title, language).as_bytes())?;

        for (i, section) in sections.iter().enumerate() {
            zip.start_file(format!("OEBPS/{}", chapter_file(i + 1)), deflated)?;
            zip.write_all(section_xhtml(section, language).as_bytes())?;
        }
        zip.finish()?;
    }
    Ok(buffer.into_inner())
}

/// Writes sections as EPUB 3 books, one chapter per section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EpubWriter;

impl ContainerWriter for EpubWriter {
    fn format(&self) -> OutputFormat {
        OutputFormat::Epub
    }

    fn encode_section(&self, section: &Section, metadata: &ExportMetadata) -> Result<Vec<u8>> {
        let fallback = if section.title.is_empty() {
            DEFAULT_TITLE
        } else {
            section.title.as_str()
        };
        let section_metadata = ExportMetadata {
            title: Some(fallback.to_string()),
            ..metadata.clone()
        };
        package(std::slice::from_ref(section), &section_metadata, DEFAULT_TITLE)
    }

    fn encode_combined(&self, sections: &[Section], metadata: &ExportMetadata) -> Result<Vec<u8>> {
        package(sections, metadata, DEFAULT_TITLE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::epub::{rootfile_path, PackageDocument};
    use crate::source::MarkupDocument;
    use crate::source::MarkupPart;
    use crate::types::{Block, Run};
    use std::io::Read;
    use zip::ZipArchive;

    fn read_part(bytes: &[u8], name: &str) -> String {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut content = String::new();
        archive.by_name(name).unwrap().read_to_string(&mut content).unwrap();
        content
    }

    fn sections() -> Vec<Section> {
        vec![
            Section::new("One", vec![Block::new(0, None, vec![Run::plain("first")])]),
            Section::new("Two <2>", vec![Block::new(5, None, vec![Run::plain("second")])]),
        ]
    }

    #[test]
    fn test_mimetype_first_and_stored() {
        let bytes = EpubWriter.encode_combined(&sections(), &ExportMetadata::default()).unwrap();
        let mut archive = ZipArchive::new(Cursor::new(&bytes[..])).unwrap();
        let first = archive.by_index(0).unwrap();

        assert_eq!(first.name(), "mimetype");
        assert_eq!(first.compression(), CompressionMethod::Stored);
    }

    #[test]
    fn test_combined_spine_matches_sections() {
        let bytes = EpubWriter.encode_combined(&sections(), &ExportMetadata::default()).unwrap();
        let opf_path = rootfile_path(&read_part(&bytes, "META-INF/container.xml")).unwrap();
        let package = PackageDocument::parse(&read_part(&bytes, &opf_path), &opf_path).unwrap();

        assert_eq!(package.title.as_deref(), Some(DEFAULT_TITLE));
        assert_eq!(package.language.as_deref(), Some(DEFAULT_LANGUAGE));
        assert_eq!(
            package.spine,
            vec!["OEBPS/chapter_1.xhtml".to_string(), "OEBPS/chapter_2.xhtml".to_string()]
        );
    }

    #[test]
    fn test_chapters_parse_as_markup() {
        let bytes = EpubWriter.encode_combined(&sections(), &ExportMetadata::default()).unwrap();
        let chapter = read_part(&bytes, "OEBPS/chapter_2.xhtml");
        let doc = MarkupDocument {
            parts: vec![MarkupPart::new("chapter_2.xhtml", &chapter)],
            ..MarkupDocument::default()
        };
        let texts: Vec<String> = doc.blocks().iter().map(Block::text).collect();
        assert_eq!(texts, vec!["Two <2>", "second"]);
    }

    #[test]
    fn test_section_uses_its_title() {
        let metadata = ExportMetadata::default().with_title("Whole Book");
        let bytes = EpubWriter.encode_section(&sections()[0], &metadata).unwrap();
        let opf = read_part(&bytes, "OEBPS/content.opf");
        assert!(opf.contains("<dc:title>One</dc:title>"));
    }
}
