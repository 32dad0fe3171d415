//! Fixture builders shared by the integration tests.
//!
//! Containers are assembled on the fly so the tests carry no binary files.

#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style>
  <w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/></w:style>
  <w:style w:type="paragraph" w:styleId="Heading2"><w:name w:val="heading 2"/></w:style>
</w:styles>"#;

/// Paragraphs of the sample report: `(style id, text)`.
pub const REPORT_PARAGRAPHS: &[(&str, &str)] = &[
    ("Heading1", "Introduction"),
    ("Normal", "Welcome text."),
    ("Heading2", "Background"),
    ("Normal", "History."),
    ("Heading1", "Methods"),
    ("Normal", "We measured."),
    ("Heading1", "Results"),
    ("Normal", "It worked."),
];

/// Spine documents of the sample book: `(href, body markup)`.
pub const BOOK_CHAPTERS: &[(&str, &str)] = &[
    (
        "ch1.xhtml",
        "<h1>Chapter One</h1><p>Alpha.</p><h2>Details</h2><p>Beta.</p>",
    ),
    ("ch2.xhtml", "<h1>Chapter Two</h1><p>Gamma.</p>"),
    ("ch3.xhtml", "<h1>Chapter Three</h1><p>Delta.</p>"),
];

fn write_zip(path: &Path, entries: &[(&str, String)]) {
    let file = File::create(path).expect("create fixture");
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default();
    for (name, content) in entries {
        let entry_options = if *name == "mimetype" {
            options.compression_method(CompressionMethod::Stored)
        } else {
            options
        };
        zip.start_file(*name, entry_options).expect("start entry");
        zip.write_all(content.as_bytes()).expect("write entry");
    }
    zip.finish().expect("finish archive");
}

fn paragraph_xml(style: &str, text: &str) -> String {
    format!(r#"<w:p><w:pPr><w:pStyle w:val="{style}"/></w:pPr><w:r><w:t>{text}</w:t></w:r></w:p>"#)
}

/// Write a DOCX file with the given `(style id, text)` paragraphs.
pub fn write_docx(path: &Path, title: &str, paragraphs: &[(&str, &str)]) {
    let body: String = paragraphs
        .iter()
        .map(|(style, text)| paragraph_xml(style, text))
        .collect();
    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="{W_NS}"><w:body>{body}</w:body></w:document>"#
    );
    let core = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/"><dc:title>{title}</dc:title></cp:coreProperties>"#
    );

    write_zip(
        path,
        &[
            ("word/document.xml", document),
            ("word/styles.xml", STYLES_XML.to_string()),
            ("docProps/core.xml", core),
        ],
    );
}

/// Write the sample report as DOCX.
pub fn write_report_docx(path: &Path) {
    write_docx(path, "Annual Report", REPORT_PARAGRAPHS);
}

fn chapter_xhtml(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<html xmlns="http://www.w3.org/1999/xhtml"><head><title>chapter</title></head><body>{body}</body></html>"#
    )
}

/// Write an EPUB whose spine lists `chapters` in order, plus a navigation
/// document that must stay out of the spine.
pub fn write_epub(path: &Path, title: &str, chapters: &[(&str, &str)]) {
    let container = r#"<?xml version="1.0"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles><rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/></rootfiles>
</container>"#;

    let mut manifest = String::from(
        r#"<item id="nav" href="nav.xhtml" media-type="application/xhtml+xml" properties="nav"/>"#,
    );
    let mut spine = String::from(r#"<itemref idref="nav"/>"#);
    for (i, (href, _)) in chapters.iter().enumerate() {
        manifest.push_str(&format!(
            r#"<item id="c{i}" href="{href}" media-type="application/xhtml+xml"/>"#
        ));
        spine.push_str(&format!(r#"<itemref idref="c{i}"/>"#));
    }
    let opf = format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="3.0" unique-identifier="id">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
    <dc:title>{title}</dc:title><dc:creator>Test Author</dc:creator><dc:language>en</dc:language>
  </metadata>
  <manifest>{manifest}</manifest>
  <spine>{spine}</spine>
</package>"#
    );

    let names: Vec<String> = chapters.iter().map(|(href, _)| format!("OEBPS/{href}")).collect();
    let mut entries = vec![
        ("mimetype", "application/epub+zip".to_string()),
        ("META-INF/container.xml", container.to_string()),
        ("OEBPS/content.opf", opf),
        (
            "OEBPS/nav.xhtml",
            chapter_xhtml("<nav><ol><li>Contents</li></ol></nav><h1>Table of Contents</h1>"),
        ),
    ];
    for ((_, body), name) in chapters.iter().zip(&names) {
        entries.push((name.as_str(), chapter_xhtml(body)));
    }
    write_zip(path, &entries);
}

/// Write the sample book as EPUB.
pub fn write_book_epub(path: &Path) {
    write_epub(path, "Sample Book", BOOK_CHAPTERS);
}
