//! XML escaping and XHTML rendering of sections.

use std::fmt::Write as _;

use super::text::heading_level;
use crate::types::{Block, Run, Section};

/// Escape text for XML element content and attribute values.
///
/// # Examples
/// ```
/// use tocsplit::export::escape_xml;
///
/// assert_eq!(escape_xml(r#"a < b & "c""#), "a &lt; b &amp; &quot;c&quot;");
/// ```
pub fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn render_run(run: &Run) -> String {
    let mut html = escape_xml(&run.text).replace('\n', "<br/>");
    if run.underline {
        html = format!("<u>{html}</u>");
    }
    if run.italic {
        html = format!("<i>{html}</i>");
    }
    if run.bold {
        html = format!("<b>{html}</b>");
    }
    html
}

/// Render a block as an XHTML element.
///
/// Heading blocks are demoted one level below the section title.
pub(crate) fn render_block(block: &Block) -> String {
    let inner: String = block.runs.iter().map(render_run).collect();
    match block.style.as_deref().and_then(heading_level) {
        Some(level) => {
            let tag = format!("h{}", (level + 1).min(6));
            format!("<{tag}>{inner}</{tag}>")
        }
        None => format!("<p>{inner}</p>"),
    }
}

/// Render a section as a standalone XHTML document.
pub(crate) fn section_xhtml(section: &Section, language: &str) -> String {
    let title = escape_xml(&section.title);
    let language = escape_xml(language);

    let mut body = String::new();
    if !section.title.is_empty() {
        let _ = writeln!(body, "<h1>{title}</h1>");
    }
    for block in &section.blocks {
        let _ = writeln!(body, "{}", render_block(block));
    }

    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml" xmlns:epub="http://www.idpf.org/2007/ops" xml:lang="{language}" lang="{language}">
<head>
<title>{title}</title>
</head>
<body>
{body}</body>
</html>
"#
    )
}
