//! EPUB loading: container, package document and spine.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use zip::ZipArchive;

use super::markup::{MarkupDocument, MarkupPart};
use super::read_entry;
use crate::error::{Result, TocSplitError};
use crate::xml::{element_children, find_by_path, find_child, get_tag_name, get_text, parse_document};

pub const CONTAINER_PART: &str = "META-INF/container.xml";

/// Metadata and reading order from an OPF package document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageDocument {
    pub title: Option<String>,
    pub creator: Option<String>,
    pub language: Option<String>,
    /// Archive paths of the spine documents in reading order.
    pub spine: Vec<String>,
}

impl PackageDocument {
    /// Parse an OPF document located at `opf_path` inside the archive.
    ///
    /// Navigation documents are left out of the spine.
    pub fn parse(xml: &str, opf_path: &str) -> Result<Self> {
        let doc = parse_document(xml)?;
        let package = doc.root_element();
        let base = opf_path.rsplit_once('/').map_or("", |(dir, _)| dir);

        let metadata_text = |tag: &str| {
            find_child(package, "metadata")
                .and_then(|m| find_child(m, tag))
                .map(get_text)
                .filter(|t| !t.is_empty())
        };

        let mut manifest: HashMap<&str, (&str, &str)> = HashMap::new();
        if let Some(items) = find_child(package, "manifest") {
            for item in element_children(items).filter(|n| get_tag_name(*n) == "item") {
                if let (Some(id), Some(href)) = (item.attribute("id"), item.attribute("href")) {
                    manifest.insert(id, (href, item.attribute("properties").unwrap_or_default()));
                }
            }
        }

        let spine_node = find_child(package, "spine").ok_or_else(|| TocSplitError::MissingPart {
            part: "spine".to_string(),
            context: opf_path.to_string(),
        })?;

        let spine = element_children(spine_node)
            .filter(|n| get_tag_name(*n) == "itemref")
            .filter_map(|itemref| {
                let idref = itemref.attribute("idref")?;
                let Some((href, properties)) = manifest.get(idref) else {
                    tracing::warn!(idref, "spine item missing from manifest");
                    return None;
                };
                if properties.split_whitespace().any(|p| p == "nav") {
                    return None;
                }
                Some(resolve_href(base, href))
            })
            .collect();

        Ok(Self {
            title: metadata_text("title"),
            creator: metadata_text("creator"),
            language: metadata_text("language"),
            spine,
        })
    }
}

/// Path of the first rootfile declared in `META-INF/container.xml`.
pub fn rootfile_path(container_xml: &str) -> Result<String> {
    let doc = parse_document(container_xml)?;
    find_by_path(doc.root_element(), "rootfiles/rootfile")
        .and_then(|n| n.attribute("full-path"))
        .map(str::to_string)
        .ok_or_else(|| TocSplitError::MissingPart {
            part: "rootfile".to_string(),
            context: CONTAINER_PART.to_string(),
        })
}

/// Resolve an href relative to a directory inside the archive.
///
/// # Examples
/// ```
/// use tocsplit::source::epub::resolve_href;
///
/// assert_eq!(resolve_href("OEBPS", "text/ch1.xhtml"), "OEBPS/text/ch1.xhtml");
/// assert_eq!(resolve_href("OEBPS/text", "../ch2.xhtml#top"), "OEBPS/ch2.xhtml");
/// assert_eq!(resolve_href("", "ch3.xhtml"), "ch3.xhtml");
/// ```
pub fn resolve_href(base: &str, href: &str) -> String {
    let href = href.split('#').next().unwrap_or_default();
    let mut segments: Vec<&str> = base.split('/').filter(|s| !s.is_empty()).collect();
    for segment in href.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// Load an `.epub` file as a markup document in spine order.
///
/// Spine documents that are missing or do not parse are skipped with a
/// warning. A missing container or package document makes the whole source
/// [`TocSplitError::SourceUnreadable`].
pub fn load_epub(path: &Path) -> Result<MarkupDocument> {
    read_epub(path).map_err(|e| TocSplitError::unreadable(path, e))
}

fn read_epub(path: &Path) -> Result<MarkupDocument> {
    let file = File::open(path)?;
    let mut archive = ZipArchive::new(BufReader::new(file))?;

    let container = read_entry(&mut archive, CONTAINER_PART)?;
    let opf_path = rootfile_path(&container)?;
    let opf = read_entry(&mut archive, &opf_path)?;
    let package = PackageDocument::parse(&opf, &opf_path)?;

    let mut parts = Vec::with_capacity(package.spine.len());
    for href in &package.spine {
        let content = match read_entry(&mut archive, href) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(href = %href, error = %e, "skipping unreadable spine item");
                continue;
            }
        };
        let part = MarkupPart::new(href.clone(), &content);
        if let Err(e) = parse_document(&part.content) {
            tracing::warn!(href = %href, error = %e, "skipping malformed spine item");
            continue;
        }
        parts.push(part);
    }

    tracing::debug!(
        path = %path.display(),
        spine = package.spine.len(),
        parts = parts.len(),
        "loaded epub"
    );

    Ok(MarkupDocument {
        title: package.title,
        creator: package.creator,
        language: package.language,
        parts,
    })
}
