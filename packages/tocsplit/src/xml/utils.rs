//! XML utility functions for navigating XHTML and OOXML trees.

use std::borrow::Cow;

use roxmltree::{Document, Node, ParsingOptions};

/// Named HTML entities that show up in EPUB content but are unknown to XML.
const HTML_ENTITIES: &[(&str, &str)] = &[
    ("&nbsp;", "&#160;"),
    ("&ensp;", "&#8194;"),
    ("&emsp;", "&#8195;"),
    ("&thinsp;", "&#8201;"),
    ("&ndash;", "&#8211;"),
    ("&mdash;", "&#8212;"),
    ("&lsquo;", "&#8216;"),
    ("&rsquo;", "&#8217;"),
    ("&ldquo;", "&#8220;"),
    ("&rdquo;", "&#8221;"),
    ("&hellip;", "&#8230;"),
    ("&middot;", "&#183;"),
    ("&copy;", "&#169;"),
    ("&reg;", "&#174;"),
    ("&sect;", "&#167;"),
    ("&laquo;", "&#171;"),
    ("&raquo;", "&#187;"),
];

/// Parse an XML or XHTML document, tolerating a DOCTYPE declaration.
pub fn parse_document(text: &str) -> Result<Document<'_>, roxmltree::Error> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    Document::parse_with_options(text, options)
}

/// Replace named HTML entities with numeric references so XHTML parses as XML.
///
/// # Examples
/// ```
/// use tocsplit::xml::replace_html_entities;
///
/// assert_eq!(replace_html_entities("a&nbsp;b"), "a&#160;b");
/// assert_eq!(replace_html_entities("plain"), "plain");
/// ```
pub fn replace_html_entities(text: &str) -> Cow<'_, str> {
    if !HTML_ENTITIES.iter().any(|(name, _)| text.contains(name)) {
        return Cow::Borrowed(text);
    }
    let mut owned = text.to_string();
    for (name, numeric) in HTML_ENTITIES {
        if owned.contains(name) {
            owned = owned.replace(name, numeric);
        }
    }
    Cow::Owned(owned)
}

/// Get the tag name without namespace prefix.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use tocsplit::xml::get_tag_name;
///
/// let xml = r#"<html xmlns="http://www.w3.org/1999/xhtml"><h1>Title</h1></html>"#;
/// let doc = Document::parse(xml).unwrap();
/// let h1 = doc.root_element().first_element_child().unwrap();
/// assert_eq!(get_tag_name(h1), "h1");
/// ```
pub fn get_tag_name<'a>(node: Node<'a, '_>) -> &'a str {
    node.tag_name().name()
}

/// Find the first child element with the given tag name.
pub fn find_child<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|child| child.is_element() && get_tag_name(*child) == tag)
}

/// Find a descendant element matching a path of tag names.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use tocsplit::xml::find_by_path;
///
/// let xml = r#"<package><metadata><title>Book</title></metadata></package>"#;
/// let doc = Document::parse(xml).unwrap();
///
/// let title = find_by_path(doc.root_element(), "metadata/title");
/// assert_eq!(title.unwrap().text(), Some("Book"));
/// ```
pub fn find_by_path<'a, 'input>(node: Node<'a, 'input>, path: &str) -> Option<Node<'a, 'input>> {
    let mut current = node;
    for part in path.split('/') {
        current = find_child(current, part)?;
    }
    Some(current)
}

/// Get the direct text content of a node, trimmed.
pub fn get_text(node: Node<'_, '_>) -> String {
    node.text()
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

/// Get all descendant text of a node in document order, untrimmed.
pub fn collect_text(node: Node<'_, '_>) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect()
}

/// Get an attribute by local name, ignoring its namespace.
///
/// OOXML puts every attribute in the `w:` namespace, which a plain
/// `node.attribute("val")` lookup does not see.
pub fn local_attribute<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.attributes()
        .find(|attr| attr.name() == name)
        .map(|attr| attr.value())
}

/// Check if an element carries `class` in its whitespace-separated class list.
pub fn has_class(node: Node<'_, '_>, class: &str) -> bool {
    node.attribute("class")
        .is_some_and(|value| value.split_whitespace().any(|c| c == class))
}

/// Get all element children of a node.
pub fn element_children<'a, 'input>(
    node: Node<'a, 'input>,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(|child| child.is_element())
}
