//! Text helpers shared by the writers.

use textwrap::{fill, Options};

use crate::source::markup::BLOCK_TAGS;

/// Wrap a paragraph at `width` columns.
///
/// Text that already fits, or that contains line breaks of its own, is
/// returned unchanged.
pub fn wrap_text(text: &str, width: usize) -> String {
    if text.chars().count() <= width || text.contains('\n') {
        return text.to_string();
    }
    fill(text, &Options::new(width))
}

/// Heading level implied by a block style, if any.
///
/// Understands markup tags (`h2`) and word-processor style names
/// (`Heading 2`, `Title`, `Subtitle`).
///
/// # Examples
/// ```
/// use tocsplit::export::heading_level;
///
/// assert_eq!(heading_level("h3"), Some(3));
/// assert_eq!(heading_level("Heading 2"), Some(2));
/// assert_eq!(heading_level("Normal"), None);
/// ```
pub fn heading_level(style: &str) -> Option<u32> {
    if let Some(n) = style.strip_prefix('h') {
        return n.parse().ok().filter(|n| (1..=6).contains(n));
    }
    if let Some(n) = style.strip_prefix("Heading ") {
        return n.trim().parse().ok().filter(|n| *n >= 1);
    }
    match style {
        "Title" => Some(1),
        "Subtitle" => Some(2),
        _ => None,
    }
}

/// Word-processor paragraph style for a block style.
///
/// Markup tags map to `Heading N` or `Normal`; named styles pass through.
pub fn paragraph_style_name(style: Option<&str>) -> String {
    match style {
        None => "Normal".to_string(),
        Some(tag) if BLOCK_TAGS.contains(&tag) => match heading_level(tag) {
            Some(level) => format!("Heading {level}"),
            None => "Normal".to_string(),
        },
        Some(name) => name.to_string(),
    }
}
