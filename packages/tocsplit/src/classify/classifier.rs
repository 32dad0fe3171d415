//! Heading classifier: style name to heading level.

use std::collections::BTreeMap;

use super::registry::StyleTable;

/// Maps paragraph style names to heading levels.
///
/// Never fails: names that match nothing simply are not headings.
#[derive(Debug, Clone)]
pub struct HeadingClassifier {
    table: StyleTable,
}

impl HeadingClassifier {
    /// Create a classifier over a style table.
    #[must_use]
    pub fn new(table: StyleTable) -> Self {
        Self { table }
    }

    /// Classify a single style name.
    #[must_use]
    pub fn classify(&self, style_name: &str) -> Option<u32> {
        if let Some(level) = self.table.get_exact(style_name) {
            return Some(level);
        }

        self.table
            .rules()
            .iter()
            .find(|rule| rule.matches(style_name))
            .map(|rule| rule.level)
    }

    /// Classify the style names actually used in a document.
    ///
    /// Pass only styles of paragraphs with non-empty text so unused template
    /// styles are never mistaken for headings.
    pub fn detect_heading_styles<'a>(
        &self,
        used_styles: impl IntoIterator<Item = &'a str>,
    ) -> BTreeMap<String, u32> {
        let mut headings = BTreeMap::new();
        for style in used_styles {
            if headings.contains_key(style) {
                continue;
            }
            if let Some(level) = self.classify(style) {
                headings.insert(style.to_string(), level);
            }
        }
        tracing::debug!(count = headings.len(), "Classified heading styles");
        headings
    }
}

impl Default for HeadingClassifier {
    fn default() -> Self {
        Self::new(super::create_default_style_table())
    }
}
