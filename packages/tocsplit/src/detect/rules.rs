//! Structural selectors and heuristic numbering rules for markup detection.

use regex::Regex;
use roxmltree::Node;

use crate::config::{CHAPTER_MAX_LENGTH, SECTION_MAX_LENGTH, SUBSECTION_MAX_LENGTH};
use crate::xml::{get_tag_name, has_class};

/// A `tag` or `tag.class` selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    pub tag: String,
    pub class: Option<String>,
}

impl Selector {
    /// Parse `"h1"` or `"div.chapter"`.
    ///
    /// # Examples
    /// ```
    /// use tocsplit::detect::Selector;
    ///
    /// let selector = Selector::parse("div.chapter");
    /// assert_eq!(selector.tag, "div");
    /// assert_eq!(selector.class.as_deref(), Some("chapter"));
    /// ```
    #[must_use]
    pub fn parse(selector: &str) -> Self {
        match selector.split_once('.') {
            Some((tag, class)) => Self {
                tag: tag.to_string(),
                class: Some(class.to_string()),
            },
            None => Self {
                tag: selector.to_string(),
                class: None,
            },
        }
    }

    pub fn matches(&self, node: Node<'_, '_>) -> bool {
        node.is_element()
            && get_tag_name(node) == self.tag
            && self.class.as_deref().map_or(true, |c| has_class(node, c))
    }
}

/// Selectors that all map to one heading level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorGroup {
    pub level: u32,
    pub selectors: Vec<Selector>,
}

impl SelectorGroup {
    #[must_use]
    pub fn new(level: u32, selectors: &[&str]) -> Self {
        Self {
            level,
            selectors: selectors.iter().map(|s| Selector::parse(s)).collect(),
        }
    }

    pub fn matches(&self, node: Node<'_, '_>) -> bool {
        self.selectors.iter().any(|s| s.matches(node))
    }
}

/// A numbering pattern that marks a text block as a heading.
#[derive(Debug, Clone)]
pub struct HeuristicRule {
    pub name: String,
    pub pattern: Regex,
    pub level: u32,
    /// Matching text must be strictly shorter than this many characters.
    pub max_length: usize,
}

impl HeuristicRule {
    pub fn new(
        name: impl Into<String>,
        pattern: &str,
        level: u32,
        max_length: usize,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            name: name.into(),
            pattern: Regex::new(pattern)?,
            level,
            max_length,
        })
    }
}

/// Default selector groups, most significant level first.
#[must_use]
pub fn default_selector_groups() -> Vec<SelectorGroup> {
    vec![
        SelectorGroup::new(1, &["h1", "div.chapter", "div.section1"]),
        SelectorGroup::new(2, &["h2", "div.section", "div.section2"]),
        SelectorGroup::new(3, &["h3", "div.subsection", "div.section3"]),
    ]
}

/// Default heuristic rules, tried in order: chapter, section, subsection.
#[must_use]
#[allow(clippy::expect_used)] // Static patterns that are guaranteed to be valid
pub fn default_heuristic_rules() -> Vec<HeuristicRule> {
    vec![
        HeuristicRule::new(
            "chapter",
            r"(?i)(第\d+章|Chapter\s+\d+|CHAPTER\s+\d+)",
            1,
            CHAPTER_MAX_LENGTH,
        )
        .expect("valid regex"),
        HeuristicRule::new("section", r"(\d+\.\d+|\d+－\d+|§\d+)", 2, SECTION_MAX_LENGTH)
            .expect("valid regex"),
        HeuristicRule::new(
            "subsection",
            r"(\d+\.\d+\.\d+|\(\d+\))",
            3,
            SUBSECTION_MAX_LENGTH,
        )
        .expect("valid regex"),
    ]
}
