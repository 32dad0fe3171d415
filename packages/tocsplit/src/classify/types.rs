//! Types for heading style classification.

use regex::Regex;

/// Heuristic rule mapping style names that match `pattern` to `level`.
#[derive(Debug, Clone)]
pub struct StyleRule {
    /// Short label for diagnostics (e.g. "chapter").
    pub name: String,

    /// Pattern tested against the whole style name.
    pub pattern: Regex,

    /// Level assigned on match.
    pub level: u32,
}

impl StyleRule {
    /// Create a rule from an already compiled pattern.
    #[must_use]
    pub fn new(name: impl Into<String>, pattern: Regex, level: u32) -> Self {
        Self {
            name: name.into(),
            pattern,
            level,
        }
    }

    /// Compile a rule from a pattern string.
    pub fn from_pattern(
        name: impl Into<String>,
        pattern: &str,
        level: u32,
    ) -> Result<Self, regex::Error> {
        Ok(Self::new(name, Regex::new(pattern)?, level))
    }

    /// Check whether the rule applies to a style name.
    #[must_use]
    pub fn matches(&self, style_name: &str) -> bool {
        self.pattern.is_match(style_name)
    }
}
