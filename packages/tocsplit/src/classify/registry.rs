//! Style table: exact style names plus ordered heuristic rules.

use std::collections::HashMap;

use super::types::StyleRule;

/// Immutable lookup data for [`super::HeadingClassifier`].
///
/// Exact names take priority over rules; rules are evaluated in
/// registration order and the first match wins.
#[derive(Debug, Clone, Default)]
pub struct StyleTable {
    exact: HashMap<String, u32>,
    rules: Vec<StyleRule>,
}

impl StyleTable {
    /// Create a new empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Map a style name to a level.
    pub fn register_exact(&mut self, name: impl Into<String>, level: u32) {
        self.exact.insert(name.into(), level);
    }

    /// Append a heuristic rule after all existing rules.
    pub fn add_rule(&mut self, rule: StyleRule) {
        self.rules.push(rule);
    }

    /// Builder form of [`Self::register_exact`].
    #[must_use]
    pub fn with_exact(mut self, name: impl Into<String>, level: u32) -> Self {
        self.register_exact(name, level);
        self
    }

    /// Builder form of [`Self::add_rule`].
    #[must_use]
    pub fn with_rule(mut self, rule: StyleRule) -> Self {
        self.add_rule(rule);
        self
    }

    /// Get the level for an exact style name.
    #[must_use]
    pub fn get_exact(&self, name: &str) -> Option<u32> {
        self.exact.get(name).copied()
    }

    /// Heuristic rules in evaluation order.
    #[must_use]
    pub fn rules(&self) -> &[StyleRule] {
        &self.rules
    }
}
