//! Hierarchy reconstruction over a flat, position-ordered entry list.

use crate::types::{LevelStatistics, TocEntry};

/// Result of a hierarchy pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HierarchySummary {
    pub level_stats: LevelStatistics,
    /// Highest level number present, 0 for an empty list.
    pub max_depth: u32,
}

/// Fill `parent_path` for every entry and summarize the levels.
///
/// Uses a stack of `(level, entry index)`: each entry pops every item whose
/// level is not strictly lower than its own, takes the remaining top as its
/// parent and is pushed. Gaps between levels (1 then 3) are allowed.
/// Running the pass again over its own output gives the same paths.
///
/// # Examples
/// ```
/// use tocsplit::hierarchy::build_hierarchy;
/// use tocsplit::types::{DetectionMethod, TocEntry};
///
/// let mut entries = vec![
///     TocEntry::new("Intro", 1, 0, DetectionMethod::StyleName),
///     TocEntry::new("Scope", 2, 1, DetectionMethod::StyleName),
/// ];
/// let summary = build_hierarchy(&mut entries);
///
/// assert_eq!(entries[1].full_path(), "Intro/Scope");
/// assert_eq!(summary.max_depth, 2);
/// ```
pub fn build_hierarchy(entries: &mut [TocEntry]) -> HierarchySummary {
    let mut stack: Vec<(u32, usize)> = Vec::new();

    for index in 0..entries.len() {
        let level = entries[index].level;
        while stack.last().is_some_and(|&(top_level, _)| top_level >= level) {
            stack.pop();
        }

        entries[index].parent_path = match stack.last() {
            Some(&(_, parent)) => entries[parent].full_path(),
            None => String::new(),
        };
        stack.push((level, index));
    }

    let level_stats = LevelStatistics::from_entries(entries);
    let max_depth = level_stats.max_level();
    tracing::debug!(entries = entries.len(), max_depth, "built hierarchy");

    HierarchySummary {
        level_stats,
        max_depth,
    }
}
