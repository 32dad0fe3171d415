//! Default style table for English and Japanese word-processor documents.

use std::sync::LazyLock;

use regex::Regex;

use super::registry::StyleTable;
use super::types::StyleRule;

/// Style names containing a subsection token.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static SUBSECTION_STYLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(subsection|小節|部)").expect("valid regex"));

/// Style names containing a chapter or section token.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static CHAPTER_STYLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(chapter|章|section|節)").expect("valid regex"));

/// Create the default style table.
///
/// ```text
/// exact   Heading 1..6      -> 1..6
///         見出し 1..3        -> 1..3
///         Title / Subtitle  -> 1 / 2
/// rules   chapter|章|section|節 -> 1
///         subsection|小節|部  -> 2
/// ```
///
/// Rules are tried in that order, so a name such as "SubSectionStyle" or
/// "小節" already matches the section token and classifies as level 1. The
/// subsection rule only decides names without a chapter or section token,
/// such as "第一部".
#[must_use]
pub fn create_default_style_table() -> StyleTable {
    let mut table = StyleTable::new();

    for level in 1..=6 {
        table.register_exact(format!("Heading {level}"), level);
    }
    for level in 1..=3 {
        table.register_exact(format!("見出し {level}"), level);
    }
    table.register_exact("Title", 1);
    table.register_exact("Subtitle", 2);

    table.add_rule(StyleRule::new("chapter", CHAPTER_STYLE.clone(), 1));
    table.add_rule(StyleRule::new("subsection", SUBSECTION_STYLE.clone(), 2));

    table
}
