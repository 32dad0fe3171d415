//! Heading text normalization.

use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static CHAPTER_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^第(\d+)章\s*").expect("valid regex"));

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static NUMBER_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\.(?:\s+|(\D))").expect("valid regex"));

/// Collapse whitespace runs to single spaces and trim.
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RUN.replace_all(text, " ").trim().to_string()
}

/// Normalize heading text.
///
/// Whitespace is collapsed, the text is NFC-normalized, a `第N章` prefix is
/// followed by exactly one ideographic space and an `N.` prefix by exactly
/// one ASCII space (`1.2` style numbers are left alone). Returns `None` when one character or less remains.
///
/// # Examples
/// ```
/// use tocsplit::detect::clean_heading_text;
///
/// assert_eq!(clean_heading_text("第1章はじめに").as_deref(), Some("第1章　はじめに"));
/// assert_eq!(clean_heading_text("  2.Scope \n of work").as_deref(), Some("2. Scope of work"));
/// assert_eq!(clean_heading_text(" x "), None);
/// ```
pub fn clean_heading_text(raw: &str) -> Option<String> {
    let collapsed = collapse_whitespace(raw);
    let normalized: String = collapsed.nfc().collect();
    let text = CHAPTER_PREFIX.replace(&normalized, "第${1}章\u{3000}");
    let text = NUMBER_PREFIX.replace(&text, "${1}. ${2}");
    let text = text.trim_end();

    (text.chars().count() > 1).then(|| text.to_string())
}
