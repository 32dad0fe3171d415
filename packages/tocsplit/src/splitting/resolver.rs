//! Split point resolution: entries to contiguous ranges.

use crate::config::validate_split_level;
use crate::error::Result;
use crate::types::{SplitRange, TocEntry};

/// Partition `[0, document_length)` at the entries of `split_level`.
///
/// Each split-level entry closes the previous range and opens one titled
/// with its text; deeper and shallower entries fold into the range that
/// contains them. Content before the first split-level entry becomes an
/// untitled leading range. Without any split-level entry the result is a
/// single untitled range over the whole document.
///
/// Positions past the end of the document are clamped to its length.
///
/// # Examples
/// ```
/// use tocsplit::splitting::resolve_split_points;
/// use tocsplit::types::{DetectionMethod, SplitRange, TocEntry};
///
/// let entries = vec![
///     TocEntry::new("Intro", 1, 0, DetectionMethod::StyleName),
///     TocEntry::new("A", 2, 10, DetectionMethod::StyleName),
///     TocEntry::new("Next", 1, 30, DetectionMethod::StyleName),
/// ];
/// let ranges = resolve_split_points(&entries, 1, 40).unwrap();
///
/// assert_eq!(
///     ranges,
///     vec![SplitRange::new(0, 30, "Intro"), SplitRange::new(30, 40, "Next")]
/// );
/// ```
pub fn resolve_split_points(
    entries: &[TocEntry],
    split_level: u32,
    document_length: usize,
) -> Result<Vec<SplitRange>> {
    validate_split_level(split_level)?;

    let cuts: Vec<&TocEntry> = entries.iter().filter(|e| e.level == split_level).collect();
    let Some(first) = cuts.first() else {
        tracing::debug!(split_level, "no entries at split level, keeping document whole");
        return Ok(vec![SplitRange::new(0, document_length, "")]);
    };

    let clamp = |position: usize| position.min(document_length);
    let mut ranges = Vec::with_capacity(cuts.len() + 1);

    let first_start = clamp(first.source_position);
    if first_start > 0 {
        ranges.push(SplitRange::new(0, first_start, ""));
    }

    for (i, entry) in cuts.iter().enumerate() {
        let start = clamp(entry.source_position);
        let end = cuts
            .get(i + 1)
            .map_or(document_length, |next| clamp(next.source_position));
        ranges.push(SplitRange::new(start, end, entry.text.clone()));
    }

    Ok(ranges)
}
