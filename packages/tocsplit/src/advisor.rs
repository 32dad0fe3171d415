//! Split level recommendation.

use crate::config::{MAX_CHAPTER_COUNT, MIN_CHAPTER_COUNT, MIN_SUBSECTION_COUNT};
use crate::types::LevelStatistics;

/// Trait for split level policies.
///
/// Implementations look only at level counts and must be total: empty
/// statistics still produce a level.
pub trait SplitLevelPolicy {
    /// Recommend the level to cut on.
    fn recommend(&self, stats: &LevelStatistics) -> u32;
}

/// Policy that aims for a reasonable number of chapters.
///
/// First matching rule wins:
/// 1. 3 to 20 level-1 headings: level 1.
/// 2. Fewer than 3 level-1 headings but more than 5 at level 2: level 2.
/// 3. More than 20 level-1 headings: level 2.
/// 4. Otherwise level 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChapterCountPolicy {
    pub min_chapters: usize,
    pub max_chapters: usize,
    pub min_subsections: usize,
}

impl Default for ChapterCountPolicy {
    fn default() -> Self {
        Self {
            min_chapters: MIN_CHAPTER_COUNT,
            max_chapters: MAX_CHAPTER_COUNT,
            min_subsections: MIN_SUBSECTION_COUNT,
        }
    }
}

impl SplitLevelPolicy for ChapterCountPolicy {
    fn recommend(&self, stats: &LevelStatistics) -> u32 {
        if stats.is_empty() {
            return 1;
        }

        let chapters = stats.count(1);
        let subsections = stats.count(2);

        if (self.min_chapters..=self.max_chapters).contains(&chapters) {
            1
        } else if chapters < self.min_chapters && subsections > self.min_subsections {
            2
        } else if chapters > self.max_chapters {
            if subsections == 0 {
                tracing::warn!(
                    chapters,
                    "many level-1 headings but none at level 2; splitting at level 2 yields a single section"
                );
            }
            2
        } else {
            1
        }
    }
}

/// Recommend a split level with the default [`ChapterCountPolicy`].
///
/// # Examples
/// ```
/// use tocsplit::advisor::recommend_split_level;
/// use tocsplit::types::LevelStatistics;
///
/// assert_eq!(recommend_split_level(&LevelStatistics::default()), 1);
/// ```
pub fn recommend_split_level(stats: &LevelStatistics) -> u32 {
    ChapterCountPolicy::default().recommend(stats)
}
