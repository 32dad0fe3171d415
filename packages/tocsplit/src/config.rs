//! Configuration constants, split settings and file name helpers.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TocSplitError};
use crate::export::OutputFormat;

/// Default output directory for split sections.
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Default file name template: sanitized title followed by the 1-based index.
pub const DEFAULT_FILENAME_PATTERN: &str = "{title}_{index}";

/// Default maximum length (in characters) of the sanitized title part.
pub const DEFAULT_MAX_FILENAME_LENGTH: usize = 50;

/// File name used when a title sanitizes to nothing.
pub const FALLBACK_FILENAME: &str = "section";

/// Level-1 counts in `[MIN_CHAPTER_COUNT, MAX_CHAPTER_COUNT]` are a reasonable chapter count.
pub const MIN_CHAPTER_COUNT: usize = 3;

/// Above this many level-1 headings the advisor moves to level 2.
pub const MAX_CHAPTER_COUNT: usize = 20;

/// Level 2 must have strictly more entries than this to rescue a sparse level 1.
pub const MIN_SUBSECTION_COUNT: usize = 5;

/// Heuristic chapter matches must be shorter than this many characters.
pub const CHAPTER_MAX_LENGTH: usize = 100;

/// Heuristic section matches must be shorter than this many characters.
pub const SECTION_MAX_LENGTH: usize = 80;

/// Heuristic subsection matches must be shorter than this many characters.
pub const SUBSECTION_MAX_LENGTH: usize = 60;

/// Number of folded subsection titles listed per section in a split preview.
pub const PREVIEW_SUBSECTION_LIMIT: usize = 5;

/// Text wrap width for Markdown output.
pub const TEXT_WRAP_WIDTH: usize = 100;

/// Characters that are invalid in file names on at least one major platform.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static INVALID_FILENAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[<>:"/\\|?*]"#).expect("valid regex"));

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Placeholder in a file name pattern: `{index}`, `{index:02}`, `{index:03d}` or `{title}`.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([a-z_]*)(?::0?(\d+)d?)?\}").expect("valid regex"));

/// Settings for one split run.
///
/// Built once and never mutated during a run. Missing keys take their
/// defaults when loaded from YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    /// Heading level to cut on (1 = top level).
    pub split_level: u32,

    /// Descendants of the cut level stay inside their parent section.
    ///
    /// Only `true` is supported.
    pub include_subsections: bool,

    /// Copy run formatting and paragraph style names into the sections.
    pub preserve_formatting: bool,

    /// Directory that receives the written sections.
    pub output_directory: PathBuf,

    /// File name template without extension.
    pub filename_pattern: String,

    /// Maximum length of the sanitized title part of a file name.
    pub max_filename_length: usize,

    /// Target container format.
    pub output_format: OutputFormat,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            split_level: 1,
            include_subsections: true,
            preserve_formatting: true,
            output_directory: PathBuf::from(DEFAULT_OUTPUT_DIR),
            filename_pattern: DEFAULT_FILENAME_PATTERN.to_string(),
            max_filename_length: DEFAULT_MAX_FILENAME_LENGTH,
            output_format: OutputFormat::default(),
        }
    }
}

impl SplitConfig {
    /// Create a configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the split level.
    #[must_use]
    pub fn with_split_level(mut self, level: u32) -> Self {
        self.split_level = level;
        self
    }

    /// Set whether formatting is preserved.
    #[must_use]
    pub fn with_preserve_formatting(mut self, preserve: bool) -> Self {
        self.preserve_formatting = preserve;
        self
    }

    /// Set the output directory.
    #[must_use]
    pub fn with_output_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_directory = dir.into();
        self
    }

    /// Set the file name pattern.
    #[must_use]
    pub fn with_filename_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.filename_pattern = pattern.into();
        self
    }

    /// Set the maximum sanitized title length.
    #[must_use]
    pub fn with_max_filename_length(mut self, length: usize) -> Self {
        self.max_filename_length = length;
        self
    }

    /// Set the output format.
    #[must_use]
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Check that the configuration can drive a split.
    pub fn validate(&self) -> Result<()> {
        validate_split_level(self.split_level)?;
        if !self.include_subsections {
            return Err(TocSplitError::InvalidConfiguration(
                "include_subsections = false is not supported; deeper headings always stay in their section"
                    .to_string(),
            ));
        }
        if self.max_filename_length == 0 {
            return Err(TocSplitError::InvalidConfiguration(
                "max_filename_length must be at least 1".to_string(),
            ));
        }
        validate_filename_pattern(&self.filename_pattern)
    }

    /// Load and validate a configuration from a YAML file.
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Self = serde_yaml_ng::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }
}

/// Validate a split level.
///
/// # Examples
/// ```
/// use tocsplit::config::validate_split_level;
///
/// assert!(validate_split_level(1).is_ok());
/// assert!(validate_split_level(0).is_err());
/// ```
pub fn validate_split_level(level: u32) -> Result<()> {
    if level < 1 {
        return Err(TocSplitError::InvalidConfiguration(format!(
            "split level must be at least 1, got {level}"
        )));
    }
    Ok(())
}

/// Validate a file name pattern.
///
/// Accepts `{index}` (optionally zero padded, e.g. `{index:02}`) and
/// `{title}`. Path separators are rejected so sections always land in the
/// output directory.
pub fn validate_filename_pattern(pattern: &str) -> Result<()> {
    let invalid = |reason: &str| TocSplitError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: reason.to_string(),
    };

    if pattern.trim().is_empty() {
        return Err(invalid("pattern is empty"));
    }
    if pattern.contains('/') || pattern.contains('\\') {
        return Err(invalid("pattern must not contain path separators"));
    }
    for caps in PLACEHOLDER.captures_iter(pattern) {
        let name = caps.get(1).map_or("", |m| m.as_str());
        if name != "index" && name != "title" {
            return Err(invalid(&format!("unknown placeholder '{{{name}}}'")));
        }
    }
    Ok(())
}

/// Turn a section title into a safe file name component.
///
/// Invalid characters and whitespace runs become underscores, leading and
/// trailing `.`/`_` are stripped, and the result is truncated to
/// `max_length` characters. Empty results fall back to [`FALLBACK_FILENAME`].
///
/// # Examples
/// ```
/// use tocsplit::config::sanitize_filename;
///
/// assert_eq!(sanitize_filename("Ch:1/Intro*", 50), "Ch_1_Intro");
/// assert_eq!(sanitize_filename("第1章　はじめに", 50), "第1章_はじめに");
/// assert_eq!(sanitize_filename("???", 50), "section");
/// ```
pub fn sanitize_filename(title: &str, max_length: usize) -> String {
    let replaced = INVALID_FILENAME_CHARS.replace_all(title, "_");
    let replaced = WHITESPACE_RUN.replace_all(&replaced, "_");
    let stripped = replaced.trim_matches(|c| c == '.' || c == '_');

    let truncated: String = stripped.chars().take(max_length).collect();
    if truncated.is_empty() {
        FALLBACK_FILENAME.to_string()
    } else {
        truncated
    }
}

/// Interpolate a 1-based index and an already sanitized title into a pattern.
///
/// # Examples
/// ```
/// use tocsplit::config::render_filename;
///
/// assert_eq!(render_filename("{title}_{index}", 3, "Intro").unwrap(), "Intro_3");
/// assert_eq!(render_filename("{index:02}_{title}", 3, "Intro").unwrap(), "03_Intro");
/// ```
pub fn render_filename(pattern: &str, index: usize, title: &str) -> Result<String> {
    validate_filename_pattern(pattern)?;

    let rendered = PLACEHOLDER.replace_all(pattern, |caps: &regex::Captures<'_>| {
        match caps.get(1).map_or("", |m| m.as_str()) {
            "index" => {
                let width = caps
                    .get(2)
                    .and_then(|w| w.as_str().parse::<usize>().ok())
                    .unwrap_or(0);
                format!("{index:0width$}")
            }
            _ => title.to_string(),
        }
    });

    Ok(rendered.into_owned())
}
