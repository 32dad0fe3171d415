//! Command-line interface for tocsplit.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::analyzer::{AnalysisReport, TocAnalyzer};
use crate::config::{sanitize_filename, SplitConfig};
use crate::error::Result;
#[cfg(not(feature = "docx"))]
use crate::error::TocSplitError;
use crate::export::{write_atomic, OutputFormat};
use crate::source::load_document;
use crate::splitter::{split_source, split_source_combined};

/// tocsplit - Detect the table of contents of EPUB/DOCX files and split them.
#[derive(Parser)]
#[command(name = "tocsplit")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze the heading structure and recommend a split level.
    Analyze {
        /// Source document (.docx, .epub, .xhtml, .html)
        file: PathBuf,

        /// Print the report as YAML instead of text
        #[arg(long)]
        yaml: bool,

        /// Also write the YAML report to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also write the report as a Word document to this file
        #[arg(long, value_name = "PATH")]
        docx: Option<PathBuf>,
    },

    /// Split a document into one file per section.
    Split {
        /// Source document (.docx, .epub, .xhtml, .html)
        file: PathBuf,

        /// Heading level to split on (default: recommended level)
        #[arg(short, long)]
        level: Option<u32>,

        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Output directory (default: output/)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// File name pattern with {index} and {title} placeholders
        #[arg(short, long)]
        pattern: Option<String>,

        /// Maximum length of the title part of file names
        #[arg(long)]
        max_length: Option<usize>,

        /// Copy text only, dropping run formatting and styles
        #[arg(long)]
        plain: bool,

        /// Write all sections into a single file
        #[arg(long)]
        combined: bool,

        /// YAML file with split settings; flags override it
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            file,
            yaml,
            output,
            docx,
        } => analyze_command(&file, yaml, output.as_deref(), docx.as_deref()),
        Commands::Split {
            file,
            level,
            format,
            output,
            pattern,
            max_length,
            plain,
            combined,
            config,
        } => {
            let overrides = SplitOverrides {
                level,
                format,
                output,
                pattern,
                max_length,
                plain,
            };
            split_command(&file, config.as_deref(), overrides, combined)
        }
    }
}

/// Command-line values that take precedence over the configuration file.
#[derive(Debug, Default)]
struct SplitOverrides {
    level: Option<u32>,
    format: Option<OutputFormat>,
    output: Option<PathBuf>,
    pattern: Option<String>,
    max_length: Option<usize>,
    plain: bool,
}

impl SplitOverrides {
    fn apply(self, mut config: SplitConfig) -> SplitConfig {
        if let Some(level) = self.level {
            config = config.with_split_level(level);
        }
        if let Some(format) = self.format {
            config = config.with_output_format(format);
        }
        if let Some(output) = self.output {
            config = config.with_output_directory(output);
        }
        if let Some(pattern) = self.pattern {
            config = config.with_filename_pattern(pattern);
        }
        if let Some(max_length) = self.max_length {
            config = config.with_max_filename_length(max_length);
        }
        if self.plain {
            config = config.with_preserve_formatting(false);
        }
        config
    }
}

fn spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

#[cfg(feature = "docx")]
fn report_docx(report: &AnalysisReport) -> Result<Vec<u8>> {
    report.to_docx()
}

#[cfg(not(feature = "docx"))]
fn report_docx(_report: &AnalysisReport) -> Result<Vec<u8>> {
    Err(TocSplitError::unsupported_format(
        "docx",
        "built without the `docx` feature",
    ))
}

/// Execute the analyze command.
fn analyze_command(
    file: &Path,
    yaml: bool,
    output: Option<&Path>,
    docx: Option<&Path>,
) -> Result<()> {
    let document = load_document(file)?;
    let report = TocAnalyzer::standard().analyze(&document).report();

    if yaml {
        print!("{}", report.to_yaml()?);
    } else {
        println!("{} {}", style("Analysis of").bold(), style(file.display()).cyan());
        println!();
        print!("{}", report.render_text());
    }

    if let Some(path) = output {
        write_atomic(path, report.to_yaml()?.as_bytes())?;
        if !yaml {
            println!();
            println!("{} {}", style("Report saved to:").green().bold(), path.display());
        }
    }

    if let Some(path) = docx {
        write_atomic(path, &report_docx(&report)?)?;
        if !yaml {
            println!("{} {}", style("Word report saved to:").green().bold(), path.display());
        }
    }

    Ok(())
}

/// Execute the split command.
fn split_command(
    file: &Path,
    config_file: Option<&Path>,
    overrides: SplitOverrides,
    combined: bool,
) -> Result<()> {
    let base = match config_file {
        Some(path) => SplitConfig::from_yaml_file(path)?,
        None => SplitConfig::default(),
    };
    let explicit_level = overrides.level.is_some() || config_file.is_some();
    let mut config = overrides.apply(base);

    println!("{} {}", style("Splitting").bold(), style(file.display()).cyan());
    println!();

    let pb = spinner();
    pb.set_message("Loading document...");
    let document = match load_document(file) {
        Ok(document) => document,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e);
        }
    };

    pb.set_message("Detecting headings...");
    let analysis = TocAnalyzer::standard().analyze(&document);
    if !explicit_level {
        config = config.with_split_level(analysis.recommended_split_level);
    }

    pb.set_message(format!("Writing {} files...", config.output_format));
    let result = if combined {
        let stem_source = document
            .title()
            .map(str::to_string)
            .or_else(|| file.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .unwrap_or_default();
        let stem = sanitize_filename(&stem_source, config.max_filename_length);
        split_source_combined(&document, &analysis, &config, &stem).map(|path| vec![path])
    } else {
        split_source(&document, &analysis, &config)
    };
    pb.finish_and_clear();
    let written = result?;

    println!("  Headings: {}", analysis.entries.len());
    println!(
        "  Split level: {}{}",
        style(config.split_level).green(),
        if explicit_level { "" } else { " (recommended)" }
    );
    println!("  Files: {}", written.len());
    println!();
    for path in &written {
        println!("{} {}", style("Wrote").green().bold(), path.display());
    }

    Ok(())
}
