//! Command-line interface for statute conversion.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::akn::section_to_akn;
use crate::config::validate_date;
use crate::convert::convert_section;
use crate::error::{AtlasError, Result};
use crate::profile::JurisdictionProfile;
use crate::types::{Citation, SectionInput};

/// Statute Atlas - Convert extracted statute text to Akoma Ntoso XML.
#[derive(Parser)]
#[command(name = "statute-atlas")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert one plain-text section file to Akoma Ntoso XML.
    Convert {
        /// Path to the extracted plain-text section
        input: PathBuf,

        /// Jurisdiction code (e.g., pa)
        #[arg(short, long)]
        jurisdiction: String,

        /// Section designator (e.g., 72-3116)
        #[arg(short, long)]
        section: String,

        /// Display name of the containing title/chapter
        #[arg(short, long, default_value = "")]
        title: String,

        /// Section heading, if known
        #[arg(long)]
        heading: Option<String>,

        /// Source URL recorded in the document metadata
        #[arg(long, default_value = "")]
        source_url: String,

        /// Retrieval date in YYYY-MM-DD format (default: today)
        #[arg(short, long)]
        date: Option<String>,

        /// Jurisdiction profile YAML (default: built-in letter/decimal/roman)
        #[arg(short, long)]
        profile: Option<PathBuf>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Convert a directory of .txt section files; file stems are used as
    /// section designators.
    Batch {
        /// Directory containing .txt section files
        input_dir: PathBuf,

        /// Jurisdiction code (e.g., pa)
        #[arg(short, long)]
        jurisdiction: String,

        /// Display name of the containing title/chapter
        #[arg(short, long, default_value = "")]
        title: String,

        /// Retrieval date in YYYY-MM-DD format (default: today)
        #[arg(short, long)]
        date: Option<String>,

        /// Jurisdiction profile YAML (default: built-in letter/decimal/roman)
        #[arg(short, long)]
        profile: Option<PathBuf>,

        /// Output directory for .xml files
        #[arg(short, long)]
        output: PathBuf,
    },
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            input,
            jurisdiction,
            section,
            title,
            heading,
            source_url,
            date,
            profile,
            output,
        } => convert_command(
            &input,
            &jurisdiction,
            &section,
            &title,
            heading,
            &source_url,
            date.as_deref(),
            profile.as_deref(),
            output.as_deref(),
        ),
        Commands::Batch {
            input_dir,
            jurisdiction,
            title,
            date,
            profile,
            output,
        } => batch_command(
            &input_dir,
            &jurisdiction,
            &title,
            date.as_deref(),
            profile.as_deref(),
            &output,
        ),
    }
}

/// Parse the retrieval date option, defaulting to today.
fn retrieval_date(date: Option<&str>) -> Result<NaiveDate> {
    let date_str = date
        .map(String::from)
        .unwrap_or_else(|| chrono::Local::now().format("%Y-%m-%d").to_string());
    validate_date(&date_str)?;
    NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")
        .map_err(|_| AtlasError::InvalidDate(date_str))
}

/// Load the profile from a YAML file, or fall back to the default preset.
fn load_profile(path: Option<&Path>) -> Result<JurisdictionProfile> {
    match path {
        Some(p) => JurisdictionProfile::from_yaml_file(p),
        None => Ok(JurisdictionProfile::letter_decimal_roman()),
    }
}

#[allow(clippy::too_many_arguments)]
fn convert_command(
    input: &Path,
    jurisdiction: &str,
    section: &str,
    title: &str,
    heading: Option<String>,
    source_url: &str,
    date: Option<&str>,
    profile: Option<&Path>,
    output: Option<&Path>,
) -> Result<()> {
    let retrieved_at = retrieval_date(date)?;
    let profile = load_profile(profile)?;
    let citation = Citation::new(jurisdiction, section)?;

    let raw_text = fs::read_to_string(input)?;
    let section_input = SectionInput {
        raw_text,
        citation,
        title_name: title.to_string(),
        heading,
        source_url: source_url.to_string(),
        retrieved_at,
        effective_date: None,
    };

    let section = convert_section(&section_input, &profile)?;
    // Tie the generation date to the retrieval date so re-running the
    // conversion yields byte-identical output.
    let xml = section_to_akn(&section, retrieved_at)?;

    match output {
        Some(path) => {
            fs::write(path, &xml)?;
            println!(
                "{} {}",
                style("Saved to:").green().bold(),
                path.display()
            );
        }
        None => println!("{xml}"),
    }

    Ok(())
}

fn batch_command(
    input_dir: &Path,
    jurisdiction: &str,
    title: &str,
    date: Option<&str>,
    profile: Option<&Path>,
    output: &Path,
) -> Result<()> {
    let retrieved_at = retrieval_date(date)?;
    let profile = load_profile(profile)?;

    if !output.is_dir() {
        return Err(AtlasError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Output directory does not exist: {}", output.display()),
        )));
    }

    let mut files: Vec<PathBuf> = fs::read_dir(input_dir)?
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "txt"))
        .collect();
    files.sort();

    println!(
        "{} {} sections from {}",
        style("Converting").bold(),
        style(files.len()).cyan(),
        input_dir.display()
    );

    let pb = ProgressBar::new(files.len() as u64);
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{bar:40.green/dim} {pos}/{len} {msg}")
            .expect("valid template"),
    );

    let mut failed = 0usize;
    for path in &files {
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        pb.set_message(stem.to_string());

        match convert_one(path, stem, jurisdiction, title, retrieved_at, &profile) {
            Ok(xml) => {
                fs::write(output.join(format!("{stem}.xml")), xml)?;
            }
            Err(e) => {
                failed += 1;
                pb.println(format!(
                    "{} {stem}: {e}",
                    style("failed").red().bold()
                ));
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    println!(
        "{} {} converted, {} failed",
        style("Done:").green().bold(),
        files.len() - failed,
        failed
    );

    Ok(())
}

fn convert_one(
    path: &Path,
    section: &str,
    jurisdiction: &str,
    title: &str,
    retrieved_at: NaiveDate,
    profile: &JurisdictionProfile,
) -> Result<String> {
    let raw_text = fs::read_to_string(path)?;
    let section_input = SectionInput {
        raw_text,
        citation: Citation::new(jurisdiction, section)?,
        title_name: title.to_string(),
        heading: None,
        source_url: String::new(),
        retrieved_at,
        effective_date: None,
    };
    let section = convert_section(&section_input, profile)?;
    section_to_akn(&section, retrieved_at)
}
