//! Command-line interface for the splitter.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, Subcommand};
use console::style;

use crate::config::{is_affirmative, validate_mode, MODE_PROMPT};
use crate::error::{Result, SplitError};
use crate::partition::partition;
use crate::types::{Mode, PartitionReport};

/// zipsplit - Split an XML register export by postal-code range.
#[derive(Parser)]
#[command(name = "zipsplit")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase log output (-v for info, -vv for debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Split an XML file into one file per postal-code range.
    Split {
        /// Input XML file
        input: PathBuf,

        /// Output directory (created if missing)
        #[arg(short, long)]
        output: PathBuf,

        /// 0 keeps CDATA sections, 1 writes plain re-indented XML (asked when omitted)
        #[arg(short, long, allow_hyphen_values = true)]
        mode: Option<String>,

        /// Replace an existing output directory without asking
        #[arg(short, long)]
        force: bool,
    },
}

/// Run the CLI.
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Split {
            input,
            output,
            mode,
            force,
        } => {
            let stdin = io::stdin();
            let mut answers = stdin.lock();
            let mut out = io::stdout();
            split_command(&input, &output, mode.as_deref(), force, &mut answers, &mut out)
        }
    }
}

/// Execute the split command.
///
/// Questions are read from `answers` and everything user-facing goes to
/// `out`.
pub fn split_command<R: BufRead, W: Write>(
    input: &Path,
    output_dir: &Path,
    mode: Option<&str>,
    force: bool,
    answers: &mut R,
    out: &mut W,
) -> Result<()> {
    // Mode first: an invalid mode must not touch the output directory
    let mode = match mode {
        Some(code) => validate_mode(code)?,
        None => prompt_mode(answers, out)?,
    };

    if output_dir.exists() {
        if !output_dir.is_dir() {
            return Err(SplitError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Output path is not a directory: {}", output_dir.display()),
            )));
        }
        if !force && !confirm_overwrite(output_dir, answers, out)? {
            writeln!(out, "Exiting without overwriting the directory.")?;
            return Ok(());
        }
        tracing::info!(dir = %output_dir.display(), "Clearing existing output directory");
        fs::remove_dir_all(output_dir)?;
    }

    writeln!(
        out,
        "{} {} (mode {}, {})",
        style("Splitting").bold(),
        style(input.display()).cyan(),
        mode.code(),
        mode.as_str()
    )?;

    let report = partition(input, output_dir, mode)?;
    print_summary(&report, output_dir, out)?;
    Ok(())
}

/// Ask for the output mode.
pub fn prompt_mode<R: BufRead, W: Write>(answers: &mut R, out: &mut W) -> Result<Mode> {
    write!(out, "{MODE_PROMPT} ")?;
    out.flush()?;
    let mut line = String::new();
    answers.read_line(&mut line)?;
    validate_mode(&line)
}

/// Ask whether an existing output directory may be replaced.
pub fn confirm_overwrite<R: BufRead, W: Write>(
    dir: &Path,
    answers: &mut R,
    out: &mut W,
) -> Result<bool> {
    write!(
        out,
        "The directory '{}' already exists. Do you want to overwrite it? (yes/no): ",
        dir.display()
    )?;
    out.flush()?;
    let mut line = String::new();
    answers.read_line(&mut line)?;
    Ok(is_affirmative(&line))
}

fn print_summary<W: Write>(report: &PartitionReport, output_dir: &Path, out: &mut W) -> Result<()> {
    writeln!(out)?;
    for file in &report.files {
        writeln!(
            out,
            "  {:<22} {} records",
            file.range.file_name,
            style(file.records).green()
        )?;
    }

    if report.unmatched > 0 {
        writeln!(out, "  Outside all ranges: {}", report.unmatched)?;
    }
    if !report.issues.is_empty() {
        writeln!(
            out,
            "  Warnings: {}",
            style(report.issues.len()).yellow().bold()
        )?;
        for issue in &report.issues {
            writeln!(out, "    - {issue}")?;
        }
    }

    writeln!(out)?;
    writeln!(
        out,
        "{} {}",
        style("Saved to:").green().bold(),
        output_dir.display()
    )?;
    Ok(())
}
