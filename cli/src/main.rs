//! mdreport CLI - Markdown to print-ready HTML reports

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use mdreport::{ConvertOptions, Converter, JsonFormat, Report};

#[derive(Parser)]
#[command(name = "mdreport")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Turn copy-pasted Markdown into clean, print-ready HTML", long_about = None)]
struct Cli {
    /// Input Markdown file
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output HTML file
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    #[command(flatten)]
    pipeline: PipelineArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a Markdown file to an HTML report
    Convert {
        /// Input Markdown file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Write a complete HTML page with styles
        #[arg(long, conflicts_with = "json")]
        standalone: bool,

        /// Write the full report as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        pipeline: PipelineArgs,
    },

    /// Print the extracted title
    Title {
        /// Input Markdown file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Print the cleaned Markdown without rendering it
    Normalize {
        /// Input Markdown file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        #[command(flatten)]
        pipeline: PipelineArgs,
    },

    /// Convert many files in parallel
    Batch {
        /// Input Markdown files
        #[arg(value_name = "FILES", required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: PathBuf,

        /// Write complete HTML pages with styles
        #[arg(long)]
        standalone: bool,

        #[command(flatten)]
        pipeline: PipelineArgs,
    },

    /// Show version information
    Version,
}

/// Switches shared by every converting command.
#[derive(Args, Clone, Default)]
struct PipelineArgs {
    /// JSON options file (camelCase keys)
    #[arg(long, value_name = "FILE", env = "MDREPORT_CONFIG")]
    config: Option<PathBuf>,

    /// Keep backslash escapes as written
    #[arg(long)]
    no_fix_escapes: bool,

    /// Leave footnote references and definitions alone
    #[arg(long)]
    no_footnotes: bool,

    /// Do not turn glyph bullets into list items
    #[arg(long)]
    no_smart_lists: bool,

    /// Transliterate to the GSM character set
    #[arg(long)]
    strip_unicode: bool,

    /// Apply Google Docs export fixes
    #[arg(long)]
    fix_gdocs: bool,
}

impl PipelineArgs {
    /// Options from the config file, with flags applied on top.
    fn options(&self) -> mdreport::Result<ConvertOptions> {
        let mut options = match &self.config {
            Some(path) => ConvertOptions::from_path(path)?,
            None => ConvertOptions::default(),
        };
        if self.no_fix_escapes {
            options = options.with_fix_escapes(false);
        }
        if self.no_footnotes {
            options = options.with_footnotes(false);
        }
        if self.no_smart_lists {
            options = options.with_smart_lists(false);
        }
        if self.strip_unicode {
            options = options.with_preserve_unicode(false);
        }
        if self.fix_gdocs {
            options = options.with_fix_gdocs(true);
        }
        Ok(options)
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Convert {
            input,
            output,
            standalone,
            json,
            pipeline,
        }) => cmd_convert(&input, output.as_deref(), standalone, json, &pipeline),
        Some(Commands::Title { input }) => cmd_title(&input),
        Some(Commands::Normalize {
            input,
            output,
            pipeline,
        }) => cmd_normalize(&input, output.as_deref(), &pipeline),
        Some(Commands::Batch {
            inputs,
            output,
            standalone,
            pipeline,
        }) => cmd_batch(&inputs, &output, standalone, &pipeline),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: convert if input is provided
            if let Some(input) = cli.input {
                cmd_convert(&input, cli.output.as_deref(), false, false, &cli.pipeline)
            } else {
                println!("{}", "Usage: mdreport <FILE> [OUTPUT]".yellow());
                println!("       mdreport --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn cmd_convert(
    input: &Path,
    output: Option<&Path>,
    standalone: bool,
    json: bool,
    pipeline: &PipelineArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let markdown = fs::read_to_string(input)?;
    let converter = Converter::new(pipeline.options()?);
    let report = converter.convert(&markdown)?;
    log::info!("{}: {}", input.display(), report.stats);

    let content = if json {
        report.to_json(JsonFormat::Pretty)?
    } else {
        render_output(&report, standalone)
    };

    if let Some(path) = output {
        fs::write(path, &content)?;
        println!("{} {}", "Saved to".green(), path.display());
        print_stats(&report);
    } else {
        println!("{}", content);
    }

    Ok(())
}

fn cmd_title(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let markdown = fs::read_to_string(input)?;
    let split = mdreport::extract_title(&mdreport::normalize_markdown_spacing(&markdown));
    println!("{}", split.title);
    Ok(())
}

fn cmd_normalize(
    input: &Path,
    output: Option<&Path>,
    pipeline: &PipelineArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let markdown = fs::read_to_string(input)?;
    let cleaned = mdreport::preprocess(&markdown, &pipeline.options()?);

    if let Some(path) = output {
        fs::write(path, &cleaned)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        print!("{}", cleaned);
    }

    Ok(())
}

fn cmd_batch(
    inputs: &[PathBuf],
    output_dir: &Path,
    standalone: bool,
    pipeline: &PipelineArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    fs::create_dir_all(output_dir)?;
    let converter = Converter::new(pipeline.options()?);

    let pb = ProgressBar::new(inputs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let results: Vec<(PathBuf, Result<PathBuf, String>)> = inputs
        .par_iter()
        .map(|input| {
            let outcome = convert_file(&converter, input, output_dir, standalone)
                .map_err(|e| e.to_string());
            pb.inc(1);
            (input.clone(), outcome)
        })
        .collect();
    pb.finish_with_message("Done!");

    println!("\n{}", "Output files:".green().bold());
    let mut failed = 0;
    for (index, (input, outcome)) in results.iter().enumerate() {
        let branch = if index + 1 == results.len() { "└─" } else { "├─" };
        match outcome {
            Ok(path) => println!("  {} {}", branch.dimmed(), path.display()),
            Err(e) => {
                failed += 1;
                println!("  {} {} {}", branch.dimmed(), input.display(), e.red());
            }
        }
    }

    if failed > 0 {
        return Err(format!("{} of {} files failed", failed, inputs.len()).into());
    }
    Ok(())
}

fn convert_file(
    converter: &Converter,
    input: &Path,
    output_dir: &Path,
    standalone: bool,
) -> Result<PathBuf, Box<dyn std::error::Error + Send + Sync>> {
    let markdown = fs::read_to_string(input)?;
    let report = converter.convert(&markdown)?;
    let path = output_path(input, output_dir);
    fs::write(&path, render_output(&report, standalone))?;
    Ok(path)
}

/// `<dir>/<stem>.html` for an input file.
fn output_path(input: &Path, output_dir: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    output_dir.join(format!("{}.html", stem))
}

fn render_output(report: &Report, standalone: bool) -> String {
    if standalone {
        report.standalone_html()
    } else {
        report.html.clone()
    }
}

fn print_stats(report: &Report) {
    let stats = &report.stats;
    println!("{}: {}", "Title".bold(), report.title);
    println!(
        "{}: {} references, {} definitions",
        "Footnotes".bold(),
        stats.footnote_references,
        stats.footnote_definitions
    );
    if stats.missing_definitions > 0 {
        println!(
            "{}: {}",
            "Missing definitions".yellow().bold(),
            stats.missing_definitions
        );
    }
    println!(
        "{}: {} formatted, {} skipped",
        "Tables".bold(),
        stats.tables_processed,
        stats.tables_skipped
    );
    println!("{}: {}", "Words".bold(), stats.word_count);
}

fn cmd_version() {
    println!("{} {}", "mdreport".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Markdown to print-ready HTML reports");
    println!();
    println!("Repository: {}", "https://github.com/iyulab/mdreport".dimmed());
    println!("License: MIT");
}
