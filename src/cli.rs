//! Command-line interface for pycefrl.

use std::fs::File;
use std::io::{self, BufWriter, IsTerminal, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use crate::catalog::ConstructKind;
use crate::config::{self, Config};
use crate::report::{self, Format};
use crate::run::AnalysisRun;
use crate::source::{DirectorySource, FileSource};

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Python code level analyzer.
///
/// Grades the syntactic constructs of Python source files on a CEFR-style
/// A1..C2 scale, from simple lists and loops up to comprehensions and
/// generator expressions.
#[derive(Parser)]
#[command(name = "pycefrl")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Level the Python files under a path
    #[command(visible_alias = "scan")]
    Analyze(AnalyzeArgs),
    /// Write a default configuration file
    Init(InitArgs),
    /// List the monitored constructs
    Catalog(CatalogArgs),
}

/// Arguments for the analyze command.
#[derive(Parser)]
pub struct AnalyzeArgs {
    /// Path to analyze (file or directory)
    pub path: PathBuf,

    /// Repository identifier (default: the directory name)
    #[arg(short, long)]
    pub repo: Option<String>,

    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format: pretty, json, csv, or summary
    #[arg(short, long, default_value = "pretty")]
    pub format: String,

    /// Worker threads (0 = one per CPU)
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Exit non-zero when any file could not be analyzed
    #[arg(long)]
    pub strict: bool,

    /// Debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Arguments for the init command.
#[derive(Parser)]
pub struct InitArgs {
    /// Output file path
    #[arg(short, long, default_value = "pycefrl.yaml")]
    pub output: PathBuf,
}

/// Arguments for the catalog command.
#[derive(Parser)]
pub struct CatalogArgs {
    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

/// Install the stderr log subscriber. `RUST_LOG` overrides the default
/// filter.
pub fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("pycefrl=debug,warn")
        } else {
            EnvFilter::new("pycefrl=info,warn")
        }
    });

    // A second call (e.g. from tests) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_target(false))
        .with(filter)
        .try_init();
}

fn progress_bar(len: usize, visible: bool) -> anyhow::Result<ProgressBar> {
    if !visible {
        return Ok(ProgressBar::hidden());
    }
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );
    Ok(pb)
}

/// Run the analyze command.
pub fn run_analyze(args: &AnalyzeArgs) -> anyhow::Result<i32> {
    init_logging(args.verbose);

    let format = match Format::parse(&args.format) {
        Some(f) => f,
        None => {
            eprintln!(
                "Error: invalid format {:?}, must be 'pretty', 'json', 'csv', or 'summary'",
                args.format
            );
            return Ok(EXIT_ERROR);
        }
    };

    let cwd = std::env::current_dir()?;
    let config = match Config::load(args.config.as_deref(), &cwd) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return Ok(EXIT_ERROR);
        }
    };

    if !args.path.exists() {
        eprintln!("Error: cannot access path {:?}", args.path);
        return Ok(EXIT_ERROR);
    }

    let mut source = DirectorySource::new(&args.path)
        .include_hidden(config.include_hidden)
        .exclude(&config.excluded_paths)?;
    if let Some(repo) = args.repo.as_ref().or(config.repository.as_ref()) {
        source = source.repository(repo);
    }

    let entries = source.entries()?;
    if entries.is_empty() {
        eprintln!("Warning: no Python files to analyze");
    }
    tracing::debug!(
        repository = source.repository_name(),
        files = entries.len(),
        "collected sources"
    );

    let jobs = args.jobs.unwrap_or(config.jobs);
    let show_progress = format == Format::Pretty && args.output.is_none() && io::stderr().is_terminal();
    let pb = progress_bar(entries.len(), show_progress)?;

    let run = AnalysisRun::new().jobs(jobs);
    let report = run.run_with_progress(&entries, &|entry| {
        pb.set_message(entry.file.clone());
        pb.inc(1);
    });
    pb.finish_and_clear();

    let path_str = args.path.to_string_lossy().to_string();
    match &args.output {
        Some(path) => {
            let file = File::create(path)?;
            let mut out = BufWriter::new(file);
            report::write_report(&mut out, format, &path_str, &report)?;
            out.flush()?;
            eprintln!("Wrote {} report to {}", format, path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            report::write_report(&mut out, format, &path_str, &report)?;
        }
    }

    if args.strict && !report.failures.is_empty() {
        Ok(EXIT_FAILED)
    } else {
        Ok(EXIT_SUCCESS)
    }
}

/// Run the init command.
pub fn run_init(args: &InitArgs) -> anyhow::Result<i32> {
    if args.output.exists() {
        eprintln!("Error: file already exists: {}", args.output.display());
        eprintln!("Remove it or use --output to specify a different path");
        return Ok(EXIT_ERROR);
    }

    // Create output directory if needed
    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() && parent != Path::new(".") {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("Error: failed to create directory: {}", e);
                return Ok(EXIT_ERROR);
            }
        }
    }

    if let Err(e) = config::write_default(&args.output) {
        eprintln!("Error: {:#}", e);
        return Ok(EXIT_ERROR);
    }

    println!("Created {}", args.output.display());
    println!();
    println!("Next steps:");
    println!("  1. Edit {} to customize for your project", args.output.display());
    println!("  2. Run: pycefrl analyze . --config {}", args.output.display());

    Ok(EXIT_SUCCESS)
}

/// Run the catalog command.
pub fn run_catalog(args: &CatalogArgs) -> anyhow::Result<i32> {
    if args.json {
        let rows: Vec<serde_json::Value> = ConstructKind::ALL
            .iter()
            .map(|kind| {
                serde_json::json!({
                    "kind": kind.as_str(),
                    "group": kind.group().as_str(),
                    "node_kinds": kind.node_kinds(),
                    "leveled": kind.has_rule(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(EXIT_SUCCESS);
    }

    println!("{:<16} {:<22} {:<8} NODE KINDS", "GROUP", "KIND", "LEVELED");
    for kind in ConstructKind::ALL {
        println!(
            "{:<16} {:<22} {:<8} {}",
            kind.group().as_str(),
            kind.as_str(),
            if kind.has_rule() { "yes" } else { "no" },
            kind.node_kinds().join(", ")
        );
    }
    Ok(EXIT_SUCCESS)
}
