//! `json-merge` - reconcile two JSON-like documents from the command line.
//!
//! Usage:
//!   json-merge merge a.json b.yaml --truth b --format json --out merged.json
//!   json-merge diff a.json b.json
//!   json-merge fix broken.json
//!   json-merge index doc.json
//!
//! Documents go to stdout unless `--out` is given; logs go to stderr.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use json_merge::formats::DocType;
use json_merge::json_cli::{
    diff_report, fix_text, index_listing, init_logging, load_document, merge_files, CliError,
    MergeOutput,
};
use json_merge::session::SessionOptions;
use json_merge::types::Side;
use json_merge_path::SortOrder;

#[derive(Parser, Debug)]
#[command(name = "json-merge")]
#[command(about = "Path-addressed reconciliation of two JSON-like documents")]
#[command(version)]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Auto-merge two documents and print the Result
    Merge(MergeArgs),
    /// List leaf paths that differ, one `status<TAB>path` per line
    Diff { a: PathBuf, b: PathBuf },
    /// Repair a JSON file (curly quotes, single quotes) and pretty-print it
    Fix { file: PathBuf },
    /// Print the offset index of a JSON file
    Index { file: PathBuf },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TruthArg {
    A,
    B,
}

impl From<TruthArg> for Side {
    fn from(t: TruthArg) -> Self {
        match t {
            TruthArg::A => Side::A,
            TruthArg::B => Side::B,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SortArg {
    Asc,
    Desc,
}

impl From<SortArg> for SortOrder {
    fn from(s: SortArg) -> Self {
        match s {
            SortArg::Asc => SortOrder::Asc,
            SortArg::Desc => SortOrder::Desc,
        }
    }
}

#[derive(clap::Args, Debug)]
struct MergeArgs {
    /// Source document A
    a: PathBuf,
    /// Source document B
    b: PathBuf,

    /// Side that wins conflicting leaves
    #[arg(long)]
    truth: Option<TruthArg>,

    /// Compact JSON output
    #[arg(long)]
    minify: bool,

    /// Key order used by flat output
    #[arg(long)]
    sort: Option<SortArg>,

    /// Output format: json, yaml, xml or csv
    #[arg(long, default_value = "json")]
    format: DocType,

    /// Print `path = value` lines instead of a document
    #[arg(long)]
    flat: bool,

    /// Keep only branches leading to differing leaves
    #[arg(long)]
    only_diff: bool,

    /// JSON file with session options; flags override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the Result here instead of stdout
    #[arg(short, long)]
    out: Option<PathBuf>,
}

impl MergeArgs {
    fn session_options(&self) -> Result<SessionOptions, CliError> {
        let mut options = match &self.config {
            Some(path) => SessionOptions::load(path)?,
            None => SessionOptions::default(),
        };
        if let Some(truth) = self.truth {
            options.truth = truth.into();
        }
        if let Some(sort) = self.sort {
            options.sort = sort.into();
        }
        options.minify |= self.minify;
        options.only_diff |= self.only_diff;
        Ok(options)
    }
}

fn run(command: Command) -> Result<(), CliError> {
    match command {
        Command::Merge(args) => {
            let options = args.session_options()?;
            let output = MergeOutput {
                format: args.format,
                flat: args.flat,
            };
            let bytes = merge_files(&args.a, &args.b, options, output)?;
            match &args.out {
                Some(path) => std::fs::write(path, &bytes).map_err(|source| CliError::Io {
                    path: path.display().to_string(),
                    source,
                }),
                None => write_stdout(&bytes),
            }
        }
        Command::Diff { a, b } => {
            let report = diff_report(&load_document(&a)?, &load_document(&b)?);
            write_stdout(report.as_bytes())
        }
        Command::Fix { file } => {
            let text = read(&file)?;
            let mut fixed = fix_text(&text)?;
            fixed.push('\n');
            write_stdout(fixed.as_bytes())
        }
        Command::Index { file } => {
            let text = read(&file)?;
            write_stdout(index_listing(&text).as_bytes())
        }
    }
}

fn read(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.display().to_string(),
        source,
    })
}

fn write_stdout(bytes: &[u8]) -> Result<(), CliError> {
    let mut stdout = io::stdout().lock();
    stdout
        .write_all(bytes)
        .and_then(|()| stdout.flush())
        .map_err(|source| CliError::Io {
            path: "<stdout>".to_owned(),
            source,
        })
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
