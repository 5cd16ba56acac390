//! Command-line interface definitions.
//!
//! Global options (verbosity, color, progress, error format, config file)
//! apply to both subcommands; the filtering and hashing options are shared
//! through [`CommonArgs`].
//!
//! # Example
//!
//! ```bash
//! # Find duplicates inside one tree
//! hdcleaner scan ~/Pictures
//!
//! # Which files on the laptop are already in the archive?
//! hdcleaner reconcile --master /mnt/archive --client ~/Pictures --output json
//!
//! # Ignore small files, include dotfiles
//! hdcleaner scan ~/Downloads --min-size 1MiB --include-hidden
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Duplicate file finder and master/client reconciler.
///
/// Files are compared by size first and by BLAKE3 content hash second, so
/// only files that could possibly be identical are ever read.
#[derive(Debug, Parser)]
#[command(name = "hdcleaner")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Do not show progress bars
    #[arg(long, global = true)]
    pub no_progress: bool,

    /// Print errors as JSON objects on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Configuration file (default: platform config dir, hdcleaner/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Find groups of identical files under one directory
    Scan(ScanArgs),
    /// Find client files that already exist in a master collection
    Reconcile(ReconcileArgs),
}

impl Commands {
    /// Options shared by every subcommand.
    #[must_use]
    pub fn common(&self) -> &CommonArgs {
        match self {
            Self::Scan(args) => &args.common,
            Self::Reconcile(args) => &args.common,
        }
    }
}

/// Arguments for the scan subcommand.
#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Directory path to scan for duplicates
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Arguments for the reconcile subcommand.
#[derive(Debug, Args)]
pub struct ReconcileArgs {
    /// Trusted collection; its files are never reported
    #[arg(long, value_name = "PATH")]
    pub master: PathBuf,

    /// Collection checked against the master
    #[arg(long, value_name = "PATH")]
    pub client: PathBuf,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Filtering, hashing and output options.
///
/// Options left unset fall back to the configuration file, then to the
/// environment, then to built-in defaults.
#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Minimum file size to consider (e.g., 1KB, 1MB, 1GB)
    ///
    /// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB, TB, TiB
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub min_size: Option<u64>,

    /// Also compare hidden files, VCS metadata and OS metadata files
    #[arg(long)]
    pub include_hidden: bool,

    /// Follow symbolic links while enumerating
    ///
    /// Warning: May cause infinite loops if symlinks form cycles.
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Number of I/O threads for hashing (default: 4)
    ///
    /// Lower values reduce disk thrashing on HDDs.
    #[arg(long, value_name = "N")]
    pub io_threads: Option<usize>,

    /// Read buffer size for hashing (default: 64KiB)
    #[arg(long, value_name = "SIZE", value_parser = parse_chunk_size)]
    pub chunk_size: Option<usize>,
}

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable report
    Text,
    /// JSON output for scripting
    Json,
    /// CSV output for spreadsheets
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

/// Parse a human-readable size string into bytes.
///
/// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB, TB, TiB
/// Case-insensitive. Numbers without suffix are treated as bytes.
///
/// # Examples
///
/// ```
/// use hdcleaner::cli::parse_size;
///
/// assert_eq!(parse_size("1024").unwrap(), 1024);
/// assert_eq!(parse_size("1KB").unwrap(), 1000);
/// assert_eq!(parse_size("1KiB").unwrap(), 1024);
/// assert_eq!(parse_size("1.5MiB").unwrap(), 1_572_864);
/// ```
///
/// # Errors
///
/// Returns an error if the string is empty, contains an invalid number,
/// a negative number, or an unknown size suffix.
pub fn parse_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Size cannot be empty".to_string());
    }
    if s.starts_with('-') {
        return Err("Size cannot be negative".to_string());
    }

    let split = s
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(s.len());
    let (num_str, suffix) = s.split_at(split);

    let num: f64 = num_str
        .parse()
        .map_err(|_| format!("Invalid number: '{num_str}'"))?;

    let multiplier: u64 = match suffix.trim().to_ascii_uppercase().as_str() {
        "" | "B" => 1,
        "KB" | "K" => 1_000,
        "KIB" => 1 << 10,
        "MB" | "M" => 1_000_000,
        "MIB" => 1 << 20,
        "GB" | "G" => 1_000_000_000,
        "GIB" => 1 << 30,
        "TB" | "T" => 1_000_000_000_000,
        "TIB" => 1 << 40,
        other => return Err(format!("Unknown size suffix: '{other}'")),
    };

    Ok((num * multiplier as f64) as u64)
}

/// Parse a read chunk size: a [`parse_size`] value of at least one byte.
///
/// # Errors
///
/// Returns an error for unparsable, zero or oversized values.
pub fn parse_chunk_size(s: &str) -> Result<usize, String> {
    let bytes = parse_size(s)?;
    if bytes == 0 {
        return Err("Chunk size must be at least 1 byte".to_string());
    }
    usize::try_from(bytes).map_err(|_| format!("Chunk size too large: {bytes}"))
}
