//! hdcleaner - duplicate file finder and master/client reconciler
//!
//! Two operations over file catalogs, both built on the same funnel: files
//! are grouped by size, and only sizes shared by two or more candidates are
//! read and hashed with BLAKE3.
//!
//! - **scan**: groups of identical files inside one directory tree
//! - **reconcile**: client files whose content already exists in a master
//!   collection, so the client copies can be removed
//!
//! The pipelines work on a [`catalog::Catalog`], so they can be driven from a
//! directory walk or from any other source of `(path, size)` records.
//!
//! ```no_run
//! use hdcleaner::catalog::{Catalog, FilterOptions};
//! use hdcleaner::duplicates::find_duplicates;
//!
//! let catalog = Catalog::from_entries(vec![
//!     ("/data/x.txt", Some(10)),
//!     ("/data/y.txt", Some(10)),
//!     ("/data/z.txt", Some(5)),
//! ]);
//! for group in find_duplicates(&catalog, &FilterOptions::default()) {
//!     println!("{} bytes: {:?}", group.size, group.members);
//! }
//! ```

pub mod catalog;
pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

use std::io::{self, IsTerminal, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use crate::catalog::Catalog;
use crate::cli::{Cli, Commands, OutputFormat, ReconcileArgs, ScanArgs};
use crate::config::{Config, ConfigOverrides};
use crate::diagnostics::{DiagnosticSink, LogSink};
use crate::duplicates::{check_disjoint_roots, DuplicateFinder, FinderConfig, FinderError, Reconciler};
use crate::error::ExitCode;
use crate::output::{CsvOutput, JsonReconcileOutput, JsonScanOutput, ReconcileCsvOutput, TextOutput};
use crate::progress::Progress;
use crate::scanner::{canonical_root, Walker};
use crate::signal::ShutdownHandler;

/// Run the command described by `cli` and return the process exit code.
///
/// # Errors
///
/// Returns an error for configuration problems, invalid roots, a
/// disjointness violation, an interrupted run, or a failed report write.
/// [`ExitCode::from_error`] maps each to its exit code.
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);
    let shutdown = signal::install_handler()?;

    let overrides = ConfigOverrides::from(cli.command.common());
    let config = Config::load(cli.config.as_deref(), &overrides)?;

    let sink: Arc<dyn DiagnosticSink> = if cli.quiet || cli.no_progress || !io::stderr().is_terminal() {
        Arc::new(LogSink)
    } else {
        Arc::new(Progress::new())
    };
    let finder_config = config
        .finder_config()
        .with_shutdown_flag(shutdown.flag())
        .with_sink(sink);
    let color = !cli.no_color && io::stdout().is_terminal();

    match &cli.command {
        Commands::Scan(args) => run_scan(args, &config, finder_config, &shutdown, color),
        Commands::Reconcile(args) => run_reconcile(args, &config, finder_config, &shutdown, color),
    }
}

fn build_catalog(root: &Path, config: &Config, shutdown: &ShutdownHandler) -> anyhow::Result<Catalog> {
    let catalog = Walker::new(root, config.walker_config())
        .with_shutdown_flag(shutdown.flag())
        .catalog()
        .with_context(|| format!("Cannot enumerate {}", root.display()))?;
    if shutdown.is_shutdown_requested() {
        return Err(FinderError::Interrupted.into());
    }
    Ok(catalog)
}

fn run_scan(
    args: &ScanArgs,
    config: &Config,
    finder_config: FinderConfig,
    shutdown: &ShutdownHandler,
    color: bool,
) -> anyhow::Result<ExitCode> {
    let catalog = build_catalog(&args.path, config, shutdown)?;
    let (groups, summary) = DuplicateFinder::new(finder_config).find(&catalog)?;
    log::info!(
        "Found {} duplicate groups ({} reclaimable) in {:.2?}",
        summary.duplicate_groups,
        summary.reclaimable_display(),
        summary.duration
    );

    let exit_code = ExitCode::for_outcome(!groups.is_empty(), summary.has_unreadable());
    let mut stdout = io::stdout().lock();
    match args.common.output {
        OutputFormat::Text => TextOutput::new(color).write_groups(&mut stdout, &groups, &summary)?,
        OutputFormat::Json => JsonScanOutput::new(&args.path, &groups, &summary, exit_code).write_to(&mut stdout)?,
        OutputFormat::Csv => CsvOutput::new(&groups).write_to(&mut stdout)?,
    }
    stdout.flush()?;

    Ok(exit_code)
}

fn run_reconcile(
    args: &ReconcileArgs,
    config: &Config,
    finder_config: FinderConfig,
    shutdown: &ShutdownHandler,
    color: bool,
) -> anyhow::Result<ExitCode> {
    let master_root =
        canonical_root(&args.master).with_context(|| format!("Cannot enumerate {}", args.master.display()))?;
    let client_root =
        canonical_root(&args.client).with_context(|| format!("Cannot enumerate {}", args.client.display()))?;
    check_disjoint_roots(&master_root, &client_root)?;

    let master = build_catalog(&master_root, config, shutdown)?;
    let client = build_catalog(&client_root, config, shutdown)?;
    let (matches, summary) = Reconciler::new(finder_config).reconcile(&master, &client)?;
    log::info!(
        "{} client files already in master ({} reclaimable) in {:.2?}",
        summary.matched_client_files,
        summary.reclaimable_display(),
        summary.duration
    );

    let exit_code = ExitCode::for_outcome(!matches.is_empty(), summary.has_unreadable());
    let mut stdout = io::stdout().lock();
    match args.common.output {
        OutputFormat::Text => TextOutput::new(color).write_matches(&mut stdout, &matches, &summary)?,
        OutputFormat::Json => JsonReconcileOutput::new(&master_root, &client_root, &matches, &summary, exit_code)
            .write_to(&mut stdout)?,
        OutputFormat::Csv => ReconcileCsvOutput::new(&matches).write_to(&mut stdout)?,
    }
    stdout.flush()?;

    Ok(exit_code)
}
