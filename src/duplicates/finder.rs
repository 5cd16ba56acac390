//! Duplicate finder implementation.
//!
//! # Overview
//!
//! This module orchestrates the duplicate detection pipeline over a
//! [`Catalog`]:
//! 1. **Filter**: keep records passing [`FilterOptions`]; records without a
//!    size are reported as unreadable
//! 2. **Size grouping**: bucket by size and drop singleton buckets (see
//!    [`crate::duplicates::groups`])
//! 3. **Hash**: BLAKE3 every remaining record on a bounded thread pool
//! 4. **Group**: partition by `(size, digest)` and keep partitions of 2+
//!
//! The hash phase is shared with [`Reconciler`](super::Reconciler).
//!
//! # Example
//!
//! ```no_run
//! use hdcleaner::duplicates::{DuplicateFinder, FinderConfig};
//! use hdcleaner::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let catalog = Walker::new(Path::new("."), WalkerConfig::default())
//!     .catalog()
//!     .unwrap();
//!
//! let finder = DuplicateFinder::new(FinderConfig::default().with_io_threads(4));
//! let (groups, summary) = finder.find(&catalog).unwrap();
//!
//! println!("Found {} duplicate groups", groups.len());
//! println!("Reclaimable space: {}", summary.reclaimable_display());
//! ```

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytesize::ByteSize;
use rayon::prelude::*;

use super::groups::{group_by_size, sort_groups, DuplicateGroup};
use crate::catalog::{Catalog, FileRecord, FilterOptions};
use crate::diagnostics::{Diagnostic, DiagnosticSink, LogSink, Phase};
use crate::scanner::{ContentHasher, Hash, HashError, Hasher, DEFAULT_CHUNK_SIZE};

/// Default number of hashing threads.
///
/// Kept low so spinning disks are not thrashed by concurrent reads.
pub const DEFAULT_IO_THREADS: usize = 4;

/// Size above which a file is logged before hashing.
const LARGE_FILE_THRESHOLD: u64 = 100 * 1024 * 1024;

/// Configuration shared by the duplicate finder and the reconciler.
#[derive(Clone)]
pub struct FinderConfig {
    /// Number of I/O threads for parallel hashing.
    pub io_threads: usize,
    /// Read chunk size for the default hasher, in bytes.
    pub chunk_size: usize,
    /// Record filters.
    pub filter: FilterOptions,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Receiver of pipeline diagnostics.
    pub sink: Arc<dyn DiagnosticSink>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("io_threads", &self.io_threads)
            .field("chunk_size", &self.chunk_size)
            .field("filter", &self.filter)
            .field("shutdown_flag", &self.shutdown_flag.is_some())
            .finish_non_exhaustive()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            io_threads: DEFAULT_IO_THREADS,
            chunk_size: DEFAULT_CHUNK_SIZE,
            filter: FilterOptions::default(),
            shutdown_flag: None,
            sink: Arc::new(LogSink),
        }
    }
}

impl FinderConfig {
    /// Set the number of I/O threads (at least 1).
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Set the read chunk size for the default hasher.
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Set the record filters.
    #[must_use]
    pub fn with_filter(mut self, filter: FilterOptions) -> Self {
        self.filter = filter;
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the diagnostics sink.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Check if shutdown has been requested.
    pub(crate) fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Build the default streaming hasher for this configuration.
    pub(crate) fn default_hasher(&self) -> Arc<dyn ContentHasher> {
        let mut hasher = Hasher::new().with_chunk_size(self.chunk_size);
        if let Some(ref flag) = self.shutdown_flag {
            hasher = hasher.with_shutdown_flag(flag.clone());
        }
        Arc::new(hasher)
    }
}

/// Summary statistics from a duplicate search.
#[derive(Debug, Clone, Default)]
pub struct FindSummary {
    /// Number of records in the catalog
    pub total_records: usize,
    /// Number of records passing the filters (with a known size)
    pub eligible_records: usize,
    /// Number of eligible records eliminated by size grouping
    pub eliminated_by_size: usize,
    /// Number of records hashed successfully
    pub hashed_files: usize,
    /// Records excluded because they could not be stat'ed or read, sorted
    pub unreadable: Vec<PathBuf>,
    /// Number of confirmed duplicate groups
    pub duplicate_groups: usize,
    /// Total number of duplicate files (excluding one original per group)
    pub duplicate_files: usize,
    /// Total space that can be reclaimed by removing duplicates
    pub reclaimable_space: u64,
    /// Duration of the search
    pub duration: Duration,
}

impl FindSummary {
    /// Format reclaimable space as human-readable string.
    #[must_use]
    pub fn reclaimable_display(&self) -> String {
        ByteSize::b(self.reclaimable_space).to_string()
    }

    /// Whether any record was excluded as unreadable.
    #[must_use]
    pub fn has_unreadable(&self) -> bool {
        !self.unreadable.is_empty()
    }
}

/// Errors that can occur during duplicate finding.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The search was interrupted by user (Ctrl+C or shutdown signal).
    #[error("Scan interrupted by user")]
    Interrupted,
}

// ============================================================================
// Shared hash phase
// ============================================================================

/// A record that was hashed successfully.
#[derive(Debug, Clone, Copy)]
pub(crate) struct HashedRecord<'a> {
    /// Position of the record in the phase's candidate list
    pub index: usize,
    pub size: u64,
    pub record: &'a FileRecord,
    pub hash: Hash,
}

/// Result of one hash phase.
#[derive(Debug, Default)]
pub(crate) struct HashOutcome<'a> {
    pub hashed: Vec<HashedRecord<'a>>,
    pub unreadable: Vec<PathBuf>,
    pub interrupted: bool,
}

/// Split a catalog into eligible records and records with no known size.
///
/// Unsized records that would otherwise pass the visibility filter are
/// reported to the sink as unreadable.
pub(crate) fn select_eligible<'a>(
    catalog: &'a Catalog,
    filter: &FilterOptions,
    sink: &dyn DiagnosticSink,
) -> (Vec<&'a FileRecord>, Vec<PathBuf>) {
    let mut eligible = Vec::new();
    let mut no_size = Vec::new();

    for record in catalog {
        if filter.only_visible && !record.visibility.is_visible() {
            continue;
        }
        match record.size {
            Some(size) if size >= filter.min_size => eligible.push(record),
            Some(_) => {}
            None => {
                sink.report(&Diagnostic::UnreadableFile {
                    path: record.path.clone(),
                    reason: "size unavailable".to_string(),
                });
                no_size.push(record.path.clone());
            }
        }
    }

    (eligible, no_size)
}

/// Hash every candidate on a pool of `config.io_threads` threads.
///
/// Failures never abort the phase: the record is dropped and reported as
/// unreadable. A cancelled read counts as a failure.
pub(crate) fn run_hash_phase<'a>(
    candidates: Vec<(u64, &'a FileRecord)>,
    hasher: &dyn ContentHasher,
    config: &FinderConfig,
    phase: Phase,
) -> HashOutcome<'a> {
    let sink = config.sink.as_ref();
    sink.report(&Diagnostic::PhaseStarted {
        phase,
        total: candidates.len(),
    });

    log::info!(
        "Hashing {} candidate files with {} threads",
        candidates.len(),
        config.io_threads
    );

    let hash_one = |(index, (size, record)): (usize, (u64, &'a FileRecord))| {
        if config.is_shutdown_requested() {
            return (index, size, record, Err(HashError::Interrupted(record.path.clone())));
        }

        if size > LARGE_FILE_THRESHOLD {
            log::debug!(
                "Hashing large file ({} MB): {}",
                size / (1024 * 1024),
                record.path.display()
            );
        }

        let result = hasher.digest(&record.path);
        match result {
            Ok(_) => sink.report(&Diagnostic::FileHashed {
                path: record.path.clone(),
                bytes: size,
            }),
            Err(ref e) => sink.report(&Diagnostic::UnreadableFile {
                path: record.path.clone(),
                reason: e.to_string(),
            }),
        }
        (index, size, record, result)
    };

    // Build a custom thread pool with limited parallelism for I/O
    let results: Vec<(usize, u64, &'a FileRecord, Result<Hash, HashError>)> =
        match rayon::ThreadPoolBuilder::new()
            .num_threads(config.io_threads)
            .build()
        {
            Ok(pool) => pool.install(|| {
                candidates
                    .into_par_iter()
                    .enumerate()
                    .map(hash_one)
                    .collect()
            }),
            Err(e) => {
                log::warn!(
                    "Failed to create hashing thread pool ({}), using global pool with {} threads",
                    e,
                    rayon::current_num_threads()
                );
                candidates
                    .into_par_iter()
                    .enumerate()
                    .map(hash_one)
                    .collect()
            }
        };

    let mut outcome = HashOutcome::default();
    for (index, size, record, result) in results {
        match result {
            Ok(hash) => outcome.hashed.push(HashedRecord {
                index,
                size,
                record,
                hash,
            }),
            Err(_) => outcome.unreadable.push(record.path.clone()),
        }
    }

    outcome.interrupted = config.is_shutdown_requested();
    if outcome.interrupted {
        log::info!("Phase {}: Interrupted by shutdown signal", phase);
    }

    sink.report(&Diagnostic::PhaseFinished { phase });
    outcome
}

// ============================================================================
// DuplicateFinder - Pipeline Orchestrator
// ============================================================================

/// Duplicate finder that orchestrates the detection pipeline.
///
/// # Example
///
/// ```
/// use hdcleaner::catalog::Catalog;
/// use hdcleaner::duplicates::DuplicateFinder;
///
/// let finder = DuplicateFinder::with_defaults();
/// let (groups, summary) = finder.find(&Catalog::default()).unwrap();
/// assert!(groups.is_empty());
/// assert_eq!(summary.total_records, 0);
/// ```
pub struct DuplicateFinder {
    config: FinderConfig,
    hasher: Arc<dyn ContentHasher>,
}

impl DuplicateFinder {
    /// Create a new duplicate finder using the streaming BLAKE3 hasher.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        let hasher = config.default_hasher();
        Self { config, hasher }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// Create a duplicate finder with a custom content hasher.
    #[must_use]
    pub fn with_hasher(config: FinderConfig, hasher: Arc<dyn ContentHasher>) -> Self {
        Self { config, hasher }
    }

    /// The finder's configuration.
    #[must_use]
    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// Find all groups of identical files in `catalog`.
    ///
    /// Groups are ordered by descending size, ties by ascending first member
    /// path; members are sorted by path. Unreadable files are excluded and
    /// listed in the summary.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::Interrupted`] if the shutdown flag was observed.
    pub fn find(&self, catalog: &Catalog) -> Result<(Vec<DuplicateGroup>, FindSummary), FinderError> {
        let start_time = Instant::now();
        let mut summary = FindSummary {
            total_records: catalog.len(),
            ..FindSummary::default()
        };

        let (eligible, no_size) = select_eligible(catalog, &self.config.filter, self.config.sink.as_ref());
        summary.eligible_records = eligible.len();
        summary.unreadable = no_size;

        if eligible.is_empty() {
            log::info!("No eligible files to compare");
        }

        // Phase 1: size pre-filter
        let (size_groups, size_stats) = group_by_size(eligible);
        summary.eliminated_by_size = size_stats.eliminated_unique;

        let candidates: Vec<(u64, &FileRecord)> = size_groups
            .into_iter()
            .flat_map(|(size, records)| records.into_iter().map(move |r| (size, r)))
            .collect();

        // Phase 2: content hashing
        let outcome = run_hash_phase(candidates, self.hasher.as_ref(), &self.config, Phase::Grouping);
        summary.hashed_files = outcome.hashed.len();
        summary.unreadable.extend(outcome.unreadable);
        summary.unreadable.sort();

        if outcome.interrupted || self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        // Phase 3: partition by (size, digest)
        let mut by_content: HashMap<(u64, Hash), Vec<PathBuf>> = HashMap::new();
        for hashed in outcome.hashed {
            by_content
                .entry((hashed.size, hashed.hash))
                .or_default()
                .push(hashed.record.path.clone());
        }

        let mut groups: Vec<DuplicateGroup> = by_content
            .into_iter()
            .filter(|(_, members)| members.len() > 1)
            .map(|((size, hash), members)| {
                log::debug!(
                    "Duplicate group {}: {} files, {} bytes each",
                    crate::scanner::hash_to_hex(&hash),
                    members.len(),
                    size
                );
                DuplicateGroup::new(size, hash, members)
            })
            .collect();
        sort_groups(&mut groups);

        summary.duplicate_groups = groups.len();
        summary.duplicate_files = groups.iter().map(DuplicateGroup::duplicate_count).sum();
        summary.reclaimable_space = groups.iter().map(DuplicateGroup::wasted_space).sum();
        summary.duration = start_time.elapsed();

        log::info!(
            "Duplicate search complete: {} groups, {} duplicate files, {} reclaimable",
            summary.duplicate_groups,
            summary.duplicate_files,
            summary.reclaimable_display()
        );

        Ok((groups, summary))
    }
}

/// Find duplicate groups in `catalog` with default settings and the given
/// filters.
///
/// Diagnostics go to the `log` facade. Without a shutdown flag the search
/// cannot be interrupted, so this never fails.
#[must_use]
pub fn find_duplicates(catalog: &Catalog, options: &FilterOptions) -> Vec<DuplicateGroup> {
    let finder = DuplicateFinder::new(FinderConfig::default().with_filter(*options));
    finder
        .find(catalog)
        .map(|(groups, _)| groups)
        .unwrap_or_default()
}
