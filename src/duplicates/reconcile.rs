//! Master/client reconciliation.
//!
//! # Overview
//!
//! Given a trusted "master" collection and a "client" collection, find every
//! client file whose content equals some master file. The two catalogs must
//! not share any path; this is checked before any file is opened so a client
//! file can never be reported as a copy of itself.
//!
//! Pipeline:
//! 1. Disjointness check on per-component, NFC-normalized path keys
//! 2. Filter both sides with the same [`FilterOptions`]
//! 3. Keep only records whose size occurs on both sides
//! 4. Hash the survivors (one shared hash phase)
//! 5. Join on `(size, digest)`
//!
//! # Example
//!
//! ```
//! use hdcleaner::catalog::{Catalog, FilterOptions};
//! use hdcleaner::duplicates::{reconcile, ReconcileError};
//!
//! let master = Catalog::from_entries(vec![("/photos/a.jpg", Some(10))]);
//! let client = Catalog::from_entries(vec![("/photos/a.jpg", Some(10))]);
//!
//! let err = reconcile(&master, &client, &FilterOptions::default()).unwrap_err();
//! assert!(matches!(err, ReconcileError::DisjointnessViolation { count: 1, .. }));
//! ```

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytesize::ByteSize;
use serde::Serialize;

use super::finder::{run_hash_phase, select_eligible, FinderConfig, HashedRecord};
use crate::catalog::{Catalog, FileRecord, FilterOptions};
use crate::diagnostics::Phase;
use crate::scanner::path_utils::{path_key, PathKey};
use crate::scanner::{ContentHasher, Hash};

/// Maximum number of shared paths carried by a disjointness error.
pub const DISJOINT_SAMPLE_LIMIT: usize = 10;

/// A client file whose content equals a master file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ReconciliationMatch {
    /// Redundant client file
    pub client_path: PathBuf,
    /// Master file with identical content
    pub master_path: PathBuf,
    /// Size in bytes of both files
    pub size: u64,
}

/// Errors that can occur during reconciliation.
#[derive(thiserror::Error, Debug)]
pub enum ReconcileError {
    /// Master and client catalogs share at least one path.
    #[error("Master and client share {count} path(s), first: {}", first_path(.paths))]
    DisjointnessViolation {
        /// Number of shared paths
        count: usize,
        /// Up to [`DISJOINT_SAMPLE_LIMIT`] shared client paths
        paths: Vec<PathBuf>,
    },

    /// The reconciliation was interrupted by user (Ctrl+C or shutdown signal).
    #[error("Reconciliation interrupted by user")]
    Interrupted,
}

fn first_path(paths: &[PathBuf]) -> String {
    paths
        .first()
        .map_or_else(String::new, |p| p.display().to_string())
}

/// Per-catalog statistics from a reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SideSummary {
    /// Number of records in the catalog
    pub total_records: usize,
    /// Number of records passing the filters (with a known size)
    pub eligible_records: usize,
    /// Eligible records whose size does not occur on the other side
    pub eliminated_by_size: usize,
    /// Number of records hashed successfully
    pub hashed_files: usize,
}

/// Summary statistics from a reconciliation.
#[derive(Debug, Clone, Default)]
pub struct ReconcileSummary {
    /// Master catalog statistics
    pub master: SideSummary,
    /// Client catalog statistics
    pub client: SideSummary,
    /// Records from either side excluded as unreadable, sorted
    pub unreadable: Vec<PathBuf>,
    /// Number of matches reported
    pub matches: usize,
    /// Number of distinct client files with at least one match
    pub matched_client_files: usize,
    /// Bytes freed by removing every matched client file
    pub reclaimable_space: u64,
    /// Duration of the reconciliation
    pub duration: Duration,
}

impl ReconcileSummary {
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

/// Fail if any path appears in both catalogs.
///
/// Paths are compared component by component after NFC normalization, so
/// `/data//./a.bin` collides with `/data/a.bin` and `café` spelled with a
/// combining accent collides with the precomposed form.
///
/// # Errors
///
/// Returns [`ReconcileError::DisjointnessViolation`] with the number of shared
/// paths and up to [`DISJOINT_SAMPLE_LIMIT`] of them, in client order.
pub fn check_disjoint(master: &Catalog, client: &Catalog) -> Result<(), ReconcileError> {
    let master_keys: HashSet<PathKey> = master.iter().map(|r| path_key(&r.path)).collect();

    let mut count = 0usize;
    let mut paths = Vec::new();
    for record in client {
        if master_keys.contains(&path_key(&record.path)) {
            count += 1;
            if paths.len() < DISJOINT_SAMPLE_LIMIT {
                paths.push(record.path.clone());
            }
        }
    }

    if count == 0 {
        Ok(())
    } else {
        log::error!("Master and client catalogs share {} path(s)", count);
        Err(ReconcileError::DisjointnessViolation { count, paths })
    }
}

/// Fail if one canonical root is equal to or contains the other.
///
/// Both roots must already be canonical (see
/// [`canonical_root`](crate::scanner::canonical_root)); a walk of nested
/// roots would list the inner tree on both sides.
///
/// # Errors
///
/// Returns [`ReconcileError::DisjointnessViolation`] carrying the inner root.
pub fn check_disjoint_roots(master: &Path, client: &Path) -> Result<(), ReconcileError> {
    let inner = if client.starts_with(master) {
        client
    } else if master.starts_with(client) {
        master
    } else {
        return Ok(());
    };

    log::error!(
        "Master root {} and client root {} overlap",
        master.display(),
        client.display()
    );
    Err(ReconcileError::DisjointnessViolation {
        count: 1,
        paths: vec![inner.to_path_buf()],
    })
}

/// Reconciles a client catalog against a master catalog.
///
/// # Example
///
/// ```
/// use hdcleaner::catalog::Catalog;
/// use hdcleaner::duplicates::Reconciler;
///
/// let reconciler = Reconciler::with_defaults();
/// let (matches, summary) = reconciler
///     .reconcile(&Catalog::default(), &Catalog::default())
///     .unwrap();
/// assert!(matches.is_empty());
/// assert_eq!(summary.matched_client_files, 0);
/// ```
pub struct Reconciler {
    config: FinderConfig,
    hasher: Arc<dyn ContentHasher>,
}

impl Reconciler {
    /// Create a reconciler using the streaming BLAKE3 hasher.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        let hasher = config.default_hasher();
        Self { config, hasher }
    }

    /// Create a reconciler with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// Create a reconciler with a custom content hasher.
    #[must_use]
    pub fn with_hasher(config: FinderConfig, hasher: Arc<dyn ContentHasher>) -> Self {
        Self { config, hasher }
    }

    /// The reconciler's configuration.
    #[must_use]
    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// Find client files whose content matches a master file.
    ///
    /// A client file equal to several master files yields one match per
    /// master file. Matches are ordered by descending size, then client path,
    /// then master path.
    ///
    /// # Errors
    ///
    /// - [`ReconcileError::DisjointnessViolation`] if the catalogs share a
    ///   path; raised before any file is hashed
    /// - [`ReconcileError::Interrupted`] if the shutdown flag was observed
    pub fn reconcile(
        &self,
        master: &Catalog,
        client: &Catalog,
    ) -> Result<(Vec<ReconciliationMatch>, ReconcileSummary), ReconcileError> {
        let start_time = Instant::now();
        check_disjoint(master, client)?;

        let mut summary = ReconcileSummary {
            master: SideSummary {
                total_records: master.len(),
                ..SideSummary::default()
            },
            client: SideSummary {
                total_records: client.len(),
                ..SideSummary::default()
            },
            ..ReconcileSummary::default()
        };

        let sink = self.config.sink.as_ref();
        let (master_eligible, master_no_size) = select_eligible(master, &self.config.filter, sink);
        let (client_eligible, client_no_size) = select_eligible(client, &self.config.filter, sink);
        summary.master.eligible_records = master_eligible.len();
        summary.client.eligible_records = client_eligible.len();
        summary.unreadable.extend(master_no_size);
        summary.unreadable.extend(client_no_size);

        if master_eligible.is_empty() || client_eligible.is_empty() {
            log::info!("Nothing to reconcile: one side has no eligible files");
        }

        // Size pre-filter: only sizes present on both sides can match
        let master_sizes = sizes_of(&master_eligible);
        let client_sizes = sizes_of(&client_eligible);
        let master_candidates = keep_sizes(&master_eligible, &client_sizes);
        let client_candidates = keep_sizes(&client_eligible, &master_sizes);
        summary.master.eliminated_by_size = master_eligible.len() - master_candidates.len();
        summary.client.eliminated_by_size = client_eligible.len() - client_candidates.len();

        log::info!(
            "Size filter: {} master and {} client candidates",
            master_candidates.len(),
            client_candidates.len()
        );

        // Master candidates come first, so indexes below this are master records
        let master_count = master_candidates.len();
        let mut candidates = master_candidates;
        candidates.extend(client_candidates);

        let outcome = run_hash_phase(candidates, self.hasher.as_ref(), &self.config, Phase::Reconciling);
        summary.unreadable.extend(outcome.unreadable);
        summary.unreadable.sort();

        if outcome.interrupted || self.config.is_shutdown_requested() {
            return Err(ReconcileError::Interrupted);
        }

        let (master_hashed, client_hashed): (Vec<HashedRecord<'_>>, Vec<HashedRecord<'_>>) =
            outcome.hashed.into_iter().partition(|h| h.index < master_count);
        summary.master.hashed_files = master_hashed.len();
        summary.client.hashed_files = client_hashed.len();

        let mut master_index: HashMap<(u64, Hash), Vec<&Path>> = HashMap::new();
        for hashed in &master_hashed {
            master_index
                .entry((hashed.size, hashed.hash))
                .or_default()
                .push(hashed.record.path.as_path());
        }

        let mut matches = Vec::new();
        for hashed in &client_hashed {
            let Some(masters) = master_index.get(&(hashed.size, hashed.hash)) else {
                continue;
            };
            log::debug!(
                "{} matches {} master file(s)",
                hashed.record.path.display(),
                masters.len()
            );
            summary.matched_client_files += 1;
            summary.reclaimable_space += hashed.size;
            matches.extend(masters.iter().map(|master_path| ReconciliationMatch {
                client_path: hashed.record.path.clone(),
                master_path: master_path.to_path_buf(),
                size: hashed.size,
            }));
        }

        matches.sort_by(|a, b| {
            b.size
                .cmp(&a.size)
                .then_with(|| a.client_path.cmp(&b.client_path))
                .then_with(|| a.master_path.cmp(&b.master_path))
        });

        summary.matches = matches.len();
        summary.duration = start_time.elapsed();

        log::info!(
            "Reconciliation complete: {} client files match master ({} matches), {} reclaimable",
            summary.matched_client_files,
            summary.matches,
            summary.reclaimable_display()
        );

        Ok((matches, summary))
    }
}

fn sizes_of(records: &[&FileRecord]) -> HashSet<u64> {
    records.iter().filter_map(|r| r.size).collect()
}

fn keep_sizes<'a>(records: &[&'a FileRecord], sizes: &HashSet<u64>) -> Vec<(u64, &'a FileRecord)> {
    records
        .iter()
        .filter_map(|r| r.size.filter(|s| sizes.contains(s)).map(|s| (s, *r)))
        .collect()
}

/// Reconcile `client` against `master` with default settings and the given
/// filters.
///
/// # Errors
///
/// Returns [`ReconcileError::DisjointnessViolation`] if the catalogs share a
/// path.
pub fn reconcile(
    master: &Catalog,
    client: &Catalog,
    options: &FilterOptions,
) -> Result<Vec<ReconciliationMatch>, ReconcileError> {
    let reconciler = Reconciler::new(FinderConfig::default().with_filter(*options));
    reconciler
        .reconcile(master, client)
        .map(|(matches, _)| matches)
}
