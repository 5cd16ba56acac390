//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Size-based record grouping
//! - Content-hash grouping of same-size candidates
//! - Master/client reconciliation
//! - Duplicate group management

pub mod finder;
pub mod groups;
pub mod reconcile;

pub use finder::{
    find_duplicates, DuplicateFinder, FindSummary, FinderConfig, FinderError, DEFAULT_IO_THREADS,
};
pub use groups::{group_by_size, sort_groups, DuplicateGroup, GroupingStats};
pub use reconcile::{
    check_disjoint, check_disjoint_roots, reconcile, ReconcileError, ReconcileSummary,
    ReconciliationMatch, Reconciler, SideSummary, DISJOINT_SAMPLE_LIMIT,
};
