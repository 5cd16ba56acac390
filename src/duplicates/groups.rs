//! Duplicate grouping and size-based record organization.
//!
//! # Overview
//!
//! This module provides the size pre-filter (the first phase of duplicate
//! detection) and the [`DuplicateGroup`] result type.
//!
//! ## Size Grouping
//!
//! Files with different sizes cannot share content, so records are bucketed by
//! exact size and buckets holding a single record are discarded before any
//! file is opened. Empty files are grouped like any other size.
//!
//! # Example
//!
//! ```
//! use hdcleaner::catalog::FileRecord;
//! use hdcleaner::duplicates::group_by_size;
//!
//! let records = vec![
//!     FileRecord::new("/file1.txt", Some(1024)),
//!     FileRecord::new("/file2.txt", Some(1024)),
//!     FileRecord::new("/file3.txt", Some(2048)),
//! ];
//!
//! // Only buckets with 2+ records survive
//! let (groups, stats) = group_by_size(&records);
//!
//! assert_eq!(stats.total_files, 3);
//! assert_eq!(stats.potential_duplicates, 2);
//! assert_eq!(groups.len(), 1);
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::catalog::FileRecord;
use crate::scanner::Hash;

/// Confirmed group of files with identical size and content digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateGroup {
    /// File size in bytes (shared by all members)
    pub size: u64,
    /// BLAKE3 digest of the content (32 bytes)
    pub hash: Hash,
    /// Member paths, sorted ascending
    pub members: Vec<PathBuf>,
}

impl DuplicateGroup {
    /// Create a new duplicate group. Members are sorted by path.
    #[must_use]
    pub fn new(size: u64, hash: Hash, mut members: Vec<PathBuf>) -> Self {
        members.sort();
        Self {
            size,
            hash,
            members,
        }
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Lexicographically smallest member path.
    #[must_use]
    pub fn first_member(&self) -> Option<&Path> {
        self.members.first().map(PathBuf::as_path)
    }

    /// Whether `path` is a member of this group.
    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.members
            .binary_search_by(|m| m.as_path().cmp(path))
            .is_ok()
    }

    /// Total size of all files in this group.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.size * self.members.len() as u64
    }

    /// Total wasted space (all copies minus one).
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.size * self.duplicate_count() as u64
    }

    /// Number of duplicate copies (total - 1 original).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.members.len().saturating_sub(1)
    }

    /// Hash as hexadecimal string.
    #[must_use]
    pub fn hash_hex(&self) -> String {
        crate::scanner::hash_to_hex(&self.hash)
    }
}

/// Order groups by descending size, ties by ascending first member path.
pub fn sort_groups(groups: &mut [DuplicateGroup]) {
    groups.sort_by(|a, b| {
        b.size
            .cmp(&a.size)
            .then_with(|| a.first_member().cmp(&b.first_member()))
    });
}

/// Statistics from the size grouping phase.
///
/// Provides insight into the distribution of files by size and
/// the effectiveness of the size pre-filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingStats {
    /// Total number of records processed
    pub total_files: usize,
    /// Total size of all records in bytes
    pub total_size: u64,
    /// Number of unique file sizes
    pub unique_sizes: usize,
    /// Number of records that could be duplicates (in buckets of 2+)
    pub potential_duplicates: usize,
    /// Number of records eliminated as unique (singleton buckets)
    pub eliminated_unique: usize,
    /// Number of empty records encountered
    pub empty_files: usize,
    /// Number of size buckets with 2+ records
    pub duplicate_groups: usize,
}

impl GroupingStats {
    /// Percentage of records eliminated by size grouping.
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            (self.eliminated_unique as f64 / self.total_files as f64) * 100.0
        }
    }
}

/// Group records by size, keeping only buckets with 2+ records.
///
/// Records without a size are skipped; callers filter them out (and report
/// them) beforehand. No file I/O is performed.
///
/// # Returns
///
/// A tuple of:
/// - `HashMap<u64, Vec<&FileRecord>>` - Records grouped by size (only buckets with 2+ records)
/// - `GroupingStats` - Statistics about the grouping operation
///
/// # Example
///
/// ```
/// use hdcleaner::catalog::FileRecord;
/// use hdcleaner::duplicates::group_by_size;
///
/// let records = vec![
///     FileRecord::new("/a.txt", Some(100)),
///     FileRecord::new("/b.txt", Some(100)),
///     FileRecord::new("/c.txt", Some(200)),
/// ];
///
/// let (groups, stats) = group_by_size(&records);
///
/// assert_eq!(groups.len(), 1);
/// assert_eq!(groups[&100].len(), 2);
/// assert_eq!(stats.eliminated_unique, 1);
/// ```
#[must_use]
pub fn group_by_size<'a>(
    records: impl IntoIterator<Item = &'a FileRecord>,
) -> (HashMap<u64, Vec<&'a FileRecord>>, GroupingStats) {
    let mut all_groups: HashMap<u64, Vec<&'a FileRecord>> = HashMap::new();
    let mut stats = GroupingStats::default();

    for record in records {
        let Some(size) = record.size else {
            continue;
        };
        stats.total_files += 1;
        stats.total_size += size;
        if size == 0 {
            stats.empty_files += 1;
        }
        all_groups.entry(size).or_default().push(record);
    }

    stats.unique_sizes = all_groups.len();

    all_groups.retain(|size, records| {
        if records.len() == 1 {
            stats.eliminated_unique += 1;
            log::trace!(
                "Eliminated unique size {}: {}",
                size,
                records[0].path.display()
            );
            false
        } else {
            stats.potential_duplicates += records.len();
            stats.duplicate_groups += 1;
            log::debug!(
                "Size group {} bytes: {} potential duplicates",
                size,
                records.len()
            );
            true
        }
    });

    log::info!(
        "Size grouping: {} files → {} candidates ({:.1}% eliminated)",
        stats.total_files,
        stats.potential_duplicates,
        stats.elimination_rate()
    );

    (all_groups, stats)
}
