//! In-memory metadata catalog.
//!
//! # Overview
//!
//! A [`Catalog`] is the per-run table of [`FileRecord`]s that duplicate
//! detection and reconciliation operate on. It is built once from an
//! enumeration of `(path, size)` pairs and never mutated afterwards; the
//! algorithms only take filtered views of it.
//!
//! Paths are unique within a catalog. When an enumeration reports the same
//! path more than once, the last-seen record wins and keeps the position where
//! the path first appeared.
//!
//! # Example
//!
//! ```
//! use hdcleaner::catalog::{Catalog, FilterOptions};
//! use std::path::PathBuf;
//!
//! let catalog = Catalog::from_entries(vec![
//!     (PathBuf::from("x.txt"), Some(10)),
//!     (PathBuf::from(".hidden"), Some(10)),
//!     (PathBuf::from("gone.txt"), None),
//! ]);
//!
//! let options = FilterOptions::default();
//! assert_eq!(catalog.eligible(&options).count(), 1);
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::scanner::visibility::{classify, Visibility};

/// Metadata for one catalogued file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Path of the file; unique within a catalog
    pub path: PathBuf,
    /// Size in bytes, absent when the file could not be stat'ed
    pub size: Option<u64>,
    /// Visibility derived from the path's component names
    pub visibility: Visibility,
}

impl FileRecord {
    /// Create a record, classifying visibility from the full path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, size: Option<u64>) -> Self {
        let path = path.into();
        let visibility = classify(&path);
        Self {
            path,
            size,
            visibility,
        }
    }

    /// Create a record with an explicit visibility.
    #[must_use]
    pub fn with_visibility(path: impl Into<PathBuf>, size: Option<u64>, visibility: Visibility) -> Self {
        Self {
            path: path.into(),
            size,
            visibility,
        }
    }

    /// Whether this record passes the given filters.
    ///
    /// Records without a size never pass.
    #[must_use]
    pub fn is_eligible(&self, options: &FilterOptions) -> bool {
        let visible_enough = !options.only_visible || self.visibility.is_visible();
        visible_enough && self.size.is_some_and(|s| s >= options.min_size)
    }
}

/// Record filters shared by duplicate detection and reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterOptions {
    /// Minimum file size in bytes (inclusive)
    pub min_size: u64,
    /// Only consider [`Visibility::Visible`] records
    pub only_visible: bool,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            min_size: 0,
            only_visible: true,
        }
    }
}

impl FilterOptions {
    /// Set the minimum size.
    #[must_use]
    pub fn with_min_size(mut self, min_size: u64) -> Self {
        self.min_size = min_size;
        self
    }

    /// Set whether only visible records are considered.
    #[must_use]
    pub fn with_only_visible(mut self, only_visible: bool) -> Self {
        self.only_visible = only_visible;
        self
    }
}

/// Immutable per-run table of file records with unique paths.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    records: Vec<FileRecord>,
    index: HashMap<PathBuf, usize>,
}

impl Catalog {
    /// Build a catalog from records, de-duplicating by path (last-seen wins).
    #[must_use]
    pub fn from_records(records: impl IntoIterator<Item = FileRecord>) -> Self {
        let mut catalog = Self::default();
        let mut replaced = 0usize;

        for record in records {
            match catalog.index.get(&record.path) {
                Some(&idx) => {
                    log::trace!("Duplicate catalog path, keeping last: {}", record.path.display());
                    catalog.records[idx] = record;
                    replaced += 1;
                }
                None => {
                    catalog.index.insert(record.path.clone(), catalog.records.len());
                    catalog.records.push(record);
                }
            }
        }

        if replaced > 0 {
            log::debug!("Catalog collapsed {} repeated path(s)", replaced);
        }
        catalog
    }

    /// Build a catalog from `(path, size)` pairs, classifying the full path.
    #[must_use]
    pub fn from_entries<P: Into<PathBuf>>(entries: impl IntoIterator<Item = (P, Option<u64>)>) -> Self {
        Self::from_records(
            entries
                .into_iter()
                .map(|(path, size)| FileRecord::new(path, size)),
        )
    }

    /// Build a catalog from `(path, size)` pairs enumerated below `root`.
    ///
    /// Visibility is classified on the root-relative part of each path, so the
    /// location of the root itself never hides its contents.
    #[must_use]
    pub fn from_root_entries<P: Into<PathBuf>>(
        root: &Path,
        entries: impl IntoIterator<Item = (P, Option<u64>)>,
    ) -> Self {
        Self::from_records(entries.into_iter().map(|(path, size)| {
            let path = path.into();
            let visibility = classify(path.strip_prefix(root).unwrap_or(path.as_path()));
            FileRecord::with_visibility(path, size, visibility)
        }))
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the catalog has no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &FileRecord> {
        self.records.iter()
    }

    /// Records passing `options`, in catalog order.
    pub fn eligible<'a>(&'a self, options: &'a FilterOptions) -> impl Iterator<Item = &'a FileRecord> + 'a {
        self.records.iter().filter(move |r| r.is_eligible(options))
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a FileRecord;
    type IntoIter = std::slice::Iter<'a, FileRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl FromIterator<FileRecord> for Catalog {
    fn from_iter<I: IntoIterator<Item = FileRecord>>(iter: I) -> Self {
        Self::from_records(iter)
    }
}
