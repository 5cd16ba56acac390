//! CSV output formatters.
//!
//! [`CsvOutput`] writes one row per member of every duplicate group:
//!
//! - `group_id`: 1-based position of the group in the report
//! - `hash`: BLAKE3 content hash (hexadecimal)
//! - `path`: member path
//! - `size`: file size in bytes
//!
//! [`ReconcileCsvOutput`] writes one row per match with the columns
//! `client_path`, `master_path` and `size`.
//!
//! # Example
//!
//! ```no_run
//! use hdcleaner::catalog::{Catalog, FilterOptions};
//! use hdcleaner::duplicates::find_duplicates;
//! use hdcleaner::output::csv::CsvOutput;
//!
//! let catalog = Catalog::from_entries(vec![("/data/a.bin", Some(3)), ("/data/b.bin", Some(3))]);
//! let groups = find_duplicates(&catalog, &FilterOptions::default());
//! CsvOutput::new(&groups).write_to(std::io::stdout()).unwrap();
//! ```

use std::io;

use serde::Serialize;
use thiserror::Error;

use crate::duplicates::{DuplicateGroup, ReconciliationMatch};

/// Errors that can occur during CSV output generation.
#[derive(Debug, Error)]
pub enum CsvOutputError {
    /// I/O error during writing.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error during CSV serialization.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Serialize)]
struct GroupRow<'a> {
    group_id: usize,
    hash: &'a str,
    path: String,
    size: u64,
}

#[derive(Debug, Serialize)]
struct MatchRow {
    client_path: String,
    master_path: String,
    size: u64,
}

/// CSV formatter for duplicate groups.
pub struct CsvOutput<'a> {
    groups: &'a [DuplicateGroup],
}

impl<'a> CsvOutput<'a> {
    /// Create a new CSV output formatter.
    #[must_use]
    pub fn new(groups: &'a [DuplicateGroup]) -> Self {
        Self { groups }
    }

    /// Write the CSV output to the given writer.
    ///
    /// # Errors
    ///
    /// Returns `CsvOutputError` if writing or serialization fails.
    pub fn write_to<W: io::Write>(&self, writer: W) -> Result<(), CsvOutputError> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        if self.groups.is_empty() {
            csv_writer.write_record(["group_id", "hash", "path", "size"])?;
        }
        for (idx, group) in self.groups.iter().enumerate() {
            let hash = group.hash_hex();
            for path in &group.members {
                csv_writer.serialize(GroupRow {
                    group_id: idx + 1,
                    hash: &hash,
                    path: path.to_string_lossy().into_owned(),
                    size: group.size,
                })?;
            }
        }

        csv_writer.flush()?;
        Ok(())
    }

    /// Generate CSV output as a string.
    ///
    /// # Errors
    ///
    /// Returns `CsvOutputError` if serialization fails.
    pub fn to_string(&self) -> Result<String, CsvOutputError> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

/// CSV formatter for reconciliation matches.
pub struct ReconcileCsvOutput<'a> {
    matches: &'a [ReconciliationMatch],
}

impl<'a> ReconcileCsvOutput<'a> {
    /// Create a new CSV output formatter.
    #[must_use]
    pub fn new(matches: &'a [ReconciliationMatch]) -> Self {
        Self { matches }
    }

    /// Write the CSV output to the given writer.
    ///
    /// # Errors
    ///
    /// Returns `CsvOutputError` if writing or serialization fails.
    pub fn write_to<W: io::Write>(&self, writer: W) -> Result<(), CsvOutputError> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        // An empty report still gets a header line.
        if self.matches.is_empty() {
            csv_writer.write_record(["client_path", "master_path", "size"])?;
        }
        for m in self.matches {
            csv_writer.serialize(MatchRow {
                client_path: m.client_path.to_string_lossy().into_owned(),
                master_path: m.master_path.to_string_lossy().into_owned(),
                size: m.size,
            })?;
        }

        csv_writer.flush()?;
        Ok(())
    }

    /// Generate CSV output as a string.
    ///
    /// # Errors
    ///
    /// Returns `CsvOutputError` if serialization fails.
    pub fn to_string(&self) -> Result<String, CsvOutputError> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
