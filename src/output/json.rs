//! JSON output formatter.
//!
//! Provides machine-readable JSON output for scripting and automation.
//!
//! # Output Schema (scan)
//!
//! ```json
//! {
//!   "generated_at": "2024-05-01T12:00:00Z",
//!   "root": "/home/user/Pictures",
//!   "duplicates": [
//!     { "hash": "abc123...", "size": 1024, "files": ["/a.jpg", "/b.jpg"] }
//!   ],
//!   "unreadable": ["/locked.jpg"],
//!   "summary": {
//!     "total_records": 100,
//!     "eligible_records": 90,
//!     "eliminated_by_size": 70,
//!     "hashed_files": 19,
//!     "duplicate_groups": 5,
//!     "duplicate_files": 10,
//!     "reclaimable_space": 51200,
//!     "duration_ms": 1234,
//!     "exit_code": 3,
//!     "exit_code_name": "HD003"
//!   }
//! }
//! ```
//!
//! Reconciliation output has `master`, `client`, `matches` (each
//! `{client_path, master_path, size}`), `unreadable` and a summary with
//! per-side counts.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::duplicates::{DuplicateGroup, FindSummary, ReconcileSummary, ReconciliationMatch, SideSummary};
use crate::error::ExitCode;

/// A single duplicate group in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonDuplicateGroup {
    /// BLAKE3 hash as hexadecimal string (64 characters)
    pub hash: String,
    /// File size in bytes
    pub size: u64,
    /// Member paths, sorted
    pub files: Vec<String>,
}

impl From<&DuplicateGroup> for JsonDuplicateGroup {
    fn from(group: &DuplicateGroup) -> Self {
        Self {
            hash: group.hash_hex(),
            size: group.size,
            files: group.members.iter().map(|p| path_string(p)).collect(),
        }
    }
}

/// A single reconciliation match in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonMatch {
    /// Redundant client file
    pub client_path: String,
    /// Master file with identical content
    pub master_path: String,
    /// File size in bytes
    pub size: u64,
}

impl From<&ReconciliationMatch> for JsonMatch {
    fn from(m: &ReconciliationMatch) -> Self {
        Self {
            client_path: path_string(&m.client_path),
            master_path: path_string(&m.master_path),
            size: m.size,
        }
    }
}

/// Duplicate search summary in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonScanSummary {
    /// Number of records in the catalog
    pub total_records: usize,
    /// Number of records passing the filters
    pub eligible_records: usize,
    /// Records eliminated by size grouping
    pub eliminated_by_size: usize,
    /// Records hashed successfully
    pub hashed_files: usize,
    /// Number of confirmed duplicate groups
    pub duplicate_groups: usize,
    /// Total number of duplicate files (excluding originals)
    pub duplicate_files: usize,
    /// Space that can be reclaimed by removing duplicates (bytes)
    pub reclaimable_space: u64,
    /// Duration of the search in milliseconds
    pub duration_ms: u64,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "HD000")
    pub exit_code_name: String,
}

impl JsonScanSummary {
    /// Create a JSON summary from a [`FindSummary`] and an exit code.
    #[must_use]
    pub fn new(summary: &FindSummary, exit_code: ExitCode) -> Self {
        Self {
            total_records: summary.total_records,
            eligible_records: summary.eligible_records,
            eliminated_by_size: summary.eliminated_by_size,
            hashed_files: summary.hashed_files,
            duplicate_groups: summary.duplicate_groups,
            duplicate_files: summary.duplicate_files,
            reclaimable_space: summary.reclaimable_space,
            duration_ms: summary.duration.as_millis() as u64,
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix().to_string(),
        }
    }
}

/// Reconciliation summary in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonReconcileSummary {
    /// Master catalog statistics
    pub master: JsonSideSummary,
    /// Client catalog statistics
    pub client: JsonSideSummary,
    /// Number of matches reported
    pub matches: usize,
    /// Distinct client files with at least one match
    pub matched_client_files: usize,
    /// Bytes freed by removing every matched client file
    pub reclaimable_space: u64,
    /// Duration of the reconciliation in milliseconds
    pub duration_ms: u64,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "HD000")
    pub exit_code_name: String,
}

/// Per-side reconciliation counts in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSideSummary {
    /// Number of records in the catalog
    pub total_records: usize,
    /// Number of records passing the filters
    pub eligible_records: usize,
    /// Records whose size does not occur on the other side
    pub eliminated_by_size: usize,
    /// Records hashed successfully
    pub hashed_files: usize,
}

impl From<&SideSummary> for JsonSideSummary {
    fn from(side: &SideSummary) -> Self {
        Self {
            total_records: side.total_records,
            eligible_records: side.eligible_records,
            eliminated_by_size: side.eliminated_by_size,
            hashed_files: side.hashed_files,
        }
    }
}

impl JsonReconcileSummary {
    /// Create a JSON summary from a [`ReconcileSummary`] and an exit code.
    #[must_use]
    pub fn new(summary: &ReconcileSummary, exit_code: ExitCode) -> Self {
        Self {
            master: (&summary.master).into(),
            client: (&summary.client).into(),
            matches: summary.matches,
            matched_client_files: summary.matched_client_files,
            reclaimable_space: summary.reclaimable_space,
            duration_ms: summary.duration.as_millis() as u64,
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix().to_string(),
        }
    }
}

/// Complete JSON output of a duplicate search.
#[derive(Debug, Clone, Serialize)]
pub struct JsonScanOutput {
    /// When this report was produced
    pub generated_at: DateTime<Utc>,
    /// Scanned root directory
    pub root: String,
    /// Duplicate groups
    pub duplicates: Vec<JsonDuplicateGroup>,
    /// Files excluded because they could not be read
    pub unreadable: Vec<String>,
    /// Summary statistics
    pub summary: JsonScanSummary,
}

impl JsonScanOutput {
    /// Create a new JSON output from duplicate groups, summary and exit code.
    ///
    /// # Example
    ///
    /// ```
    /// use hdcleaner::duplicates::{DuplicateGroup, FindSummary};
    /// use hdcleaner::error::ExitCode;
    /// use hdcleaner::output::json::JsonScanOutput;
    /// use std::path::{Path, PathBuf};
    ///
    /// let groups = vec![DuplicateGroup::new(
    ///     1024,
    ///     [0u8; 32],
    ///     vec![PathBuf::from("/file1.txt"), PathBuf::from("/file2.txt")],
    /// )];
    /// let output = JsonScanOutput::new(Path::new("/"), &groups, &FindSummary::default(), ExitCode::Success);
    /// assert_eq!(output.duplicates.len(), 1);
    /// assert!(output.to_json().unwrap().starts_with('{'));
    /// ```
    #[must_use]
    pub fn new(root: &Path, groups: &[DuplicateGroup], summary: &FindSummary, exit_code: ExitCode) -> Self {
        Self {
            generated_at: Utc::now(),
            root: path_string(root),
            duplicates: groups.iter().map(JsonDuplicateGroup::from).collect(),
            unreadable: path_strings(&summary.unreadable),
            summary: JsonScanSummary::new(summary, exit_code),
        }
    }

    /// Serialize to compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Write pretty-printed JSON followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), JsonOutputError> {
        write_pretty(self, writer)
    }
}

/// Complete JSON output of a reconciliation.
#[derive(Debug, Clone, Serialize)]
pub struct JsonReconcileOutput {
    /// When this report was produced
    pub generated_at: DateTime<Utc>,
    /// Master root directory
    pub master: String,
    /// Client root directory
    pub client: String,
    /// Client files matching master files
    pub matches: Vec<JsonMatch>,
    /// Files excluded because they could not be read
    pub unreadable: Vec<String>,
    /// Summary statistics
    pub summary: JsonReconcileSummary,
}

impl JsonReconcileOutput {
    /// Create a new JSON output from matches, summary and exit code.
    #[must_use]
    pub fn new(
        master: &Path,
        client: &Path,
        matches: &[ReconciliationMatch],
        summary: &ReconcileSummary,
        exit_code: ExitCode,
    ) -> Self {
        Self {
            generated_at: Utc::now(),
            master: path_string(master),
            client: path_string(client),
            matches: matches.iter().map(JsonMatch::from).collect(),
            unreadable: path_strings(&summary.unreadable),
            summary: JsonReconcileSummary::new(summary, exit_code),
        }
    }

    /// Serialize to compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Write pretty-printed JSON followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), JsonOutputError> {
        write_pretty(self, writer)
    }
}

fn write_pretty<T: Serialize, W: Write>(value: &T, writer: &mut W) -> Result<(), JsonOutputError> {
    serde_json::to_writer_pretty(&mut *writer, value)?;
    writer.write_all(b"\n")?;
    Ok(())
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn path_strings(paths: &[PathBuf]) -> Vec<String> {
    paths.iter().map(|p| path_string(p)).collect()
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error during JSON generation: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_groups() -> Vec<DuplicateGroup> {
        let mut hash = [0u8; 32];
        hash[0] = 0xab;
        vec![DuplicateGroup::new(
            10,
            hash,
            vec![PathBuf::from("/r/y.txt"), PathBuf::from("/r/x.txt")],
        )]
    }

    #[test]
    fn test_scan_output_structure() {
        let summary = FindSummary {
            total_records: 3,
            duplicate_groups: 1,
            duplicate_files: 1,
            reclaimable_space: 10,
            unreadable: vec![PathBuf::from("/r/locked")],
            ..FindSummary::default()
        };
        let output = JsonScanOutput::new(Path::new("/r"), &sample_groups(), &summary, ExitCode::PartialSuccess);
        let value: serde_json::Value = serde_json::from_str(&output.to_json().unwrap()).unwrap();

        assert_eq!(value["root"], "/r");
        assert_eq!(value["duplicates"][0]["size"], 10);
        assert_eq!(value["duplicates"][0]["files"][0], "/r/x.txt");
        assert!(value["duplicates"][0]["hash"].as_str().unwrap().starts_with("ab"));
        assert_eq!(value["unreadable"][0], "/r/locked");
        assert_eq!(value["summary"]["reclaimable_space"], 10);
        assert_eq!(value["summary"]["exit_code"], 3);
        assert_eq!(value["summary"]["exit_code_name"], "HD003");
        assert!(value["generated_at"].is_string());
    }

    #[test]
    fn test_reconcile_output_structure() {
        let matches = vec![ReconciliationMatch {
            client_path: PathBuf::from("/c/c1.bin"),
            master_path: PathBuf::from("/m/m1.bin"),
            size: 5,
        }];
        let summary = ReconcileSummary {
            matches: 1,
            matched_client_files: 1,
            reclaimable_space: 5,
            ..ReconcileSummary::default()
        };
        let output = JsonReconcileOutput::new(
            Path::new("/m"),
            Path::new("/c"),
            &matches,
            &summary,
            ExitCode::Success,
        );
        let value: serde_json::Value = serde_json::from_str(&output.to_json().unwrap()).unwrap();

        assert_eq!(value["master"], "/m");
        assert_eq!(value["client"], "/c");
        assert_eq!(value["matches"][0]["client_path"], "/c/c1.bin");
        assert_eq!(value["matches"][0]["master_path"], "/m/m1.bin");
        assert_eq!(value["matches"][0]["size"], 5);
        assert_eq!(value["summary"]["matched_client_files"], 1);
        assert_eq!(value["summary"]["master"]["hashed_files"], 0);
    }

    #[test]
    fn test_write_to_is_pretty_with_trailing_newline() {
        let output = JsonScanOutput::new(Path::new("/r"), &[], &FindSummary::default(), ExitCode::NothingFound);
        let mut buf = Vec::new();
        output.write_to(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.contains("\n  \"root\""));
        assert!(text.ends_with("}\n"));
    }
}
