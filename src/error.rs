//! Structured error handling and exit codes.

use serde::Serialize;

use crate::duplicates::{FinderError, ReconcileError};

/// Process exit codes.
///
/// - 0: Success (duplicates or matches found)
/// - 1: General error (unexpected failure)
/// - 2: Nothing found (completed normally, no duplicates or matches)
/// - 3: Partial success (completed, but some files were unreadable)
/// - 4: Master and client share paths
/// - 130: Interrupted by user (Ctrl+C)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Success: duplicates or matches were found.
    Success = 0,
    /// General error: An unexpected error occurred.
    GeneralError = 1,
    /// Nothing found: completed but no duplicates or matches were found.
    NothingFound = 2,
    /// Partial success: completed but some files could not be read.
    PartialSuccess = 3,
    /// Master and client catalogs were not disjoint.
    DisjointnessViolation = 4,
    /// Interrupted: Run was interrupted by user (Ctrl+C).
    Interrupted = 130,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "HD000",
            Self::GeneralError => "HD001",
            Self::NothingFound => "HD002",
            Self::PartialSuccess => "HD003",
            Self::DisjointnessViolation => "HD004",
            Self::Interrupted => "HD130",
        }
    }

    /// Exit code for a completed run.
    ///
    /// Unreadable files take precedence over the found/not-found outcome.
    #[must_use]
    pub fn for_outcome(found: bool, had_unreadable: bool) -> Self {
        if had_unreadable {
            Self::PartialSuccess
        } else if found {
            Self::Success
        } else {
            Self::NothingFound
        }
    }

    /// Exit code for an error returned from `run_app`.
    #[must_use]
    pub fn from_error(err: &anyhow::Error) -> Self {
        if err
            .downcast_ref::<FinderError>()
            .is_some_and(|e| matches!(e, FinderError::Interrupted))
        {
            return Self::Interrupted;
        }
        match err.downcast_ref::<ReconcileError>() {
            Some(ReconcileError::Interrupted) => Self::Interrupted,
            Some(ReconcileError::DisjointnessViolation { .. }) => Self::DisjointnessViolation,
            None => Self::GeneralError,
        }
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "HD001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message
    pub message: String,
    /// Whether the operation was interrupted
    pub interrupted: bool,
    /// Shared paths, for disjointness violations
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub shared_paths: Vec<String>,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        let shared_paths = match err.downcast_ref::<ReconcileError>() {
            Some(ReconcileError::DisjointnessViolation { paths, .. }) => {
                paths.iter().map(|p| p.display().to_string()).collect()
            }
            _ => Vec::new(),
        };
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: err.to_string(),
            interrupted: exit_code == ExitCode::Interrupted,
            shared_paths,
        }
    }
}
