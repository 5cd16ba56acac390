//! Diagnostics events and sinks.
//!
//! The hash pipeline never aborts on a bad file; instead it reports what
//! happened through a [`DiagnosticSink`] handed to it by the caller. Sinks are
//! shared between hashing worker threads, so implementations must be
//! `Send + Sync`.
//!
//! Provided sinks:
//! - [`LogSink`]: forwards events to the `log` facade (the default)
//! - [`CollectingSink`]: keeps every event, for callers and tests
//! - [`NullSink`]: discards everything
//! - [`Progress`](crate::progress::Progress): terminal progress bars

use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;

/// Pipeline phase a diagnostic belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Hashing size-ambiguous candidates for duplicate grouping
    Grouping,
    /// Hashing master and client candidates for reconciliation
    Reconciling,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Grouping => write!(f, "grouping"),
            Self::Reconciling => write!(f, "reconciling"),
        }
    }
}

/// An event reported by the hash pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A hash phase is about to hash `total` files.
    PhaseStarted {
        /// Phase being started
        phase: Phase,
        /// Number of files to hash
        total: usize,
    },
    /// A file was hashed successfully.
    FileHashed {
        /// Hashed file
        path: PathBuf,
        /// Catalogued size of the file
        bytes: u64,
    },
    /// A file could not be stat'ed or read and was excluded.
    UnreadableFile {
        /// Excluded file
        path: PathBuf,
        /// Human-readable cause
        reason: String,
    },
    /// A hash phase completed.
    PhaseFinished {
        /// Phase that completed
        phase: Phase,
    },
}

/// Receiver of pipeline diagnostics.
pub trait DiagnosticSink: Send + Sync {
    /// Handle one event. Must not panic or block for long.
    fn report(&self, event: &Diagnostic);
}

impl<T: DiagnosticSink + ?Sized> DiagnosticSink for Arc<T> {
    fn report(&self, event: &Diagnostic) {
        (**self).report(event);
    }
}

/// Sink that forwards events to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn report(&self, event: &Diagnostic) {
        match event {
            Diagnostic::PhaseStarted { phase, total } => {
                log::debug!("Phase {} started: hashing {} files", phase, total);
            }
            Diagnostic::FileHashed { path, bytes } => {
                log::trace!("Hashed {} ({} bytes)", path.display(), bytes);
            }
            Diagnostic::UnreadableFile { path, reason } => {
                log::warn!("Skipping unreadable file {}: {}", path.display(), reason);
            }
            Diagnostic::PhaseFinished { phase } => {
                log::debug!("Phase {} finished", phase);
            }
        }
    }
}

/// Sink that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn report(&self, _event: &Diagnostic) {}
}

/// Sink that records every event in arrival order.
#[derive(Debug, Default)]
pub struct CollectingSink {
    events: Mutex<Vec<Diagnostic>>,
}

impl CollectingSink {
    /// Create an empty collecting sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all events received so far.
    #[must_use]
    pub fn events(&self) -> Vec<Diagnostic> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Paths reported as unreadable, in arrival order.
    #[must_use]
    pub fn unreadable_paths(&self) -> Vec<PathBuf> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Diagnostic::UnreadableFile { path, .. } => Some(path),
                _ => None,
            })
            .collect()
    }

    /// Number of [`Diagnostic::FileHashed`] events received.
    #[must_use]
    pub fn hashed_count(&self) -> usize {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|e| matches!(e, Diagnostic::FileHashed { .. }))
            .count()
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&self, event: &Diagnostic) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }
}
