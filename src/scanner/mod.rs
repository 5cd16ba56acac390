//! Scanner module for file enumeration, classification and hashing.
//!
//! This module provides functionality for:
//! - Parallel directory walking using jwalk
//! - Path-based visibility classification
//! - Content hashing with BLAKE3 (streaming)
//! - Unicode path normalization
//!
//! # Architecture
//!
//! - [`walker`]: Directory traversal and file discovery
//! - [`visibility`]: Visible / hidden / VCS / system-metadata classification
//! - [`hasher`]: BLAKE3 file hashing
//! - [`path_utils`]: NFC path keys

pub mod hasher;
pub mod path_utils;
pub mod visibility;
pub mod walker;

use std::path::{Path, PathBuf};

// Re-export main types
pub use hasher::{hash_to_hex, ContentHasher, Hash, Hasher, DEFAULT_CHUNK_SIZE};
pub use visibility::{classify, Visibility};
pub use walker::{canonical_root, Walker};

/// A file discovered by the [`Walker`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Path to the file (root joined with the relative path)
    pub path: PathBuf,
    /// File size in bytes, or `None` if the file could not be stat'ed
    pub size: Option<u64>,
}

impl FileEntry {
    /// Create a new FileEntry.
    #[must_use]
    pub fn new(path: PathBuf, size: Option<u64>) -> Self {
        Self { path, size }
    }

    /// Split into the `(path, size)` pair catalogs are built from.
    #[must_use]
    pub fn into_parts(self) -> (PathBuf, Option<u64>) {
        (self.path, self.size)
    }
}

/// Configuration for directory walking.
#[derive(Debug, Clone, Default)]
pub struct WalkerConfig {
    /// Follow symbolic links during traversal.
    /// Warning: May cause infinite loops with symlink cycles.
    pub follow_symlinks: bool,
}

impl WalkerConfig {
    /// Create a new configuration.
    #[must_use]
    pub fn new(follow_symlinks: bool) -> Self {
        Self { follow_symlinks }
    }
}

/// Errors that can occur during directory scanning.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Permission was denied when accessing a file or directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The specified path was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// The specified path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// An I/O error occurred while accessing a file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Errors that can occur during file hashing.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// The specified file was not found.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// Hashing was cancelled by a shutdown request.
    #[error("Hashing interrupted: {0}")]
    Interrupted(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl HashError {
    /// Map an I/O error on `path` to the matching variant.
    #[must_use]
    pub fn from_io(path: &Path, error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }

    /// Path of the file that failed.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(p) | Self::PermissionDenied(p) | Self::Interrupted(p) => p,
            Self::Io { path, .. } => path,
        }
    }
}
