//! BLAKE3 file hasher with streaming support.
//!
//! # Overview
//!
//! [`Hasher`] computes a BLAKE3 digest of a file's full content, reading it in
//! fixed-size chunks so memory use stays bounded regardless of file size.
//! Failures are returned as [`HashError`] values; it is up to the caller to
//! decide whether a failure is fatal (the duplicate pipeline never treats it
//! as such).
//!
//! The [`ContentHasher`] trait is the seam used by the duplicate finder and the
//! reconciler, so tests can substitute an instrumented implementation.
//!
//! # Example
//!
//! ```no_run
//! use hdcleaner::scanner::{hash_to_hex, ContentHasher, Hasher};
//! use std::path::Path;
//!
//! let hasher = Hasher::new();
//! let digest = hasher.digest(Path::new("some/file.bin")).unwrap();
//! println!("{}", hash_to_hex(&digest));
//! ```

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::HashError;

/// A 32-byte BLAKE3 digest.
pub type Hash = [u8; 32];

/// Default read chunk size (64 KiB).
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Computes a content digest for a single file.
///
/// Implementations must be safe to call from several worker threads at once.
pub trait ContentHasher: Send + Sync {
    /// Hash the full content of the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns a [`HashError`] if the file cannot be opened or read, or if
    /// hashing was cancelled.
    fn digest(&self, path: &Path) -> Result<Hash, HashError>;
}

/// Streaming BLAKE3 file hasher.
#[derive(Debug, Clone)]
pub struct Hasher {
    chunk_size: usize,
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher {
    /// Create a hasher that reads in [`DEFAULT_CHUNK_SIZE`] chunks.
    #[must_use]
    pub fn new() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            shutdown_flag: None,
        }
    }

    /// Set the read chunk size in bytes (clamped to at least 1).
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Set the shutdown flag checked between chunks.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Configured read chunk size in bytes.
    #[must_use]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Hash the full content of a file.
    ///
    /// # Errors
    ///
    /// See [`ContentHasher::digest`].
    pub fn full_hash(&self, path: &Path) -> Result<Hash, HashError> {
        log::trace!("Starting to hash {}", path.display());

        let mut file = File::open(path).map_err(|e| HashError::from_io(path, e))?;
        let mut hasher = blake3::Hasher::new();
        let mut buffer = vec![0u8; self.chunk_size];

        loop {
            if self.is_shutdown_requested() {
                return Err(HashError::Interrupted(path.to_path_buf()));
            }

            let read = match file.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(HashError::from_io(path, e)),
            };
            hasher.update(&buffer[..read]);
        }

        log::trace!("Finished hashing {}", path.display());
        Ok(*hasher.finalize().as_bytes())
    }
}

impl ContentHasher for Hasher {
    fn digest(&self, path: &Path) -> Result<Hash, HashError> {
        self.full_hash(path)
    }
}

/// Format a digest as a lowercase hexadecimal string (64 characters).
#[must_use]
pub fn hash_to_hex(hash: &Hash) -> String {
    use std::fmt::Write;

    hash.iter().fold(String::with_capacity(64), |mut out, b| {
        let _ = write!(out, "{b:02x}");
        out
    })
}
