//! Directory walker implementation using jwalk for parallel traversal.
//!
//! # Overview
//!
//! [`Walker`] enumerates the regular files below a root directory and reports
//! each one as a [`FileEntry`] (path plus size, when the file could be
//! stat'ed). It is the enumeration collaborator that feeds
//! [`Catalog`](crate::catalog::Catalog) construction; it applies no
//! visibility or size filtering of its own.
//!
//! # Example
//!
//! ```no_run
//! use hdcleaner::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("/home/user/Downloads"), WalkerConfig::default());
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(file) => println!("{}: {:?} bytes", file.path.display(), file.size),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use jwalk::WalkDir;

use super::{FileEntry, ScanError, WalkerConfig};
use crate::catalog::Catalog;

/// Resolve a root directory to its canonical absolute form.
///
/// Symlinks, `.` and `..` are resolved, so two spellings of the same
/// directory give equal paths.
///
/// # Errors
///
/// Returns [`ScanError::NotFound`], [`ScanError::NotADirectory`],
/// [`ScanError::PermissionDenied`] or [`ScanError::Io`].
pub fn canonical_root(path: &Path) -> Result<PathBuf, ScanError> {
    let canonical = std::fs::canonicalize(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ScanError::NotFound(path.to_path_buf()),
        std::io::ErrorKind::PermissionDenied => ScanError::PermissionDenied(path.to_path_buf()),
        _ => ScanError::Io {
            path: path.to_path_buf(),
            source: e,
        },
    })?;
    if !canonical.is_dir() {
        return Err(ScanError::NotADirectory(path.to_path_buf()));
    }
    Ok(canonical)
}

/// Directory walker for parallel file discovery.
#[derive(Debug)]
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Walker configuration
    config: WalkerConfig,
    /// Optional shutdown flag for graceful termination
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Walker {
    /// Create a new walker for the given path.
    #[must_use]
    pub fn new(path: &Path, config: WalkerConfig) -> Self {
        Self {
            root: path.to_path_buf(),
            config,
            shutdown_flag: None,
        }
    }

    /// Set the shutdown flag for graceful termination.
    ///
    /// When the flag is set to `true`, the walker stops iteration as soon as
    /// possible.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Check that the root exists and is a directory.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::NotFound`] or [`ScanError::NotADirectory`].
    pub fn validate_root(&self) -> Result<(), ScanError> {
        if !self.root.exists() {
            return Err(ScanError::NotFound(self.root.clone()));
        }
        if !self.root.is_dir() {
            return Err(ScanError::NotADirectory(self.root.clone()));
        }
        Ok(())
    }

    /// Walk the directory tree, yielding file entries.
    ///
    /// Errors are yielded as [`ScanError`] values rather than stopping
    /// iteration. Children are visited in file-name order so the output is
    /// deterministic.
    pub fn walk(&self) -> impl Iterator<Item = Result<FileEntry, ScanError>> + '_ {
        let walk_dir = WalkDir::new(&self.root)
            .follow_links(self.config.follow_symlinks)
            .skip_hidden(false)
            .sort(true);

        walk_dir.into_iter().filter_map(move |entry_result| {
            if self.is_shutdown_requested() {
                log::debug!("Walker: Shutdown requested, stopping iteration");
                return None;
            }

            match entry_result {
                Ok(entry) => {
                    let path = entry.path();
                    let file_type = entry.file_type();

                    if file_type.is_dir() {
                        return None;
                    }

                    if file_type.is_symlink() && !self.config.follow_symlinks {
                        log::trace!("Skipping symlink: {}", path.display());
                        return None;
                    }

                    let metadata = if self.config.follow_symlinks {
                        std::fs::metadata(&path)
                    } else {
                        std::fs::symlink_metadata(&path)
                    };

                    match metadata {
                        Ok(m) if m.is_file() => Some(Ok(FileEntry::new(path, Some(m.len())))),
                        Ok(_) => None,
                        Err(e) => {
                            // Still catalogued, but without a size it is never hashed.
                            log::debug!("Cannot stat {}: {}", path.display(), e);
                            Some(Ok(FileEntry::new(path, None)))
                        }
                    }
                }
                Err(e) => {
                    let path = e
                        .path()
                        .map_or_else(|| self.root.clone(), std::borrow::ToOwned::to_owned);
                    Some(Err(Self::handle_jwalk_error(path, e)))
                }
            }
        })
    }

    /// Enumerate the tree into a [`Catalog`].
    ///
    /// Visibility is classified on the part of each path below the root, so a
    /// root that itself lives inside a hidden directory still yields visible
    /// files. Errors inside the tree are logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns a [`ScanError`] if the root is missing or not a directory.
    pub fn catalog(&self) -> Result<Catalog, ScanError> {
        self.validate_root()?;

        let entries: Vec<(PathBuf, Option<u64>)> = self
            .walk()
            .filter_map(|res| match res {
                Ok(entry) => Some(entry.into_parts()),
                Err(e) => {
                    log::warn!("{}", e);
                    None
                }
            })
            .collect();

        log::info!(
            "Enumerated {} files under {}",
            entries.len(),
            self.root.display()
        );

        Ok(Catalog::from_root_entries(&self.root, entries))
    }

    fn handle_jwalk_error(path: PathBuf, error: jwalk::Error) -> ScanError {
        match error.io_error().map(std::io::Error::kind) {
            Some(std::io::ErrorKind::PermissionDenied) => ScanError::PermissionDenied(path),
            Some(std::io::ErrorKind::NotFound) => ScanError::NotFound(path),
            _ => ScanError::Io {
                path,
                source: std::io::Error::other(error.to_string()),
            },
        }
    }
}
