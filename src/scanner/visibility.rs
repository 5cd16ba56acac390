//! Path-based visibility classification.
//!
//! A file's [`Visibility`] is derived purely from the names of its path
//! components, never from filesystem attributes. Components are inspected from
//! the leaf toward the root and the first component that matches a rule
//! decides the class:
//!
//! 1. system metadata (`.DS_Store`, `._*`, `Thumbs.db`, ...) → [`Visibility::SystemMetadata`]
//! 2. version-control markers (`.git*`, `.hg*`, `.svn*`, `.bzr*`) → [`Visibility::VcsMetadata`]
//! 3. any other dot-name → [`Visibility::Hidden`]
//!
//! # Example
//!
//! ```
//! use hdcleaner::scanner::visibility::{classify, Visibility};
//! use std::path::Path;
//!
//! assert_eq!(classify(Path::new("docs/readme.md")), Visibility::Visible);
//! assert_eq!(classify(Path::new(".cache/repo/.git/HEAD")), Visibility::VcsMetadata);
//! assert_eq!(classify(Path::new("photos/.DS_Store")), Visibility::SystemMetadata);
//! assert_eq!(classify(Path::new("home/.config/app.toml")), Visibility::Hidden);
//! ```

use std::path::{Component, Path};

/// Visibility class of a catalogued file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    /// No hidden or metadata component anywhere in the path.
    Visible,
    /// Some component starts with `.`.
    Hidden,
    /// Some component is a version-control marker.
    VcsMetadata,
    /// Some component is an OS-generated metadata file or directory.
    SystemMetadata,
}

impl Visibility {
    /// Whether this is [`Visibility::Visible`].
    #[must_use]
    pub fn is_visible(self) -> bool {
        self == Self::Visible
    }
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Visible => write!(f, "visible"),
            Self::Hidden => write!(f, "hidden"),
            Self::VcsMetadata => write!(f, "vcs"),
            Self::SystemMetadata => write!(f, "system"),
        }
    }
}

/// Name prefixes of OS-generated metadata (macOS Finder, AppleDouble, Spotlight).
const SYSTEM_METADATA_PREFIXES: &[&str] = &[
    ".DS_Store",
    "._",
    ".Spotlight-V100",
    ".Trashes",
    ".fseventsd",
];

/// Exact names of OS-generated metadata, compared case-insensitively (Windows).
const SYSTEM_METADATA_NAMES: &[&str] = &["thumbs.db", "desktop.ini"];

/// Name prefixes of version-control metadata.
const VCS_PREFIXES: &[&str] = &[".git", ".hg", ".svn", ".bzr"];

/// Classify a single component name, or `None` if it is an ordinary name.
fn classify_component(name: &str) -> Option<Visibility> {
    if SYSTEM_METADATA_PREFIXES.iter().any(|p| name.starts_with(p))
        || SYSTEM_METADATA_NAMES
            .iter()
            .any(|n| name.eq_ignore_ascii_case(n))
    {
        Some(Visibility::SystemMetadata)
    } else if VCS_PREFIXES.iter().any(|p| name.starts_with(p)) {
        Some(Visibility::VcsMetadata)
    } else if name.starts_with('.') {
        Some(Visibility::Hidden)
    } else {
        None
    }
}

/// Classify a path by its component names, leaf first.
///
/// Only normal components are inspected; root, drive prefixes, `.` and `..`
/// never affect the result.
#[must_use]
pub fn classify(path: &Path) -> Visibility {
    path.components()
        .rev()
        .filter_map(|c| match c {
            Component::Normal(name) => Some(name.to_string_lossy()),
            _ => None,
        })
        .find_map(|name| classify_component(&name))
        .unwrap_or(Visibility::Visible)
}
