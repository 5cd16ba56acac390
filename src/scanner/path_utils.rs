//! Unicode path normalization utilities.
//!
//! macOS stores file names in NFD (decomposed) form while Linux and Windows
//! usually keep NFC (composed) form, so the same visual name can have two
//! byte representations:
//!
//! - NFC: `café.txt` - 'é' is U+00E9 (single code point)
//! - NFD: `café.txt` - 'e' U+0065 + combining acute accent U+0301
//!
//! Path keys used for set membership (the master/client disjointness check)
//! are built per component and normalized to NFC so both spellings collide.
//!
//! # Example
//!
//! ```
//! use hdcleaner::scanner::path_utils::{normalize_path_str, path_key};
//! use std::path::Path;
//!
//! let nfc = "café.txt";
//! let nfd = "cafe\u{0301}.txt";
//!
//! assert_eq!(normalize_path_str(nfc), normalize_path_str(nfd));
//! assert_eq!(path_key(Path::new(nfc)), path_key(Path::new(nfd)));
//! ```

use std::borrow::Cow;
use std::ffi::OsString;
use std::path::{Component, Path};

use unicode_normalization::{is_nfc_quick, IsNormalized, UnicodeNormalization};

/// Normalize a path string to NFC (composed) form.
#[must_use]
pub fn normalize_path_str(s: &str) -> String {
    s.nfc().collect()
}

/// Normalize a path string to NFC, borrowing when it is already NFC.
#[must_use]
pub fn normalize_path_str_cow(s: &str) -> Cow<'_, str> {
    match is_nfc_quick(s.chars()) {
        IsNormalized::Yes => Cow::Borrowed(s),
        _ => Cow::Owned(normalize_path_str(s)),
    }
}

/// One component of a [`PathKey`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum KeyComponent {
    Prefix(OsString),
    RootDir,
    ParentDir,
    /// UTF-8 name in NFC form
    Name(String),
    /// Name that is not valid UTF-8, kept byte for byte
    Raw(OsString),
}

/// Identity of a path for the master/client disjointness check.
///
/// Two paths get the same key when they name the same location component by
/// component: repeated separators and `.` segments are ignored, and UTF-8
/// names compare in NFC form. Names that are not valid UTF-8 keep their raw
/// bytes, so two distinct undecodable names never share a key. `..` is kept
/// as a component, since resolving it needs the filesystem.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathKey(Vec<KeyComponent>);

/// Key for a path in NFC-insensitive sets and maps.
#[must_use]
pub fn path_key(path: &Path) -> PathKey {
    let components = path
        .components()
        .filter_map(|component| match component {
            Component::Prefix(prefix) => Some(KeyComponent::Prefix(prefix.as_os_str().to_os_string())),
            Component::RootDir => Some(KeyComponent::RootDir),
            Component::CurDir => None,
            Component::ParentDir => Some(KeyComponent::ParentDir),
            Component::Normal(name) => Some(match name.to_str() {
                Some(name) => KeyComponent::Name(normalize_path_str_cow(name).into_owned()),
                None => KeyComponent::Raw(name.to_os_string()),
            }),
        })
        .collect();
    PathKey(components)
}
