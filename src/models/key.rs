//! Canonical storage keys derived from untrusted request paths.

use serde::Serialize;
use std::fmt;

/// A normalized, relative storage key.
///
/// Only the path normalizer builds these: a key never begins with `/` and
/// never contains two consecutive separators. It may still contain `..`;
/// rejecting traversal is the access policy's job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CanonicalKey(String);

impl CanonicalKey {
    pub(crate) fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Final path segment, e.g. `update.exe` for `downloads/app/update.exe`.
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Lower-cased suffix of the final segment, without the dot.
    ///
    /// Dotfiles such as `.htaccess` and names ending in a bare `.` have no
    /// extension.
    pub fn extension(&self) -> Option<String> {
        let (stem, ext) = self.file_name().rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }
}

impl fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
