//! Turns an untrusted request path into a canonical storage key.

use crate::models::key::CanonicalKey;
use clap::ValueEnum;

/// Case handling applied to keys before policy checks and lookups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum KeyCase {
    /// Look keys up exactly as requested.
    #[default]
    Preserve,
    /// Lower-case every requested key.
    Lower,
}

#[derive(Debug, Clone)]
pub struct PathNormalizer {
    default_document: Option<String>,
    key_case: KeyCase,
}

impl PathNormalizer {
    /// `default_document` is served for empty paths. It is itself collapsed
    /// and stripped of leading separators; a document that normalizes to
    /// nothing counts as disabled. Case policy is not applied to it.
    pub fn new(default_document: Option<String>, key_case: KeyCase) -> Self {
        let default_document = default_document
            .map(|doc| collapse_and_strip(&doc))
            .filter(|doc| !doc.is_empty());
        Self {
            default_document,
            key_case,
        }
    }

    /// Total: every input maps to a key. The key is empty only when the path
    /// is empty and no default document is configured.
    ///
    /// `.` and `..` segments are left in place for the access policy to
    /// reject.
    pub fn normalize(&self, raw: &str) -> CanonicalKey {
        let stripped = collapse_and_strip(raw);
        if stripped.is_empty() {
            return CanonicalKey::new(self.default_document.clone().unwrap_or_default());
        }
        match self.key_case {
            KeyCase::Preserve => CanonicalKey::new(stripped),
            KeyCase::Lower => CanonicalKey::new(stripped.to_lowercase()),
        }
    }
}

/// Collapse runs of `/` and drop the single leading separator left over.
fn collapse_and_strip(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut prev_sep = false;
    for ch in raw.chars() {
        let is_sep = ch == '/';
        if !(is_sep && prev_sep) {
            out.push(ch);
        }
        prev_sep = is_sep;
    }
    match out.strip_prefix('/') {
        Some(rest) => rest.to_string(),
        None => out,
    }
}
