//! An object fetched from the storage backend.

use super::key::CanonicalKey;
use bytes::Bytes;

/// The whole body of one stored object, held for the duration of a request.
///
/// Absence is not represented here: a missing object is the fetcher's
/// not-found outcome, so a record always carries bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRecord {
    /// Key the object was looked up under.
    pub key: CanonicalKey,

    /// Raw payload as returned by the backend.
    pub bytes: Bytes,
}

impl ObjectRecord {
    pub fn new(key: CanonicalKey, bytes: impl Into<Bytes>) -> Self {
        Self {
            key,
            bytes: bytes.into(),
        }
    }

    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }
}
