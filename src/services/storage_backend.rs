//! src/services/storage_backend.rs
//!
//! The storage capability the gateway reads from, and its local-disk
//! implementation. The gateway never writes: backends only answer
//! `exists` and `read` for a canonical key.

use async_trait::async_trait;
use bytes::Bytes;
use std::{
    io::{self, ErrorKind},
    path::{Component, Path, PathBuf},
    time::Duration,
};
use thiserror::Error;
use tokio::fs;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("object `{0}` not found")]
    NotFound(String),
    #[error("invalid object key `{0}`")]
    InvalidKey(String),
    #[error("backend did not answer within {0:?}")]
    Timeout(Duration),
    #[error("backend unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Read-only object storage as seen by the gateway.
///
/// Implementations are built once per process and shared immutably across
/// requests; they must not hold per-request state.
#[async_trait]
pub trait ObjectBackend: Send + Sync + 'static {
    /// Whether an object is stored under `key`.
    async fn exists(&self, key: &str) -> BackendResult<bool>;

    /// The full contents of the object under `key`.
    ///
    /// Returns `BackendError::NotFound` when it is absent.
    async fn read(&self, key: &str) -> BackendResult<Bytes>;

    /// Cheap readiness check used by `/readyz`.
    async fn probe(&self) -> BackendResult<()>;
}

const MAX_OBJECT_KEY_LEN: usize = 1024;

/// Serves objects from files beneath a root directory.
#[derive(Debug, Clone)]
pub struct FilesystemBackend {
    root: PathBuf,
}

impl FilesystemBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Key validation independent of the access policy.
    ///
    /// Rejects empty or oversized keys, absolute keys, `..`, backslashes and
    /// control bytes, and anything that is not a plain relative component.
    fn ensure_key_safe(&self, key: &str) -> BackendResult<()> {
        if key.is_empty() || key.len() > MAX_OBJECT_KEY_LEN {
            return Err(BackendError::InvalidKey(key.to_string()));
        }
        if key.starts_with('/') || key.contains("..") {
            return Err(BackendError::InvalidKey(key.to_string()));
        }
        if key.bytes().any(|b| b.is_ascii_control() || b == b'\\') {
            return Err(BackendError::InvalidKey(key.to_string()));
        }
        if !Path::new(key)
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(BackendError::InvalidKey(key.to_string()));
        }
        Ok(())
    }

    /// Map a key onto the filesystem and confirm it stays under the root.
    ///
    /// Existing paths are canonicalized so a symlink pointing outside the
    /// root is refused. Missing paths are returned as-is.
    async fn object_path(&self, key: &str) -> BackendResult<PathBuf> {
        self.ensure_key_safe(key)?;
        let path = self.root.join(key);

        let canonical = match fs::canonicalize(&path).await {
            Ok(canonical) => canonical,
            Err(err) if is_missing(&err) => return Ok(path),
            Err(err) => return Err(BackendError::Io(err)),
        };
        let root = fs::canonicalize(&self.root).await?;
        if !canonical.starts_with(&root) {
            warn!(
                "key {} resolves outside storage root {}",
                key,
                self.root.display()
            );
            return Err(BackendError::InvalidKey(key.to_string()));
        }
        Ok(path)
    }
}

#[async_trait]
impl ObjectBackend for FilesystemBackend {
    async fn exists(&self, key: &str) -> BackendResult<bool> {
        let path = self.object_path(key).await?;
        match fs::metadata(&path).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(err) if is_missing(&err) => Ok(false),
            Err(err) => Err(BackendError::Io(err)),
        }
    }

    async fn read(&self, key: &str) -> BackendResult<Bytes> {
        let path = self.object_path(key).await?;
        let data = fs::read(&path).await.map_err(|err| {
            if is_missing(&err) || err.kind() == ErrorKind::IsADirectory {
                BackendError::NotFound(key.to_string())
            } else {
                BackendError::Io(err)
            }
        })?;
        debug!("read {} bytes from {}", data.len(), path.display());
        Ok(Bytes::from(data))
    }

    async fn probe(&self) -> BackendResult<()> {
        let meta = fs::metadata(&self.root).await.map_err(|err| {
            BackendError::Unavailable(format!(
                "storage root {} is not accessible: {}",
                self.root.display(),
                err
            ))
        })?;
        if !meta.is_dir() {
            return Err(BackendError::Unavailable(format!(
                "storage root {} is not a directory",
                self.root.display()
            )));
        }
        let mut entries = fs::read_dir(&self.root).await?;
        entries.next_entry().await?;
        Ok(())
    }
}

/// `NotFound`, or a path component that is a file rather than a directory.
fn is_missing(err: &io::Error) -> bool {
    matches!(err.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory)
}
