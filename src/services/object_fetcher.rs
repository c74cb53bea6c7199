//! Fetches one object per request from the shared backend handle.

use crate::{
    errors::GatewayError,
    models::{key::CanonicalKey, object::ObjectRecord},
    services::storage_backend::{BackendError, BackendResult, ObjectBackend},
};
use bytes::Bytes;
use std::{sync::Arc, time::Duration};
use tokio::time;
use tracing::warn;

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct ObjectFetcher {
    backend: Arc<dyn ObjectBackend>,
    timeout: Duration,
}

impl ObjectFetcher {
    pub fn new(backend: Arc<dyn ObjectBackend>, timeout: Duration) -> Self {
        Self { backend, timeout }
    }

    pub fn backend(&self) -> &Arc<dyn ObjectBackend> {
        &self.backend
    }

    /// Existence check then read, both under one deadline.
    ///
    /// Absence at either step is `NotFound`. A key the backend refuses as
    /// unsafe is also answered as `NotFound`, so the response does not reveal
    /// how storage is laid out. Everything else, including the deadline
    /// passing, is a `Backend` error that keeps the underlying cause. No
    /// retries.
    pub async fn fetch(&self, key: &CanonicalKey) -> Result<ObjectRecord, GatewayError> {
        let outcome = match time::timeout(self.timeout, self.exists_then_read(key.as_str())).await
        {
            Ok(outcome) => outcome,
            Err(_) => Err(BackendError::Timeout(self.timeout)),
        };

        match outcome {
            Ok(bytes) => Ok(ObjectRecord::new(key.clone(), bytes)),
            Err(BackendError::NotFound(_)) => Err(GatewayError::NotFound(key.to_string())),
            Err(BackendError::InvalidKey(reason)) => {
                warn!("backend refused key {}: {}", key, reason);
                Err(GatewayError::NotFound(key.to_string()))
            }
            Err(source) => Err(GatewayError::Backend {
                key: key.to_string(),
                source,
            }),
        }
    }

    async fn exists_then_read(&self, key: &str) -> BackendResult<Bytes> {
        if !self.backend.exists(key).await? {
            return Err(BackendError::NotFound(key.to_string()));
        }
        self.backend.read(key).await
    }
}
