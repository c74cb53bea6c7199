//! src/services/gateway_service.rs
//!
//! Gateway: runs one request through the pipeline
//! normalize → policy → fetch → resolve → build.
//!
//! Each stage short-circuits to an error envelope; the policy is always
//! consulted before storage is touched, so a disallowed object is refused
//! whether or not it exists. Nothing is cached between calls, so repeated
//! calls against unchanged storage produce identical envelopes.

use crate::{
    config::GatewayConfig,
    errors::GatewayError,
    models::{
        access::AccessDecision,
        content::ContentPlan,
        envelope::{GatewayEvent, ResponseEnvelope},
        object::ObjectRecord,
    },
    services::{
        access_policy::AccessPolicy,
        content_resolver::ContentResolver,
        normalizer::{KeyCase, PathNormalizer},
        object_fetcher::ObjectFetcher,
        response_builder,
        storage_backend::{BackendResult, ObjectBackend},
    },
};
use std::sync::Arc;
use tracing::{debug, error, info};

pub struct Gateway {
    normalizer: PathNormalizer,
    policy: AccessPolicy,
    resolver: ContentResolver,
    fetcher: ObjectFetcher,
}

impl Gateway {
    /// Build the pipeline over a process-wide backend handle.
    ///
    /// With the `lower` case policy, prefix allow-list entries are
    /// lower-cased too so they can still match requested keys.
    pub fn new(config: &GatewayConfig, backend: Arc<dyn ObjectBackend>) -> Self {
        let normalizer = PathNormalizer::new(config.default_document.clone(), config.key_case);
        let prefixes = config.allowed_prefixes.iter().map(|prefix| match config.key_case {
            KeyCase::Preserve => prefix.clone(),
            KeyCase::Lower => prefix.to_lowercase(),
        });
        let policy = AccessPolicy::new(&config.allowed_extensions, prefixes, config.combine);

        Self {
            normalizer,
            policy,
            resolver: config.content_types.clone(),
            fetcher: ObjectFetcher::new(backend, config.fetch_timeout),
        }
    }

    /// Serve a raw request path. Never fails: every error becomes an
    /// envelope.
    pub async fn handle(&self, raw_path: &str) -> ResponseEnvelope {
        let outcome = self.run(raw_path).await;
        if let Err(err) = &outcome {
            log_failure(raw_path, err);
        }
        let envelope = response_builder::build(outcome);
        debug!(
            "responded to {:?} with status {}",
            raw_path, envelope.status_code
        );
        envelope
    }

    /// Serve a function-style trigger event.
    pub async fn handle_event(&self, event: &GatewayEvent) -> ResponseEnvelope {
        self.handle(event.raw_path()).await
    }

    /// Readiness of the storage backend.
    pub async fn ready(&self) -> BackendResult<()> {
        self.fetcher.backend().probe().await
    }

    async fn run(&self, raw_path: &str) -> Result<(ContentPlan, ObjectRecord), GatewayError> {
        let key = self.normalizer.normalize(raw_path);
        debug!("normalized {:?} to key {:?}", raw_path, key.as_str());
        if key.is_empty() {
            return Err(GatewayError::InvalidRequest(
                "empty path and no default document configured".into(),
            ));
        }

        if let AccessDecision::Denied(reason) = self.policy.decide(&key) {
            return Err(GatewayError::Denied {
                key: key.to_string(),
                reason,
            });
        }
        debug!("policy allowed {}", key);

        let record = self.fetcher.fetch(&key).await?;
        debug!("fetched {} ({} bytes)", key, record.size_bytes());

        // Resolved after the read: an absent key is 404 whatever its
        // suffix, and text decoding needs the bytes anyway.
        let plan = self.resolver.resolve(&key)?;
        Ok((plan, record))
    }
}

fn log_failure(raw_path: &str, err: &GatewayError) {
    match err {
        GatewayError::Backend { key, source } => {
            error!("backend failure for {} (path {:?}): {}", key, raw_path, source)
        }
        GatewayError::Denied { key, reason } => {
            info!("denied {} (path {:?}): {}", key, raw_path, reason)
        }
        other => debug!("request for {:?} failed: {}", raw_path, other),
    }
}
