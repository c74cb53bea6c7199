//! The gateway pipeline and the storage capability it reads from.

pub mod access_policy;
pub mod content_resolver;
pub mod gateway_service;
pub mod normalizer;
pub mod object_fetcher;
pub mod response_builder;
pub mod storage_backend;
