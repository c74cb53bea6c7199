//! Health & readiness handlers.
//!
//! - GET /healthz  -> process is up and routing requests
//! - GET /readyz   -> storage backend answers its probe

use crate::services::gateway_service::Gateway;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use std::{collections::BTreeMap, sync::Arc};
use tracing::warn;

/// `GET /healthz`
///
/// Answers as long as the gateway can route a request. Storage is not
/// consulted; that is what `/readyz` is for.
pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, Json(Liveness { status: "ok" }))
}

/// `GET /readyz`
///
/// Probes the storage backend (for the filesystem backend: the root is a
/// listable directory). HTTP 200 when it answers, HTTP 503 otherwise. The
/// probe error is logged; the body only says storage is unavailable.
pub async fn readyz(State(gateway): State<Arc<Gateway>>) -> impl IntoResponse {
    let storage = match gateway.ready().await {
        Ok(()) => Check::passing(),
        Err(e) => {
            warn!("storage readiness probe failed: {}", e);
            Check::failing("storage unavailable")
        }
    };

    let ready = storage.ok;
    let body = Readiness {
        status: if ready { "ok" } else { "unavailable" },
        checks: BTreeMap::from([("storage", storage)]),
    };
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(body))
}

#[derive(Serialize)]
struct Liveness {
    status: &'static str,
}

#[derive(Serialize)]
struct Readiness {
    status: &'static str,
    checks: BTreeMap<&'static str, Check>,
}

#[derive(Serialize)]
struct Check {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'static str>,
}

impl Check {
    fn passing() -> Self {
        Self {
            ok: true,
            error: None,
        }
    }

    fn failing(error: &'static str) -> Self {
        Self {
            ok: false,
            error: Some(error),
        }
    }
}
