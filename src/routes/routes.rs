//! Defines routes for the asset gateway.
//!
//! ## Structure
//! - **Probes**
//!   - `GET  /healthz` — liveness
//!   - `GET  /readyz`  — storage readiness
//!
//! - **Triggers**
//!   - `POST /invoke`  — event JSON in, envelope JSON out
//!   - `GET  /`        — default document
//!   - `GET  /{*path}` — any asset; nested keys like `downloads/app/update.exe`

use crate::{
    handlers::{
        asset_handlers::{get_asset, get_root, invoke},
        health_handlers::{healthz, readyz},
    },
    services::gateway_service::Gateway,
};
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

/// Build the router. The shared `Gateway` is attached with `with_state`.
pub fn routes() -> Router<Arc<Gateway>> {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/invoke", post(invoke))
        .route("/", get(get_root))
        .route("/{*path}", get(get_asset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::GatewayConfig,
        services::{
            access_policy::Combine,
            storage_backend::{FilesystemBackend, memory::MemoryBackend},
        },
    };
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
        response::Response,
    };
    use base64::{Engine as _, engine::general_purpose};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn app_with(config: GatewayConfig, backend: MemoryBackend) -> Router {
        routes().with_state(Arc::new(Gateway::new(&config, Arc::new(backend))))
    }

    fn app() -> Router {
        let mut config = GatewayConfig::default();
        config.allowed_prefixes = vec!["downloads".into(), "index.html".into()];
        app_with(
            config,
            MemoryBackend::new()
                .with_object("index.html", "<h1>Downloads</h1>")
                .with_object("downloads/app/update.exe", &b"MZ\x90\x00\x03"[..])
                .with_object("downloads/appcast.xml", "<rss version=\"2.0\"/>"),
        )
    }

    async fn get_uri(app: &Router, uri: &str) -> Response {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        app.clone().oneshot(request).await.unwrap()
    }

    async fn body_bytes(response: Response) -> Vec<u8> {
        response.into_body().collect().await.unwrap().to_bytes().to_vec()
    }

    async fn post_invoke(app: &Router, event: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/invoke")
            .header("content-type", "application/json")
            .body(Body::from(event.to_string()))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = body_bytes(response).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn installer_download_is_raw_bytes() {
        let response = get_uri(&app(), "/downloads/app/update.exe").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/octet-stream"
        );
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=update.exe"
        );
        assert_eq!(body_bytes(response).await, b"MZ\x90\x00\x03");
    }

    #[tokio::test]
    async fn root_serves_default_document() {
        let response = get_uri(&app(), "/").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/html");
        assert_eq!(body_bytes(response).await, b"<h1>Downloads</h1>");
    }

    #[tokio::test]
    async fn manifest_is_served_inline() {
        let response = get_uri(&app(), "/downloads/appcast.xml").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/rss+xml"
        );
        assert!(response.headers().get(header::CONTENT_DISPOSITION).is_none());
    }

    #[tokio::test]
    async fn http_errors_carry_json_bodies() {
        let app = app();

        let response = get_uri(&app, "/private/update.exe").await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(body["error"], "Denied");

        let response = get_uri(&app, "/downloads/missing.zip").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );
    }

    #[tokio::test]
    async fn invoke_returns_envelope_json() {
        let app = app();

        let (status, envelope) = post_invoke(
            &app,
            json!({"path": "//downloads//app//update.exe"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(envelope["statusCode"], 200);
        assert_eq!(envelope["isBodyEncoded"], true);
        let body = envelope["body"].as_str().unwrap();
        assert_eq!(
            general_purpose::STANDARD.decode(body).unwrap(),
            b"MZ\x90\x00\x03"
        );

        let (_, envelope) = post_invoke(&app, json!({"pathParameters": {"proxy": null}})).await;
        assert_eq!(envelope["statusCode"], 200);
        assert_eq!(envelope["body"], "<h1>Downloads</h1>");

        let (_, envelope) = post_invoke(&app, json!({"path": "../../etc/passwd"})).await;
        assert_eq!(envelope["statusCode"], 403);
    }

    #[tokio::test]
    async fn invoke_rejects_malformed_events() {
        let request = Request::builder()
            .method("POST")
            .uri("/invoke")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn filesystem_backed_gateway_serves_files() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("downloads")).unwrap();
        std::fs::write(dir.path().join("downloads/app.zip"), b"PK\x03\x04").unwrap();
        std::fs::write(dir.path().join("index.html"), "home").unwrap();

        let mut config = GatewayConfig::default();
        config.allowed_prefixes = vec!["downloads".into()];
        config.combine = Combine::Any;
        let backend = Arc::new(FilesystemBackend::new(dir.path()));
        let app = routes().with_state(Arc::new(Gateway::new(&config, backend)));

        let response = get_uri(&app, "/downloads/app.zip").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_bytes(response).await, b"PK\x03\x04");

        let response = get_uri(&app, "/").await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = get_uri(&app, "/readyz").await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn readyz_reports_unavailable_storage() {
        let dir = TempDir::new().unwrap();
        let backend = Arc::new(FilesystemBackend::new(dir.path().join("gone")));
        let app = routes().with_state(Arc::new(Gateway::new(
            &GatewayConfig::default(),
            backend,
        )));

        let response = get_uri(&app, "/readyz").await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let raw = body_bytes(response).await;
        let body: Value = serde_json::from_slice(&raw).unwrap();
        assert_eq!(body["status"], "unavailable");
        assert_eq!(body["checks"]["storage"]["ok"], false);
        assert_eq!(body["checks"]["storage"]["error"], "storage unavailable");
        let root = dir.path().to_string_lossy().into_owned();
        assert!(!String::from_utf8_lossy(&raw).contains(&root));

        let response = get_uri(&app, "/healthz").await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(body, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn undecodable_path_is_json_bad_request() {
        let response = get_uri(&app(), "/downloads/%FF.exe").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );
        let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(body["status"], 400);
    }
}
