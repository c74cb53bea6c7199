//! HTTP triggers for the gateway.
//!
//! `GET /{*path}` renders the envelope as a real HTTP response (base64
//! bodies are decoded back to bytes); `POST /invoke` takes the
//! function-style event JSON and answers with the envelope itself.

use crate::{
    errors::AppError,
    models::envelope::{GatewayEvent, ResponseEnvelope},
    services::gateway_service::Gateway,
};
use axum::{
    Json,
    body::{Body, Bytes},
    extract::{Path, State, rejection::PathRejection},
    http::{HeaderName, HeaderValue, StatusCode},
    response::Response,
};
use base64::{Engine as _, engine::general_purpose};
use std::sync::Arc;

/// `GET /` — the default document.
pub async fn get_root(State(gateway): State<Arc<Gateway>>) -> Result<Response, AppError> {
    render_envelope(gateway.handle("/").await)
}

/// `GET /{*path}` — any asset. A path axum cannot decode (e.g. `%FF`) is
/// answered with a JSON 400.
pub async fn get_asset(
    State(gateway): State<Arc<Gateway>>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Response, AppError> {
    let Path(path) =
        path.map_err(|err| AppError::bad_request(format!("invalid request path: {}", err)))?;
    render_envelope(gateway.handle(&path).await)
}

/// `POST /invoke` — function-style trigger. An empty body is an event with
/// no path.
pub async fn invoke(
    State(gateway): State<Arc<Gateway>>,
    body: Bytes,
) -> Result<Json<ResponseEnvelope>, AppError> {
    let event = if body.is_empty() {
        GatewayEvent::default()
    } else {
        serde_json::from_slice::<GatewayEvent>(&body)
            .map_err(|err| AppError::bad_request(format!("invalid trigger event: {}", err)))?
    };
    Ok(Json(gateway.handle_event(&event).await))
}

/// Turn an envelope into an HTTP response.
fn render_envelope(envelope: ResponseEnvelope) -> Result<Response, AppError> {
    let status = StatusCode::from_u16(envelope.status_code)
        .map_err(|err| AppError::internal(format!("invalid status code: {}", err)))?;

    let body = if envelope.is_body_encoded {
        general_purpose::STANDARD
            .decode(envelope.body.as_bytes())
            .map_err(|err| AppError::internal(format!("undecodable body: {}", err)))?
    } else {
        envelope.body.into_bytes()
    };

    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    for (name, value) in &envelope.headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|err| AppError::internal(format!("invalid header name {}: {}", name, err)))?;
        let value = HeaderValue::from_bytes(value.as_bytes())
            .map_err(|err| AppError::internal(format!("invalid header value: {}", err)))?;
        response.headers_mut().insert(name, value);
    }
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn encoded_bodies_are_decoded_to_raw_bytes() {
        let envelope = ResponseEnvelope {
            status_code: 200,
            headers: BTreeMap::from([
                (
                    "Content-Type".to_string(),
                    "application/octet-stream".to_string(),
                ),
                (
                    "Content-Disposition".to_string(),
                    "attachment; filename=update.exe".to_string(),
                ),
            ]),
            body: general_purpose::STANDARD.encode(b"MZ\x00\x01"),
            is_body_encoded: true,
        };
        let response = render_envelope(envelope).unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()["content-disposition"],
            "attachment; filename=update.exe"
        );
    }

    #[test]
    fn corrupt_envelope_is_an_internal_error() {
        let envelope = ResponseEnvelope {
            status_code: 200,
            headers: BTreeMap::new(),
            body: "not base64!".into(),
            is_body_encoded: true,
        };
        let err = render_envelope(envelope).unwrap_err();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
