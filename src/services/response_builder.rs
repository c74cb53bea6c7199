//! Pure assembly of response envelopes.

use crate::{
    errors::GatewayError,
    models::{
        content::{ContentPlan, Disposition, TransferEncoding},
        envelope::ResponseEnvelope,
        object::ObjectRecord,
    },
};
use base64::{Engine as _, engine::general_purpose};
use serde_json::json;
use std::collections::BTreeMap;

pub const CONTENT_TYPE: &str = "Content-Type";
pub const CONTENT_DISPOSITION: &str = "Content-Disposition";

/// Envelope for the outcome of one request.
///
/// A successful fetch can still fail here if a text-classed object is not
/// valid UTF-8.
pub fn build(outcome: Result<(ContentPlan, ObjectRecord), GatewayError>) -> ResponseEnvelope {
    match outcome.and_then(|(plan, record)| success(&plan, &record)) {
        Ok(envelope) => envelope,
        Err(err) => failure(&err),
    }
}

/// 200 envelope with the body encoded per the plan.
pub fn success(plan: &ContentPlan, record: &ObjectRecord) -> Result<ResponseEnvelope, GatewayError> {
    let (body, is_body_encoded) = match plan.transfer_encoding {
        TransferEncoding::Identity => {
            let text = String::from_utf8(record.bytes.to_vec()).map_err(|source| {
                GatewayError::Undecodable {
                    key: record.key.to_string(),
                    source,
                }
            })?;
            (text, false)
        }
        TransferEncoding::Base64 => (general_purpose::STANDARD.encode(&record.bytes), true),
    };

    let mut headers = BTreeMap::new();
    headers.insert(CONTENT_TYPE.to_string(), plan.content_type.clone());
    if plan.disposition == Disposition::Attachment {
        headers.insert(
            CONTENT_DISPOSITION.to_string(),
            attachment_disposition(&plan.filename),
        );
    }

    Ok(ResponseEnvelope {
        status_code: 200,
        headers,
        body,
        is_body_encoded,
    })
}

/// Structured JSON error envelope. Backend failures name the key but keep
/// the underlying error out of the body.
pub fn failure(err: &GatewayError) -> ResponseEnvelope {
    let status = err.status().as_u16();
    let mut body = json!({
        "error": err.code(),
        "message": err.public_message(),
        "status": status,
    });
    if let Some(key) = err.key() {
        body["key"] = json!(key);
    }

    ResponseEnvelope {
        status_code: status,
        headers: BTreeMap::from([(CONTENT_TYPE.to_string(), "application/json".to_string())]),
        body: body.to_string(),
        is_body_encoded: false,
    }
}

/// `attachment; filename=update.exe`, quoting names that are not plain
/// tokens.
fn attachment_disposition(filename: &str) -> String {
    let is_token = !filename.is_empty()
        && filename
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b"!#$&+-.^_`|~".contains(&b));
    if is_token {
        format!("attachment; filename={}", filename)
    } else {
        let escaped = filename.replace('\\', "\\\\").replace('"', "\\\"");
        format!("attachment; filename=\"{}\"", escaped)
    }
}
