//! Trigger-facing shapes: the inbound event and the response envelope.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The terminal artifact handed back to the trigger.
///
/// Headers live in a `BTreeMap` so two identical invocations serialize to
/// identical bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
    /// True when `body` is base64 and must be decoded to recover the bytes.
    pub is_body_encoded: bool,
}

/// Function-style trigger event.
///
/// Accepts either a direct `path` or the proxy-integration shape
/// `{"pathParameters": {"proxy": "..."}}`. When both are present `path` wins.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayEvent {
    #[serde(default)]
    pub path: Option<String>,

    #[serde(default)]
    pub path_parameters: Option<PathParameters>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathParameters {
    #[serde(default)]
    pub proxy: Option<String>,
}

impl GatewayEvent {
    /// Raw path to normalize; empty when the event names none, which the
    /// normalizer turns into the default document.
    pub fn raw_path(&self) -> &str {
        self.path
            .as_deref()
            .or_else(|| {
                self.path_parameters
                    .as_ref()
                    .and_then(|params| params.proxy.as_deref())
            })
            .unwrap_or("")
    }
}
