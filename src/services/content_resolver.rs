//! Suffix-driven content typing.
//!
//! One table decides the `Content-Type`, whether the object is sent inline
//! as text or as a base64 attachment, and which suffixes are servable at
//! all. The table is independent of the access policy: widening one does
//! not widen the other.

use crate::{
    errors::GatewayError,
    models::{
        content::{ContentPlan, Disposition, TransferEncoding},
        key::CanonicalKey,
    },
};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

/// One row of the content table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContentTypeEntry {
    pub content_type: String,

    /// Binary objects are sent as base64 attachments; text objects inline.
    #[serde(default)]
    pub binary: bool,
}

impl ContentTypeEntry {
    pub fn text(content_type: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            binary: false,
        }
    }

    pub fn binary(content_type: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            binary: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ContentResolver {
    table: HashMap<String, ContentTypeEntry>,
}

impl ContentResolver {
    pub fn new(entries: impl IntoIterator<Item = (String, ContentTypeEntry)>) -> Self {
        let mut resolver = Self::default();
        resolver.extend(entries);
        resolver
    }

    /// Types for update manifests, landing pages and installers.
    pub fn builtin() -> Self {
        Self::new([
            ("xml".into(), ContentTypeEntry::text("application/rss+xml")),
            ("html".into(), ContentTypeEntry::text("text/html")),
            ("htm".into(), ContentTypeEntry::text("text/html")),
            ("txt".into(), ContentTypeEntry::text("text/plain")),
            ("json".into(), ContentTypeEntry::text("application/json")),
            ("exe".into(), ContentTypeEntry::binary("application/octet-stream")),
            ("msi".into(), ContentTypeEntry::binary("application/octet-stream")),
            ("zip".into(), ContentTypeEntry::binary("application/zip")),
            ("gz".into(), ContentTypeEntry::binary("application/gzip")),
            (
                "dmg".into(),
                ContentTypeEntry::binary("application/x-apple-diskimage"),
            ),
        ])
    }

    /// Parse a JSON table such as
    /// `{".pdf": {"content_type": "application/pdf", "binary": true}}`.
    pub fn parse_table(json: &str) -> serde_json::Result<BTreeMap<String, ContentTypeEntry>> {
        serde_json::from_str(json)
    }

    /// Add or replace entries. Suffixes are lower-cased and may carry a
    /// leading dot.
    pub fn extend(&mut self, entries: impl IntoIterator<Item = (String, ContentTypeEntry)>) {
        for (suffix, entry) in entries {
            let suffix = suffix.trim().trim_start_matches('.').to_ascii_lowercase();
            if !suffix.is_empty() {
                self.table.insert(suffix, entry);
            }
        }
    }

    pub fn resolve(&self, key: &CanonicalKey) -> Result<ContentPlan, GatewayError> {
        let entry = key
            .extension()
            .and_then(|ext| self.table.get(&ext))
            .ok_or_else(|| GatewayError::UnsupportedType {
                key: key.to_string(),
            })?;

        let (disposition, transfer_encoding) = if entry.binary {
            (Disposition::Attachment, TransferEncoding::Base64)
        } else {
            (Disposition::Inline, TransferEncoding::Identity)
        };

        Ok(ContentPlan {
            content_type: entry.content_type.clone(),
            disposition,
            filename: key.file_name().to_string(),
            transfer_encoding,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_suffixes_are_inline_identity() {
        let plan = ContentResolver::builtin()
            .resolve(&CanonicalKey::new("index.html"))
            .unwrap();
        assert_eq!(plan.content_type, "text/html");
        assert_eq!(plan.disposition, Disposition::Inline);
        assert_eq!(plan.transfer_encoding, TransferEncoding::Identity);
    }

    #[test]
    fn binary_suffixes_are_base64_attachments_named_by_last_segment() {
        let plan = ContentResolver::builtin()
            .resolve(&CanonicalKey::new("downloads/app/Update.EXE"))
            .unwrap();
        assert_eq!(plan.content_type, "application/octet-stream");
        assert_eq!(plan.disposition, Disposition::Attachment);
        assert_eq!(plan.filename, "Update.EXE");
        assert_eq!(plan.transfer_encoding, TransferEncoding::Base64);
    }

    #[test]
    fn unknown_or_missing_suffix_is_unsupported() {
        let resolver = ContentResolver::builtin();
        for raw in ["report.pdf", "LICENSE", "downloads/"] {
            let err = resolver.resolve(&CanonicalKey::new(raw)).unwrap_err();
            assert!(
                matches!(err, GatewayError::UnsupportedType { ref key } if key == raw),
                "{raw}: {err:?}"
            );
        }
    }

    #[test]
    fn json_table_extends_and_overrides() {
        let table = ContentResolver::parse_table(
            r#"{
                ".PDF": {"content_type": "application/pdf", "binary": true},
                "xml": {"content_type": "application/xml"}
            }"#,
        )
        .unwrap();
        let mut resolver = ContentResolver::builtin();
        resolver.extend(table);

        let pdf = resolver.resolve(&CanonicalKey::new("report.pdf")).unwrap();
        assert_eq!(pdf.transfer_encoding, TransferEncoding::Base64);
        let xml = resolver.resolve(&CanonicalKey::new("appcast.xml")).unwrap();
        assert_eq!(xml.content_type, "application/xml");
        assert_eq!(xml.transfer_encoding, TransferEncoding::Identity);
    }

    #[test]
    fn malformed_table_is_an_error() {
        assert!(ContentResolver::parse_table(r#"{"pdf": {"binary": true}}"#).is_err());
        assert!(ContentResolver::parse_table("[]").is_err());
    }
}
