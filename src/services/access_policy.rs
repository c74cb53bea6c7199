//! Static allow-list policy over canonical key shape.

use crate::models::{
    access::{AccessDecision, DenyReason},
    key::CanonicalKey,
};
use clap::ValueEnum;
use std::collections::BTreeSet;

/// How the extension and prefix allow-lists combine when both are set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Combine {
    /// Both lists must match.
    #[default]
    All,
    /// Either list may match.
    Any,
}

#[derive(Debug, Clone)]
pub struct AccessPolicy {
    /// Lower-cased, without the leading dot.
    extensions: BTreeSet<String>,
    /// Without leading or trailing separators.
    prefixes: Vec<String>,
    combine: Combine,
}

impl AccessPolicy {
    /// Extensions may be written `.exe` or `exe`; prefixes `downloads`,
    /// `/downloads/` and `downloads/` are equivalent. Blank entries are
    /// ignored.
    pub fn new<E, P>(extensions: E, prefixes: P, combine: Combine) -> Self
    where
        E: IntoIterator,
        E::Item: AsRef<str>,
        P: IntoIterator,
        P::Item: AsRef<str>,
    {
        let extensions = extensions
            .into_iter()
            .map(|ext| {
                ext.as_ref()
                    .trim()
                    .trim_start_matches('.')
                    .to_ascii_lowercase()
            })
            .filter(|ext| !ext.is_empty())
            .collect();
        let prefixes = prefixes
            .into_iter()
            .map(|prefix| prefix.as_ref().trim().trim_matches('/').to_string())
            .filter(|prefix| !prefix.is_empty())
            .collect();
        Self {
            extensions,
            prefixes,
            combine,
        }
    }

    /// Decide from the key alone. Never touches storage.
    ///
    /// `..`, backslashes and control characters are refused before any
    /// allow-list is consulted, whatever the configuration.
    pub fn decide(&self, key: &CanonicalKey) -> AccessDecision {
        let raw = key.as_str();
        if raw.contains("..") {
            return AccessDecision::Denied(DenyReason::Traversal);
        }
        if raw.chars().any(|c| c == '\\' || c.is_control()) {
            return AccessDecision::Denied(DenyReason::ForbiddenCharacter);
        }

        let extension_ok = (!self.extensions.is_empty()).then(|| {
            key.extension()
                .is_some_and(|ext| self.extensions.contains(&ext))
        });
        let prefix_ok = (!self.prefixes.is_empty())
            .then(|| self.prefixes.iter().any(|prefix| has_prefix(raw, prefix)));

        let denied = match (extension_ok, prefix_ok) {
            (None, None) => Some(DenyReason::NoRulesConfigured),
            (Some(false), _) if self.combine == Combine::All || prefix_ok.is_none() => {
                Some(DenyReason::ExtensionNotAllowed)
            }
            (_, Some(false)) if self.combine == Combine::All || extension_ok.is_none() => {
                Some(DenyReason::PrefixNotAllowed)
            }
            (Some(false), Some(false)) => Some(DenyReason::NoRuleMatched),
            _ => None,
        };

        match denied {
            Some(reason) => AccessDecision::Denied(reason),
            None => AccessDecision::Allowed,
        }
    }
}

/// `downloads` covers `downloads` itself and everything beneath `downloads/`,
/// but not `downloads-old/...`.
fn has_prefix(key: &str, prefix: &str) -> bool {
    match key.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
