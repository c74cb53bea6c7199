//! Outcome of the access policy for a single canonical key.

use std::fmt;

/// Whether a key may be served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Allowed,
    Denied(DenyReason),
}

/// Why a key was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// The key contains a `..` sequence.
    Traversal,
    /// The key contains a backslash or an ASCII control character.
    ForbiddenCharacter,
    /// No allow-list is configured, so nothing can be served.
    NoRulesConfigured,
    ExtensionNotAllowed,
    PrefixNotAllowed,
    /// Both lists are configured in `any` mode and neither matched.
    NoRuleMatched,
}

impl DenyReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DenyReason::Traversal => "path traversal is not allowed",
            DenyReason::ForbiddenCharacter => "path contains a forbidden character",
            DenyReason::NoRulesConfigured => "no allow-list rules are configured",
            DenyReason::ExtensionNotAllowed => "file extension is not allowed",
            DenyReason::PrefixNotAllowed => "path is outside the allowed prefixes",
            DenyReason::NoRuleMatched => "path matches no allow-list rule",
        }
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
