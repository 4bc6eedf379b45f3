//! Context identifiers.
//!
//! A context is the spatial or logical partition (usually a scene) that a
//! participant is currently viewing. Events carry the context they were
//! produced in, and receivers compare it against their own.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Identifier of a scene or other viewable context.
///
/// Equality is exact string equality; there is no hierarchical matching.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export, export_to = "bindings/")]
pub struct ContextId(String);

impl ContextId {
    /// Create a context identifier from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for ContextId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ContextId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for ContextId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<ContextId> for String {
    fn from(id: ContextId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_is_exact() {
        assert_eq!(ContextId::new("scene1"), ContextId::from("scene1"));
        assert_ne!(ContextId::new("scene1"), ContextId::new("Scene1"));
        assert_ne!(ContextId::new("scene1"), ContextId::new("scene1 "));
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&ContextId::new("abc")).unwrap_or_default();
        assert_eq!(json, "\"abc\"");
    }
}
