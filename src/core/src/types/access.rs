//! Policy vocabulary: roles and permission tokens
//!
//! Both are opaque tokens compared by equality only. The concrete set of
//! roles and permissions is configuration supplied by the embedding
//! application, so nothing here interprets their contents.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role assigned to a principal (e.g. "member", "admin")
///
/// Ordering between roles comes from the policy's level table, not from
/// the token itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(String);

impl Role {
    /// Create a new role token
    pub fn new<S: Into<String>>(name: S) -> Self {
        Role(name.into())
    }

    /// Get the role name
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Role {
    fn from(s: &str) -> Self {
        Role(s.to_string())
    }
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        Role(s)
    }
}

/// Capability token gating one action
///
/// Namespaced by convention as `"<domain>.<action>"` (e.g. `pages.create`),
/// but never parsed. Ordered so requirement sets iterate deterministically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionValue(String);

impl PermissionValue {
    /// Create a new permission token
    pub fn new<S: Into<String>>(token: S) -> Self {
        PermissionValue(token.into())
    }

    /// Get the permission token
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PermissionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PermissionValue {
    fn from(s: &str) -> Self {
        PermissionValue(s.to_string())
    }
}

impl From<String> for PermissionValue {
    fn from(s: String) -> Self {
        PermissionValue(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_compare_by_equality_only() {
        assert_eq!(Role::from("admin"), Role::new("admin"));
        assert_ne!(Role::from("admin"), Role::from("Admin"));

        // "pages.*" is not a wildcard
        assert_ne!(PermissionValue::from("pages.*"), PermissionValue::from("pages.create"));
    }

    #[test]
    fn test_permission_ordering_is_lexical() {
        let mut perms = vec![
            PermissionValue::from("pages.delete"),
            PermissionValue::from("analytics.view"),
            PermissionValue::from("pages.create"),
        ];
        perms.sort();
        assert_eq!(perms[0].as_str(), "analytics.view");
        assert_eq!(perms[2].as_str(), "pages.delete");
    }
}
