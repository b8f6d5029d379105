//! Declarative security requirements
//!
//! A [`SecurityMiddlewareConfig`] is written once per call site (a screen,
//! a route, a mutation) and evaluated by the composer against the current
//! context. It can also be deserialized so route requirements can live in
//! configuration.
//!
//! ```rust
//! use gatehouse_authz::middleware::SecurityMiddlewareConfig;
//!
//! // Editing a page: need pages.edit, and must own the page or be on its team
//! let config = SecurityMiddlewareConfig::new()
//!     .require_all(["pages.edit"])
//!     .require_ownership("page")
//!     .with_team_access();
//!
//! assert!(config.ownership.as_ref().unwrap().allow_team_access);
//! ```

use crate::policy::RoleLevel;
use gatehouse_core::PermissionValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// How a set of required permissions is combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Combinator {
    /// At least one permission
    Any,
    /// Every permission
    #[default]
    All,
}

/// Permissions a call site requires
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PermissionRequirement {
    #[serde(default)]
    pub permissions: BTreeSet<PermissionValue>,

    #[serde(default)]
    pub combinator: Combinator,
}

impl PermissionRequirement {
    pub fn is_empty(&self) -> bool {
        self.permissions.is_empty()
    }
}

/// Ownership a call site requires
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipRequirement {
    /// Kind of resource the call site acts on
    pub resource_type: String,

    /// Whether membership of the owning team is sufficient
    #[serde(default)]
    pub allow_team_access: bool,
}

/// Requirement evaluated by the security composer
///
/// Every part is optional; an empty config only requires authentication.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SecurityMiddlewareConfig {
    #[serde(default)]
    pub required_permissions: PermissionRequirement,

    #[serde(default)]
    pub min_role_level: Option<RoleLevel>,

    #[serde(default)]
    pub ownership: Option<OwnershipRequirement>,
}

impl SecurityMiddlewareConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only require a signed-in principal
    pub fn authenticated() -> Self {
        Self::default()
    }

    /// Require at least one of `permissions`
    pub fn require_any<I, P>(self, permissions: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PermissionValue>,
    {
        self.require(permissions, Combinator::Any)
    }

    /// Require every one of `permissions`
    pub fn require_all<I, P>(self, permissions: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PermissionValue>,
    {
        self.require(permissions, Combinator::All)
    }

    /// Require a minimum role level
    pub fn min_role_level(mut self, level: RoleLevel) -> Self {
        self.min_role_level = Some(level);
        self
    }

    /// Require ownership of a resource of `resource_type`
    pub fn require_ownership(mut self, resource_type: impl Into<String>) -> Self {
        self.ownership = Some(OwnershipRequirement {
            resource_type: resource_type.into(),
            allow_team_access: false,
        });
        self
    }

    /// Accept owning-team members; no effect without an ownership requirement
    pub fn with_team_access(mut self) -> Self {
        if let Some(ownership) = &mut self.ownership {
            ownership.allow_team_access = true;
        }
        self
    }

    /// Whether the config declares any authorization requirement
    pub fn has_authorization_requirement(&self) -> bool {
        self.min_role_level.is_some() || !self.required_permissions.is_empty()
    }

    fn require<I, P>(mut self, permissions: I, combinator: Combinator) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PermissionValue>,
    {
        self.required_permissions = PermissionRequirement {
            permissions: permissions.into_iter().map(Into::into).collect(),
            combinator,
        };
        self
    }
}
