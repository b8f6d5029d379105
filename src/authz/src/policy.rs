//! Policy definition and validation
//!
//! The policy is supplied once by the embedding application and is
//! read-only for the lifetime of the process. It maps every role to a level
//! and to a (possibly empty) set of permissions, and names the bypass and
//! guest roles.

use crate::error::{AuthzError, Result};
use gatehouse_core::{PermissionValue, Role};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Position of a role in the privilege order
pub type RoleLevel = i32;

/// Level reported for roles missing from the policy
///
/// Strictly below every configured level, so an unrecognised role can never
/// satisfy a level requirement.
pub const UNKNOWN_ROLE_LEVEL: RoleLevel = RoleLevel::MIN;

/// One role entry in the policy configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDefinition {
    /// Role name (e.g. "member")
    pub name: Role,

    /// Position in the privilege order (higher = more privileged)
    pub level: RoleLevel,

    /// Permissions granted to the role
    #[serde(default)]
    pub permissions: Vec<PermissionValue>,
}

impl RoleDefinition {
    /// Create a role definition
    pub fn new(name: impl Into<Role>, level: RoleLevel) -> Self {
        Self {
            name: name.into(),
            level,
            permissions: Vec::new(),
        }
    }

    /// Grant permissions to the role
    pub fn with_permissions<I, P>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PermissionValue>,
    {
        self.permissions.extend(permissions.into_iter().map(Into::into));
        self
    }
}

/// Serializable policy configuration
///
/// ```toml
/// super_admin = "super_admin"
/// guest = "guest"
///
/// [[roles]]
/// name = "guest"
/// level = 0
///
/// [[roles]]
/// name = "member"
/// level = 10
/// permissions = ["pages.create", "pages.edit"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Role that bypasses every permission and ownership check
    pub super_admin: Role,

    /// Role given to unauthenticated principals
    pub guest: Role,

    /// All roles known to the application
    pub roles: Vec<RoleDefinition>,
}

/// Validated, immutable policy table
#[derive(Debug, Clone)]
pub struct PolicyTable {
    levels: HashMap<Role, RoleLevel>,
    permissions: HashMap<Role, HashSet<PermissionValue>>,
    super_admin: Role,
    guest: Role,
}

impl PolicyTable {
    /// Build a policy table from configuration
    ///
    /// # Errors
    ///
    /// Returns [`AuthzError::InvalidPolicy`] if:
    /// - a role name or permission token is empty
    /// - a role is defined twice
    /// - the super admin or guest role is not defined
    /// - the guest role is also the super admin role
    pub fn from_config(config: PolicyConfig) -> Result<Self> {
        let mut levels = HashMap::with_capacity(config.roles.len());
        let mut permissions = HashMap::with_capacity(config.roles.len());

        for role in config.roles {
            if role.name.as_str().is_empty() {
                return Err(AuthzError::InvalidPolicy(
                    "Role name cannot be empty".to_string(),
                ));
            }

            if levels.contains_key(&role.name) {
                return Err(AuthzError::InvalidPolicy(format!(
                    "Duplicate role: {}",
                    role.name
                )));
            }

            if role.permissions.iter().any(|p| p.as_str().is_empty()) {
                return Err(AuthzError::InvalidPolicy(format!(
                    "Role '{}' has an empty permission",
                    role.name
                )));
            }

            levels.insert(role.name.clone(), role.level);
            permissions.insert(role.name, role.permissions.into_iter().collect());
        }

        for (label, role) in [("super admin", &config.super_admin), ("guest", &config.guest)] {
            if !levels.contains_key(role) {
                return Err(AuthzError::InvalidPolicy(format!(
                    "The {} role '{}' is not defined",
                    label, role
                )));
            }
        }

        if config.super_admin == config.guest {
            return Err(AuthzError::InvalidPolicy(format!(
                "Role '{}' cannot be both the guest and the super admin role",
                config.guest
            )));
        }

        Ok(Self {
            levels,
            permissions,
            super_admin: config.super_admin,
            guest: config.guest,
        })
    }

    /// Level of a role, `None` if the role is not defined
    pub fn level(&self, role: &Role) -> Option<RoleLevel> {
        self.levels.get(role).copied()
    }

    /// Permissions of a role, `None` if the role is not defined
    pub fn permissions(&self, role: &Role) -> Option<&HashSet<PermissionValue>> {
        self.permissions.get(role)
    }

    /// The bypass role
    pub fn super_admin(&self) -> &Role {
        &self.super_admin
    }

    /// The unauthenticated role
    pub fn guest(&self) -> &Role {
        &self.guest
    }

    /// Number of defined roles
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Whether no roles are defined (never true for a validated table)
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Defined roles ordered from least to most privileged
    pub fn roles_by_level(&self) -> Vec<(&Role, RoleLevel)> {
        let mut roles: Vec<_> = self.levels.iter().map(|(r, l)| (r, *l)).collect();
        roles.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.as_str().cmp(b.0.as_str())));
        roles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> PolicyConfig {
        PolicyConfig {
            super_admin: Role::from("super_admin"),
            guest: Role::from("guest"),
            roles: vec![
                RoleDefinition::new("guest", 0),
                RoleDefinition::new("member", 10).with_permissions(["pages.create"]),
                RoleDefinition::new("admin", 30).with_permissions(["pages.create", "pages.delete"]),
                RoleDefinition::new("super_admin", 100),
            ],
        }
    }

    #[test]
    fn test_table_from_config() {
        let table = PolicyTable::from_config(test_config()).unwrap();

        assert_eq!(table.len(), 4);
        assert_eq!(table.level(&Role::from("admin")), Some(30));
        assert_eq!(table.level(&Role::from("owner")), None);
        assert!(table
            .permissions(&Role::from("admin"))
            .unwrap()
            .contains(&PermissionValue::from("pages.delete")));
        assert!(table.permissions(&Role::from("guest")).unwrap().is_empty());
        assert_eq!(table.super_admin(), &Role::from("super_admin"));
        assert_eq!(table.guest(), &Role::from("guest"));
    }

    #[test]
    fn test_roles_by_level() {
        let table = PolicyTable::from_config(test_config()).unwrap();
        let names: Vec<_> = table
            .roles_by_level()
            .into_iter()
            .map(|(r, _)| r.as_str().to_string())
            .collect();
        assert_eq!(names, vec!["guest", "member", "admin", "super_admin"]);
    }

    #[test]
    fn test_duplicate_role_rejected() {
        let mut config = test_config();
        config.roles.push(RoleDefinition::new("member", 20));

        let err = PolicyTable::from_config(config).unwrap_err();
        assert!(matches!(err, AuthzError::InvalidPolicy(msg) if msg.contains("Duplicate")));
    }

    #[test]
    fn test_undefined_bypass_role_rejected() {
        let mut config = test_config();
        config.super_admin = Role::from("root");

        let err = PolicyTable::from_config(config).unwrap_err();
        assert!(matches!(err, AuthzError::InvalidPolicy(msg) if msg.contains("root")));
    }

    #[test]
    fn test_undefined_guest_role_rejected() {
        let mut config = test_config();
        config.roles.retain(|r| r.name.as_str() != "guest");

        assert!(PolicyTable::from_config(config).is_err());
    }

    #[test]
    fn test_guest_cannot_be_super_admin() {
        let mut config = test_config();
        config.guest = Role::from("super_admin");

        let err = PolicyTable::from_config(config).unwrap_err();
        assert!(matches!(err, AuthzError::InvalidPolicy(msg) if msg.contains("both")));
    }

    #[test]
    fn test_empty_tokens_rejected() {
        let mut config = test_config();
        config.roles.push(RoleDefinition::new("", 5));
        assert!(PolicyTable::from_config(config).is_err());

        let mut config = test_config();
        config.roles.push(RoleDefinition::new("editor", 5).with_permissions([""]));
        assert!(PolicyTable::from_config(config).is_err());
    }

    #[test]
    fn test_non_monotonic_table_is_authoritative() {
        // A higher level does not imply a superset of permissions
        let config = PolicyConfig {
            super_admin: Role::from("super_admin"),
            guest: Role::from("guest"),
            roles: vec![
                RoleDefinition::new("guest", 0),
                RoleDefinition::new("billing", 5).with_permissions(["billing.manage"]),
                RoleDefinition::new("admin", 30).with_permissions(["pages.delete"]),
                RoleDefinition::new("super_admin", 100),
            ],
        };
        let table = PolicyTable::from_config(config).unwrap();
        assert!(!table
            .permissions(&Role::from("admin"))
            .unwrap()
            .contains(&PermissionValue::from("billing.manage")));
    }
}
