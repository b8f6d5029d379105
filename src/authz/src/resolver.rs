//! Role-permission resolution
//!
//! Pure lookups over the policy table. No I/O, no interior state, safe to
//! call on every render or request.
//!
//! The super admin bypass is decided here and nowhere else: the combinators
//! are written in terms of [`RolePermissionResolver::role_has_permission`],
//! so they never special-case the bypass role themselves.
//!
//! # Example
//!
//! ```rust
//! use gatehouse_authz::policy::{PolicyConfig, PolicyTable, RoleDefinition};
//! use gatehouse_authz::resolver::RolePermissionResolver;
//! use gatehouse_core::{PermissionValue, Role};
//!
//! let table = PolicyTable::from_config(PolicyConfig {
//!     super_admin: Role::from("super_admin"),
//!     guest: Role::from("guest"),
//!     roles: vec![
//!         RoleDefinition::new("guest", 0),
//!         RoleDefinition::new("admin", 30).with_permissions(["pages.delete"]),
//!         RoleDefinition::new("super_admin", 100),
//!     ],
//! }).unwrap();
//!
//! let resolver = RolePermissionResolver::new(table);
//! let delete = PermissionValue::from("pages.delete");
//! assert!(resolver.role_has_permission(&Role::from("admin"), &delete));
//! assert!(!resolver.role_has_permission(&Role::from("guest"), &delete));
//! ```

use crate::policy::{PolicyTable, RoleLevel, UNKNOWN_ROLE_LEVEL};
use gatehouse_core::{PermissionValue, Role};
use std::collections::HashSet;

/// Resolves role levels and permissions against a fixed policy table
#[derive(Debug, Clone)]
pub struct RolePermissionResolver {
    table: PolicyTable,
    no_permissions: HashSet<PermissionValue>,
}

impl RolePermissionResolver {
    /// Create a resolver over a validated policy table
    pub fn new(table: PolicyTable) -> Self {
        Self {
            table,
            no_permissions: HashSet::new(),
        }
    }

    /// The underlying policy table
    pub fn table(&self) -> &PolicyTable {
        &self.table
    }

    /// Role assigned to unauthenticated principals
    pub fn guest_role(&self) -> &Role {
        self.table.guest()
    }

    /// Whether `role` is the universal bypass role
    pub fn is_super_admin(&self, role: &Role) -> bool {
        role == self.table.super_admin()
    }

    /// Level of a role; unknown roles get [`UNKNOWN_ROLE_LEVEL`]
    pub fn get_role_level(&self, role: &Role) -> RoleLevel {
        self.table.level(role).unwrap_or(UNKNOWN_ROLE_LEVEL)
    }

    /// Permissions of a role; unknown roles get the empty set
    pub fn get_permissions_for_role(&self, role: &Role) -> &HashSet<PermissionValue> {
        self.table.permissions(role).unwrap_or(&self.no_permissions)
    }

    /// Whether a role holds a permission (always true for the bypass role)
    pub fn role_has_permission(&self, role: &Role, permission: &PermissionValue) -> bool {
        self.is_super_admin(role) || self.get_permissions_for_role(role).contains(permission)
    }

    /// `Any` combinator: the role holds at least one of `permissions`
    ///
    /// An empty requirement is never satisfied.
    pub fn role_has_any_permission<'a, I>(&self, role: &Role, permissions: I) -> bool
    where
        I: IntoIterator<Item = &'a PermissionValue>,
    {
        permissions
            .into_iter()
            .any(|p| self.role_has_permission(role, p))
    }

    /// `All` combinator: the role holds every one of `permissions`
    pub fn role_has_all_permissions<'a, I>(&self, role: &Role, permissions: I) -> bool
    where
        I: IntoIterator<Item = &'a PermissionValue>,
    {
        permissions
            .into_iter()
            .all(|p| self.role_has_permission(role, p))
    }

    /// Whether a role reaches a minimum level (always true for the bypass role)
    pub fn role_meets_level(&self, role: &Role, min_level: RoleLevel) -> bool {
        self.is_super_admin(role) || self.get_role_level(role) >= min_level
    }
}
