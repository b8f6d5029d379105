//! Security context: who is asking
//!
//! A [`SecurityContext`] is an immutable snapshot of one principal at one
//! point in time. Its role level and permissions are always derived from its
//! role through the resolver at construction; there is no way to set them
//! independently.

pub mod assembler;

pub use assembler::{AssemblyOutcome, ContextAssembler, ContextSnapshot, LoadPhase};

use crate::policy::RoleLevel;
use crate::resolver::RolePermissionResolver;
use gatehouse_core::{
    Identity, PermissionValue, Role, TeamId, TenantId, UserId, DEFAULT_SUBSCRIPTION_PLAN,
};
use serde::Serialize;
use std::collections::BTreeSet;

/// Snapshot of a principal's identity, role, permissions and teams
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecurityContext {
    is_authenticated: bool,
    user_id: Option<UserId>,
    email: Option<String>,
    role: Role,
    role_level: RoleLevel,
    permissions: BTreeSet<PermissionValue>,
    team_ids: BTreeSet<TeamId>,
    tenant_id: Option<TenantId>,
    subscription_plan: String,
}

impl SecurityContext {
    /// Context for an unauthenticated principal
    pub fn guest(resolver: &RolePermissionResolver) -> Self {
        let role = resolver.guest_role().clone();
        Self {
            is_authenticated: false,
            user_id: None,
            email: None,
            role_level: resolver.get_role_level(&role),
            permissions: resolver.get_permissions_for_role(&role).iter().cloned().collect(),
            role,
            team_ids: BTreeSet::new(),
            tenant_id: None,
            subscription_plan: DEFAULT_SUBSCRIPTION_PLAN.to_string(),
        }
    }

    /// Context for an authenticated principal
    pub fn authenticated(
        identity: Identity,
        role: Role,
        team_ids: BTreeSet<TeamId>,
        resolver: &RolePermissionResolver,
    ) -> Self {
        Self {
            is_authenticated: true,
            user_id: Some(identity.user_id),
            email: identity.email,
            role_level: resolver.get_role_level(&role),
            permissions: resolver.get_permissions_for_role(&role).iter().cloned().collect(),
            role,
            team_ids,
            tenant_id: identity.tenant_id,
            subscription_plan: identity
                .subscription_plan
                .unwrap_or_else(|| DEFAULT_SUBSCRIPTION_PLAN.to_string()),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated
    }

    pub fn user_id(&self) -> Option<&UserId> {
        self.user_id.as_ref()
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn role(&self) -> &Role {
        &self.role
    }

    pub fn role_level(&self) -> RoleLevel {
        self.role_level
    }

    pub fn permissions(&self) -> &BTreeSet<PermissionValue> {
        &self.permissions
    }

    pub fn team_ids(&self) -> &BTreeSet<TeamId> {
        &self.team_ids
    }

    pub fn tenant_id(&self) -> Option<&TenantId> {
        self.tenant_id.as_ref()
    }

    pub fn subscription_plan(&self) -> &str {
        &self.subscription_plan
    }

    /// Whether the principal holds the bypass role
    pub fn is_super_admin(&self, resolver: &RolePermissionResolver) -> bool {
        resolver.is_super_admin(&self.role)
    }

    /// Whether the principal may perform an action gated by `permission`
    pub fn has_permission(
        &self,
        resolver: &RolePermissionResolver,
        permission: &PermissionValue,
    ) -> bool {
        resolver.role_has_permission(&self.role, permission)
    }

    /// Whether the principal holds at least one of `permissions`
    pub fn has_any_permission<'a, I>(
        &self,
        resolver: &RolePermissionResolver,
        permissions: I,
    ) -> bool
    where
        I: IntoIterator<Item = &'a PermissionValue>,
    {
        resolver.role_has_any_permission(&self.role, permissions)
    }

    /// Whether the principal holds every one of `permissions`
    pub fn has_all_permissions<'a, I>(
        &self,
        resolver: &RolePermissionResolver,
        permissions: I,
    ) -> bool
    where
        I: IntoIterator<Item = &'a PermissionValue>,
    {
        resolver.role_has_all_permissions(&self.role, permissions)
    }

    /// Whether the principal's role reaches `min_level`
    pub fn has_min_role_level(
        &self,
        resolver: &RolePermissionResolver,
        min_level: RoleLevel,
    ) -> bool {
        resolver.role_meets_level(&self.role, min_level)
    }

    /// Whether the principal belonged to `team_id` when the context was built
    pub fn is_team_member(&self, team_id: &TeamId) -> bool {
        self.team_ids.contains(team_id)
    }
}
