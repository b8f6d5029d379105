//! Session identity, session events, and resource ownership records

use super::ids::{TeamId, TenantId, UserId};
use serde::{Deserialize, Serialize};

/// Plan reported for principals whose session carries no subscription plan
pub const DEFAULT_SUBSCRIPTION_PLAN: &str = "free";

/// Identity reported by the session provider for the signed-in principal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Authenticated user
    pub user_id: UserId,

    /// Email address attached to the session, if any
    #[serde(default)]
    pub email: Option<String>,

    /// Tenant the session belongs to (carried through, never interpreted)
    #[serde(default)]
    pub tenant_id: Option<TenantId>,

    /// Billing plan name (carried through, never interpreted)
    #[serde(default)]
    pub subscription_plan: Option<String>,
}

impl Identity {
    /// Create an identity for a user with no extra session metadata
    pub fn new(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: user_id.into(),
            email: None,
            tenant_id: None,
            subscription_plan: None,
        }
    }

    /// Attach an email address
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Attach a tenant
    pub fn with_tenant(mut self, tenant_id: impl Into<TenantId>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }

    /// Attach a subscription plan
    pub fn with_plan(mut self, plan: impl Into<String>) -> Self {
        self.subscription_plan = Some(plan.into());
        self
    }
}

/// Notification from the session provider
///
/// Delivered to the context assembler, which decides whether the event
/// changes the principal's identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionEvent {
    /// A principal signed in (possibly replacing another)
    SignedIn,
    /// The principal signed out
    SignedOut,
    /// Profile data changed for the signed-in principal
    UserUpdated,
    /// Credentials were rotated; identity is unchanged
    TokenRefreshed,
}

impl SessionEvent {
    /// Whether the event may change who the principal is
    pub fn changes_identity(&self) -> bool {
        !matches!(self, SessionEvent::TokenRefreshed)
    }
}

/// Ownership binding of a resource
///
/// A resource has exactly one owning user and optionally one owning team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerRecord {
    /// User who owns the resource
    pub owner_user_id: UserId,

    /// Team the resource is shared with, if any
    #[serde(default)]
    pub owner_team_id: Option<TeamId>,
}

impl OwnerRecord {
    /// Resource owned by a single user
    pub fn user(owner: impl Into<UserId>) -> Self {
        Self {
            owner_user_id: owner.into(),
            owner_team_id: None,
        }
    }

    /// Attach an owning team
    pub fn with_team(mut self, team: impl Into<TeamId>) -> Self {
        self.owner_team_id = Some(team.into());
        self
    }
}
