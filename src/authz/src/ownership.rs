//! Resource ownership resolution
//!
//! Answers "does this principal own this resource, directly or through a
//! team?" by reading the resource store. Every answer reflects the store at
//! the instant of the check; callers performing the guarded mutation must
//! re-validate if they need transactional guarantees.
//!
//! Store failures are never surfaced as errors. They resolve to "not the
//! owner", and a missing resource resolves to `resource_not_found`.

use crate::context::SecurityContext;
use crate::metrics::MetricsCollector;
use crate::middleware::{DeniedReason, SecurityCheckResult};
use crate::resolver::RolePermissionResolver;
use gatehouse_core::{OwnerRecord, ResourceId, ResourceStore, TeamId, UserId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Ownership question for one resource instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipRequest {
    /// Kind of resource (e.g. "page")
    pub resource_type: String,

    /// Resource instance
    pub resource_id: ResourceId,

    /// Whether membership of the owning team is sufficient
    #[serde(default)]
    pub allow_team_access: bool,
}

impl OwnershipRequest {
    pub fn new(resource_type: impl Into<String>, resource_id: impl Into<ResourceId>) -> Self {
        Self {
            resource_type: resource_type.into(),
            resource_id: resource_id.into(),
            allow_team_access: false,
        }
    }

    /// Accept owning-team members as owners
    pub fn with_team_access(mut self, allow: bool) -> Self {
        self.allow_team_access = allow;
        self
    }
}

/// Result of fetching a resource's owner
enum OwnerLookup {
    Found(OwnerRecord),
    Missing,
    Failed,
}

/// Resolves resource ownership against the resource store
///
/// Holds no mutable state; concurrent checks for different resources are
/// independent.
pub struct OwnershipResolver {
    store: Arc<dyn ResourceStore>,
    resolver: Arc<RolePermissionResolver>,
    metrics: Option<Arc<MetricsCollector>>,
}

impl OwnershipResolver {
    pub fn new(
        store: Arc<dyn ResourceStore>,
        resolver: Arc<RolePermissionResolver>,
        metrics: Option<Arc<MetricsCollector>>,
    ) -> Self {
        Self {
            store,
            resolver,
            metrics,
        }
    }

    /// Whether `user_id` is the direct owner of the resource
    ///
    /// A missing resource or a failed lookup is `false`.
    pub async fn is_resource_owner(
        &self,
        resource_type: &str,
        resource_id: &ResourceId,
        user_id: &UserId,
    ) -> bool {
        match self.lookup_owner(resource_type, resource_id).await {
            OwnerLookup::Found(record) => &record.owner_user_id == user_id,
            OwnerLookup::Missing | OwnerLookup::Failed => false,
        }
    }

    /// Whether `user_id` belongs to the team that owns the resource
    ///
    /// Team membership is read from the store, not from a cached context.
    pub async fn is_team_resource_owner(
        &self,
        resource_type: &str,
        resource_id: &ResourceId,
        user_id: &UserId,
    ) -> bool {
        match self.lookup_owner(resource_type, resource_id).await {
            OwnerLookup::Found(OwnerRecord {
                owner_team_id: Some(team_id),
                ..
            }) => self.is_member(&team_id, user_id).await,
            _ => false,
        }
    }

    /// Ownership layer verdict for the principal in `context`
    ///
    /// Allowed when the principal is the bypass role, the direct owner, or
    /// (with `allow_team_access`) a member of the owning team. An
    /// unauthenticated context is denied before the bypass is consulted. The
    /// owner record is read once per check.
    pub async fn check_ownership(
        &self,
        context: &SecurityContext,
        request: &OwnershipRequest,
    ) -> SecurityCheckResult {
        let Some(user_id) = context.user_id().filter(|_| context.is_authenticated()) else {
            debug!(
                resource_id = %request.resource_id,
                "Unauthenticated principal is never an owner"
            );
            return SecurityCheckResult::deny(DeniedReason::NotOwner);
        };

        if context.is_super_admin(&self.resolver) {
            debug!(resource_id = %request.resource_id, "Ownership bypassed for super admin");
            return SecurityCheckResult::allow();
        }

        let record = match self
            .lookup_owner(&request.resource_type, &request.resource_id)
            .await
        {
            OwnerLookup::Found(record) => record,
            OwnerLookup::Missing => {
                return SecurityCheckResult::deny(DeniedReason::ResourceNotFound)
            }
            OwnerLookup::Failed => return SecurityCheckResult::deny(DeniedReason::NotOwner),
        };

        if &record.owner_user_id == user_id {
            debug!(
                user_id = %user_id,
                resource_id = %request.resource_id,
                "Direct owner"
            );
            return SecurityCheckResult::allow();
        }

        if request.allow_team_access {
            if let Some(team_id) = &record.owner_team_id {
                if self.is_member(team_id, user_id).await {
                    debug!(
                        user_id = %user_id,
                        team_id = %team_id,
                        resource_id = %request.resource_id,
                        "Owner via team"
                    );
                    return SecurityCheckResult::allow();
                }
            }
        }

        debug!(
            user_id = %user_id,
            resource_type = %request.resource_type,
            resource_id = %request.resource_id,
            "Not the owner"
        );
        SecurityCheckResult::deny(DeniedReason::NotOwner)
    }

    async fn lookup_owner(&self, resource_type: &str, resource_id: &ResourceId) -> OwnerLookup {
        self.record_lookup();

        match self.store.get_resource_owner(resource_type, resource_id).await {
            Ok(Some(record)) => OwnerLookup::Found(record),
            Ok(None) => {
                debug!(resource_type, resource_id = %resource_id, "Resource not found");
                OwnerLookup::Missing
            }
            Err(e) => {
                warn!(
                    resource_type,
                    resource_id = %resource_id,
                    error = %e,
                    store_error = e.is_store_error(),
                    "Owner lookup failed, denying"
                );
                OwnerLookup::Failed
            }
        }
    }

    async fn is_member(&self, team_id: &TeamId, user_id: &UserId) -> bool {
        self.record_lookup();

        match self.store.get_user_team_ids(user_id).await {
            Ok(teams) => teams.contains(team_id),
            Err(e) => {
                warn!(
                    user_id = %user_id,
                    error = %e,
                    store_error = e.is_store_error(),
                    "Team lookup failed, denying"
                );
                false
            }
        }
    }

    fn record_lookup(&self) {
        if let Some(metrics) = &self.metrics {
            metrics.record_ownership_lookup();
        }
    }
}
