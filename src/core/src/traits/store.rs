//! Resource store trait
//!
//! The store holds users, teams and resources. The engine only ever reads
//! from it: role and team lookups during context assembly, owner lookups
//! during ownership checks.

use crate::error::{CoreError, Result};
use crate::types::{OwnerRecord, ResourceId, Role, TeamId, UserId};
use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Read access to the backing store
///
/// Implementations must be safe to call concurrently. Retry and timeout
/// policy, if any, belongs here rather than in the engine.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Get the role assigned to a user
    async fn get_user_role(&self, user_id: &UserId) -> Result<Role>;

    /// Get the teams a user belongs to
    async fn get_user_team_ids(&self, user_id: &UserId) -> Result<BTreeSet<TeamId>>;

    /// Get the ownership record of a resource, `None` if the resource does not exist
    async fn get_resource_owner(
        &self,
        resource_type: &str,
        resource_id: &ResourceId,
    ) -> Result<Option<OwnerRecord>>;
}

type ResourceKey = (String, ResourceId);

/// In-memory resource store implementation
#[derive(Clone, Default)]
pub struct InMemoryResourceStore {
    roles: Arc<RwLock<HashMap<UserId, Role>>>,
    teams: Arc<RwLock<HashMap<UserId, BTreeSet<TeamId>>>>,
    owners: Arc<RwLock<HashMap<ResourceKey, OwnerRecord>>>,
}

impl InMemoryResourceStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign a role to a user
    pub async fn set_user_role(&self, user_id: impl Into<UserId>, role: impl Into<Role>) {
        self.roles.write().await.insert(user_id.into(), role.into());
    }

    /// Add a user to a team
    pub async fn add_team_member(&self, team_id: impl Into<TeamId>, user_id: impl Into<UserId>) {
        self.teams
            .write()
            .await
            .entry(user_id.into())
            .or_default()
            .insert(team_id.into());
    }

    /// Remove a user from a team
    pub async fn remove_team_member(&self, team_id: &TeamId, user_id: &UserId) {
        if let Some(teams) = self.teams.write().await.get_mut(user_id) {
            teams.remove(team_id);
        }
    }

    /// Store (or reassign) the owner of a resource
    pub async fn put_resource(
        &self,
        resource_type: impl Into<String>,
        resource_id: impl Into<ResourceId>,
        owner: OwnerRecord,
    ) {
        self.owners
            .write()
            .await
            .insert((resource_type.into(), resource_id.into()), owner);
    }

    /// Delete a resource
    pub async fn remove_resource(&self, resource_type: &str, resource_id: &ResourceId) {
        self.owners
            .write()
            .await
            .remove(&(resource_type.to_string(), resource_id.clone()));
    }
}

#[async_trait]
impl ResourceStore for InMemoryResourceStore {
    async fn get_user_role(&self, user_id: &UserId) -> Result<Role> {
        let roles = self.roles.read().await;
        roles
            .get(user_id)
            .cloned()
            .ok_or_else(|| CoreError::NotFound(format!("role for user {}", user_id)))
    }

    async fn get_user_team_ids(&self, user_id: &UserId) -> Result<BTreeSet<TeamId>> {
        let teams = self.teams.read().await;
        Ok(teams.get(user_id).cloned().unwrap_or_default())
    }

    async fn get_resource_owner(
        &self,
        resource_type: &str,
        resource_id: &ResourceId,
    ) -> Result<Option<OwnerRecord>> {
        let owners = self.owners.read().await;
        let record = owners
            .get(&(resource_type.to_string(), resource_id.clone()))
            .cloned();

        debug!(
            resource_type,
            resource_id = %resource_id,
            found = record.is_some(),
            "Owner lookup"
        );

        Ok(record)
    }
}
