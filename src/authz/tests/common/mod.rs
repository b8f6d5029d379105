//! Shared fixtures and mock collaborators for the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use gatehouse_authz::{
    PolicyConfig, PolicyTable, RoleDefinition, RolePermissionResolver, SecurityContext,
};
use gatehouse_core::{
    CoreError, Identity, InMemoryResourceStore, OwnerRecord, ResourceId, ResourceStore, Result,
    Role, SessionProvider, TeamId, UserId,
};
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Install a test subscriber once; honours `RUST_LOG`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// member:10 (pages.create, pages.edit), admin:30 (+ pages.delete), super_admin:100
pub fn standard_policy() -> PolicyConfig {
    PolicyConfig {
        super_admin: Role::from("super_admin"),
        guest: Role::from("guest"),
        roles: vec![
            RoleDefinition::new("guest", 0),
            RoleDefinition::new("member", 10).with_permissions(["pages.create", "pages.edit"]),
            RoleDefinition::new("admin", 30).with_permissions([
                "pages.create",
                "pages.edit",
                "pages.delete",
            ]),
            RoleDefinition::new("super_admin", 100),
        ],
    }
}

pub fn resolver() -> Arc<RolePermissionResolver> {
    Arc::new(RolePermissionResolver::new(
        PolicyTable::from_config(standard_policy()).expect("standard policy is valid"),
    ))
}

pub fn context_for(user: &str, role: &str, teams: &[&str]) -> SecurityContext {
    let team_ids: BTreeSet<TeamId> = teams.iter().map(|t| TeamId::from(*t)).collect();
    SecurityContext::authenticated(Identity::new(user), Role::from(role), team_ids, &resolver())
}

pub fn guest_context() -> SecurityContext {
    SecurityContext::guest(&resolver())
}

// ============================================================================
// GATED STORE
// ============================================================================

/// Store whose role lookups for chosen users block until released
///
/// Used to hold one context build in flight while another overtakes it.
#[derive(Clone, Default)]
pub struct GatedStore {
    inner: InMemoryResourceStore,
    gates: Arc<Mutex<HashMap<UserId, Arc<Notify>>>>,
}

impl GatedStore {
    pub fn new(inner: InMemoryResourceStore) -> Self {
        Self {
            inner,
            gates: Arc::default(),
        }
    }

    /// Block role lookups for `user` until [`release`](Self::release)
    pub fn gate(&self, user: &str) {
        self.gates
            .lock()
            .unwrap()
            .insert(UserId::from(user), Arc::new(Notify::new()));
    }

    pub fn release(&self, user: &str) {
        if let Some(gate) = self.gates.lock().unwrap().get(&UserId::from(user)) {
            gate.notify_one();
        }
    }

    fn gate_for(&self, user_id: &UserId) -> Option<Arc<Notify>> {
        self.gates.lock().unwrap().get(user_id).cloned()
    }
}

#[async_trait]
impl ResourceStore for GatedStore {
    async fn get_user_role(&self, user_id: &UserId) -> Result<Role> {
        if let Some(gate) = self.gate_for(user_id) {
            gate.notified().await;
        }
        self.inner.get_user_role(user_id).await
    }

    async fn get_user_team_ids(&self, user_id: &UserId) -> Result<BTreeSet<TeamId>> {
        self.inner.get_user_team_ids(user_id).await
    }

    async fn get_resource_owner(
        &self,
        resource_type: &str,
        resource_id: &ResourceId,
    ) -> Result<Option<OwnerRecord>> {
        self.inner.get_resource_owner(resource_type, resource_id).await
    }
}

// ============================================================================
// FAILING STORE
// ============================================================================

/// Store whose lookups can be made to fail independently
#[derive(Clone, Default)]
pub struct FailingStore {
    inner: InMemoryResourceStore,
    fail_roles: Arc<AtomicBool>,
    fail_teams: Arc<AtomicBool>,
    fail_owners: Arc<AtomicBool>,
}

impl FailingStore {
    pub fn new(inner: InMemoryResourceStore) -> Self {
        Self {
            inner,
            ..Default::default()
        }
    }

    pub fn fail_roles(&self, fail: bool) {
        self.fail_roles.store(fail, Ordering::SeqCst);
    }

    pub fn fail_teams(&self, fail: bool) {
        self.fail_teams.store(fail, Ordering::SeqCst);
    }

    pub fn fail_owners(&self, fail: bool) {
        self.fail_owners.store(fail, Ordering::SeqCst);
    }

    fn check(flag: &AtomicBool, what: &str) -> Result<()> {
        if flag.load(Ordering::SeqCst) {
            Err(CoreError::Store(format!("{what} lookup unavailable")))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ResourceStore for FailingStore {
    async fn get_user_role(&self, user_id: &UserId) -> Result<Role> {
        Self::check(&self.fail_roles, "role")?;
        self.inner.get_user_role(user_id).await
    }

    async fn get_user_team_ids(&self, user_id: &UserId) -> Result<BTreeSet<TeamId>> {
        Self::check(&self.fail_teams, "team")?;
        self.inner.get_user_team_ids(user_id).await
    }

    async fn get_resource_owner(
        &self,
        resource_type: &str,
        resource_id: &ResourceId,
    ) -> Result<Option<OwnerRecord>> {
        Self::check(&self.fail_owners, "owner")?;
        self.inner.get_resource_owner(resource_type, resource_id).await
    }
}

// ============================================================================
// FAILING SESSION
// ============================================================================

/// Session provider that cannot report the current identity
#[derive(Clone, Default)]
pub struct FailingSession;

#[async_trait]
impl SessionProvider for FailingSession {
    async fn current_identity(&self) -> Result<Option<Identity>> {
        Err(CoreError::Session("identity service unavailable".to_string()))
    }
}
