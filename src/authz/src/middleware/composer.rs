//! Layered security check evaluation
//!
//! # Pipeline
//!
//! ```text
//! authentication ──► authorization ──► ownership ──► allow
//!       │            (level, perms)        │
//!       ▼                  ▼               ▼
//!     deny               deny            deny
//! ```
//!
//! Layers run in order and the first rejection is the verdict. The first two
//! layers are pure and synchronous; only the ownership layer touches the
//! resource store.
//!
//! # Entry points
//!
//! | call                         | layers | ownership                          |
//! |------------------------------|--------|------------------------------------|
//! | `check_capability`           | 1–2    | not evaluated                      |
//! | `check_resource`             | 1–3    | always evaluated when declared     |
//! | `run_security_checks`        | 1–2    | not evaluated                      |
//! | `run_full_security_check`    | 1–3    | skipped when no resource id given  |
//!
//! Mutations on an existing resource should use `check_resource`:
//! `run_full_security_check` with `None` lets an ownership requirement pass,
//! which is only correct before the resource exists.

use super::config::{Combinator, SecurityMiddlewareConfig};
use super::result::{DeniedReason, SecurityCheckResult};
use crate::context::SecurityContext;
use crate::metrics::MetricsCollector;
use crate::ownership::{OwnershipRequest, OwnershipResolver};
use crate::resolver::RolePermissionResolver;
use futures::future::join_all;
use gatehouse_core::ResourceId;
use std::sync::Arc;
use tracing::{debug, warn};

/// Evaluates security requirements against a context
pub struct SecurityComposer {
    resolver: Arc<RolePermissionResolver>,
    ownership: Arc<OwnershipResolver>,
    metrics: Option<Arc<MetricsCollector>>,
}

impl SecurityComposer {
    pub fn new(
        resolver: Arc<RolePermissionResolver>,
        ownership: Arc<OwnershipResolver>,
        metrics: Option<Arc<MetricsCollector>>,
    ) -> Self {
        Self {
            resolver,
            ownership,
            metrics,
        }
    }

    /// Authentication and authorization layers only
    pub fn run_security_checks(
        &self,
        context: &SecurityContext,
        config: &SecurityMiddlewareConfig,
    ) -> SecurityCheckResult {
        let result = self.evaluate_principal(context, config);
        self.finish(result)
    }

    /// All three layers
    ///
    /// When `config` declares ownership but `resource_id` is `None`, the
    /// ownership layer passes. Use [`check_resource`](Self::check_resource)
    /// where a resource already exists.
    pub async fn run_full_security_check(
        &self,
        context: &SecurityContext,
        config: &SecurityMiddlewareConfig,
        resource_id: Option<&ResourceId>,
    ) -> SecurityCheckResult {
        let result = match resource_id {
            Some(resource_id) => self.evaluate_resource(context, config, resource_id).await,
            None => {
                if let Some(ownership) = &config.ownership {
                    warn!(
                        resource_type = %ownership.resource_type,
                        "Ownership declared but no resource id supplied, ownership layer skipped"
                    );
                }
                self.evaluate_principal(context, config)
            }
        };
        self.finish(result)
    }

    /// "May this principal do this kind of thing at all?"
    ///
    /// For screens that act before any resource instance exists (e.g. a
    /// create form). Ownership requirements are not evaluated.
    pub fn check_capability(
        &self,
        context: &SecurityContext,
        config: &SecurityMiddlewareConfig,
    ) -> SecurityCheckResult {
        if let Some(ownership) = &config.ownership {
            debug!(
                resource_type = %ownership.resource_type,
                "Capability check, ownership deferred to resource check"
            );
        }
        self.run_security_checks(context, config)
    }

    /// "May this principal do this to this resource?"
    ///
    /// The resource id is mandatory, so a declared ownership requirement is
    /// always enforced.
    pub async fn check_resource(
        &self,
        context: &SecurityContext,
        config: &SecurityMiddlewareConfig,
        resource_id: &ResourceId,
    ) -> SecurityCheckResult {
        let result = self.evaluate_resource(context, config, resource_id).await;
        self.finish(result)
    }

    /// Resource check over many resources, results in input order
    ///
    /// The principal layers are evaluated once; ownership lookups for the
    /// individual resources run concurrently.
    pub async fn check_resources(
        &self,
        context: &SecurityContext,
        config: &SecurityMiddlewareConfig,
        resource_ids: &[ResourceId],
    ) -> Vec<SecurityCheckResult> {
        let principal = self.evaluate_principal(context, config);

        let results = if !principal.allowed() {
            vec![principal; resource_ids.len()]
        } else {
            match &config.ownership {
                None => vec![principal; resource_ids.len()],
                Some(ownership) => {
                    let checks = resource_ids.iter().map(|resource_id| {
                        let request = OwnershipRequest::new(
                            ownership.resource_type.clone(),
                            resource_id.clone(),
                        )
                        .with_team_access(ownership.allow_team_access);

                        async move { self.ownership.check_ownership(context, &request).await }
                    });
                    join_all(checks).await
                }
            }
        };

        results.into_iter().map(|r| self.finish(r)).collect()
    }

    async fn evaluate_resource(
        &self,
        context: &SecurityContext,
        config: &SecurityMiddlewareConfig,
        resource_id: &ResourceId,
    ) -> SecurityCheckResult {
        let principal = self.evaluate_principal(context, config);
        if !principal.allowed() {
            return principal;
        }

        let Some(ownership) = &config.ownership else {
            return principal;
        };

        let request = OwnershipRequest::new(ownership.resource_type.clone(), resource_id.clone())
            .with_team_access(ownership.allow_team_access);

        self.ownership.check_ownership(context, &request).await
    }

    /// Layers 1 and 2
    fn evaluate_principal(
        &self,
        context: &SecurityContext,
        config: &SecurityMiddlewareConfig,
    ) -> SecurityCheckResult {
        // Layer 1: authentication
        if !context.is_authenticated() {
            debug!("Denied at authentication layer");
            return SecurityCheckResult::deny(DeniedReason::NotAuthenticated);
        }

        // Layer 2: authorization
        if let Some(min_level) = config.min_role_level {
            if !context.has_min_role_level(&self.resolver, min_level) {
                debug!(
                    role = %context.role(),
                    role_level = context.role_level(),
                    min_level,
                    "Denied at authorization layer: role level"
                );
                return SecurityCheckResult::deny(DeniedReason::InsufficientRole);
            }
        }

        let required = &config.required_permissions;
        if !required.is_empty() {
            let granted = match required.combinator {
                Combinator::Any => {
                    context.has_any_permission(&self.resolver, &required.permissions)
                }
                Combinator::All => {
                    context.has_all_permissions(&self.resolver, &required.permissions)
                }
            };

            if !granted {
                debug!(
                    role = %context.role(),
                    combinator = ?required.combinator,
                    required = ?required.permissions,
                    "Denied at authorization layer: permissions"
                );
                return SecurityCheckResult::deny(DeniedReason::InsufficientPermissions);
            }
        }

        SecurityCheckResult::allow()
    }

    fn finish(&self, result: SecurityCheckResult) -> SecurityCheckResult {
        if let Some(metrics) = &self.metrics {
            metrics.record_check(&result);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::SecurityLayer;
    use crate::policy::{PolicyConfig, PolicyTable, RoleDefinition};
    use gatehouse_core::{Identity, InMemoryResourceStore, OwnerRecord, Role};
    use std::collections::BTreeSet;

    fn resolver() -> Arc<RolePermissionResolver> {
        Arc::new(RolePermissionResolver::new(
            PolicyTable::from_config(PolicyConfig {
                super_admin: Role::from("super_admin"),
                guest: Role::from("guest"),
                roles: vec![
                    RoleDefinition::new("guest", 0),
                    RoleDefinition::new("member", 10).with_permissions(["pages.edit"]),
                    RoleDefinition::new("admin", 30)
                        .with_permissions(["pages.edit", "pages.delete"]),
                    RoleDefinition::new("super_admin", 100),
                ],
            })
            .unwrap(),
        ))
    }

    async fn composer() -> SecurityComposer {
        let store = InMemoryResourceStore::new();
        store.put_resource("page", "page-1", OwnerRecord::user("alice")).await;
        store.put_resource("page", "page-2", OwnerRecord::user("bob")).await;

        let resolver = resolver();
        let ownership = Arc::new(OwnershipResolver::new(Arc::new(store), resolver.clone(), None));
        SecurityComposer::new(resolver, ownership, None)
    }

    fn context(user: &str, role: &str) -> SecurityContext {
        SecurityContext::authenticated(
            Identity::new(user),
            Role::from(role),
            BTreeSet::new(),
            &resolver(),
        )
    }

    #[tokio::test]
    async fn test_unauthenticated_denied_first() {
        let composer = composer().await;
        let guest = SecurityContext::guest(&resolver());
        let config = SecurityMiddlewareConfig::new()
            .min_role_level(30)
            .require_ownership("page");

        let result = composer
            .run_full_security_check(&guest, &config, Some(&ResourceId::from("page-2")))
            .await;
        assert_eq!(result.layer(), Some(SecurityLayer::Authentication));
        assert_eq!(result.denied_reason(), Some(DeniedReason::NotAuthenticated));
    }

    #[tokio::test]
    async fn test_role_checked_before_permissions() {
        let composer = composer().await;
        let config = SecurityMiddlewareConfig::new()
            .min_role_level(30)
            .require_all(["pages.delete"]);

        let result = composer.run_security_checks(&context("alice", "member"), &config);
        assert_eq!(result.denied_reason(), Some(DeniedReason::InsufficientRole));
    }

    #[tokio::test]
    async fn test_capability_vs_resource_check() {
        let composer = composer().await;
        let config = SecurityMiddlewareConfig::new()
            .require_all(["pages.edit"])
            .require_ownership("page");
        let alice = context("alice", "member");

        assert!(composer.check_capability(&alice, &config).allowed());
        assert!(composer
            .check_resource(&alice, &config, &ResourceId::from("page-1"))
            .await
            .allowed());

        let result = composer
            .check_resource(&alice, &config, &ResourceId::from("page-2"))
            .await;
        assert_eq!(result.denied_reason(), Some(DeniedReason::NotOwner));
    }

    #[tokio::test]
    async fn test_full_check_without_resource_id_skips_ownership() {
        let composer = composer().await;
        let config = SecurityMiddlewareConfig::new().require_ownership("page");

        let result = composer
            .run_full_security_check(&context("carol", "member"), &config, None)
            .await;
        assert!(result.allowed());
    }

    #[tokio::test]
    async fn test_batch_check_preserves_order() {
        let composer = composer().await;
        let config = SecurityMiddlewareConfig::new().require_ownership("page");
        let ids = vec![
            ResourceId::from("page-2"),
            ResourceId::from("page-1"),
            ResourceId::from("page-9"),
        ];

        let results = composer
            .check_resources(&context("alice", "member"), &config, &ids)
            .await;
        let reasons: Vec<_> = results.iter().map(|r| r.denied_reason()).collect();
        assert_eq!(
            reasons,
            vec![
                Some(DeniedReason::NotOwner),
                None,
                Some(DeniedReason::ResourceNotFound),
            ]
        );
    }

    #[tokio::test]
    async fn test_batch_check_principal_denial_applies_to_all() {
        let composer = composer().await;
        let config = SecurityMiddlewareConfig::new()
            .require_all(["pages.delete"])
            .require_ownership("page");
        let ids = vec![ResourceId::from("page-1"), ResourceId::from("page-2")];

        let results = composer
            .check_resources(&context("alice", "member"), &config, &ids)
            .await;
        assert_eq!(results.len(), 2);
        assert!(results
            .iter()
            .all(|r| r.denied_reason() == Some(DeniedReason::InsufficientPermissions)));
    }
}
