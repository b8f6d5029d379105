//! Security engine facade
//!
//! # Architecture
//!
//! ```text
//! SessionProvider ──► ContextAssembler ──► SecurityContext (watch snapshot)
//!                          │                       │
//!                    ResourceStore                 ▼
//!                          │            SecurityComposer ──► SecurityCheckResult
//!                          └──► OwnershipResolver ──┘               │
//!                                                                   ▼
//!                                                         VerdictTranslator
//! ```
//!
//! The facade owns one assembler and evaluates every check against the
//! snapshot published at the moment the check starts.

use crate::config::EngineConfig;
use crate::context::{AssemblyOutcome, ContextAssembler, ContextSnapshot, SecurityContext};
use crate::error::Result;
use crate::metrics::{EngineMetrics, MetricsCollector};
use crate::middleware::{SecurityCheckResult, SecurityComposer, SecurityMiddlewareConfig};
use crate::ownership::OwnershipResolver;
use crate::policy::PolicyTable;
use crate::resolver::RolePermissionResolver;
use crate::verdict::VerdictTranslator;
use gatehouse_core::{ResourceId, ResourceStore, SessionEvent, SessionProvider};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::info;

/// Entry point for the presentation layer
pub struct SecurityEngine {
    resolver: Arc<RolePermissionResolver>,
    assembler: Arc<ContextAssembler>,
    composer: SecurityComposer,
    translator: VerdictTranslator,
    metrics: Option<Arc<MetricsCollector>>,
}

impl SecurityEngine {
    /// Build an engine; fails only when the configuration is invalid
    ///
    /// The published context is guest until [`init`](Self::init) runs.
    pub fn new(
        config: EngineConfig,
        session: Arc<dyn SessionProvider>,
        store: Arc<dyn ResourceStore>,
    ) -> Result<Self> {
        config.validate()?;

        let table = PolicyTable::from_config(config.policy)?;
        let role_count = table.len();
        let resolver = Arc::new(RolePermissionResolver::new(table));

        let metrics = if config.enable_metrics {
            Some(Arc::new(MetricsCollector::new()))
        } else {
            None
        };

        let ownership = Arc::new(OwnershipResolver::new(
            Arc::clone(&store),
            Arc::clone(&resolver),
            metrics.clone(),
        ));
        let assembler = Arc::new(ContextAssembler::new(
            session,
            store,
            Arc::clone(&resolver),
            metrics.clone(),
        ));
        let composer = SecurityComposer::new(Arc::clone(&resolver), ownership, metrics.clone());

        info!(
            roles = role_count,
            metrics = config.enable_metrics,
            "Security engine initialized"
        );

        Ok(Self {
            resolver,
            assembler,
            composer,
            translator: VerdictTranslator::new(config.verdict),
            metrics,
        })
    }

    /// Assemble the first context from the current session
    pub async fn init(&self) -> AssemblyOutcome {
        self.assembler.rebuild().await
    }

    /// Rebuild the context after a role or team change
    pub async fn refresh(&self) -> AssemblyOutcome {
        self.assembler.refresh().await
    }

    /// Apply one session notification
    pub async fn handle_event(&self, event: SessionEvent) -> Option<AssemblyOutcome> {
        self.assembler.handle_event(event).await
    }

    /// Rebuild on every identity change received on `events`
    pub fn listen(&self, events: mpsc::Receiver<SessionEvent>) -> JoinHandle<()> {
        Arc::clone(&self.assembler).listen(events)
    }

    pub fn context(&self) -> Arc<SecurityContext> {
        self.assembler.context()
    }

    pub fn snapshot(&self) -> ContextSnapshot {
        self.assembler.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<ContextSnapshot> {
        self.assembler.subscribe()
    }

    pub fn resolver(&self) -> &RolePermissionResolver {
        &self.resolver
    }

    /// Composer for evaluating an explicitly supplied context
    pub fn composer(&self) -> &SecurityComposer {
        &self.composer
    }

    /// Layers 1–2 against the current context
    pub fn run_security_checks(&self, config: &SecurityMiddlewareConfig) -> SecurityCheckResult {
        let context = self.context();
        self.composer.run_security_checks(&context, config)
    }

    /// Layers 1–3 against the current context; ownership is skipped without an id
    pub async fn run_full_security_check(
        &self,
        config: &SecurityMiddlewareConfig,
        resource_id: Option<&ResourceId>,
    ) -> SecurityCheckResult {
        let context = self.context();
        self.composer
            .run_full_security_check(&context, config, resource_id)
            .await
    }

    /// Capability check for actions that precede any resource instance
    pub fn check_capability(&self, config: &SecurityMiddlewareConfig) -> SecurityCheckResult {
        let context = self.context();
        self.composer.check_capability(&context, config)
    }

    /// Check against one existing resource; ownership is enforced when declared
    pub async fn check_resource(
        &self,
        config: &SecurityMiddlewareConfig,
        resource_id: &ResourceId,
    ) -> SecurityCheckResult {
        let context = self.context();
        self.composer.check_resource(&context, config, resource_id).await
    }

    /// Check against many resources, results in input order
    pub async fn check_resources(
        &self,
        config: &SecurityMiddlewareConfig,
        resource_ids: &[ResourceId],
    ) -> Vec<SecurityCheckResult> {
        let context = self.context();
        self.composer
            .check_resources(&context, config, resource_ids)
            .await
    }

    pub fn error_message(&self, result: &SecurityCheckResult) -> Option<String> {
        self.translator.error_message(result)
    }

    pub fn redirect_path(&self, result: &SecurityCheckResult, fallback: &str) -> Option<String> {
        self.translator.redirect_path(result, fallback)
    }

    /// Counter snapshot, `None` when metrics are disabled
    pub fn metrics(&self) -> Option<EngineMetrics> {
        self.metrics.as_ref().map(|m| m.get_metrics())
    }
}
