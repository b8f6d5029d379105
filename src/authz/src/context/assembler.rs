//! Security context assembly
//!
//! Builds the [`SecurityContext`] for the current session and publishes it
//! through a `watch` channel so readers always see one complete snapshot.
//!
//! # Lifecycle
//!
//! ```text
//! Unloaded ──rebuild──► Loading ──lookups done──► Ready
//!                          ▲                        │
//!                          └──── identity change ◄──┘
//! ```
//!
//! # Stale results
//!
//! Every rebuild takes a generation token from a monotonic counter before it
//! suspends. When its lookups complete it publishes only if its token is
//! still the latest one issued and newer than the published snapshot. The
//! comparison runs inside the channel's lock, so a slow build for a previous
//! identity can never overwrite the context of a newer one.

use super::SecurityContext;
use crate::metrics::MetricsCollector;
use crate::resolver::RolePermissionResolver;
use gatehouse_core::{Identity, ResourceStore, SessionEvent, SessionProvider, UserId};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Assembly state of the published context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadPhase {
    /// No build has started yet
    Unloaded,
    /// A build is in flight
    Loading,
    /// The published context reflects the latest session identity
    Ready,
}

/// What readers observe: the phase plus the context published by `generation`
#[derive(Debug, Clone)]
pub struct ContextSnapshot {
    pub phase: LoadPhase,
    pub generation: u64,
    pub context: Arc<SecurityContext>,
}

impl ContextSnapshot {
    pub fn is_ready(&self) -> bool {
        self.phase == LoadPhase::Ready
    }
}

/// Result of one rebuild
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblyOutcome {
    /// The built context is now the published one
    Published,
    /// A newer rebuild started first; the result was discarded
    Superseded,
}

/// Builds and publishes the security context for the current session
pub struct ContextAssembler {
    session: Arc<dyn SessionProvider>,
    store: Arc<dyn ResourceStore>,
    resolver: Arc<RolePermissionResolver>,
    metrics: Option<Arc<MetricsCollector>>,

    /// Last generation token handed out
    latest_generation: AtomicU64,

    state: watch::Sender<ContextSnapshot>,
}

impl ContextAssembler {
    /// Create an assembler; the published context starts as guest/`Unloaded`
    pub fn new(
        session: Arc<dyn SessionProvider>,
        store: Arc<dyn ResourceStore>,
        resolver: Arc<RolePermissionResolver>,
        metrics: Option<Arc<MetricsCollector>>,
    ) -> Self {
        let initial = ContextSnapshot {
            phase: LoadPhase::Unloaded,
            generation: 0,
            context: Arc::new(SecurityContext::guest(&resolver)),
        };
        let (state, _) = watch::channel(initial);

        Self {
            session,
            store,
            resolver,
            metrics,
            latest_generation: AtomicU64::new(0),
            state,
        }
    }

    /// Current snapshot
    pub fn snapshot(&self) -> ContextSnapshot {
        self.state.borrow().clone()
    }

    /// Currently published context
    pub fn context(&self) -> Arc<SecurityContext> {
        self.state.borrow().context.clone()
    }

    /// Subscribe to published snapshots
    pub fn subscribe(&self) -> watch::Receiver<ContextSnapshot> {
        self.state.subscribe()
    }

    /// Re-read the session and publish a fresh context
    ///
    /// Role and team lookups run concurrently; if either fails, or the
    /// session itself cannot be read, the guest context is published
    /// instead. A partially privileged context is never built.
    pub async fn rebuild(&self) -> AssemblyOutcome {
        let generation = self.latest_generation.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(generation, "Context rebuild started");

        let identity = match self.session.current_identity().await {
            Ok(identity) => identity,
            Err(e) => {
                warn!(generation, error = %e, "Session lookup failed, publishing guest context");
                self.record_failure();
                return self.publish(generation, SecurityContext::guest(&self.resolver));
            }
        };

        let Some(identity) = identity else {
            return self.publish(generation, SecurityContext::guest(&self.resolver));
        };

        self.mark_loading(generation, &identity.user_id);

        let context = match self.load_authenticated(identity).await {
            Some(context) => context,
            None => {
                self.record_failure();
                SecurityContext::guest(&self.resolver)
            }
        };

        self.publish(generation, context)
    }

    /// Rebuild for the current session (after a role or team change)
    pub async fn refresh(&self) -> AssemblyOutcome {
        self.rebuild().await
    }

    /// Handle one session notification
    ///
    /// Returns `None` when the event leaves the identity unchanged.
    pub async fn handle_event(&self, event: SessionEvent) -> Option<AssemblyOutcome> {
        if !event.changes_identity() {
            debug!(?event, "Session event does not change identity");
            return None;
        }
        Some(self.rebuild().await)
    }

    /// Drive rebuilds from a stream of session notifications
    ///
    /// Each identity-changing event spawns its own rebuild, so a slow build
    /// never delays a newer one; generation tokens decide which result is
    /// kept. The task ends when the sender side is dropped.
    pub fn listen(self: Arc<Self>, mut events: mpsc::Receiver<SessionEvent>) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                if !event.changes_identity() {
                    debug!(?event, "Ignoring session event");
                    continue;
                }

                let assembler = Arc::clone(&self);
                tokio::spawn(async move {
                    assembler.rebuild().await;
                });
            }
            debug!("Session event stream closed");
        })
    }

    async fn load_authenticated(&self, identity: Identity) -> Option<SecurityContext> {
        let user_id = identity.user_id.clone();

        let lookups = tokio::try_join!(
            self.store.get_user_role(&user_id),
            self.store.get_user_team_ids(&user_id),
        );

        match lookups {
            Ok((role, team_ids)) => Some(SecurityContext::authenticated(
                identity,
                role,
                team_ids,
                &self.resolver,
            )),
            Err(e) => {
                warn!(
                    user_id = %user_id,
                    error = %e,
                    store_error = e.is_store_error(),
                    "Role/team lookup failed, publishing guest context"
                );
                None
            }
        }
    }

    /// Enter `Loading`. When the build is for a different principal than the
    /// one published, the published context drops to guest meanwhile.
    fn mark_loading(&self, generation: u64, user_id: &UserId) {
        let resolver = &self.resolver;
        self.state.send_if_modified(|snapshot| {
            if !self.is_current(generation, snapshot) {
                return false;
            }

            snapshot.phase = LoadPhase::Loading;
            if snapshot.context.user_id() != Some(user_id) {
                snapshot.context = Arc::new(SecurityContext::guest(resolver));
            }
            true
        });
    }

    fn publish(&self, generation: u64, context: SecurityContext) -> AssemblyOutcome {
        let context = Arc::new(context);
        let published = self.state.send_if_modified(|snapshot| {
            if !self.is_current(generation, snapshot) {
                return false;
            }

            snapshot.phase = LoadPhase::Ready;
            snapshot.generation = generation;
            snapshot.context = Arc::clone(&context);
            true
        });

        if published {
            if let Some(metrics) = &self.metrics {
                metrics.record_context_build();
            }
            info!(
                generation,
                authenticated = context.is_authenticated(),
                role = %context.role(),
                "Security context published"
            );
            AssemblyOutcome::Published
        } else {
            if let Some(metrics) = &self.metrics {
                metrics.record_stale_discard();
            }
            warn!(
                generation,
                latest = self.latest_generation.load(Ordering::SeqCst),
                "Discarding stale security context"
            );
            AssemblyOutcome::Superseded
        }
    }

    fn is_current(&self, generation: u64, snapshot: &ContextSnapshot) -> bool {
        generation == self.latest_generation.load(Ordering::SeqCst)
            && generation > snapshot.generation
    }

    fn record_failure(&self) {
        if let Some(metrics) = &self.metrics {
            metrics.record_assembly_failure();
        }
    }
}
