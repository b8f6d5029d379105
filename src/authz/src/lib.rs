//! # Gatehouse Authorization Engine
//!
//! Layered, fail-closed authorization for multi-tenant applications.
//!
//! ## Features
//!
//! - **Role levels and permissions** from a policy table supplied at startup
//! - **Resource ownership** checks, direct or through the owning team
//! - **Context assembly** with stale-result discard across identity changes
//! - **Structured verdicts** with a stable reason and layer, never an error
//! - **Verdict translation** to user-facing messages and redirect routes
//!
//! ## Example
//!
//! ```rust
//! use gatehouse_authz::{
//!     EngineConfig, PolicyConfig, RoleDefinition, SecurityEngine, SecurityMiddlewareConfig,
//! };
//! use gatehouse_core::{
//!     Identity, InMemoryResourceStore, InMemorySessionProvider, OwnerRecord, ResourceId,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let policy = PolicyConfig {
//!         super_admin: "super_admin".into(),
//!         guest: "guest".into(),
//!         roles: vec![
//!             RoleDefinition::new("guest", 0),
//!             RoleDefinition::new("member", 10).with_permissions(["pages.edit"]),
//!             RoleDefinition::new("super_admin", 100),
//!         ],
//!     };
//!
//!     let store = InMemoryResourceStore::new();
//!     store.set_user_role("alice", "member").await;
//!     store.put_resource("page", "page-1", OwnerRecord::user("alice")).await;
//!
//!     let session = InMemorySessionProvider::signed_in(Identity::new("alice"));
//!     let engine = SecurityEngine::new(
//!         EngineConfig::new(policy),
//!         Arc::new(session),
//!         Arc::new(store),
//!     )?;
//!     engine.init().await;
//!
//!     let edit_page = SecurityMiddlewareConfig::new()
//!         .require_all(["pages.edit"])
//!         .require_ownership("page");
//!
//!     let result = engine.check_resource(&edit_page, &ResourceId::from("page-1")).await;
//!     assert!(result.allowed());
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod ownership;
pub mod policy;
pub mod resolver;
pub mod verdict;

// Re-export commonly used types
pub use config::EngineConfig;
pub use context::{AssemblyOutcome, ContextAssembler, ContextSnapshot, LoadPhase, SecurityContext};
pub use engine::SecurityEngine;
pub use error::{AuthzError, Result};
pub use metrics::{EngineMetrics, MetricsCollector};
pub use middleware::{
    Combinator, DeniedReason, SecurityCheckResult, SecurityComposer, SecurityLayer,
    SecurityMiddlewareConfig,
};
pub use ownership::{OwnershipRequest, OwnershipResolver};
pub use policy::{PolicyConfig, PolicyTable, RoleDefinition, RoleLevel, UNKNOWN_ROLE_LEVEL};
pub use resolver::RolePermissionResolver;
pub use verdict::{VerdictConfig, VerdictMessages, VerdictTranslator};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
