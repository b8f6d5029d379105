//! # Gatehouse Core
//!
//! Shared identifiers, policy vocabulary, and collaborator traits for the
//! Gatehouse authorization engine. The engine itself lives in
//! `gatehouse-authz`; this package holds everything an embedding
//! application needs to implement the session and resource-store seams
//! without depending on the engine.

pub mod types;
pub mod traits;
pub mod error;

// Re-export commonly used types
pub use error::{CoreError, Result};
pub use types::{
    Identity, OwnerRecord, PermissionValue, ResourceId, Role, SessionEvent, TeamId, TenantId,
    UserId, DEFAULT_SUBSCRIPTION_PLAN,
};
pub use traits::{InMemoryResourceStore, InMemorySessionProvider, ResourceStore, SessionProvider};
