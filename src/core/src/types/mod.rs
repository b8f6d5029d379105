//! Shared types for the Gatehouse engine

pub mod ids;
pub mod access;
pub mod identity;

// Re-export commonly used types
pub use ids::{ResourceId, TeamId, TenantId, UserId};
pub use access::{PermissionValue, Role};
pub use identity::{Identity, OwnerRecord, SessionEvent, DEFAULT_SUBSCRIPTION_PLAN};
