//! Layered security middleware
//!
//! Declarative requirements ([`SecurityMiddlewareConfig`]), the verdict type
//! ([`SecurityCheckResult`]) and the composer that evaluates one against a
//! [`SecurityContext`](crate::context::SecurityContext).

pub mod composer;
pub mod config;
pub mod result;

pub use composer::SecurityComposer;
pub use config::{Combinator, OwnershipRequirement, PermissionRequirement, SecurityMiddlewareConfig};
pub use result::{DeniedReason, SecurityCheckResult, SecurityLayer};
