//! Collaborator seams consumed by the engine

pub mod session;
pub mod store;

// Re-export commonly used traits
pub use session::{InMemorySessionProvider, SessionProvider};
pub use store::{InMemoryResourceStore, ResourceStore};
