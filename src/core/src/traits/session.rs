//! Session provider trait

use crate::error::Result;
use crate::types::Identity;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Source of the current session identity
///
/// Queried on engine start and after every identity-change notification.
/// `Ok(None)` means nobody is signed in.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Get the identity of the signed-in principal, if any
    async fn current_identity(&self) -> Result<Option<Identity>>;
}

/// In-memory session provider
///
/// Holds a single identity slot, switched with [`sign_in`](Self::sign_in)
/// and [`sign_out`](Self::sign_out). Useful for tests and for embedding
/// applications that already track the session themselves.
#[derive(Clone, Default)]
pub struct InMemorySessionProvider {
    identity: Arc<RwLock<Option<Identity>>>,
}

impl InMemorySessionProvider {
    /// Create a provider with nobody signed in
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a provider with `identity` already signed in
    pub fn signed_in(identity: Identity) -> Self {
        Self {
            identity: Arc::new(RwLock::new(Some(identity))),
        }
    }

    /// Replace the current identity
    pub async fn sign_in(&self, identity: Identity) {
        *self.identity.write().await = Some(identity);
    }

    /// Clear the current identity
    pub async fn sign_out(&self) {
        *self.identity.write().await = None;
    }
}

#[async_trait]
impl SessionProvider for InMemorySessionProvider {
    async fn current_identity(&self) -> Result<Option<Identity>> {
        Ok(self.identity.read().await.clone())
    }
}
