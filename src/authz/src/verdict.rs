//! Translation of denial verdicts for the presentation layer
//!
//! Table-driven over [`DeniedReason`]. The engine never navigates or renders
//! anything itself: it hands the caller a message and a route, and the
//! caller decides whether to use them. Allowed verdicts are never
//! translated.

use crate::middleware::{DeniedReason, SecurityCheckResult};
use serde::{Deserialize, Serialize};

/// Default sign-in route
pub const DEFAULT_SIGN_IN_PATH: &str = "/login";

/// Per-reason message overrides; unset reasons keep the default text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VerdictMessages {
    pub not_authenticated: Option<String>,
    pub insufficient_role: Option<String>,
    pub insufficient_permissions: Option<String>,
    pub not_owner: Option<String>,
    pub resource_not_found: Option<String>,
}

impl VerdictMessages {
    fn get(&self, reason: DeniedReason) -> Option<&str> {
        let message = match reason {
            DeniedReason::NotAuthenticated => &self.not_authenticated,
            DeniedReason::InsufficientRole => &self.insufficient_role,
            DeniedReason::InsufficientPermissions => &self.insufficient_permissions,
            DeniedReason::NotOwner => &self.not_owner,
            DeniedReason::ResourceNotFound => &self.resource_not_found,
        };
        message.as_deref()
    }
}

/// Translator configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerdictConfig {
    /// Route unauthenticated principals are sent to
    pub sign_in_path: String,

    pub messages: VerdictMessages,
}

impl Default for VerdictConfig {
    fn default() -> Self {
        Self {
            sign_in_path: DEFAULT_SIGN_IN_PATH.to_string(),
            messages: VerdictMessages::default(),
        }
    }
}

/// Maps denial verdicts to user-facing text and routes
#[derive(Debug, Clone, Default)]
pub struct VerdictTranslator {
    config: VerdictConfig,
}

impl VerdictTranslator {
    pub fn new(config: VerdictConfig) -> Self {
        Self { config }
    }

    /// Human-readable explanation of a denial, `None` when allowed
    pub fn error_message(&self, result: &SecurityCheckResult) -> Option<String> {
        let reason = result.denied_reason()?;
        let message = self
            .config
            .messages
            .get(reason)
            .unwrap_or_else(|| default_message(reason));
        Some(message.to_string())
    }

    /// Where to send the principal after a denial, `None` when allowed
    ///
    /// Unauthenticated principals go to the sign-in route; every other
    /// denial goes to `fallback`.
    pub fn redirect_path(&self, result: &SecurityCheckResult, fallback: &str) -> Option<String> {
        let path = match result.denied_reason()? {
            DeniedReason::NotAuthenticated => self.config.sign_in_path.as_str(),
            DeniedReason::InsufficientRole
            | DeniedReason::InsufficientPermissions
            | DeniedReason::NotOwner
            | DeniedReason::ResourceNotFound => fallback,
        };
        Some(path.to_string())
    }
}

fn default_message(reason: DeniedReason) -> &'static str {
    match reason {
        DeniedReason::NotAuthenticated => "Please sign in to continue.",
        DeniedReason::InsufficientRole => "Your role does not allow this action.",
        DeniedReason::InsufficientPermissions => {
            "You do not have permission to perform this action."
        }
        DeniedReason::NotOwner => {
            "You do not have permission to change this resource because you are not its owner."
        }
        DeniedReason::ResourceNotFound => "The requested resource could not be found.",
    }
}
