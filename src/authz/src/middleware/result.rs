//! Security check verdicts

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stage of a security check that can reject a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityLayer {
    /// Is anybody signed in
    Authentication,
    /// Role level and permissions
    Authorization,
    /// Resource ownership
    Ownership,
}

/// Why a check was denied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeniedReason {
    NotAuthenticated,
    InsufficientRole,
    InsufficientPermissions,
    NotOwner,
    ResourceNotFound,
}

impl DeniedReason {
    /// Every reason, in layer order
    pub const ALL: [DeniedReason; 5] = [
        DeniedReason::NotAuthenticated,
        DeniedReason::InsufficientRole,
        DeniedReason::InsufficientPermissions,
        DeniedReason::NotOwner,
        DeniedReason::ResourceNotFound,
    ];

    /// Layer that produces this reason
    pub fn layer(&self) -> SecurityLayer {
        match self {
            DeniedReason::NotAuthenticated => SecurityLayer::Authentication,
            DeniedReason::InsufficientRole | DeniedReason::InsufficientPermissions => {
                SecurityLayer::Authorization
            }
            DeniedReason::NotOwner | DeniedReason::ResourceNotFound => SecurityLayer::Ownership,
        }
    }

    /// Stable snake_case token (matches the serialized form)
    pub fn as_str(&self) -> &'static str {
        match self {
            DeniedReason::NotAuthenticated => "not_authenticated",
            DeniedReason::InsufficientRole => "insufficient_role",
            DeniedReason::InsufficientPermissions => "insufficient_permissions",
            DeniedReason::NotOwner => "not_owner",
            DeniedReason::ResourceNotFound => "resource_not_found",
        }
    }
}

impl fmt::Display for DeniedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one security check
///
/// Either allowed with no reason, or denied with both a reason and the layer
/// that produced it. Fields are private so no other combination can exist;
/// there is no "unknown" verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SecurityCheckResult {
    allowed: bool,
    denied_reason: Option<DeniedReason>,
    layer: Option<SecurityLayer>,
}

impl SecurityCheckResult {
    /// Allow verdict
    pub fn allow() -> Self {
        Self {
            allowed: true,
            denied_reason: None,
            layer: None,
        }
    }

    /// Deny verdict; the layer follows from the reason
    pub fn deny(reason: DeniedReason) -> Self {
        Self {
            allowed: false,
            denied_reason: Some(reason),
            layer: Some(reason.layer()),
        }
    }

    /// Whether the action may proceed
    pub fn allowed(&self) -> bool {
        self.allowed
    }

    /// Why the action was denied, `None` when allowed
    pub fn denied_reason(&self) -> Option<DeniedReason> {
        self.denied_reason
    }

    /// Layer that denied the action, `None` when allowed
    pub fn layer(&self) -> Option<SecurityLayer> {
        self.layer
    }
}
