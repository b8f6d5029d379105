//! Engine configuration
//!
//! ```toml
//! enable_metrics = true
//!
//! [policy]
//! super_admin = "super_admin"
//! guest = "guest"
//!
//! [[policy.roles]]
//! name = "guest"
//! level = 0
//!
//! [[policy.roles]]
//! name = "super_admin"
//! level = 100
//!
//! [verdict]
//! sign_in_path = "/login"
//! ```

use crate::error::{AuthzError, Result};
use crate::policy::PolicyConfig;
use crate::verdict::VerdictConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Security engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Enable metrics collection
    #[serde(default = "default_true")]
    pub enable_metrics: bool,

    /// Role levels and permissions
    pub policy: PolicyConfig,

    /// Denial messages and routes
    #[serde(default)]
    pub verdict: VerdictConfig,
}

fn default_true() -> bool {
    true
}

impl EngineConfig {
    /// Configuration with metrics on and default verdict text
    pub fn new(policy: PolicyConfig) -> Self {
        Self {
            enable_metrics: true,
            policy,
            verdict: VerdictConfig::default(),
        }
    }

    /// Parse configuration from a TOML document
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&contents)
    }

    /// Settings that the policy table itself does not check
    pub fn validate(&self) -> Result<()> {
        if !self.verdict.sign_in_path.starts_with('/') {
            return Err(AuthzError::Config(format!(
                "sign_in_path must be an absolute route, got '{}'",
                self.verdict.sign_in_path
            )));
        }
        Ok(())
    }
}
