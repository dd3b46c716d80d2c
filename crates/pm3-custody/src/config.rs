//! Custody contract configuration.

use pm3_core::{OrgId, PM3_MSP_ID};
use pm3_registry::config::env_org;
use pm3_registry::{ConfigError, PermissionBinding};

/// Configuration for the custody contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustodyConfig {
    /// Organization that takes nominal ownership of settled packages.
    pub platform_org: OrgId,
    /// Where registry permission checks are answered.
    pub permissions: PermissionBinding,
}

impl CustodyConfig {
    pub fn new(platform_org: OrgId, permissions: PermissionBinding) -> Self {
        Self {
            platform_org,
            permissions,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `PM3_PLATFORM_ORG` (default: `PM3MSP`)
    /// - `PM3_PERMISSION_SOURCE` (default: `in-process`; or
    ///   `cross-contract:<chaincode>`)
    pub fn from_env() -> Result<Self, ConfigError> {
        let permissions = match std::env::var("PM3_PERMISSION_SOURCE") {
            Ok(raw) => raw.parse()?,
            Err(_) => PermissionBinding::InProcess,
        };
        Ok(Self {
            platform_org: env_org("PM3_PLATFORM_ORG", PM3_MSP_ID)?,
            permissions,
        })
    }
}

impl Default for CustodyConfig {
    fn default() -> Self {
        Self {
            platform_org: OrgId::platform(),
            permissions: PermissionBinding::InProcess,
        }
    }
}
