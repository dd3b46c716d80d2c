//! Permission registry configuration.
//!
//! The administrator organization is a deployment constant. Defaults match
//! the platform operator's MSP id; override through the environment or by
//! explicit construction in tests.

use std::str::FromStr;

use pm3_core::{OrgId, PM3_MSP_ID};

/// Default chaincode name of a separately deployed registry.
pub const DEFAULT_REGISTRY_CHAINCODE: &str = "roleauth";

/// Configuration for the permission registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    /// The only organization allowed to change permission records.
    pub admin_org: OrgId,
}

impl RegistryConfig {
    pub fn new(admin_org: OrgId) -> Self {
        Self { admin_org }
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `PM3_ADMIN_ORG` (default: `PM3MSP`)
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            admin_org: env_org("PM3_ADMIN_ORG", PM3_MSP_ID)?,
        })
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            admin_org: OrgId::platform(),
        }
    }
}

/// Where a contract looks up registry permissions.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PermissionBinding {
    /// The registry runs inside the calling contract's transaction code.
    #[default]
    InProcess,
    /// The registry is a separate chaincode reached by cross-contract call.
    CrossContract(String),
}

impl FromStr for PermissionBinding {
    type Err = ConfigError;

    /// Accepts `in-process`, `cross-contract` (default registry name) or
    /// `cross-contract:<chaincode>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "in-process" => Ok(Self::InProcess),
            "cross-contract" => Ok(Self::CrossContract(DEFAULT_REGISTRY_CHAINCODE.to_string())),
            other => match other.strip_prefix("cross-contract:") {
                Some(name) if !name.trim().is_empty() => {
                    Ok(Self::CrossContract(name.trim().to_string()))
                }
                _ => Err(ConfigError::InvalidPermissionSource(s.to_string())),
            },
        }
    }
}

impl std::fmt::Display for PermissionBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InProcess => f.write_str("in-process"),
            Self::CrossContract(name) => write!(f, "cross-contract:{name}"),
        }
    }
}

/// Read an organization id from `var`, falling back to `default`.
pub fn env_org(var: &str, default: &str) -> Result<OrgId, ConfigError> {
    let raw = std::env::var(var).unwrap_or_else(|_| default.to_string());
    OrgId::new(&raw).map_err(|e| ConfigError::InvalidOrg(var.to_string(), e.to_string()))
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid organization id in {0}: {1}")]
    InvalidOrg(String, String),
    #[error("invalid permission source {0:?} (expected \"in-process\" or \"cross-contract:<name>\")")]
    InvalidPermissionSource(String),
}
