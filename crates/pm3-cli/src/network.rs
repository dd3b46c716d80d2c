//! Network settings shared by subcommands that stand up a ledger.
//!
//! Settings load from the environment first (`PM3_ADMIN_ORG`,
//! `PM3_PLATFORM_ORG`, `PM3_PERMISSION_SOURCE`); flags override them.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;

use pm3_core::OrgId;
use pm3_custody::{CustodyConfig, PackageContract};
use pm3_ledger::MemoryLedger;
use pm3_registry::{PermissionBinding, RegistryConfig, RoleAuthContract};

/// Flags overriding the environment configuration.
#[derive(Args, Debug, Clone, Default)]
pub struct NetworkArgs {
    /// Administrator organization of the permission registry.
    #[arg(long)]
    pub admin_org: Option<String>,

    /// Organization that takes ownership of settled packages.
    #[arg(long)]
    pub platform_org: Option<String>,

    /// Where the custody contract resolves permissions
    /// (`in-process`, `cross-contract`, or `cross-contract:<name>`).
    #[arg(long)]
    pub permission_source: Option<String>,
}

impl NetworkArgs {
    /// Resolve both contract configurations.
    pub fn load(&self) -> Result<(RegistryConfig, CustodyConfig)> {
        let mut registry =
            RegistryConfig::from_env().context("failed to load registry configuration")?;
        let mut custody =
            CustodyConfig::from_env().context("failed to load custody configuration")?;

        if let Some(admin) = &self.admin_org {
            registry.admin_org =
                OrgId::new(admin.as_str()).with_context(|| format!("invalid --admin-org {admin:?}"))?;
        }
        if let Some(platform) = &self.platform_org {
            custody.platform_org = OrgId::new(platform.as_str())
                .with_context(|| format!("invalid --platform-org {platform:?}"))?;
        }
        if let Some(source) = &self.permission_source {
            custody.permissions = source
                .parse::<PermissionBinding>()
                .with_context(|| format!("invalid --permission-source {source:?}"))?;
        }
        Ok((registry, custody))
    }
}

/// A fresh ledger with `roleauth` and `pm3package` installed.
pub fn build_ledger(registry: &RegistryConfig, custody: &CustodyConfig) -> MemoryLedger {
    if let PermissionBinding::CrossContract(name) = &custody.permissions {
        if name != pm3_registry::config::DEFAULT_REGISTRY_CHAINCODE {
            tracing::warn!(
                chaincode = %name,
                "permission source names a chaincode that replay does not install"
            );
        }
    }
    let ledger = MemoryLedger::new();
    ledger.install(Arc::new(RoleAuthContract::new(registry)));
    ledger.install(Arc::new(PackageContract::new(custody, registry)));
    tracing::debug!(
        admin = %registry.admin_org,
        platform = %custody.platform_org,
        permissions = %custody.permissions,
        "ledger ready"
    );
    ledger
}
