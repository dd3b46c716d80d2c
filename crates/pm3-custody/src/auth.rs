//! # Authorization Glue
//!
//! Every check takes the caller from the stub, which carries the
//! authenticated submitter. Two kinds of check exist:
//!
//! - **Data-implied**: the caller must be the package owner, the terms
//!   recipient, or the administrator.
//! - **Registry**: the caller must hold an explicit permission, answered by
//!   a [`PermissionSource`] that is either in-process or a cross-contract
//!   call into `roleauth`.

use pm3_core::OrgId;
use pm3_ledger::{ChaincodeStub, ContractError};
use pm3_model::{BlockchainPackage, Permission, TransferTerms};
use pm3_registry::PermissionSource;

/// Authorization policy of the custody contract.
#[derive(Debug, Clone)]
pub struct Authorizer {
    admin_org: OrgId,
    permissions: PermissionSource,
}

impl Authorizer {
    pub fn new(admin_org: OrgId, permissions: PermissionSource) -> Self {
        Self {
            admin_org,
            permissions,
        }
    }

    pub fn admin_org(&self) -> &OrgId {
        &self.admin_org
    }

    pub fn permissions(&self) -> &PermissionSource {
        &self.permissions
    }

    /// Registry check for the current caller.
    pub fn require_permission(
        &self,
        stub: &mut dyn ChaincodeStub,
        permission: Permission,
    ) -> Result<(), ContractError> {
        self.permissions.require(stub, permission)
    }

    /// The caller must own `package`.
    pub fn require_owner(
        &self,
        package: &BlockchainPackage,
        caller: &OrgId,
        action: &str,
    ) -> Result<(), ContractError> {
        if package.is_owned_by(caller) {
            return Ok(());
        }
        deny(caller, &package.external_id.to_string(), action)
    }

    /// The caller must own `package` or be the administrator.
    pub fn require_owner_or_admin(
        &self,
        package: &BlockchainPackage,
        caller: &OrgId,
        action: &str,
    ) -> Result<(), ContractError> {
        if package.is_owned_by(caller) || caller == &self.admin_org {
            return Ok(());
        }
        deny(caller, &package.external_id.to_string(), action)
    }

    /// The caller must be the organization `terms` were proposed to.
    pub fn require_terms_recipient(
        &self,
        terms: &TransferTerms,
        caller: &OrgId,
        action: &str,
    ) -> Result<(), ContractError> {
        if &terms.to_org_id == caller {
            return Ok(());
        }
        deny(caller, &format!("transfer terms {}", terms.terms_id), action)
    }
}

fn deny(caller: &OrgId, subject: &str, action: &str) -> Result<(), ContractError> {
    tracing::warn!(caller = %caller, subject, action, "access denied");
    Err(ContractError::unauthorized(format!(
        "{caller} may not {action} {subject}"
    )))
}
