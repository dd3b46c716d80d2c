//! Permission lookup for other contracts.
//!
//! A contract either embeds the registry logic and reads the permission
//! records from its own view of world state, or calls a separately
//! deployed `roleauth` chaincode inside the same transaction. Both paths
//! answer the same question with the same fail-closed semantics.

use pm3_core::OrgId;
use pm3_ledger::{ChaincodeStub, ContractError};
use pm3_model::Permission;

use crate::config::{PermissionBinding, RegistryConfig};
use crate::registry::PermissionRegistry;

/// Where permission checks are answered.
#[derive(Debug, Clone)]
pub enum PermissionSource {
    /// Evaluate the registry inside the calling contract.
    InProcess(PermissionRegistry),
    /// Call `HasPermission` on the named chaincode.
    CrossContract { chaincode: String },
}

impl PermissionSource {
    pub fn from_binding(binding: &PermissionBinding, registry: &RegistryConfig) -> Self {
        match binding {
            PermissionBinding::InProcess => Self::InProcess(PermissionRegistry::new(registry)),
            PermissionBinding::CrossContract(name) => Self::CrossContract {
                chaincode: name.clone(),
            },
        }
    }

    /// Whether `org` holds `permission`.
    ///
    /// A cross-contract reply other than `true` or `false` counts as
    /// `false`. Failures of the call itself propagate and abort the
    /// transaction.
    pub fn has_permission(
        &self,
        stub: &mut dyn ChaincodeStub,
        org: &OrgId,
        permission: Permission,
    ) -> Result<bool, ContractError> {
        match self {
            Self::InProcess(registry) => registry.has_permission(stub, org, permission),
            Self::CrossContract { chaincode } => {
                let args = [org.to_string(), permission.as_str().to_string()];
                let reply = stub.invoke_chaincode(chaincode, "HasPermission", &args)?;
                match reply.as_slice() {
                    b"true" => Ok(true),
                    b"false" => Ok(false),
                    _ => {
                        tracing::warn!(
                            chaincode = %chaincode,
                            org = %org,
                            "unexpected HasPermission reply; treating as denied"
                        );
                        Ok(false)
                    }
                }
            }
        }
    }

    /// Fail with [`ContractError::MissingPermission`] unless the caller of
    /// the current transaction holds `permission`.
    pub fn require(
        &self,
        stub: &mut dyn ChaincodeStub,
        permission: Permission,
    ) -> Result<(), ContractError> {
        let caller = stub.caller_org_id().clone();
        if self.has_permission(stub, &caller, permission)? {
            return Ok(());
        }
        tracing::warn!(caller = %caller, permission = %permission, "permission check failed");
        Err(ContractError::MissingPermission { caller, permission })
    }
}
