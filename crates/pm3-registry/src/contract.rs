//! The registry deployed as its own chaincode, `roleauth`.

use pm3_core::{CanonicalBytes, OrgId};
use pm3_ledger::chaincode::{arg, lookup, opt_arg};
use pm3_ledger::{Chaincode, ChaincodeStub, ContractError, Operation, OperationInfo};
use pm3_model::{Permission, PermissionSet, Role};

use crate::config::{RegistryConfig, DEFAULT_REGISTRY_CHAINCODE};
use crate::registry::PermissionRegistry;

/// Chaincode wrapper around [`PermissionRegistry`].
///
/// Registry operations carry no table permission: mutations are gated on
/// the administrator organization inside the registry itself.
#[derive(Debug, Clone)]
pub struct RoleAuthContract {
    registry: PermissionRegistry,
}

const OPERATIONS: &[Operation<RoleAuthContract>] = &[
    Operation::read("GetPermissions", None, get_permissions),
    Operation::read("HasPermission", None, has_permission),
    Operation::write("SetPermissions", None, set_permissions),
    Operation::write("GrantPermissions", None, grant_permissions),
    Operation::write("RevokePermissions", None, revoke_permissions),
    Operation::write("Bootstrap", None, bootstrap),
    Operation::write("AssignRole", None, assign_role),
];

impl RoleAuthContract {
    pub fn new(config: &RegistryConfig) -> Self {
        Self {
            registry: PermissionRegistry::new(config),
        }
    }

    pub fn registry(&self) -> &PermissionRegistry {
        &self.registry
    }
}

impl Chaincode for RoleAuthContract {
    fn name(&self) -> &str {
        DEFAULT_REGISTRY_CHAINCODE
    }

    fn operations(&self) -> Vec<OperationInfo> {
        OPERATIONS.iter().map(Operation::info).collect()
    }

    fn invoke(
        &self,
        stub: &mut dyn ChaincodeStub,
        function: &str,
        args: &[String],
    ) -> Result<Vec<u8>, ContractError> {
        lookup(self.name(), OPERATIONS, function)?.run(self, stub, args)
    }
}

fn org_arg(args: &[String], index: usize, name: &str) -> Result<OrgId, ContractError> {
    Ok(OrgId::new(arg(args, index, name)?)?)
}

fn set_arg(args: &[String], index: usize) -> Result<PermissionSet, ContractError> {
    Ok(PermissionSet::from_json(arg(args, index, "permissions")?.as_bytes())?)
}

fn encode(set: &PermissionSet) -> Result<Vec<u8>, ContractError> {
    Ok(CanonicalBytes::new(set)?.into_vec())
}

fn get_permissions(
    c: &RoleAuthContract,
    stub: &mut dyn ChaincodeStub,
    args: &[String],
) -> Result<Vec<u8>, ContractError> {
    let org = org_arg(args, 0, "orgId")?;
    encode(&c.registry.get_permissions(stub, &org)?)
}

fn has_permission(
    c: &RoleAuthContract,
    stub: &mut dyn ChaincodeStub,
    args: &[String],
) -> Result<Vec<u8>, ContractError> {
    let org = org_arg(args, 0, "orgId")?;
    let permission: Permission = arg(args, 1, "permission")?.parse()?;
    let held = c.registry.has_permission(stub, &org, permission)?;
    Ok(held.to_string().into_bytes())
}

fn set_permissions(
    c: &RoleAuthContract,
    stub: &mut dyn ChaincodeStub,
    args: &[String],
) -> Result<Vec<u8>, ContractError> {
    let target = org_arg(args, 0, "targetOrgId")?;
    encode(&c.registry.set_permissions(stub, &target, &set_arg(args, 1)?)?)
}

fn grant_permissions(
    c: &RoleAuthContract,
    stub: &mut dyn ChaincodeStub,
    args: &[String],
) -> Result<Vec<u8>, ContractError> {
    let target = org_arg(args, 0, "targetOrgId")?;
    encode(&c.registry.grant_permissions(stub, &target, &set_arg(args, 1)?)?)
}

fn revoke_permissions(
    c: &RoleAuthContract,
    stub: &mut dyn ChaincodeStub,
    args: &[String],
) -> Result<Vec<u8>, ContractError> {
    let target = org_arg(args, 0, "targetOrgId")?;
    encode(&c.registry.revoke_permissions(stub, &target, &set_arg(args, 1)?)?)
}

fn bootstrap(
    c: &RoleAuthContract,
    stub: &mut dyn ChaincodeStub,
    args: &[String],
) -> Result<Vec<u8>, ContractError> {
    // Target defaults to the caller.
    let target = match opt_arg(args, 0) {
        Some(id) => OrgId::new(id)?,
        None => stub.caller_org_id().clone(),
    };
    encode(&c.registry.bootstrap(stub, &target)?)
}

fn assign_role(
    c: &RoleAuthContract,
    stub: &mut dyn ChaincodeStub,
    args: &[String],
) -> Result<Vec<u8>, ContractError> {
    let target = org_arg(args, 0, "targetOrgId")?;
    let role: Role = arg(args, 1, "role")?.parse()?;
    encode(&c.registry.assign_role(stub, &target, role)?)
}
