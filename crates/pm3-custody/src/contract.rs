//! # The `pm3package` Chaincode
//!
//! Dispatch is table-driven. Before a handler runs, the dispatcher checks
//! the entry's registry permission against the caller; read-only entries
//! then run against a [`ReadOnlyStub`](pm3_ledger::ReadOnlyStub).

use pm3_core::{ExternalPackageId, OrgId, TermsId};
use pm3_ledger::chaincode::{arg, lookup};
use pm3_ledger::{Chaincode, ChaincodeStub, ContractError, Operation, OperationInfo};
use pm3_model::Permission;
use pm3_registry::{PermissionSource, RegistryConfig};

use crate::auth::Authorizer;
use crate::config::CustodyConfig;
use crate::{package, transfer};

/// Installed name of the custody chaincode.
pub const CHAINCODE_NAME: &str = "pm3package";

/// The custody contract.
#[derive(Debug, Clone)]
pub struct PackageContract {
    platform_org: OrgId,
    auth: Authorizer,
}

const OPERATIONS: &[Operation<PackageContract>] = &[
    Operation::write("CreatePackage", Some(Permission::PackageCreate), package::create_package),
    Operation::read("ReadBlockchainPackage", None, package::read_blockchain_package),
    Operation::read(
        "ReadPackageDetailsAndPII",
        Some(Permission::PackageReadPrivate),
        package::read_package_details_and_pii,
    ),
    Operation::read("PackageExists", None, package::package_exists),
    Operation::read(
        "CheckPackageDetailsAndPIIHash",
        None,
        package::check_package_details_and_pii_hash,
    ),
    Operation::write(
        "UpdatePackageStatus",
        Some(Permission::PackageUpdateStatus),
        package::update_package_status,
    ),
    Operation::write("ProposeTransfer", Some(Permission::TransferPropose), transfer::propose_transfer),
    Operation::read("ReadTransferTerms", None, transfer::read_transfer_terms),
    Operation::read(
        "ReadPrivateTransferTerms",
        Some(Permission::PackageReadPrivate),
        transfer::read_private_transfer_terms,
    ),
    Operation::write("AcceptTransfer", Some(Permission::TransferAccept), transfer::accept_transfer),
    Operation::write("ExecuteTransfer", Some(Permission::TransferExecute), transfer::execute_transfer),
    Operation::write("TransferToPM3", None, package::transfer_to_pm3),
    Operation::write("DeletePackage", Some(Permission::PackageDelete), package::delete_package),
];

impl PackageContract {
    pub fn new(custody: &CustodyConfig, registry: &RegistryConfig) -> Self {
        let permissions = PermissionSource::from_binding(&custody.permissions, registry);
        Self {
            platform_org: custody.platform_org.clone(),
            auth: Authorizer::new(registry.admin_org.clone(), permissions),
        }
    }

    /// Organization that owns settled packages.
    pub fn platform_org(&self) -> &OrgId {
        &self.platform_org
    }

    pub fn auth(&self) -> &Authorizer {
        &self.auth
    }
}

impl Chaincode for PackageContract {
    fn name(&self) -> &str {
        CHAINCODE_NAME
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
        let op = lookup(CHAINCODE_NAME, OPERATIONS, function)?;
        tracing::debug!(
            tx_id = %stub.tx_id(),
            caller = %stub.caller_org_id(),
            function,
            mode = op.mode.as_str(),
            "dispatch"
        );
        if let Some(permission) = op.permission {
            self.auth.require_permission(stub, permission)?;
        }
        op.run(self, stub, args)
    }
}

// ─── Arguments ───────────────────────────────────────────────────────

pub(crate) fn package_id_arg(args: &[String], index: usize) -> Result<ExternalPackageId, ContractError> {
    Ok(ExternalPackageId::new(arg(args, index, "externalId")?)?)
}

pub(crate) fn terms_id_arg(args: &[String], index: usize) -> Result<TermsId, ContractError> {
    Ok(TermsId::parse(arg(args, index, "termsId")?)?)
}

pub(crate) fn org_arg(args: &[String], index: usize, name: &str) -> Result<OrgId, ContractError> {
    Ok(OrgId::new(arg(args, index, name)?)?)
}
