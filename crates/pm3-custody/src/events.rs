//! Event names and payloads of the custody contract.
//!
//! Payloads always carry `externalId` so broadcast topics can route by
//! package. No private field ever appears in an event.

use serde::Serialize;

use pm3_core::{ExternalPackageId, OrgId, TermsId};
use pm3_ledger::{ChaincodeStub, ContractError};
use pm3_state::PackageStatus;

use crate::store::encode;

pub const CREATE_PACKAGE: &str = "CreatePackage";
pub const STATUS_UPDATED: &str = "StatusUpdated";
pub const PROPOSE_TRANSFER: &str = "ProposeTransfer";
pub const ACCEPT_TRANSFER: &str = "AcceptTransfer";
pub const TRANSFER_EXECUTED: &str = "TransferExecuted";
pub const TRANSFER_TO_PM3: &str = "TransferToPM3";
pub const DELETE_PACKAGE: &str = "DeletePackage";

/// Payload of `StatusUpdated`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChange<'a> {
    pub external_id: &'a ExternalPackageId,
    pub from: PackageStatus,
    pub to: PackageStatus,
}

/// Payload of the transfer protocol events.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferStep<'a> {
    pub external_id: &'a ExternalPackageId,
    pub terms_id: TermsId,
    pub from_org_id: &'a OrgId,
    pub to_org_id: &'a OrgId,
    pub owner_org_id: &'a OrgId,
    pub status: PackageStatus,
}

/// Set the transaction's event to `name` with a canonical JSON payload.
pub fn emit(
    stub: &mut dyn ChaincodeStub,
    name: &str,
    payload: &impl Serialize,
) -> Result<(), ContractError> {
    stub.set_event(name, encode(payload)?)?;
    Ok(())
}
