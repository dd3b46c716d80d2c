//! # Package Lifecycle Operations
//!
//! Creation, reads, operational status updates, settlement and deletion.
//! The transfer protocol lives in [`crate::transfer`].

use pm3_core::{CanonicalBytes, StateTransitionError};
use pm3_crypto::Commitment;
use pm3_ledger::chaincode::arg;
use pm3_ledger::{composite_key, split_composite_key, ChaincodeStub, ContractError};
use pm3_model::{BlockchainPackage, PackageDetails, Pii, StoreObject, TransferTerms};
use pm3_state::PackageStatus;

use crate::contract::{org_arg, package_id_arg, PackageContract};
use crate::events::{self, StatusChange};
use crate::store::{self, TERMS, TERMS_INDEX};

/// Statuses a holder may set directly. Every other status is reached only
/// through its protocol operation.
pub const OPERATIONAL_STATUSES: &[PackageStatus] = &[PackageStatus::InTransit, PackageStatus::Failed];

fn bool_reply(value: bool) -> Vec<u8> {
    value.to_string().into_bytes()
}

fn set_endorsers(
    stub: &mut dyn ChaincodeStub,
    package: &BlockchainPackage,
) -> Result<(), ContractError> {
    if stub.supports_key_endorsement() {
        let key = store::package_key(&package.external_id)?;
        stub.set_state_endorsers(&key, std::slice::from_ref(&package.owner_org_id))?;
    }
    Ok(())
}

pub(crate) fn create_package(
    _: &PackageContract,
    stub: &mut dyn ChaincodeStub,
    args: &[String],
) -> Result<Vec<u8>, ContractError> {
    let external_id = package_id_arg(args, 0)?;
    let recipient = org_arg(args, 1, "recipientOrgId")?;
    if store::package_exists(stub, &external_id)? {
        return Err(ContractError::AlreadyExists(format!("package {external_id}")));
    }
    let pii = store::transient_input(stub, store::PII, Pii::from_json)?;
    let details = store::transient_input(stub, store::PACKAGE_DETAILS, PackageDetails::from_json)?;

    let caller = stub.caller_org_id().clone();
    let sealed = CanonicalBytes::new(&StoreObject::seal(details, pii))?;
    let hash = Commitment::of_canonical(&sealed);
    stub.put_private_data(&caller, &store::package_key(&external_id)?, sealed.into_vec())?;

    let package = BlockchainPackage::pending(external_id, caller, recipient, hash);
    store::write_package(stub, &package)?;
    set_endorsers(stub, &package)?;
    events::emit(stub, events::CREATE_PACKAGE, &package)?;

    tracing::info!(
        external_id = %package.external_id,
        owner = %package.owner_org_id,
        recipient = %package.recipient_org_id,
        hash = %package.package_details_and_pii_hash,
        "package created"
    );
    store::encode(&package)
}

pub(crate) fn read_blockchain_package(
    _: &PackageContract,
    stub: &mut dyn ChaincodeStub,
    args: &[String],
) -> Result<Vec<u8>, ContractError> {
    let external_id = package_id_arg(args, 0)?;
    store::encode(&store::read_package(stub, &external_id)?)
}

/// Owner-only read of the private payload.
pub(crate) fn read_package_details_and_pii(
    c: &PackageContract,
    stub: &mut dyn ChaincodeStub,
    args: &[String],
) -> Result<Vec<u8>, ContractError> {
    let external_id = package_id_arg(args, 0)?;
    let package = store::read_package(stub, &external_id)?;
    let caller = stub.caller_org_id();
    c.auth().require_owner(&package, caller, "read the private details of")?;
    stub.get_private_data(caller, &store::package_key(&external_id)?)?
        .ok_or_else(|| ContractError::NotFound(format!("private details of package {external_id}")))
}

pub(crate) fn package_exists(
    _: &PackageContract,
    stub: &mut dyn ChaincodeStub,
    args: &[String],
) -> Result<Vec<u8>, ContractError> {
    let external_id = package_id_arg(args, 0)?;
    Ok(bool_reply(store::package_exists(stub, &external_id)?))
}

/// True iff `hash` equals both the public anchor and the substrate hash of
/// the owner's private entry. Needs no read access to the entry.
pub(crate) fn check_package_details_and_pii_hash(
    _: &PackageContract,
    stub: &mut dyn ChaincodeStub,
    args: &[String],
) -> Result<Vec<u8>, ContractError> {
    let external_id = package_id_arg(args, 0)?;
    let expected = Commitment::from_hex(arg(args, 1, "hash")?)?;
    let package = store::read_package(stub, &external_id)?;
    if !package.package_details_and_pii_hash.ct_eq(&expected) {
        return Ok(bool_reply(false));
    }
    let stored = stub.get_private_data_hash(&package.owner_org_id, &store::package_key(&external_id)?)?;
    Ok(bool_reply(
        stored.is_some_and(|digest| expected.matches_digest(&digest)),
    ))
}

pub(crate) fn update_package_status(
    c: &PackageContract,
    stub: &mut dyn ChaincodeStub,
    args: &[String],
) -> Result<Vec<u8>, ContractError> {
    let external_id = package_id_arg(args, 0)?;
    let target: PackageStatus = arg(args, 1, "status")?.parse()?;
    if !OPERATIONAL_STATUSES.contains(&target) {
        return Err(ContractError::InvalidInput(format!(
            "{target} is reached only through its protocol operation"
        )));
    }
    let mut package = store::read_package(stub, &external_id)?;
    c.auth()
        .require_owner(&package, stub.caller_org_id(), "update the status of")?;

    let from = package.status;
    package.status = from.transition(target)?;
    store::write_package(stub, &package)?;
    events::emit(
        stub,
        events::STATUS_UPDATED,
        &StatusChange {
            external_id: &external_id,
            from,
            to: package.status,
        },
    )?;
    tracing::info!(external_id = %external_id, from = %from, to = %package.status, "status updated");
    store::encode(&package)
}

/// Settlement: the recipient hands a delivered package to the platform.
pub(crate) fn transfer_to_pm3(
    c: &PackageContract,
    stub: &mut dyn ChaincodeStub,
    args: &[String],
) -> Result<Vec<u8>, ContractError> {
    let external_id = package_id_arg(args, 0)?;
    let mut package = store::read_package(stub, &external_id)?;
    let caller = stub.caller_org_id().clone();
    if !package.is_owned_by(&caller) || !package.is_recipient(&caller) {
        tracing::warn!(caller = %caller, external_id = %external_id, "settlement refused");
        return Err(ContractError::unauthorized(format!(
            "only the recipient holding package {external_id} may settle it"
        )));
    }
    package.status = package.status.transition(PackageStatus::Succeeded)?;

    let platform = c.platform_org();
    if &caller != platform {
        let key = store::package_key(&external_id)?;
        let payload = stub
            .get_private_data(&caller, &key)?
            .ok_or_else(|| ContractError::NotFound(format!("private details of package {external_id}")))?;
        stub.put_private_data(platform, &key, payload)?;
        stub.delete_private_data(&caller, &key)?;
    }
    package.owner_org_id = platform.clone();
    store::write_package(stub, &package)?;
    set_endorsers(stub, &package)?;
    events::emit(stub, events::TRANSFER_TO_PM3, &package)?;

    tracing::info!(external_id = %external_id, from = %caller, to = %platform, "package settled");
    store::encode(&package)
}

/// Delete a package and every transfer proposal made for it.
pub(crate) fn delete_package(
    c: &PackageContract,
    stub: &mut dyn ChaincodeStub,
    args: &[String],
) -> Result<Vec<u8>, ContractError> {
    let external_id = package_id_arg(args, 0)?;
    let package = store::read_package(stub, &external_id)?;
    let caller = stub.caller_org_id().clone();
    c.auth().require_owner_or_admin(&package, &caller, "delete")?;
    if !package.status.is_deletable() {
        return Err(StateTransitionError::InvalidTransition {
            from: package.status.as_str().to_string(),
            to: "DELETED".to_string(),
        }
        .into());
    }

    let proposals = stub.get_state_by_partial_composite_key(TERMS, &[external_id.as_str()])?;
    let cascaded = proposals.len();
    for (key, bytes) in proposals {
        match TransferTerms::from_json(&bytes) {
            Ok(terms) => stub.delete_private_data(&terms.to_org_id, &key)?,
            Err(e) => {
                tracing::warn!(external_id = %external_id, error = %e, "unreadable terms record; private half left in place");
            }
        }
        let (_, attrs) = split_composite_key(&key)?;
        if let Some(terms_id) = attrs.get(1) {
            stub.delete_state(&composite_key(TERMS_INDEX, &[terms_id.as_str()])?)?;
        }
        stub.delete_state(&key)?;
    }

    let key = store::package_key(&external_id)?;
    stub.delete_private_data(&package.owner_org_id, &key)?;
    stub.delete_state(&key)?;
    events::emit(stub, events::DELETE_PACKAGE, &package)?;

    tracing::info!(external_id = %external_id, caller = %caller, terms = cascaded, "package deleted");
    store::encode(&package)
}
