//! # Transfer Protocol
//!
//! Propose, accept and execute, plus the two terms reads.
//!
//! Each terms record is single-use: `PROPOSED → ACCEPTED → EXECUTED`. A
//! package that is already `IN_TRANSIT` keeps its status through propose
//! and accept, so a transporter can arrange the final leg without resetting
//! progress; execution then moves it straight to `DELIVERED`.

use pm3_core::{CanonicalBytes, OrgId, Timestamp};
use pm3_crypto::Commitment;
use pm3_ledger::chaincode::{arg, opt_arg};
use pm3_ledger::{ChaincodeStub, ContractError};
use pm3_model::{BlockchainPackage, PrivateTransferTerms, StoreObject, TransferTerms};
use pm3_state::{PackageStatus, TermsStatus};

use crate::contract::{org_arg, package_id_arg, terms_id_arg, PackageContract};
use crate::events::{self, TransferStep};
use crate::store;

fn ensure_unexpired(terms: &TransferTerms, now: Timestamp) -> Result<(), ContractError> {
    match terms.expires_at {
        Some(deadline) if terms.is_expired_at(now) => {
            tracing::warn!(terms_id = %terms.terms_id, expired_at = %deadline, now = %now, "terms expired");
            Err(ContractError::Expired {
                terms_id: terms.terms_id.to_string(),
                expired_at: deadline,
            })
        }
        _ => Ok(()),
    }
}

fn mismatch(subject: String, expected: &Commitment, actual: &Commitment) -> ContractError {
    tracing::warn!(subject = %subject, "commitment mismatch");
    ContractError::CommitmentMismatch {
        subject,
        expected: expected.to_string(),
        actual: actual.to_string(),
    }
}

fn step<'a>(package: &'a BlockchainPackage, terms: &'a TransferTerms) -> TransferStep<'a> {
    TransferStep {
        external_id: &package.external_id,
        terms_id: terms.terms_id,
        from_org_id: &terms.from_org_id,
        to_org_id: &terms.to_org_id,
        owner_org_id: &package.owner_org_id,
        status: package.status,
    }
}

/// The status a package takes when a proposal is made or accepted.
/// `IN_TRANSIT` is kept; anything else must allow the move to `next`.
fn advance(current: PackageStatus, next: PackageStatus) -> Result<PackageStatus, ContractError> {
    if current == PackageStatus::InTransit {
        return Ok(current);
    }
    Ok(current.transition(next)?)
}

// ─── Propose ─────────────────────────────────────────────────────────

pub(crate) fn propose_transfer(
    c: &PackageContract,
    stub: &mut dyn ChaincodeStub,
    args: &[String],
) -> Result<Vec<u8>, ContractError> {
    let external_id = package_id_arg(args, 0)?;
    let terms_id = terms_id_arg(args, 1)?;
    let to = org_arg(args, 2, "toOrgId")?;
    let created_at = Timestamp::parse(arg(args, 3, "createdAt")?)?;
    let expires_at = opt_arg(args, 4).map(Timestamp::parse).transpose()?;
    let private = store::transient_input(stub, store::PRIVATE_TERMS, PrivateTransferTerms::from_json)?;

    let caller = stub.caller_org_id().clone();
    let mut package = store::read_package(stub, &external_id)?;
    c.auth()
        .require_owner(&package, &caller, "propose a transfer of")?;
    if to == caller {
        return Err(ContractError::InvalidInput(format!(
            "{caller} already owns package {external_id}"
        )));
    }
    if caller != package.sender_org_id && !package.is_recipient(&to) {
        tracing::warn!(caller = %caller, to = %to, external_id = %external_id, "transporter proposed to a third party");
        return Err(ContractError::unauthorized(format!(
            "a transporter may only propose package {external_id} to its recipient {}",
            package.recipient_org_id
        )));
    }
    package.status = advance(package.status, PackageStatus::Proposed)?;

    if let Some(deadline) = expires_at {
        if deadline <= created_at {
            return Err(ContractError::InvalidInput(format!(
                "expiresAt {deadline} is not after createdAt {created_at}"
            )));
        }
    }

    let index_key = store::terms_index_key(&terms_id)?;
    if stub.get_state(&index_key)?.is_some() {
        return Err(ContractError::AlreadyExists(format!("transfer terms {terms_id}")));
    }

    let private_bytes = CanonicalBytes::new(&private)?;
    let terms = TransferTerms {
        terms_id,
        external_package_id: external_id.clone(),
        from_org_id: caller,
        to_org_id: to,
        created_at,
        expires_at,
        private_terms_hash: Commitment::of_canonical(&private_bytes),
        status: TermsStatus::Proposed,
    };
    ensure_unexpired(&terms, stub.tx_timestamp())?;

    let key = store::terms_key(&external_id, &terms_id)?;
    store::write_terms(stub, &terms)?;
    stub.put_state(&index_key, external_id.as_str().as_bytes().to_vec())?;
    stub.put_private_data(&terms.to_org_id, &key, private_bytes.into_vec())?;
    store::write_package(stub, &package)?;
    events::emit(stub, events::PROPOSE_TRANSFER, &step(&package, &terms))?;

    tracing::info!(
        external_id = %external_id,
        terms_id = %terms_id,
        from = %terms.from_org_id,
        to = %terms.to_org_id,
        status = %package.status,
        "transfer proposed"
    );
    store::encode(&terms)
}

// ─── Accept ──────────────────────────────────────────────────────────

pub(crate) fn accept_transfer(
    c: &PackageContract,
    stub: &mut dyn ChaincodeStub,
    args: &[String],
) -> Result<Vec<u8>, ContractError> {
    let external_id = package_id_arg(args, 0)?;
    let terms_id = terms_id_arg(args, 1)?;
    let supplied = store::transient_input(stub, store::PRIVATE_TERMS, PrivateTransferTerms::from_json)?;

    let caller = stub.caller_org_id().clone();
    let mut terms = store::read_terms(stub, &external_id, &terms_id)?;
    c.auth().require_terms_recipient(&terms, &caller, "accept")?;
    ensure_unexpired(&terms, stub.tx_timestamp())?;
    terms.status = terms.status.transition(TermsStatus::Accepted)?;

    let actual = supplied.commitment()?;
    if !actual.ct_eq(&terms.private_terms_hash) {
        return Err(mismatch(
            format!("private terms {terms_id}"),
            &terms.private_terms_hash,
            &actual,
        ));
    }

    let mut package = store::read_package(stub, &external_id)?;
    package.status = advance(package.status, PackageStatus::ReadyForPickup)?;
    store::write_terms(stub, &terms)?;
    store::write_package(stub, &package)?;
    events::emit(stub, events::ACCEPT_TRANSFER, &step(&package, &terms))?;

    tracing::info!(external_id = %external_id, terms_id = %terms_id, by = %caller, status = %package.status, "transfer accepted");
    store::encode(&terms)
}

// ─── Execute ─────────────────────────────────────────────────────────

pub(crate) fn execute_transfer(
    _: &PackageContract,
    stub: &mut dyn ChaincodeStub,
    args: &[String],
) -> Result<Vec<u8>, ContractError> {
    let external_id = package_id_arg(args, 0)?;
    let terms_id = terms_id_arg(args, 1)?;
    let supplied = store::transient_input(stub, store::STORE_OBJECT, StoreObject::from_json)?;

    let caller = stub.caller_org_id().clone();
    let mut package = store::read_package(stub, &external_id)?;
    let mut terms = store::read_terms(stub, &external_id, &terms_id)?;
    if !package.is_owned_by(&caller) || terms.from_org_id != caller {
        tracing::warn!(caller = %caller, external_id = %external_id, terms_id = %terms_id, "execute refused");
        return Err(ContractError::unauthorized(format!(
            "only the owner that proposed terms {terms_id} may execute them"
        )));
    }
    ensure_unexpired(&terms, stub.tx_timestamp())?;
    terms.status = terms.status.transition(TermsStatus::Executed)?;

    let sealed = CanonicalBytes::new(&supplied)?;
    let actual = Commitment::of_canonical(&sealed);
    if !actual.ct_eq(&package.package_details_and_pii_hash) {
        return Err(mismatch(
            format!("package {external_id}"),
            &package.package_details_and_pii_hash,
            &actual,
        ));
    }

    let next = if package.is_recipient(&terms.to_org_id) {
        PackageStatus::Delivered
    } else {
        PackageStatus::PickedUp
    };
    package.status = package.status.transition(next)?;

    let key = store::package_key(&external_id)?;
    stub.put_private_data(&terms.to_org_id, &key, sealed.into_vec())?;
    stub.delete_private_data(&caller, &key)?;
    package.owner_org_id = terms.to_org_id.clone();
    store::write_package(stub, &package)?;
    store::write_terms(stub, &terms)?;
    if stub.supports_key_endorsement() {
        stub.set_state_endorsers(&key, std::slice::from_ref(&package.owner_org_id))?;
    }
    events::emit(stub, events::TRANSFER_EXECUTED, &step(&package, &terms))?;

    tracing::info!(
        external_id = %external_id,
        terms_id = %terms_id,
        from = %caller,
        to = %package.owner_org_id,
        status = %package.status,
        "custody transferred"
    );
    store::encode(&package)
}

// ─── Reads ───────────────────────────────────────────────────────────

pub(crate) fn read_transfer_terms(
    _: &PackageContract,
    stub: &mut dyn ChaincodeStub,
    args: &[String],
) -> Result<Vec<u8>, ContractError> {
    let terms_id = terms_id_arg(args, 0)?;
    store::encode(&store::resolve_terms(stub, &terms_id)?)
}

/// Recipient-only read of the private half of a proposal.
pub(crate) fn read_private_transfer_terms(
    c: &PackageContract,
    stub: &mut dyn ChaincodeStub,
    args: &[String],
) -> Result<Vec<u8>, ContractError> {
    let terms_id = terms_id_arg(args, 0)?;
    let terms = store::resolve_terms(stub, &terms_id)?;
    let caller: &OrgId = stub.caller_org_id();
    c.auth().require_terms_recipient(&terms, caller, "read the private half of")?;
    let key = store::terms_key(&terms.external_package_id, &terms_id)?;
    stub.get_private_data(caller, &key)?
        .ok_or_else(|| ContractError::NotFound(format!("private transfer terms {terms_id}")))
}
