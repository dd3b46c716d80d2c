//! # Key Layout and Typed Ledger Access
//!
//! | Record | Store | Key |
//! |---|---|---|
//! | `BlockchainPackage` | world state | `(package, [externalId])` |
//! | `StoreObject` | owner's partition | `(package, [externalId])` |
//! | `TransferTerms` | world state | `(terms, [externalId, termsId])` |
//! | `PrivateTransferTerms` | recipient's partition | `(terms, [externalId, termsId])` |
//! | terms index | world state | `(termsIndex, [termsId])` → `externalId` |
//!
//! Everything is written as canonical JSON, so the substrate hash of a
//! private entry equals the commitment of its decoded value.

use serde::Serialize;

use pm3_core::{CanonicalBytes, ExternalPackageId, TermsId, ValidationError};
use pm3_ledger::{composite_key, ChaincodeStub, ContractError};
use pm3_model::{BlockchainPackage, TransferTerms};

pub const PACKAGE: &str = "package";
pub const TERMS: &str = "terms";
pub const TERMS_INDEX: &str = "termsIndex";

// Transient field names.
pub const PII: &str = "pii";
pub const PACKAGE_DETAILS: &str = "packageDetails";
pub const PRIVATE_TERMS: &str = "privateTransferTerms";
pub const STORE_OBJECT: &str = "storeObject";

pub fn package_key(id: &ExternalPackageId) -> Result<String, ContractError> {
    Ok(composite_key(PACKAGE, &[id.as_str()])?)
}

pub fn terms_key(id: &ExternalPackageId, terms_id: &TermsId) -> Result<String, ContractError> {
    Ok(composite_key(TERMS, &[id.as_str(), &terms_id.to_string()])?)
}

pub fn terms_index_key(terms_id: &TermsId) -> Result<String, ContractError> {
    Ok(composite_key(TERMS_INDEX, &[&terms_id.to_string()])?)
}

/// Canonical JSON bytes of `value`.
pub fn encode(value: &impl Serialize) -> Result<Vec<u8>, ContractError> {
    Ok(CanonicalBytes::new(value)?.into_vec())
}

/// Parse a required transient field. Absent and empty are the same.
pub fn transient_input<T>(
    stub: &dyn ChaincodeStub,
    name: &str,
    parse: fn(&[u8]) -> Result<T, ValidationError>,
) -> Result<T, ContractError> {
    match stub.transient(name) {
        Some(bytes) if !bytes.is_empty() => Ok(parse(bytes)?),
        _ => Err(ContractError::MissingInput(name.to_string())),
    }
}

// ─── Packages ────────────────────────────────────────────────────────

pub fn package_exists(stub: &dyn ChaincodeStub, id: &ExternalPackageId) -> Result<bool, ContractError> {
    Ok(stub.get_state(&package_key(id)?)?.is_some())
}

pub fn read_package(
    stub: &dyn ChaincodeStub,
    id: &ExternalPackageId,
) -> Result<BlockchainPackage, ContractError> {
    let bytes = stub
        .get_state(&package_key(id)?)?
        .ok_or_else(|| ContractError::NotFound(format!("package {id}")))?;
    Ok(BlockchainPackage::from_json(&bytes)?)
}

pub fn write_package(
    stub: &mut dyn ChaincodeStub,
    package: &BlockchainPackage,
) -> Result<(), ContractError> {
    stub.put_state(&package_key(&package.external_id)?, encode(package)?)?;
    Ok(())
}

// ─── Terms ───────────────────────────────────────────────────────────

pub fn read_terms(
    stub: &dyn ChaincodeStub,
    id: &ExternalPackageId,
    terms_id: &TermsId,
) -> Result<TransferTerms, ContractError> {
    let bytes = stub
        .get_state(&terms_key(id, terms_id)?)?
        .ok_or_else(|| ContractError::NotFound(format!("transfer terms {terms_id} for package {id}")))?;
    Ok(TransferTerms::from_json(&bytes)?)
}

/// Look terms up by id alone, through the terms index.
pub fn resolve_terms(
    stub: &dyn ChaincodeStub,
    terms_id: &TermsId,
) -> Result<TransferTerms, ContractError> {
    let raw = stub
        .get_state(&terms_index_key(terms_id)?)?
        .ok_or_else(|| ContractError::NotFound(format!("transfer terms {terms_id}")))?;
    let id = String::from_utf8(raw)
        .map_err(|_| ContractError::InvalidInput(format!("terms index entry for {terms_id} is not UTF-8")))?;
    read_terms(stub, &ExternalPackageId::new(id)?, terms_id)
}

pub fn write_terms(stub: &mut dyn ChaincodeStub, terms: &TransferTerms) -> Result<(), ContractError> {
    let key = terms_key(&terms.external_package_id, &terms.terms_id)?;
    stub.put_state(&key, encode(terms)?)?;
    Ok(())
}
