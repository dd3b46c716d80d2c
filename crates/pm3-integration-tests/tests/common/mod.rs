//! Shared fixtures: a ledger with `roleauth` and `pm3package` installed,
//! a bootstrapped registry, and client-side call helpers.
//!
//! OrgA and OrgB hold the `pm3` role, OrgT is a transporter that may also
//! execute transfers and update status, OrgC holds nothing.

#![allow(dead_code)]

use std::sync::Arc;

use serde_json::{json, Value};

use pm3_core::OrgId;
use pm3_custody::{CustodyConfig, PackageContract, CHAINCODE_NAME};
use pm3_ledger::{ContractError, MemoryLedger, Proposal, Receipt};
use pm3_model::BlockchainPackage;
use pm3_registry::{PermissionBinding, RegistryConfig, RoleAuthContract};

pub const ADMIN: &str = "PM3MSP";
pub const T1: &str = "6f9619ff-8b86-d011-b42d-00c04fc964ff";
pub const T2: &str = "0e0f9b3a-3c43-4d1e-9a43-0b0a3f1e2d55";

pub fn org(s: &str) -> OrgId {
    OrgId::new(s).unwrap()
}

/// An installed pair of contracts with an empty registry.
pub fn bare_network(binding: PermissionBinding) -> MemoryLedger {
    let registry = RegistryConfig::default();
    let ledger = MemoryLedger::new();
    ledger.install(Arc::new(RoleAuthContract::new(&registry)));
    ledger.install(Arc::new(PackageContract::new(
        &CustodyConfig::new(org(ADMIN), binding),
        &registry,
    )));
    ledger
}

pub fn network_with(binding: PermissionBinding) -> MemoryLedger {
    let ledger = bare_network(binding);
    admin(&ledger, "Bootstrap", &[ADMIN]).unwrap();
    admin(&ledger, "AssignRole", &["OrgA", "pm3"]).unwrap();
    admin(&ledger, "AssignRole", &["OrgB", "pm3"]).unwrap();
    admin(&ledger, "AssignRole", &["OrgT", "transporter"]).unwrap();
    admin(
        &ledger,
        "GrantPermissions",
        &["OrgT", r#"["transfer:execute","package:updateStatus"]"#],
    )
    .unwrap();
    ledger
}

pub fn network() -> MemoryLedger {
    network_with(PermissionBinding::InProcess)
}

pub fn admin(ledger: &MemoryLedger, function: &str, args: &[&str]) -> Result<Receipt, ContractError> {
    registry_call(ledger, ADMIN, function, args)
}

pub fn registry_call(
    ledger: &MemoryLedger,
    caller: &str,
    function: &str,
    args: &[&str],
) -> Result<Receipt, ContractError> {
    ledger.submit(&Proposal::new(org(caller), "roleauth", function).args(args.iter().copied()))
}

pub fn details() -> Value {
    json!({
        "pickupLocation": {"name": "Depot", "address": "Hamngatan 1", "lat": 59.3293, "lng": 18.0686},
        "dropLocation": {"name": "Home", "address": "Storgatan 2", "lat": 57.7089, "lng": 11.9746},
        "size": {"width": 30, "height": 20, "depth": 10.5},
        "weightKg": 2.5,
        "urgency": "high"
    })
}

pub fn pii() -> Value {
    json!({"name": "Alice", "phone": "+46700000000"})
}

pub fn call(ledger: &MemoryLedger, caller: &str, function: &str, args: &[&str]) -> Result<Receipt, ContractError> {
    ledger.submit(&Proposal::new(org(caller), CHAINCODE_NAME, function).args(args.iter().copied()))
}

pub fn query(ledger: &MemoryLedger, caller: &str, function: &str, args: &[&str]) -> Result<Vec<u8>, ContractError> {
    ledger.evaluate(&Proposal::new(org(caller), CHAINCODE_NAME, function).args(args.iter().copied()))
}

pub fn create_proposal(caller: &str, id: &str, recipient: &str) -> Proposal {
    Proposal::new(org(caller), CHAINCODE_NAME, "CreatePackage")
        .args([id, recipient])
        .transient_json("pii", &pii())
        .transient_json("packageDetails", &details())
}

pub fn create(ledger: &MemoryLedger, caller: &str, id: &str, recipient: &str) -> Result<Receipt, ContractError> {
    ledger.submit(&create_proposal(caller, id, recipient))
}

pub fn propose_proposal(ledger: &MemoryLedger, caller: &str, id: &str, terms: &str, to: &str, price: u64) -> Proposal {
    let now = ledger.now();
    Proposal::new(org(caller), CHAINCODE_NAME, "ProposeTransfer")
        .args([id.to_string(), terms.to_string(), to.to_string(), now.to_string()])
        .transient_json("privateTransferTerms", &json!({"price": price}))
}

pub fn propose(
    ledger: &MemoryLedger,
    caller: &str,
    id: &str,
    terms: &str,
    to: &str,
    price: u64,
) -> Result<Receipt, ContractError> {
    ledger.submit(&propose_proposal(ledger, caller, id, terms, to, price))
}

/// Propose with a deadline `expires_in` seconds after the ledger clock.
pub fn propose_expiring(
    ledger: &MemoryLedger,
    caller: &str,
    id: &str,
    terms: &str,
    to: &str,
    price: u64,
    expires_in: i64,
) -> Result<Receipt, ContractError> {
    let now = ledger.now();
    let p = Proposal::new(org(caller), CHAINCODE_NAME, "ProposeTransfer")
        .args([
            id.to_string(),
            terms.to_string(),
            to.to_string(),
            now.to_string(),
            now.checked_plus_secs(expires_in).unwrap().to_string(),
        ])
        .transient_json("privateTransferTerms", &json!({"price": price}));
    ledger.submit(&p)
}

pub fn accept_proposal(caller: &str, id: &str, terms: &str, price: u64) -> Proposal {
    Proposal::new(org(caller), CHAINCODE_NAME, "AcceptTransfer")
        .args([id, terms])
        .transient_json("privateTransferTerms", &json!({"price": price}))
}

pub fn accept(ledger: &MemoryLedger, caller: &str, id: &str, terms: &str, price: u64) -> Result<Receipt, ContractError> {
    ledger.submit(&accept_proposal(caller, id, terms, price))
}

pub fn execute(
    ledger: &MemoryLedger,
    caller: &str,
    id: &str,
    terms: &str,
    store_object: &[u8],
) -> Result<Receipt, ContractError> {
    let p = Proposal::new(org(caller), CHAINCODE_NAME, "ExecuteTransfer")
        .args([id, terms])
        .transient("storeObject", store_object.to_vec());
    ledger.submit(&p)
}

/// The owner's private payload, read the way the owner would.
pub fn store_object(ledger: &MemoryLedger, owner: &str, id: &str) -> Vec<u8> {
    query(ledger, owner, "ReadPackageDetailsAndPII", &[id]).unwrap()
}

pub fn package(ledger: &MemoryLedger, id: &str) -> BlockchainPackage {
    BlockchainPackage::from_json(&query(ledger, "OrgC", "ReadBlockchainPackage", &[id]).unwrap()).unwrap()
}

/// Create PKG-1 from OrgA to OrgB and hand it over through terms T1.
pub fn delivered(ledger: &MemoryLedger) {
    create(ledger, "OrgA", "PKG-1", "OrgB").unwrap();
    propose(ledger, "OrgA", "PKG-1", T1, "OrgB", 100).unwrap();
    accept(ledger, "OrgB", "PKG-1", T1, 100).unwrap();
    let sealed = store_object(ledger, "OrgA", "PKG-1");
    execute(ledger, "OrgA", "PKG-1", T1, &sealed).unwrap();
}
