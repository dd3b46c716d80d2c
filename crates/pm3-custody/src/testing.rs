//! Shared fixtures for the contract tests: a ledger with both chaincodes
//! installed and a bootstrapped registry.

use std::sync::Arc;

use serde_json::{json, Value};

use pm3_core::{OrgId, TermsId};
use pm3_ledger::{ContractError, MemoryLedger, Proposal, Receipt};
use pm3_model::BlockchainPackage;
use pm3_registry::{PermissionBinding, RegistryConfig, RoleAuthContract};

use crate::{CustodyConfig, PackageContract, CHAINCODE_NAME};

pub const ADMIN: &str = "PM3MSP";
pub const T1: &str = "6f9619ff-8b86-d011-b42d-00c04fc964ff";
pub const T2: &str = "0e0f9b3a-3c43-4d1e-9a43-0b0a3f1e2d55";

pub fn org(s: &str) -> OrgId {
    OrgId::new(s).unwrap()
}

pub fn terms_id(s: &str) -> TermsId {
    TermsId::parse(s).unwrap()
}

/// OrgA and OrgB hold every permission; OrgT is a transporter that may also
/// execute transfers and update status; OrgC holds nothing.
pub fn network_with(binding: PermissionBinding) -> MemoryLedger {
    let registry = RegistryConfig::default();
    let ledger = MemoryLedger::new();
    ledger.install(Arc::new(RoleAuthContract::new(&registry)));
    ledger.install(Arc::new(PackageContract::new(
        &CustodyConfig::new(org(ADMIN), binding),
        &registry,
    )));
    let admin = |function: &str, args: &[&str]| {
        ledger
            .submit(&Proposal::new(org(ADMIN), "roleauth", function).args(args.iter().copied()))
            .unwrap();
    };
    admin("Bootstrap", &[ADMIN]);
    admin("AssignRole", &["OrgA", "pm3"]);
    admin("AssignRole", &["OrgB", "pm3"]);
    admin("AssignRole", &["OrgT", "transporter"]);
    admin("GrantPermissions", &["OrgT", r#"["transfer:execute","package:updateStatus"]"#]);
    ledger
}

pub fn network() -> MemoryLedger {
    network_with(PermissionBinding::InProcess)
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

pub fn create(ledger: &MemoryLedger, caller: &str, id: &str, recipient: &str) -> Result<Receipt, ContractError> {
    let p = Proposal::new(org(caller), CHAINCODE_NAME, "CreatePackage")
        .args([id, recipient])
        .transient_json("pii", &pii())
        .transient_json("packageDetails", &details());
    ledger.submit(&p)
}

pub fn propose(
    ledger: &MemoryLedger,
    caller: &str,
    id: &str,
    terms: &str,
    to: &str,
    price: u64,
    expires_in: Option<i64>,
) -> Result<Receipt, ContractError> {
    let now = ledger.now();
    let mut args = vec![id.to_string(), terms.to_string(), to.to_string(), now.to_string()];
    if let Some(secs) = expires_in {
        args.push(now.checked_plus_secs(secs).unwrap().to_string());
    }
    let p = Proposal::new(org(caller), CHAINCODE_NAME, "ProposeTransfer")
        .args(args)
        .transient_json("privateTransferTerms", &json!({"price": price}));
    ledger.submit(&p)
}

pub fn accept(ledger: &MemoryLedger, caller: &str, id: &str, terms: &str, price: u64) -> Result<Receipt, ContractError> {
    let p = Proposal::new(org(caller), CHAINCODE_NAME, "AcceptTransfer")
        .args([id, terms])
        .transient_json("privateTransferTerms", &json!({"price": price}));
    ledger.submit(&p)
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
    propose(ledger, "OrgA", "PKG-1", T1, "OrgB", 100, None).unwrap();
    accept(ledger, "OrgB", "PKG-1", T1, 100).unwrap();
    let sealed = store_object(ledger, "OrgA", "PKG-1");
    execute(ledger, "OrgA", "PKG-1", T1, &sealed).unwrap();
}
