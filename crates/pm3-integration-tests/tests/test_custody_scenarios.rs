//! End-to-end custody scenarios, submitted through the in-memory ledger the
//! way a client would: caller identity from the proposal, private payloads
//! as transient fields.

mod common;

use common::*;
use pm3_core::CanonicalBytes;
use pm3_crypto::{verify_commitment, Commitment};
use pm3_ledger::ErrorKind;
use pm3_model::StoreObject;
use pm3_state::PackageStatus;
use serde_json::Value;

// =========================================================================
// Create
// =========================================================================

#[test]
fn create_records_public_anchor_and_private_payload() {
    let ledger = network();
    create(&ledger, "OrgA", "PKG-1", "OrgB").unwrap();

    let pkg = package(&ledger, "PKG-1");
    assert_eq!(pkg.status, PackageStatus::Pending);
    assert_eq!(pkg.owner_org_id, "OrgA");
    assert_eq!(pkg.sender_org_id, "OrgA");
    assert_eq!(pkg.recipient_org_id, "OrgB");

    let sealed = store_object(&ledger, "OrgA", "PKG-1");
    let object = StoreObject::from_json(&sealed).unwrap();
    assert_eq!(object.commitment().unwrap(), pkg.package_details_and_pii_hash);
    assert!(verify_commitment(&pkg.package_details_and_pii_hash, &object));

    // The stored bytes are already canonical.
    let reparsed: Value = serde_json::from_slice(&sealed).unwrap();
    assert_eq!(CanonicalBytes::new(&reparsed).unwrap().as_bytes(), &sealed[..]);
}

#[test]
fn create_emits_only_the_public_record() {
    let ledger = network();
    let receipt = create(&ledger, "OrgA", "PKG-1", "OrgB").unwrap();
    let event = receipt.event.unwrap();
    assert_eq!(event.name, "CreatePackage");
    let payload = event.json().unwrap();
    assert_eq!(payload["externalId"], "PKG-1");
    assert_eq!(payload["status"], "PENDING");
    assert!(payload.get("pii").is_none());
    assert!(!event.payload.windows(5).any(|w| w == b"Alice"));
}

#[test]
fn duplicate_create_fails_and_keeps_the_first_payload() {
    let ledger = network();
    create(&ledger, "OrgA", "PKG-1", "OrgB").unwrap();
    let before = store_object(&ledger, "OrgA", "PKG-1");

    let err = create(&ledger, "OrgB", "PKG-1", "OrgA").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyExists);
    assert_eq!(package(&ledger, "PKG-1").owner_org_id, "OrgA");
    assert_eq!(store_object(&ledger, "OrgA", "PKG-1"), before);
    assert!(ledger.private_keys(&org("OrgB")).is_empty());
}

// =========================================================================
// Full happy path
// =========================================================================

#[test]
fn full_happy_path_settles_with_the_platform() {
    let ledger = network();
    create(&ledger, "OrgA", "PKG-1", "OrgB").unwrap();

    propose(&ledger, "OrgA", "PKG-1", T1, "OrgB", 100).unwrap();
    assert_eq!(package(&ledger, "PKG-1").status, PackageStatus::Proposed);

    accept(&ledger, "OrgB", "PKG-1", T1, 100).unwrap();
    assert_eq!(package(&ledger, "PKG-1").status, PackageStatus::ReadyForPickup);

    let sealed = store_object(&ledger, "OrgA", "PKG-1");
    let receipt = execute(&ledger, "OrgA", "PKG-1", T1, &sealed).unwrap();
    let pkg = package(&ledger, "PKG-1");
    assert_eq!(pkg.owner_org_id, "OrgB");
    assert_eq!(pkg.status, PackageStatus::Delivered);
    let event = receipt.event.unwrap().json().unwrap();
    assert_eq!(event["ownerOrgId"], "OrgB");

    call(&ledger, "OrgB", "TransferToPM3", &["PKG-1"]).unwrap();
    let pkg = package(&ledger, "PKG-1");
    assert_eq!(pkg.status, PackageStatus::Succeeded);
    assert_eq!(pkg.owner_org_id, ADMIN);

    // The anchor still matches the entry in the new owner's partition.
    let check = query(
        &ledger,
        "OrgC",
        "CheckPackageDetailsAndPIIHash",
        &["PKG-1", pkg.package_details_and_pii_hash.as_str()],
    )
    .unwrap();
    assert_eq!(check, b"true");
}

#[test]
fn terminal_package_refuses_further_changes() {
    let ledger = network();
    delivered(&ledger);
    call(&ledger, "OrgB", "TransferToPM3", &["PKG-1"]).unwrap();

    let err = call(&ledger, ADMIN, "UpdatePackageStatus", &["PKG-1", "FAILED"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidTransition);
    let err = call(&ledger, "OrgB", "TransferToPM3", &["PKG-1"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
}

#[test]
fn settlement_requires_the_recipient_holding_a_delivered_package() {
    let ledger = network();
    create(&ledger, "OrgA", "PKG-1", "OrgB").unwrap();
    let err = call(&ledger, "OrgA", "TransferToPM3", &["PKG-1"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert_eq!(package(&ledger, "PKG-1").status, PackageStatus::Pending);

    let err = call(&ledger, "OrgB", "TransferToPM3", &["PKG-1"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
}

// =========================================================================
// Tampering
// =========================================================================

#[test]
fn tampered_acceptance_fails_commitment_check() {
    let ledger = network();
    create(&ledger, "OrgA", "PKG-1", "OrgB").unwrap();
    propose(&ledger, "OrgA", "PKG-1", T1, "OrgB", 100).unwrap();

    let err = accept(&ledger, "OrgB", "PKG-1", T1, 999).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CommitmentMismatch);
    assert_eq!(package(&ledger, "PKG-1").status, PackageStatus::Proposed);

    // The honest price still goes through afterwards.
    accept(&ledger, "OrgB", "PKG-1", T1, 100).unwrap();
}

#[test]
fn substituted_store_object_is_rejected() {
    let ledger = network();
    create(&ledger, "OrgA", "PKG-1", "OrgB").unwrap();
    propose(&ledger, "OrgA", "PKG-1", T1, "OrgB", 100).unwrap();
    accept(&ledger, "OrgB", "PKG-1", T1, 100).unwrap();

    let mut forged: Value = serde_json::from_slice(&store_object(&ledger, "OrgA", "PKG-1")).unwrap();
    forged["pii"]["name"] = Value::from("Mallory");
    let forged = serde_json::to_vec(&forged).unwrap();

    let err = execute(&ledger, "OrgA", "PKG-1", T1, &forged).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CommitmentMismatch);
    let pkg = package(&ledger, "PKG-1");
    assert_eq!(pkg.owner_org_id, "OrgA");
    assert_eq!(pkg.status, PackageStatus::ReadyForPickup);
}

#[test]
fn hash_check_rejects_a_wrong_hash() {
    let ledger = network();
    create(&ledger, "OrgA", "PKG-1", "OrgB").unwrap();
    let wrong = Commitment::from_hex(&"0".repeat(64)).unwrap();
    let check = query(&ledger, "OrgB", "CheckPackageDetailsAndPIIHash", &["PKG-1", wrong.as_str()]).unwrap();
    assert_eq!(check, b"false");
}

// =========================================================================
// Delete
// =========================================================================

#[test]
fn unauthorized_delete_leaves_package_in_place() {
    let ledger = network();
    create(&ledger, "OrgA", "PKG-1", "OrgB").unwrap();
    // OrgC holds no registry permission at all.
    let err = call(&ledger, "OrgC", "DeletePackage", &["PKG-1"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);

    // OrgB holds package:delete but neither owns nor administers.
    let err = call(&ledger, "OrgB", "DeletePackage", &["PKG-1"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);

    assert_eq!(query(&ledger, "OrgC", "PackageExists", &["PKG-1"]).unwrap(), b"true");
}

#[test]
fn delete_cascades_over_every_terms_record() {
    let ledger = network();
    create(&ledger, "OrgA", "PKG-1", "OrgB").unwrap();
    propose(&ledger, "OrgA", "PKG-1", T1, "OrgB", 100).unwrap();

    let receipt = call(&ledger, "OrgA", "DeletePackage", &["PKG-1"]).unwrap();
    assert_eq!(receipt.event.unwrap().name, "DeletePackage");

    assert_eq!(query(&ledger, "OrgC", "PackageExists", &["PKG-1"]).unwrap(), b"false");
    assert!(ledger.private_keys(&org("OrgA")).is_empty());
    assert!(ledger.private_keys(&org("OrgB")).is_empty());
    let err = query(&ledger, "OrgC", "ReadTransferTerms", &[T1]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    // The id and the terms id are free again.
    create(&ledger, "OrgA", "PKG-1", "OrgB").unwrap();
    propose(&ledger, "OrgA", "PKG-1", T1, "OrgB", 100).unwrap();
}

#[test]
fn administrator_may_delete_before_custody_moves() {
    let ledger = network();
    create(&ledger, "OrgA", "PKG-1", "OrgB").unwrap();
    call(&ledger, ADMIN, "DeletePackage", &["PKG-1"]).unwrap();
    assert_eq!(query(&ledger, "OrgC", "PackageExists", &["PKG-1"]).unwrap(), b"false");

    delivered(&ledger);
    let err = call(&ledger, ADMIN, "DeletePackage", &["PKG-1"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidTransition);
    assert!(err.to_string().contains("DELIVERED"));
}

// =========================================================================
// Registry bootstrap
// =========================================================================

#[test]
fn bootstrap_happens_exactly_once() {
    let ledger = bare_network(Default::default());

    // Only the administrator may bootstrap, and only for itself.
    let err = registry_call(&ledger, "OrgA", "Bootstrap", &["OrgA"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    let err = admin(&ledger, "Bootstrap", &["OrgA"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);

    admin(&ledger, "Bootstrap", &[]).unwrap();
    let perms = ledger
        .evaluate(&pm3_ledger::Proposal::new(org(ADMIN), "roleauth", "HasPermission").args([ADMIN, "package:create"]))
        .unwrap();
    assert_eq!(perms, b"true");

    for caller in [ADMIN, "OrgA"] {
        let err = registry_call(&ledger, caller, "Bootstrap", &[caller]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized, "{caller}");
    }

    // The normal administrator path still works.
    admin(&ledger, "AssignRole", &["OrgA", "pm3"]).unwrap();
    create(&ledger, "OrgA", "PKG-1", "OrgB").unwrap();
}

#[test]
fn explicit_grants_close_the_bootstrap_window() {
    let ledger = bare_network(Default::default());
    let err = create(&ledger, "OrgA", "PKG-1", "OrgB").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);

    admin(&ledger, "SetPermissions", &["OrgA", r#"["package:create"]"#]).unwrap();
    create(&ledger, "OrgA", "PKG-1", "OrgB").unwrap();

    let err = admin(&ledger, "Bootstrap", &[]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
}
