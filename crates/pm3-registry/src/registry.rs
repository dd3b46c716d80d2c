//! # Permission Registry Operations
//!
//! Records live in world state under `(permissions, [orgId])` as a JSON
//! array of permission strings. Every mutating operation is a
//! read-modify-write against the committed record, so it is safe to
//! re-execute after an MVCC conflict.

use serde::Serialize;

use pm3_core::{CanonicalBytes, OrgId};
use pm3_ledger::{composite_key, ChaincodeStub, ContractError};
use pm3_model::{Permission, PermissionSet, Role};

use crate::config::RegistryConfig;

/// Composite-key object type of permission records.
pub const PERMISSIONS_NAMESPACE: &str = "permissions";

/// Event emitted by every registry mutation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionsChanged<'a> {
    pub org_id: &'a OrgId,
    pub permissions: &'a PermissionSet,
}

/// Registry logic, bound to one administrator organization.
#[derive(Debug, Clone)]
pub struct PermissionRegistry {
    admin_org: OrgId,
}

impl PermissionRegistry {
    pub fn new(config: &RegistryConfig) -> Self {
        Self {
            admin_org: config.admin_org.clone(),
        }
    }

    pub fn admin_org(&self) -> &OrgId {
        &self.admin_org
    }

    pub fn is_admin(&self, org: &OrgId) -> bool {
        org == &self.admin_org
    }

    fn key(org: &OrgId) -> Result<String, ContractError> {
        Ok(composite_key(PERMISSIONS_NAMESPACE, &[org.as_str()])?)
    }

    // ─── Reads ───────────────────────────────────────────────────────

    /// The permissions held by `org`.
    ///
    /// An absent record and a record that does not parse both yield the
    /// empty set. Substrate faults still propagate.
    pub fn get_permissions(
        &self,
        stub: &dyn ChaincodeStub,
        org: &OrgId,
    ) -> Result<PermissionSet, ContractError> {
        let Some(bytes) = stub.get_state(&Self::key(org)?)? else {
            return Ok(PermissionSet::empty());
        };
        match PermissionSet::from_json(&bytes) {
            Ok(set) => Ok(set),
            Err(e) => {
                tracing::warn!(org = %org, error = %e, "corrupt permission record; treating as empty");
                Ok(PermissionSet::empty())
            }
        }
    }

    pub fn has_permission(
        &self,
        stub: &dyn ChaincodeStub,
        org: &OrgId,
        permission: Permission,
    ) -> Result<bool, ContractError> {
        Ok(self.get_permissions(stub, org)?.contains(permission))
    }

    /// Fail with [`ContractError::MissingPermission`] unless `org` holds
    /// `permission`.
    pub fn require_permission(
        &self,
        stub: &dyn ChaincodeStub,
        org: &OrgId,
        permission: Permission,
    ) -> Result<(), ContractError> {
        if self.has_permission(stub, org, permission)? {
            return Ok(());
        }
        tracing::warn!(caller = %org, permission = %permission, "permission check failed");
        Err(ContractError::MissingPermission {
            caller: org.clone(),
            permission,
        })
    }

    // ─── Administrator mutations ─────────────────────────────────────

    fn require_admin(&self, stub: &dyn ChaincodeStub, action: &str) -> Result<(), ContractError> {
        let caller = stub.caller_org_id();
        if self.is_admin(caller) {
            return Ok(());
        }
        tracing::warn!(caller = %caller, action, "non-administrator attempted a registry change");
        Err(ContractError::unauthorized(format!(
            "only {} may {action}, caller is {caller}",
            self.admin_org
        )))
    }

    fn write(
        &self,
        stub: &mut dyn ChaincodeStub,
        event: &str,
        target: &OrgId,
        set: &PermissionSet,
    ) -> Result<(), ContractError> {
        stub.put_state(&Self::key(target)?, CanonicalBytes::new(set)?.into_vec())?;
        let payload = CanonicalBytes::new(&PermissionsChanged {
            org_id: target,
            permissions: set,
        })?;
        stub.set_event(event, payload.into_vec())?;
        tracing::info!(
            caller = %stub.caller_org_id(),
            target = %target,
            permissions = %set,
            event,
            "permission record written"
        );
        Ok(())
    }

    /// Replace `target`'s permissions with `permissions`.
    pub fn set_permissions(
        &self,
        stub: &mut dyn ChaincodeStub,
        target: &OrgId,
        permissions: &PermissionSet,
    ) -> Result<PermissionSet, ContractError> {
        self.require_admin(stub, "set permissions")?;
        self.write(stub, "PermissionsSet", target, permissions)?;
        Ok(permissions.clone())
    }

    /// Add `delta` to `target`'s permissions.
    pub fn grant_permissions(
        &self,
        stub: &mut dyn ChaincodeStub,
        target: &OrgId,
        delta: &PermissionSet,
    ) -> Result<PermissionSet, ContractError> {
        self.require_admin(stub, "grant permissions")?;
        let updated = self.get_permissions(stub, target)?.grant(delta);
        self.write(stub, "PermissionsGranted", target, &updated)?;
        Ok(updated)
    }

    /// Remove `delta` from `target`'s permissions.
    pub fn revoke_permissions(
        &self,
        stub: &mut dyn ChaincodeStub,
        target: &OrgId,
        delta: &PermissionSet,
    ) -> Result<PermissionSet, ContractError> {
        self.require_admin(stub, "revoke permissions")?;
        let updated = self.get_permissions(stub, target)?.revoke(delta);
        self.write(stub, "PermissionsRevoked", target, &updated)?;
        Ok(updated)
    }

    /// Replace `target`'s permissions with the defaults of `role`.
    pub fn assign_role(
        &self,
        stub: &mut dyn ChaincodeStub,
        target: &OrgId,
        role: Role,
    ) -> Result<PermissionSet, ContractError> {
        self.require_admin(stub, "assign roles")?;
        let set = role.default_permissions();
        self.write(stub, "RoleAssigned", target, &set)?;
        Ok(set)
    }

    // ─── Bootstrap ───────────────────────────────────────────────────

    /// First assignment on a fresh ledger.
    ///
    /// Succeeds only while no organization has a permission record, and
    /// only when the administrator assigns the full set to itself. The
    /// namespace scan is recorded as a range read, so two concurrent
    /// bootstraps cannot both commit.
    pub fn bootstrap(
        &self,
        stub: &mut dyn ChaincodeStub,
        target: &OrgId,
    ) -> Result<PermissionSet, ContractError> {
        let caller = stub.caller_org_id().clone();
        if !stub
            .get_state_by_partial_composite_key(PERMISSIONS_NAMESPACE, &[])?
            .is_empty()
        {
            tracing::warn!(caller = %caller, "bootstrap attempted on an initialized registry");
            return Err(ContractError::unauthorized(
                "registry is already bootstrapped; use the administrator operations",
            ));
        }
        if !self.is_admin(&caller) || target != &caller {
            tracing::warn!(caller = %caller, target = %target, "bootstrap refused");
            return Err(ContractError::unauthorized(format!(
                "bootstrap is reserved for {} assigning itself",
                self.admin_org
            )));
        }
        let set = Role::Pm3.default_permissions();
        self.write(stub, "RegistryBootstrapped", target, &set)?;
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pm3_ledger::{ErrorKind, MemoryLedger, Proposal};

    use crate::contract::RoleAuthContract;
    use std::sync::Arc;

    fn org(s: &str) -> OrgId {
        OrgId::new(s).unwrap()
    }

    fn ledger() -> MemoryLedger {
        let ledger = MemoryLedger::new();
        ledger.install(Arc::new(RoleAuthContract::new(&RegistryConfig::new(org(
            "AdminMSP",
        )))));
        ledger
    }

    fn submit(
        ledger: &MemoryLedger,
        caller: &str,
        function: &str,
        args: &[&str],
    ) -> Result<String, ContractError> {
        let p = Proposal::new(org(caller), "roleauth", function).args(args.iter().copied());
        ledger.submit(&p).map(|r| r.payload_str())
    }

    fn perms(ledger: &MemoryLedger, who: &str) -> PermissionSet {
        let p = Proposal::new(org("Anyone"), "roleauth", "GetPermissions").arg(who);
        PermissionSet::from_json(&ledger.evaluate(&p).unwrap()).unwrap()
    }

    #[test]
    fn absent_record_is_empty() {
        assert!(perms(&ledger(), "OrgA").is_empty());
    }

    #[test]
    fn bootstrap_once() {
        let l = ledger();
        submit(&l, "AdminMSP", "Bootstrap", &["AdminMSP"]).unwrap();
        assert_eq!(perms(&l, "AdminMSP"), PermissionSet::full());

        let err = submit(&l, "AdminMSP", "Bootstrap", &["AdminMSP"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        let err = submit(&l, "OrgA", "Bootstrap", &["OrgA"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
    }

    #[test]
    fn bootstrap_requires_admin_targeting_itself() {
        let l = ledger();
        assert!(submit(&l, "OrgA", "Bootstrap", &["OrgA"]).is_err());
        assert!(submit(&l, "AdminMSP", "Bootstrap", &["OrgA"]).is_err());
        assert!(perms(&l, "OrgA").is_empty());
        // Failed attempts leave the ledger bootstrappable.
        assert!(submit(&l, "AdminMSP", "Bootstrap", &["AdminMSP"]).is_ok());
    }

    #[test]
    fn bootstrap_refused_after_any_record_exists() {
        let l = ledger();
        submit(&l, "AdminMSP", "SetPermissions", &["OrgA", r#"["package:read"]"#]).unwrap();
        assert!(submit(&l, "AdminMSP", "Bootstrap", &["AdminMSP"]).is_err());
    }

    #[test]
    fn only_admin_mutates() {
        let l = ledger();
        let err = submit(&l, "OrgA", "SetPermissions", &["OrgA", r#"["package:create"]"#])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        assert!(perms(&l, "OrgA").is_empty());
        assert!(submit(&l, "OrgA", "GrantPermissions", &["OrgA", r#"["package:read"]"#]).is_err());
        assert!(submit(&l, "OrgA", "AssignRole", &["OrgA", "pm3"]).is_err());
    }

    #[test]
    fn grant_and_revoke() {
        let l = ledger();
        submit(&l, "AdminMSP", "GrantPermissions", &["OrgA", r#"["package:read","package:create"]"#])
            .unwrap();
        submit(&l, "AdminMSP", "GrantPermissions", &["OrgA", r#"["package:read"]"#]).unwrap();
        assert_eq!(perms(&l, "OrgA").len(), 2);

        submit(&l, "AdminMSP", "RevokePermissions", &["OrgA", r#"["package:create"]"#]).unwrap();
        let set = perms(&l, "OrgA");
        assert!(set.contains(Permission::PackageRead));
        assert!(!set.contains(Permission::PackageCreate));
    }

    #[test]
    fn unknown_permission_string_is_invalid_input() {
        let l = ledger();
        let err = submit(&l, "AdminMSP", "SetPermissions", &["OrgA", r#"["package:fly"]"#])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn corrupt_record_fails_closed() {
        let l = ledger();
        submit(&l, "AdminMSP", "SetPermissions", &["OrgA", r#"["package:read"]"#]).unwrap();

        // Overwrite the record with garbage through a raw write.
        struct Raw;
        impl pm3_ledger::Chaincode for Raw {
            fn name(&self) -> &str {
                "raw"
            }
            fn operations(&self) -> Vec<pm3_ledger::OperationInfo> {
                Vec::new()
            }
            fn invoke(
                &self,
                stub: &mut dyn ChaincodeStub,
                _: &str,
                args: &[String],
            ) -> Result<Vec<u8>, ContractError> {
                let key = composite_key(PERMISSIONS_NAMESPACE, &[args[0].as_str()])?;
                stub.put_state(&key, b"{not json".to_vec())?;
                Ok(Vec::new())
            }
        }
        l.install(Arc::new(Raw));
        l.submit(&Proposal::new(org("X"), "raw", "Put").arg("OrgA")).unwrap();

        assert!(perms(&l, "OrgA").is_empty());
        let p = Proposal::new(org("X"), "roleauth", "HasPermission").args(["OrgA", "package:read"]);
        assert_eq!(l.evaluate(&p).unwrap(), b"false");
    }

    #[test]
    fn assign_role_replaces_set() {
        let l = ledger();
        submit(&l, "AdminMSP", "SetPermissions", &["OrgT", r#"["package:create"]"#]).unwrap();
        submit(&l, "AdminMSP", "AssignRole", &["OrgT", "transporter"]).unwrap();
        assert_eq!(perms(&l, "OrgT"), Role::Transporter.default_permissions());
    }

    #[test]
    fn mutation_emits_event() {
        let l = ledger();
        submit(&l, "AdminMSP", "Bootstrap", &["AdminMSP"]).unwrap();
        let events = l.events();
        let last = events.last().unwrap();
        assert_eq!(last.name, "RegistryBootstrapped");
        assert_eq!(last.json().unwrap()["orgId"], "AdminMSP");
    }

    #[test]
    fn require_permission_reports_caller_and_permission() {
        let l = ledger();
        let p = Proposal::new(org("OrgA"), "roleauth", "HasPermission")
            .args(["OrgA", "transfer:execute"]);
        assert_eq!(l.evaluate(&p).unwrap(), b"false");

        let registry = PermissionRegistry::new(&RegistryConfig::new(org("AdminMSP")));
        struct Check(PermissionRegistry);
        impl pm3_ledger::Chaincode for Check {
            fn name(&self) -> &str {
                "check"
            }
            fn operations(&self) -> Vec<pm3_ledger::OperationInfo> {
                Vec::new()
            }
            fn invoke(
                &self,
                stub: &mut dyn ChaincodeStub,
                _: &str,
                _: &[String],
            ) -> Result<Vec<u8>, ContractError> {
                let caller = stub.caller_org_id().clone();
                self.0
                    .require_permission(stub, &caller, Permission::TransferExecute)?;
                Ok(Vec::new())
            }
        }
        l.install(Arc::new(Check(registry)));
        let err = l
            .evaluate(&Proposal::new(org("OrgA"), "check", "Run"))
            .unwrap_err();
        assert_eq!(
            err,
            ContractError::MissingPermission {
                caller: org("OrgA"),
                permission: Permission::TransferExecute,
            }
        );
    }
}
