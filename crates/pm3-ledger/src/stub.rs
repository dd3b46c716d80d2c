//! # Chaincode Stub
//!
//! One transaction's handle on the ledger. Every handler receives the stub
//! explicitly; nothing about the caller or the transaction is ambient.

use pm3_core::{ContentDigest, OrgId, Timestamp};

use crate::chaincode::Mode;
use crate::error::{ContractError, LedgerError};

/// The ledger operations available to contract logic within one
/// transaction.
///
/// Reads observe committed state only; writes are buffered until commit.
pub trait ChaincodeStub {
    // ── transaction context ──

    /// Substrate-assigned transaction id.
    fn tx_id(&self) -> &str;

    /// Time recorded for this transaction. All expiry checks use it.
    fn tx_timestamp(&self) -> Timestamp;

    /// Authenticated organization of the submitter.
    fn caller_org_id(&self) -> &OrgId;

    /// Transaction-scoped input that is never persisted.
    fn transient(&self, name: &str) -> Option<&[u8]>;

    // ── world state ──

    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, LedgerError>;

    fn put_state(&mut self, key: &str, value: Vec<u8>) -> Result<(), LedgerError>;

    fn delete_state(&mut self, key: &str) -> Result<(), LedgerError>;

    /// All committed entries whose composite key starts with the partial
    /// key built from `object_type` and `attributes`, in key order.
    fn get_state_by_partial_composite_key(
        &self,
        object_type: &str,
        attributes: &[&str],
    ) -> Result<Vec<(String, Vec<u8>)>, LedgerError>;

    // ── private partitions ──

    /// Read from `org`'s private partition. Fails unless `org` is the caller.
    fn get_private_data(&self, org: &OrgId, key: &str) -> Result<Option<Vec<u8>>, LedgerError>;

    fn put_private_data(&mut self, org: &OrgId, key: &str, value: Vec<u8>)
        -> Result<(), LedgerError>;

    fn delete_private_data(&mut self, org: &OrgId, key: &str) -> Result<(), LedgerError>;

    /// SHA-256 of the stored private value. Available to every organization.
    fn get_private_data_hash(
        &self,
        org: &OrgId,
        key: &str,
    ) -> Result<Option<ContentDigest>, LedgerError>;

    // ── events and endorsement ──

    /// Set the transaction's event. A later call replaces an earlier one.
    fn set_event(&mut self, name: &str, payload: Vec<u8>) -> Result<(), LedgerError>;

    /// Whether the substrate honors per-key endorsement policies.
    fn supports_key_endorsement(&self) -> bool {
        false
    }

    /// Require `orgs` to endorse future writes to `key`.
    fn set_state_endorsers(&mut self, key: &str, orgs: &[OrgId]) -> Result<(), LedgerError>;

    // ── cross-contract calls ──

    /// The declared mode of `function` on an installed chaincode.
    fn chaincode_mode(&self, chaincode: &str, function: &str) -> Option<Mode>;

    /// Call another chaincode inside this transaction.
    fn invoke_chaincode(
        &mut self,
        chaincode: &str,
        function: &str,
        args: &[String],
    ) -> Result<Vec<u8>, ContractError>;
}

/// A stub wrapper that rejects every write.
///
/// Read-only operations receive this instead of the raw stub, so a handler
/// registered as read-only cannot mutate state even by mistake. Cross
/// contract calls are allowed only into read-only functions.
pub struct ReadOnlyStub<'a> {
    inner: &'a mut dyn ChaincodeStub,
}

impl<'a> ReadOnlyStub<'a> {
    pub fn new(inner: &'a mut dyn ChaincodeStub) -> Self {
        Self { inner }
    }
}

impl ChaincodeStub for ReadOnlyStub<'_> {
    fn tx_id(&self) -> &str {
        self.inner.tx_id()
    }

    fn tx_timestamp(&self) -> Timestamp {
        self.inner.tx_timestamp()
    }

    fn caller_org_id(&self) -> &OrgId {
        self.inner.caller_org_id()
    }

    fn transient(&self, name: &str) -> Option<&[u8]> {
        self.inner.transient(name)
    }

    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, LedgerError> {
        self.inner.get_state(key)
    }

    fn put_state(&mut self, _key: &str, _value: Vec<u8>) -> Result<(), LedgerError> {
        Err(LedgerError::ReadOnly { operation: "put_state" })
    }

    fn delete_state(&mut self, _key: &str) -> Result<(), LedgerError> {
        Err(LedgerError::ReadOnly { operation: "delete_state" })
    }

    fn get_state_by_partial_composite_key(
        &self,
        object_type: &str,
        attributes: &[&str],
    ) -> Result<Vec<(String, Vec<u8>)>, LedgerError> {
        self.inner.get_state_by_partial_composite_key(object_type, attributes)
    }

    fn get_private_data(&self, org: &OrgId, key: &str) -> Result<Option<Vec<u8>>, LedgerError> {
        self.inner.get_private_data(org, key)
    }

    fn put_private_data(
        &mut self,
        _org: &OrgId,
        _key: &str,
        _value: Vec<u8>,
    ) -> Result<(), LedgerError> {
        Err(LedgerError::ReadOnly { operation: "put_private_data" })
    }

    fn delete_private_data(&mut self, _org: &OrgId, _key: &str) -> Result<(), LedgerError> {
        Err(LedgerError::ReadOnly { operation: "delete_private_data" })
    }

    fn get_private_data_hash(
        &self,
        org: &OrgId,
        key: &str,
    ) -> Result<Option<ContentDigest>, LedgerError> {
        self.inner.get_private_data_hash(org, key)
    }

    fn set_event(&mut self, _name: &str, _payload: Vec<u8>) -> Result<(), LedgerError> {
        Err(LedgerError::ReadOnly { operation: "set_event" })
    }

    fn supports_key_endorsement(&self) -> bool {
        self.inner.supports_key_endorsement()
    }

    fn set_state_endorsers(&mut self, _key: &str, _orgs: &[OrgId]) -> Result<(), LedgerError> {
        Err(LedgerError::ReadOnly { operation: "set_state_endorsers" })
    }

    fn chaincode_mode(&self, chaincode: &str, function: &str) -> Option<Mode> {
        self.inner.chaincode_mode(chaincode, function)
    }

    fn invoke_chaincode(
        &mut self,
        chaincode: &str,
        function: &str,
        args: &[String],
    ) -> Result<Vec<u8>, ContractError> {
        match self.inner.chaincode_mode(chaincode, function) {
            Some(Mode::ReadOnly) => self.inner.invoke_chaincode(chaincode, function, args),
            Some(Mode::ReadWrite) => Err(LedgerError::ReadOnly {
                operation: "invoke_chaincode",
            }
            .into()),
            // Let the substrate report the unknown chaincode or function.
            None => self.inner.invoke_chaincode(chaincode, function, args),
        }
    }
}
