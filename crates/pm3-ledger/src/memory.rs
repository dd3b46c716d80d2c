//! # In-Memory Ledger
//!
//! `MemoryLedger` models the parts of a permissioned ledger the contracts
//! depend on, with the same transaction lifecycle:
//!
//! 1. **Simulate.** A [`Proposal`] runs against committed state. Reads
//!    record the version they observed; writes go to a private write set.
//! 2. **Commit.** The read set is validated under the write lock. If any
//!    key read (or any range scanned) changed since simulation, the whole
//!    transaction is rejected with [`LedgerError::MvccConflict`]. Otherwise
//!    every write lands at once under a new version.
//!
//! [`MemoryLedger::submit`] does both; [`MemoryLedger::evaluate`] only
//! simulates. Calling [`MemoryLedger::simulate`] and
//! [`MemoryLedger::commit`] separately lets tests interleave concurrent
//! transactions.
//!
//! ## Partition Privacy
//!
//! A transaction may read a private partition only if the partition belongs
//! to the submitting organization. Any transaction may read the SHA-256 of
//! a private entry, and any transaction may write to any partition.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::RwLock;
use uuid::Uuid;

use pm3_core::{ContentDigest, OrgId, Timestamp, ValidationError};

use crate::chaincode::{Chaincode, Mode};
use crate::error::{ContractError, LedgerError};
use crate::event::ChaincodeEvent;
use crate::key::{partial_composite_key, printable};
use crate::stub::ChaincodeStub;

type Version = u64;

// ─── Committed State ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum Slot {
    World(String),
    Private(OrgId, String),
}

impl Slot {
    fn printable(&self) -> String {
        match self {
            Self::World(k) => printable(k),
            Self::Private(org, k) => format!("{org}:{}", printable(k)),
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    value: Vec<u8>,
    version: Version,
}

#[derive(Debug, Default)]
struct State {
    world: BTreeMap<String, Entry>,
    private: HashMap<OrgId, BTreeMap<String, Entry>>,
    endorsers: HashMap<String, Vec<OrgId>>,
    events: Vec<ChaincodeEvent>,
    height: u64,
}

impl State {
    fn entry(&self, slot: &Slot) -> Option<&Entry> {
        match slot {
            Slot::World(k) => self.world.get(k),
            Slot::Private(org, k) => self.private.get(org).and_then(|p| p.get(k)),
        }
    }

    fn scan(&self, prefix: &str) -> Vec<(String, Entry)> {
        self.world
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, e)| (k.clone(), e.clone()))
            .collect()
    }
}

// ─── Proposals and Receipts ──────────────────────────────────────────

/// A transaction proposal as a client would submit it.
///
/// `caller` stands in for the signed identity of the submitter; contract
/// code only ever sees it through [`ChaincodeStub::caller_org_id`].
#[derive(Clone)]
pub struct Proposal {
    pub caller: OrgId,
    pub chaincode: String,
    pub function: String,
    pub args: Vec<String>,
    pub transient: BTreeMap<String, Vec<u8>>,
}

impl Proposal {
    pub fn new(caller: OrgId, chaincode: impl Into<String>, function: impl Into<String>) -> Self {
        Self {
            caller,
            chaincode: chaincode.into(),
            function: function.into(),
            args: Vec::new(),
            transient: BTreeMap::new(),
        }
    }

    /// Append one positional argument.
    pub fn arg(mut self, value: impl Into<String>) -> Self {
        self.args.push(value.into());
        self
    }

    /// Append several positional arguments.
    pub fn args<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(values.into_iter().map(Into::into));
        self
    }

    /// Attach a transient field.
    pub fn transient(mut self, name: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        self.transient.insert(name.into(), value.into());
        self
    }

    /// Attach a transient field holding JSON.
    pub fn transient_json(self, name: impl Into<String>, value: &serde_json::Value) -> Self {
        self.transient(name, value.to_string().into_bytes())
    }
}

// Transient fields carry private payloads; list names only.
impl std::fmt::Debug for Proposal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Proposal")
            .field("caller", &self.caller)
            .field("chaincode", &self.chaincode)
            .field("function", &self.function)
            .field("args", &self.args)
            .field("transient", &self.transient.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Outcome of a committed transaction.
#[derive(Debug, Clone)]
pub struct Receipt {
    pub tx_id: String,
    pub block: u64,
    pub payload: Vec<u8>,
    pub event: Option<ChaincodeEvent>,
}

impl Receipt {
    /// The payload as UTF-8, lossy.
    pub fn payload_str(&self) -> String {
        String::from_utf8_lossy(&self.payload).into_owned()
    }
}

#[derive(Debug, Default)]
struct ReadSet {
    keys: BTreeMap<Slot, Option<Version>>,
    ranges: Vec<RangeRead>,
}

#[derive(Debug)]
struct RangeRead {
    prefix: String,
    seen: Vec<(String, Version)>,
}

/// An endorsed but not yet committed transaction.
pub struct Simulation {
    tx_id: String,
    chaincode: String,
    function: String,
    payload: Vec<u8>,
    reads: ReadSet,
    writes: BTreeMap<Slot, Option<Vec<u8>>>,
    endorsers: BTreeMap<String, Vec<OrgId>>,
    event: Option<(String, Vec<u8>)>,
}

impl Simulation {
    /// The handler's return value.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn tx_id(&self) -> &str {
        &self.tx_id
    }

    /// Whether the transaction buffered any write.
    pub fn has_writes(&self) -> bool {
        !self.writes.is_empty() || !self.endorsers.is_empty()
    }
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("tx_id", &self.tx_id)
            .field("function", &self.function)
            .field("reads", &self.reads.keys.len())
            .field("writes", &self.writes.len())
            .finish()
    }
}

// ─── Ledger ──────────────────────────────────────────────────────────

/// An in-process ledger with endorse/commit separation.
///
/// Cloning is cheap and every clone shares the same state.
#[derive(Clone)]
pub struct MemoryLedger {
    state: Arc<RwLock<State>>,
    chaincodes: Arc<RwLock<HashMap<String, Arc<dyn Chaincode>>>>,
    clock: Arc<RwLock<Option<Timestamp>>>,
    key_endorsement: bool,
}

impl MemoryLedger {
    /// An empty ledger with per-key endorsement enabled.
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(State::default())),
            chaincodes: Arc::new(RwLock::new(HashMap::new())),
            clock: Arc::new(RwLock::new(None)),
            key_endorsement: true,
        }
    }

    /// Toggle support for per-key endorsement policies.
    pub fn with_key_endorsement(mut self, enabled: bool) -> Self {
        self.key_endorsement = enabled;
        self
    }

    /// Install (or replace) a chaincode under its own name.
    pub fn install(&self, chaincode: Arc<dyn Chaincode>) {
        let name = chaincode.name().to_string();
        tracing::debug!(chaincode = %name, "chaincode installed");
        self.chaincodes.write().insert(name, chaincode);
    }

    /// Pin the transaction clock.
    pub fn set_time(&self, ts: Timestamp) {
        *self.clock.write() = Some(ts);
    }

    /// Move the pinned clock forward by `secs` (pins it first if needed).
    /// The clock is left untouched when the shift is out of range.
    pub fn advance_time(&self, secs: i64) -> Result<Timestamp, ValidationError> {
        let mut clock = self.clock.write();
        let next = clock.unwrap_or_else(Timestamp::now).checked_plus_secs(secs)?;
        *clock = Some(next);
        Ok(next)
    }

    /// The time the next transaction will record.
    pub fn now(&self) -> Timestamp {
        self.clock.read().unwrap_or_else(Timestamp::now)
    }

    fn chaincode(&self, name: &str) -> Result<Arc<dyn Chaincode>, LedgerError> {
        self.chaincodes
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| LedgerError::UnknownChaincode(name.to_string()))
    }

    /// Execute `proposal` against committed state without committing.
    pub fn simulate(&self, proposal: &Proposal) -> Result<Simulation, ContractError> {
        let chaincode = self.chaincode(&proposal.chaincode)?;
        let mut tx = TxContext {
            ledger: self,
            tx_id: Uuid::new_v4().to_string(),
            timestamp: self.now(),
            caller: proposal.caller.clone(),
            transient: &proposal.transient,
            reads: RefCell::new(ReadSet::default()),
            writes: BTreeMap::new(),
            endorsers: BTreeMap::new(),
            event: None,
        };
        tracing::debug!(
            tx_id = %tx.tx_id,
            caller = %proposal.caller,
            chaincode = %proposal.chaincode,
            function = %proposal.function,
            "simulating proposal"
        );
        let payload = chaincode.invoke(&mut tx, &proposal.function, &proposal.args)?;
        Ok(Simulation {
            tx_id: tx.tx_id,
            chaincode: proposal.chaincode.clone(),
            function: proposal.function.clone(),
            payload,
            reads: tx.reads.into_inner(),
            writes: tx.writes,
            endorsers: tx.endorsers,
            event: tx.event,
        })
    }

    /// Validate the read set of `sim` and apply its writes atomically.
    pub fn commit(&self, sim: Simulation) -> Result<Receipt, LedgerError> {
        let mut state = self.state.write();

        for (slot, seen) in &sim.reads.keys {
            let current = state.entry(slot).map(|e| e.version);
            if current != *seen {
                tracing::warn!(tx_id = %sim.tx_id, key = %slot.printable(), "mvcc read conflict");
                return Err(LedgerError::MvccConflict {
                    key: slot.printable(),
                });
            }
        }
        for range in &sim.reads.ranges {
            let current: Vec<(String, Version)> = state
                .scan(&range.prefix)
                .into_iter()
                .map(|(k, e)| (k, e.version))
                .collect();
            if current != range.seen {
                tracing::warn!(tx_id = %sim.tx_id, prefix = %printable(&range.prefix), "phantom read conflict");
                return Err(LedgerError::MvccConflict {
                    key: printable(&range.prefix),
                });
            }
        }

        state.height += 1;
        let version = state.height;
        for (slot, value) in sim.writes {
            match (slot, value) {
                (Slot::World(k), Some(value)) => {
                    state.world.insert(k, Entry { value, version });
                }
                (Slot::World(k), None) => {
                    state.world.remove(&k);
                    state.endorsers.remove(&k);
                }
                (Slot::Private(org, k), Some(value)) => {
                    state
                        .private
                        .entry(org)
                        .or_default()
                        .insert(k, Entry { value, version });
                }
                (Slot::Private(org, k), None) => {
                    if let Some(partition) = state.private.get_mut(&org) {
                        partition.remove(&k);
                    }
                }
            }
        }
        for (key, orgs) in sim.endorsers {
            if state.world.contains_key(&key) {
                state.endorsers.insert(key, orgs);
            }
        }

        let event = sim.event.map(|(name, payload)| ChaincodeEvent {
            tx_id: sim.tx_id.clone(),
            chaincode: sim.chaincode.clone(),
            name,
            payload,
        });
        if let Some(ev) = &event {
            state.events.push(ev.clone());
        }

        tracing::debug!(
            tx_id = %sim.tx_id,
            chaincode = %sim.chaincode,
            function = %sim.function,
            block = version,
            "transaction committed"
        );
        Ok(Receipt {
            tx_id: sim.tx_id,
            block: version,
            payload: sim.payload,
            event,
        })
    }

    /// Simulate and commit.
    pub fn submit(&self, proposal: &Proposal) -> Result<Receipt, ContractError> {
        let sim = self.simulate(proposal)?;
        Ok(self.commit(sim)?)
    }

    /// Simulate only and return the payload.
    pub fn evaluate(&self, proposal: &Proposal) -> Result<Vec<u8>, ContractError> {
        Ok(self.simulate(proposal)?.payload)
    }

    // ── inspection (bypasses access control) ──

    /// Committed world-state value.
    pub fn world_state(&self, key: &str) -> Option<Vec<u8>> {
        self.state.read().world.get(key).map(|e| e.value.clone())
    }

    /// Committed private value in `org`'s partition.
    pub fn private_state(&self, org: &OrgId, key: &str) -> Option<Vec<u8>> {
        self.state
            .read()
            .private
            .get(org)
            .and_then(|p| p.get(key))
            .map(|e| e.value.clone())
    }

    /// Keys present in `org`'s partition.
    pub fn private_keys(&self, org: &OrgId) -> Vec<String> {
        self.state
            .read()
            .private
            .get(org)
            .map(|p| p.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Endorsers required for future writes to `key`, if set.
    pub fn endorsers(&self, key: &str) -> Option<Vec<OrgId>> {
        self.state.read().endorsers.get(key).cloned()
    }

    /// Every committed event, oldest first.
    pub fn events(&self) -> Vec<ChaincodeEvent> {
        self.state.read().events.clone()
    }

    /// Number of committed transactions.
    pub fn height(&self) -> u64 {
        self.state.read().height
    }
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<String> = self.chaincodes.read().keys().cloned().collect();
        names.sort();
        f.debug_struct("MemoryLedger")
            .field("height", &self.height())
            .field("chaincodes", &names)
            .finish()
    }
}

// ─── Transaction Context ─────────────────────────────────────────────

struct TxContext<'l> {
    ledger: &'l MemoryLedger,
    tx_id: String,
    timestamp: Timestamp,
    caller: OrgId,
    transient: &'l BTreeMap<String, Vec<u8>>,
    reads: RefCell<ReadSet>,
    writes: BTreeMap<Slot, Option<Vec<u8>>>,
    endorsers: BTreeMap<String, Vec<OrgId>>,
    event: Option<(String, Vec<u8>)>,
}

impl TxContext<'_> {
    fn read(&self, slot: Slot) -> Option<Vec<u8>> {
        let state = self.ledger.state.read();
        let entry = state.entry(&slot).cloned();
        drop(state);
        self.reads
            .borrow_mut()
            .keys
            .entry(slot)
            .or_insert(entry.as_ref().map(|e| e.version));
        entry.map(|e| e.value)
    }

    fn check_partition_read(&self, org: &OrgId) -> Result<(), LedgerError> {
        if org != &self.caller {
            tracing::warn!(caller = %self.caller, partition = %org, "private partition read denied");
            return Err(LedgerError::PartitionAccessDenied {
                caller: self.caller.clone(),
                partition: org.clone(),
            });
        }
        Ok(())
    }
}

impl ChaincodeStub for TxContext<'_> {
    fn tx_id(&self) -> &str {
        &self.tx_id
    }

    fn tx_timestamp(&self) -> Timestamp {
        self.timestamp
    }

    fn caller_org_id(&self) -> &OrgId {
        &self.caller
    }

    fn transient(&self, name: &str) -> Option<&[u8]> {
        self.transient.get(name).map(Vec::as_slice)
    }

    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, LedgerError> {
        Ok(self.read(Slot::World(key.to_string())))
    }

    fn put_state(&mut self, key: &str, value: Vec<u8>) -> Result<(), LedgerError> {
        self.writes.insert(Slot::World(key.to_string()), Some(value));
        Ok(())
    }

    fn delete_state(&mut self, key: &str) -> Result<(), LedgerError> {
        self.writes.insert(Slot::World(key.to_string()), None);
        Ok(())
    }

    fn get_state_by_partial_composite_key(
        &self,
        object_type: &str,
        attributes: &[&str],
    ) -> Result<Vec<(String, Vec<u8>)>, LedgerError> {
        let prefix = partial_composite_key(object_type, attributes)?;
        let entries = self.ledger.state.read().scan(&prefix);
        self.reads.borrow_mut().ranges.push(RangeRead {
            prefix,
            seen: entries.iter().map(|(k, e)| (k.clone(), e.version)).collect(),
        });
        Ok(entries.into_iter().map(|(k, e)| (k, e.value)).collect())
    }

    fn get_private_data(&self, org: &OrgId, key: &str) -> Result<Option<Vec<u8>>, LedgerError> {
        self.check_partition_read(org)?;
        Ok(self.read(Slot::Private(org.clone(), key.to_string())))
    }

    fn put_private_data(
        &mut self,
        org: &OrgId,
        key: &str,
        value: Vec<u8>,
    ) -> Result<(), LedgerError> {
        self.writes
            .insert(Slot::Private(org.clone(), key.to_string()), Some(value));
        Ok(())
    }

    fn delete_private_data(&mut self, org: &OrgId, key: &str) -> Result<(), LedgerError> {
        self.writes
            .insert(Slot::Private(org.clone(), key.to_string()), None);
        Ok(())
    }

    fn get_private_data_hash(
        &self,
        org: &OrgId,
        key: &str,
    ) -> Result<Option<ContentDigest>, LedgerError> {
        Ok(self
            .read(Slot::Private(org.clone(), key.to_string()))
            .map(|v| ContentDigest::of_stored_bytes(&v)))
    }

    fn set_event(&mut self, name: &str, payload: Vec<u8>) -> Result<(), LedgerError> {
        self.event = Some((name.to_string(), payload));
        Ok(())
    }

    fn supports_key_endorsement(&self) -> bool {
        self.ledger.key_endorsement
    }

    fn set_state_endorsers(&mut self, key: &str, orgs: &[OrgId]) -> Result<(), LedgerError> {
        if self.ledger.key_endorsement {
            self.endorsers.insert(key.to_string(), orgs.to_vec());
        }
        Ok(())
    }

    fn chaincode_mode(&self, chaincode: &str, function: &str) -> Option<Mode> {
        self.ledger
            .chaincode(chaincode)
            .ok()
            .and_then(|cc| cc.mode_of(function))
    }

    fn invoke_chaincode(
        &mut self,
        chaincode: &str,
        function: &str,
        args: &[String],
    ) -> Result<Vec<u8>, ContractError> {
        let callee = self.ledger.chaincode(chaincode)?;
        tracing::debug!(tx_id = %self.tx_id, chaincode, function, "cross-contract call");
        callee.invoke(self, function, args)
    }
}
