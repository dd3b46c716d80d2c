//! # pm3-ledger — Ledger Substrate Interface
//!
//! Contract logic never talks to a ledger runtime directly. It talks to a
//! [`ChaincodeStub`]: one transaction's view of the shared world state, the
//! per-organization private partitions, transaction-scoped transient input,
//! the authenticated caller, and the event slot.
//!
//! ## Modules
//!
//! - [`key`]: composite keys and prefix scans.
//! - [`stub`]: the `ChaincodeStub` trait and the `ReadOnlyStub` guard.
//! - [`chaincode`]: the `Chaincode` trait and explicit dispatch tables.
//! - [`memory`]: `MemoryLedger`, an in-process ledger with endorse/commit
//!   separation, MVCC conflict detection and partition privacy.
//! - [`event`]: committed chaincode events and the broadcast boundary.
//! - [`error`]: `LedgerError` (substrate faults) and `ContractError`
//!   (transaction aborts).
//!
//! ## Transaction Semantics
//!
//! Reads return committed state only. Writes are buffered in the
//! transaction's write set and become visible atomically at commit, or
//! never. A handler that returns an error leaves no trace.

pub mod chaincode;
pub mod error;
pub mod event;
pub mod key;
pub mod memory;
pub mod stub;

pub use chaincode::{Chaincode, Mode, Operation, OperationInfo};
pub use error::{ContractError, ErrorKind, LedgerError};
pub use event::{BroadcastError, BroadcastMessage, Broadcaster, ChaincodeEvent};
pub use key::{composite_key, partial_composite_key, split_composite_key};
pub use memory::{MemoryLedger, Proposal, Receipt, Simulation};
pub use stub::{ChaincodeStub, ReadOnlyStub};
