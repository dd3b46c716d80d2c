//! # pm3-custody — Package Custody Contract
//!
//! The `pm3package` chaincode. A package moves through
//! `PENDING → PROPOSED → READY_FOR_PICKUP → PICKED_UP → IN_TRANSIT →
//! DELIVERED → SUCCEEDED`, with `FAILED` reachable from every in-flight
//! state. Custody changes hands through a three-step protocol:
//!
//! 1. **Propose.** The owner publishes [`TransferTerms`](pm3_model::TransferTerms)
//!    carrying a commitment to the private commercial terms, and writes the
//!    terms themselves into the recipient's private partition.
//! 2. **Accept.** The recipient supplies the terms it agreed to off-ledger;
//!    their commitment must equal the published one.
//! 3. **Execute.** The owner hands over the private package payload; its
//!    commitment must equal the package's `packageDetailsAndPIIHash`. The
//!    payload moves partitions and ownership changes.
//!
//! ## Module Map
//!
//! | Module | Contents |
//! |---|---|
//! | [`contract`] | `PackageContract`, the dispatch table, argument parsing |
//! | [`package`] | create, read, status update, settlement, delete |
//! | [`transfer`] | propose, accept, execute, terms reads |
//! | [`auth`] | ownership, administrator and registry permission checks |
//! | [`store`] | key layout and typed ledger reads/writes |
//! | [`events`] | event names and payloads |
//! | [`config`] | `CustodyConfig` |

pub mod auth;
pub mod config;
pub mod contract;
pub mod events;
pub mod package;
pub mod store;
pub mod transfer;

pub use auth::Authorizer;
pub use config::CustodyConfig;
pub use contract::{PackageContract, CHAINCODE_NAME};

#[cfg(test)]
pub(crate) mod testing;
