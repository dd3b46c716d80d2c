//! # pm3-cli — Operator Tooling for the PM3 Custody Ledger
//!
//! Library half of the `pm3` binary. Each subcommand lives in its own
//! module with an `XArgs` struct and a `run_x` handler returning the
//! process exit code, so handlers are testable without spawning a process.
//!
//! ## Subcommands
//!
//! - `pm3 replay <scenario.yaml>`: submit a scripted list of transactions
//!   against a fresh in-memory ledger and print one JSON receipt per step.
//! - `pm3 commit <file.json>`: print the commitment of a JSON document.
//! - `pm3 ops`: print the dispatch tables of both contracts.

pub mod broadcast;
pub mod commit;
pub mod network;
pub mod ops;
pub mod replay;
