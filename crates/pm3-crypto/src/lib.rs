//! # pm3-crypto — Commitment Primitives
//!
//! The integrity anchor of the custody contract is a commitment: the
//! SHA-256 of the canonical JSON form of a structure, hex-encoded. This
//! crate provides:
//!
//! - **`Salt`**: 32 fresh random bytes, hex-encoded, mixed into every
//!   private payload so low-entropy PII cannot be recovered from the public
//!   hash by dictionary search.
//! - **`Commitment`**: a validated 64-character lowercase hex digest.
//! - **`commit()` / `verify_commitment()`**: compute and check commitments.
//!   Comparison is constant time.
//!
//! ## Crate Policy
//!
//! - Depends only on `pm3-core` internally.
//! - Commitments are only ever computed from `CanonicalBytes`.
//! - No mocking in tests; every test hashes real canonical bytes.

pub mod commitment;
pub mod salt;

pub use commitment::{commit, verify_commitment, Commitment};
pub use salt::Salt;
