//! # pm3-core — Foundational Types for PM3 Package Custody
//!
//! This crate is the leaf of the PM3 workspace. Every other crate depends on
//! it; it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for identifiers.** `OrgId`, `ExternalPackageId` and
//!    `TermsId` are validated at construction. An organization id cannot be
//!    passed where a package id is expected.
//!
//! 2. **`CanonicalBytes` newtype.** Every byte string that is hashed or written
//!    to the ledger flows through `CanonicalBytes::new()`: recursively sorted
//!    keys, compact separators, RFC 8785 number formatting. Two organizations
//!    that hold the same structure always produce the same bytes.
//!
//! 3. **`sha256_digest()` accepts only `&CanonicalBytes`.** A digest over
//!    non-canonical bytes cannot be expressed.
//!
//! 4. **UTC-only timestamps.** `Timestamp` renders as `YYYY-MM-DDTHH:MM:SSZ`
//!    so terms records hash identically on every endorsing peer.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `pm3-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod digest;
pub mod error;
pub mod identity;
pub mod temporal;

pub use canonical::CanonicalBytes;
pub use digest::{sha256_digest, sha256_hex, ContentDigest};
pub use error::{CanonicalizationError, StateTransitionError, ValidationError};
pub use identity::{ExternalPackageId, OrgId, TermsId, PM3_MSP_ID};
pub use temporal::Timestamp;
