//! # pm3-model — Package Custody Data Model
//!
//! Typed records for everything the custody contract reads or writes:
//!
//! | Record | Where it lives | Module |
//! |---|---|---|
//! | `PackageDetails`, `Pii`, `StoreObject` | owner's private partition | [`package`] |
//! | `BlockchainPackage` | world state | [`package`] |
//! | `TransferTerms` | world state | [`terms`] |
//! | `PrivateTransferTerms` | recipient's private partition | [`terms`] |
//! | `PermissionSet` | world state | [`permission`] |
//!
//! Every record that arrives as bytes (transient input or stored state) is
//! parsed through [`validate::parse_json`], which maps serde failures to
//! `ValidationError::Schema` naming the record. Private payloads reject
//! unknown fields so two parties cannot commit to differently shaped
//! documents that happen to share a typed view.

pub mod package;
pub mod permission;
pub mod terms;
pub mod validate;

pub use package::{BlockchainPackage, Location, PackageDetails, Pii, Size, StoreObject, Urgency};
pub use permission::{Permission, PermissionSet, Role};
pub use terms::{PrivateTransferTerms, TransferTerms};
