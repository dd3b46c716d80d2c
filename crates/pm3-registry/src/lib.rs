//! # pm3-registry — Permission Registry
//!
//! Each organization has one [`PermissionSet`](pm3_model::PermissionSet)
//! record in world state, keyed by the composite key
//! `(permissions, [orgId])`. Only the administrator organization may change
//! records, with one exception: on a ledger where no record exists yet, the
//! administrator may assign itself the full permission set once
//! ([`PermissionRegistry::bootstrap`]).
//!
//! Unreadable records are treated as "no permissions". A corrupted entry
//! can lock an organization out but never grants it anything.
//!
//! The registry is usable in-process by another contract, or deployed as
//! its own chaincode ([`RoleAuthContract`]) and queried through
//! cross-contract calls ([`PermissionSource::CrossContract`]).

pub mod config;
pub mod contract;
pub mod registry;
pub mod source;

pub use config::{ConfigError, PermissionBinding, RegistryConfig};
pub use contract::RoleAuthContract;
pub use registry::PermissionRegistry;
pub use source::PermissionSource;
