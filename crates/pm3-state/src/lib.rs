//! # pm3-state — Custody State Machines
//!
//! Two small state machines drive the custody contract:
//!
//! - [`PackageStatus`]: the physical custody lifecycle of a package. Its
//!   legal-transition table ([`PackageStatus::valid_transitions`]) is the
//!   single source of truth; every status-changing operation goes through
//!   [`PackageStatus::transition`].
//! - [`TermsStatus`]: the lifecycle of one transfer proposal, which makes
//!   terms single-use.
//!
//! Both enums serialize as their SCREAMING_SNAKE_CASE names, the same
//! strings their `Display` impls produce, so ledger records and error
//! messages agree.

pub mod package;
pub mod terms;

pub use package::PackageStatus;
pub use terms::TermsStatus;
