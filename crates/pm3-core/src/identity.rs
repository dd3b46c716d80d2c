//! # Identifier Newtypes
//!
//! Newtype wrappers for the identifiers that flow through the custody
//! contract. You cannot pass an `OrgId` where an `ExternalPackageId` is
//! expected, and every constructor validates its input.
//!
//! ## Security Invariant
//!
//! Identifiers end up inside composite ledger keys, which use `U+0000` as
//! a separator and reserve `U+10FFFF` as the range-scan upper bound. Control
//! characters and `U+10FFFF` are therefore rejected at construction, so no
//! identifier can forge a key in another namespace or fail key building.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

fn has_forbidden_chars(s: &str) -> bool {
    s.chars().any(|c| c.is_control() || c == char::MAX)
}

/// MSP id of the platform operator. Default administrator and the owner
/// of settled packages.
pub const PM3_MSP_ID: &str = "PM3MSP";

/// Authenticated identifier of an organization (an MSP id on Fabric).
///
/// Resolved from the transaction's identity, never from caller arguments,
/// except where an operation names a *target* organization.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OrgId(String);

impl OrgId {
    /// Validate and wrap an organization id.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.trim().is_empty() || id.trim() != id || has_forbidden_chars(&id) {
            return Err(ValidationError::InvalidOrgId(id));
        }
        Ok(Self(id))
    }

    /// The platform operator, [`PM3_MSP_ID`].
    pub fn platform() -> Self {
        Self(PM3_MSP_ID.to_string())
    }

    /// Borrow the raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for OrgId {
    type Error = ValidationError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<OrgId> for String {
    fn from(id: OrgId) -> Self {
        id.0
    }
}

impl std::fmt::Display for OrgId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<&str> for OrgId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Caller-chosen external identifier of a package (e.g. a shipment number).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ExternalPackageId(String);

impl ExternalPackageId {
    /// Validate and wrap a package id. Must be non-empty after trimming.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.trim().is_empty() || has_forbidden_chars(&id) {
            return Err(ValidationError::InvalidPackageId(id));
        }
        Ok(Self(id))
    }

    /// Borrow the raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ExternalPackageId {
    type Error = ValidationError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<ExternalPackageId> for String {
    fn from(id: ExternalPackageId) -> Self {
        id.0
    }
}

impl std::fmt::Display for ExternalPackageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a transfer proposal. Always a UUID, rendered hyphenated
/// lowercase so equal ids produce equal ledger keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TermsId(Uuid);

impl TermsId {
    /// Parse a caller-supplied terms id.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| ValidationError::InvalidTermsId(s.to_string()))
    }

    /// Generate a fresh random terms id (client-side helper).
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl TryFrom<String> for TermsId {
    type Error = ValidationError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<TermsId> for String {
    fn from(id: TermsId) -> Self {
        id.to_string()
    }
}

impl std::fmt::Display for TermsId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}
