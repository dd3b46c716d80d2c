//! # Commitments
//!
//! `commit(x)` is `hex(sha256(canonical_json(x)))`. The same function hashes
//! the private `StoreObject` (anchored publicly as
//! `packageDetailsAndPIIHash`) and private transfer terms (anchored as
//! `privateTermsHash`).
//!
//! The ledger substrate also exposes the SHA-256 of raw stored private
//! bytes to organizations that cannot read them. Because every private
//! entry is written as canonical bytes, that substrate hash and `commit()`
//! of the decoded value agree, which is what lets a non-owner verify a
//! payload it will never see.

use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

use pm3_core::{sha256_digest, CanonicalBytes, CanonicalizationError, ContentDigest, ValidationError};

/// A hex-encoded SHA-256 commitment over canonical bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Commitment(String);

impl Commitment {
    /// Commitment of already-canonical bytes.
    pub fn of_canonical(bytes: &CanonicalBytes) -> Self {
        Self::from_digest(&sha256_digest(bytes))
    }

    /// Commitment carried by a substrate content digest.
    pub fn from_digest(digest: &ContentDigest) -> Self {
        Self(digest.to_hex())
    }

    /// Parse a hex commitment supplied by a caller. Case-insensitive;
    /// normalized to lowercase.
    pub fn from_hex(s: &str) -> Result<Self, ValidationError> {
        let digest = ContentDigest::from_hex(s.trim())?;
        Ok(Self::from_digest(&digest))
    }

    /// The lowercase hex string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Constant-time equality against another commitment.
    pub fn ct_eq(&self, other: &Commitment) -> bool {
        self.0.as_bytes().ct_eq(other.0.as_bytes()).into()
    }

    /// Constant-time equality against a substrate content digest.
    pub fn matches_digest(&self, digest: &ContentDigest) -> bool {
        self.ct_eq(&Self::from_digest(digest))
    }
}

impl TryFrom<String> for Commitment {
    type Error = ValidationError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::from_hex(&s)
    }
}

impl From<Commitment> for String {
    fn from(c: Commitment) -> Self {
        c.0
    }
}

impl std::fmt::Display for Commitment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Canonicalize `value` and commit to it.
pub fn commit(value: &impl Serialize) -> Result<Commitment, CanonicalizationError> {
    let canonical = CanonicalBytes::new(value)?;
    Ok(Commitment::of_canonical(&canonical))
}

/// Recompute the commitment of `candidate` and compare it to `expected`.
///
/// A candidate with no canonical form cannot match anything and yields
/// `false`.
pub fn verify_commitment(expected: &Commitment, candidate: &impl Serialize) -> bool {
    match commit(candidate) {
        Ok(actual) => expected.ct_eq(&actual),
        Err(_) => false,
    }
}
