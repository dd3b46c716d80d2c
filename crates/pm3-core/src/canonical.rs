//! # Canonical Serialization — JCS Byte Production
//!
//! `CanonicalBytes` is the sole construction path for bytes that are hashed
//! into a commitment or written to world state and private partitions.
//!
//! ## Security Invariant
//!
//! The inner `Vec<u8>` is private. The only constructor serializes through
//! `serde_json::Value` and then `serde_jcs`, which yields RFC 8785 output:
//! object keys sorted recursively by UTF-16 code units, compact separators,
//! shortest round-tripping number form. Any function that needs bytes for a
//! commitment must accept `&CanonicalBytes`, so the "hashed a differently
//! ordered encoding" defect class cannot be written.
//!
//! ## Numbers
//!
//! Package details carry coordinates and weights, so fractional numbers are
//! permitted. JCS fixes their textual form (`5.0` renders as `5`, `0.1` as
//! `0.1`), and `serde_json` is built with `float_roundtrip` so a value read
//! back from the ledger re-canonicalizes to the same bytes.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::CanonicalizationError;

/// Bytes produced exclusively by JCS canonicalization.
///
/// # Invariants
///
/// - The only constructor is [`CanonicalBytes::new()`].
/// - Object keys are sorted at every nesting level.
/// - No insignificant whitespace.
/// - Output is valid UTF-8 JSON.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Construct canonical bytes from any serializable value.
    ///
    /// # Errors
    ///
    /// Returns `CanonicalizationError::SerializationFailed` if the value
    /// cannot be represented as JSON (for example a map with non-string
    /// keys), and `CanonicalizationError::NonFiniteNumber` if serde produced
    /// a number JCS cannot express.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        reject_non_finite(&value)?;
        let s = serde_jcs::to_string(&value)?;
        Ok(Self(s.into_bytes()))
    }

    /// Parse arbitrary JSON bytes and re-emit them canonically.
    ///
    /// Used when a caller hands over a document whose structure the
    /// contract does not need to understand (e.g. opaque PII).
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, CanonicalizationError> {
        let value: Value = serde_json::from_slice(bytes)?;
        Self::new(&value)
    }

    /// Access the canonical bytes for digest computation or storage.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume into the owned byte vector.
    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }

    /// Deserialize the canonical form back into a typed value.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, CanonicalizationError> {
        Ok(serde_json::from_slice(&self.0)?)
    }

    /// Returns the length of the canonical byte sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the canonical byte sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

fn reject_non_finite(value: &Value) -> Result<(), CanonicalizationError> {
    match value {
        Value::Number(n) => match n.as_f64() {
            Some(f) if !f.is_finite() => Err(CanonicalizationError::NonFiniteNumber),
            _ => Ok(()),
        },
        Value::Array(items) => items.iter().try_for_each(reject_non_finite),
        Value::Object(map) => map.values().try_for_each(reject_non_finite),
        Value::Null | Value::Bool(_) | Value::String(_) => Ok(()),
    }
}
