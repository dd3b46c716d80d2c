//! # Salt Generation
//!
//! A salt is generated once, when a package is created, and travels inside
//! the private `StoreObject` unchanged for the rest of the package's life.
//! Re-salting on transfer would change the commitment and break the public
//! integrity anchor.

use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use pm3_core::ValidationError;

/// Number of random bytes in a freshly generated salt.
pub const SALT_LEN: usize = 32;

/// A hex-encoded random salt.
///
/// Freshly generated salts are always `2 * SALT_LEN` lowercase hex
/// characters. Salts received from callers are accepted as any non-empty
/// string, since they must round-trip byte for byte.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Salt(String);

impl Salt {
    /// Generate a fresh salt from the operating system RNG.
    pub fn generate() -> Self {
        let mut bytes = [0u8; SALT_LEN];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes.iter().map(|b| format!("{b:02x}")).collect())
    }

    /// Wrap a salt received from a caller.
    pub fn new(s: impl Into<String>) -> Result<Self, ValidationError> {
        let s = s.into();
        if s.is_empty() {
            return Err(ValidationError::schema("Salt", "salt must not be empty"));
        }
        Ok(Self(s))
    }

    /// Borrow the hex string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Salt {
    type Error = ValidationError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Salt> for String {
    fn from(s: Salt) -> Self {
        s.0
    }
}

// Salts are secret material; keep them out of logs and panic messages.
impl std::fmt::Debug for Salt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Salt(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_salt_is_64_lowercase_hex() {
        let s = Salt::generate();
        assert_eq!(s.as_str().len(), 2 * SALT_LEN);
        assert!(s
            .as_str()
            .chars()
            .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn generated_salts_differ() {
        assert_ne!(Salt::generate(), Salt::generate());
    }

    #[test]
    fn empty_salt_rejected() {
        assert!(Salt::new("").is_err());
        assert!(serde_json::from_str::<Salt>(r#""""#).is_err());
    }

    #[test]
    fn debug_does_not_leak() {
        let s = Salt::generate();
        let dbg = format!("{s:?}");
        assert!(!dbg.contains(s.as_str()));
    }
}
