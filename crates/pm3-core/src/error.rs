//! # Error Types
//!
//! Leaf error types shared by every PM3 crate. All errors use `thiserror`.
//!
//! - Canonicalization errors identify why a structure has no canonical form.
//! - Validation errors carry the rejected input and the expected format.
//! - State transition errors name both the current and the requested state.

use thiserror::Error;

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// A number that RFC 8785 cannot express (NaN or infinity).
    #[error("non-finite numbers have no canonical representation")]
    NonFiniteNumber,

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// Validation errors for identifiers, timestamps and payload schemas.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Organization id is empty or contains control characters.
    #[error("invalid organization id: {0:?}")]
    InvalidOrgId(String),

    /// Package external id is empty or contains control characters.
    #[error("invalid package id: {0:?} (must be a non-empty string)")]
    InvalidPackageId(String),

    /// Terms id is not a UUID.
    #[error("invalid terms id: {0:?} (expected a UUID)")]
    InvalidTermsId(String),

    /// Timestamp string is not valid RFC 3339.
    #[error("invalid timestamp: {value:?} ({reason})")]
    InvalidTimestamp {
        /// The string that failed to parse.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Digest string is not 64 hex characters.
    #[error("invalid sha256 digest: {0:?}")]
    InvalidDigest(String),

    /// A payload did not match its schema.
    #[error("{schema} failed validation: {reason}")]
    Schema {
        /// The schema the payload was checked against.
        schema: &'static str,
        /// What was wrong.
        reason: String,
    },
}

impl ValidationError {
    /// Shorthand for a schema violation.
    pub fn schema(schema: &'static str, reason: impl Into<String>) -> Self {
        Self::Schema {
            schema,
            reason: reason.into(),
        }
    }
}

/// Errors during state machine transitions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateTransitionError {
    /// The requested transition is not in the legal-transition table.
    #[error("invalid transition from {from} to {to}")]
    InvalidTransition {
        /// The current state name.
        from: String,
        /// The requested state name.
        to: String,
    },

    /// The machine is in a terminal state.
    #[error("{state} is terminal; no transition to {to} is possible")]
    Terminal {
        /// The terminal state name.
        state: String,
        /// The requested state name.
        to: String,
    },
}

impl StateTransitionError {
    /// The state the machine was in.
    pub fn from_state(&self) -> &str {
        match self {
            Self::InvalidTransition { from, .. } => from,
            Self::Terminal { state, .. } => state,
        }
    }

    /// The state that was requested.
    pub fn to_state(&self) -> &str {
        match self {
            Self::InvalidTransition { to, .. } | Self::Terminal { to, .. } => to,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_error_names_both_states() {
        let err = StateTransitionError::InvalidTransition {
            from: "PENDING".into(),
            to: "DELIVERED".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("PENDING"));
        assert!(msg.contains("DELIVERED"));
        assert_eq!(err.from_state(), "PENDING");
        assert_eq!(err.to_state(), "DELIVERED");
    }

    #[test]
    fn terminal_error_accessors() {
        let err = StateTransitionError::Terminal {
            state: "SUCCEEDED".into(),
            to: "FAILED".into(),
        };
        assert_eq!(err.from_state(), "SUCCEEDED");
        assert_eq!(err.to_state(), "FAILED");
    }

    #[test]
    fn schema_error_display() {
        let err = ValidationError::schema("PackageDetails", "weightKg must be positive");
        assert_eq!(
            err.to_string(),
            "PackageDetails failed validation: weightKg must be positive"
        );
    }
}
