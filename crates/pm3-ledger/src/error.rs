//! # Error Types
//!
//! - [`LedgerError`]: the substrate refused an operation (write through a
//!   read-only stub, foreign partition read, commit conflict).
//! - [`ContractError`]: the transaction aborts. Every variant maps to one
//!   [`ErrorKind`] so clients branch on kind, not on message text.

use thiserror::Error;

use pm3_core::{CanonicalizationError, OrgId, StateTransitionError, Timestamp, ValidationError};
use pm3_model::Permission;

/// Faults raised by the ledger substrate itself.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// A write was attempted inside a read-only operation.
    #[error("{operation} is not allowed in a read-only transaction")]
    ReadOnly {
        /// The rejected stub call.
        operation: &'static str,
    },

    /// Only an organization's own transactions may read its partition.
    #[error("{caller} may not read the private partition of {partition}")]
    PartitionAccessDenied {
        /// The submitting organization.
        caller: OrgId,
        /// The partition owner.
        partition: OrgId,
    },

    /// A key read by the transaction changed before commit.
    #[error("MVCC read conflict on key {key:?}; resubmit the transaction")]
    MvccConflict {
        /// Printable form of the conflicting key.
        key: String,
    },

    /// No chaincode with this name is installed.
    #[error("chaincode {0:?} is not installed")]
    UnknownChaincode(String),

    /// A composite key component is empty or contains a reserved character.
    #[error("invalid composite key: {0}")]
    InvalidCompositeKey(String),
}

/// Coarse classification of a [`ContractError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    Unauthorized,
    InvalidTransition,
    InvalidInput,
    CommitmentMismatch,
    Expired,
    MissingInput,
    /// Commit-time MVCC conflict. Not a contract decision; resubmit.
    Conflict,
    /// Substrate fault or unknown operation.
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "NotFound",
            Self::AlreadyExists => "AlreadyExists",
            Self::Unauthorized => "Unauthorized",
            Self::InvalidTransition => "InvalidTransition",
            Self::InvalidInput => "InvalidInput",
            Self::CommitmentMismatch => "CommitmentMismatch",
            Self::Expired => "Expired",
            Self::MissingInput => "MissingInput",
            Self::Conflict => "Conflict",
            Self::Internal => "Internal",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A transaction abort. No partial state is persisted.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ContractError {
    /// A ledger or partition key is absent.
    #[error("{0} does not exist")]
    NotFound(String),

    /// A record with this key already exists.
    #[error("{0} already exists")]
    AlreadyExists(String),

    /// The caller lacks ownership or role for this operation.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The caller lacks an explicit registry permission.
    #[error("unauthorized: {caller} lacks permission {permission}")]
    MissingPermission {
        /// The submitting organization.
        caller: OrgId,
        /// The permission that was required.
        permission: Permission,
    },

    /// The status change is not in the legal-transition table.
    #[error(transparent)]
    InvalidTransition(#[from] StateTransitionError),

    /// Malformed identifier, timestamp or payload.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A recomputed commitment differs from the stored one.
    #[error("commitment mismatch for {subject}: expected {expected}, got {actual}")]
    CommitmentMismatch {
        /// What was being verified.
        subject: String,
        /// The stored commitment.
        expected: String,
        /// The recomputed commitment.
        actual: String,
    },

    /// Transfer terms are past their deadline.
    #[error("transfer terms {terms_id} expired at {expired_at}")]
    Expired {
        /// The expired terms.
        terms_id: String,
        /// Their deadline.
        expired_at: Timestamp,
    },

    /// A required transient field was not supplied.
    #[error("missing transient field {0:?}")]
    MissingInput(String),

    /// The substrate refused an operation.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// The chaincode has no operation with this name.
    #[error("chaincode {chaincode:?} has no function {function:?}")]
    UnknownFunction {
        /// The chaincode that was invoked.
        chaincode: String,
        /// The requested function.
        function: String,
    },
}

impl ContractError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::AlreadyExists(_) => ErrorKind::AlreadyExists,
            Self::Unauthorized(_) | Self::MissingPermission { .. } => ErrorKind::Unauthorized,
            Self::InvalidTransition(_) => ErrorKind::InvalidTransition,
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::CommitmentMismatch { .. } => ErrorKind::CommitmentMismatch,
            Self::Expired { .. } => ErrorKind::Expired,
            Self::MissingInput(_) => ErrorKind::MissingInput,
            Self::Ledger(LedgerError::PartitionAccessDenied { .. }) => ErrorKind::Unauthorized,
            Self::Ledger(LedgerError::MvccConflict { .. }) => ErrorKind::Conflict,
            Self::Ledger(LedgerError::InvalidCompositeKey(_)) => ErrorKind::InvalidInput,
            Self::Ledger(_) | Self::UnknownFunction { .. } => ErrorKind::Internal,
        }
    }

    /// Shorthand for an ownership or role failure.
    pub fn unauthorized(reason: impl Into<String>) -> Self {
        Self::Unauthorized(reason.into())
    }
}

impl From<ValidationError> for ContractError {
    fn from(e: ValidationError) -> Self {
        Self::InvalidInput(e.to_string())
    }
}

impl From<CanonicalizationError> for ContractError {
    fn from(e: CanonicalizationError) -> Self {
        Self::InvalidInput(e.to_string())
    }
}
