//! # Transfer Terms Lifecycle
//!
//! ```text
//! PROPOSED ──accept──▶ ACCEPTED ──execute──▶ EXECUTED
//! ```
//!
//! Acceptance requires `PROPOSED` and execution requires `ACCEPTED`, so a
//! proposal moves custody at most once.

use serde::{Deserialize, Serialize};

use pm3_core::StateTransitionError;

/// Lifecycle status of one transfer proposal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TermsStatus {
    /// Written by the proposer, awaiting the recipient.
    #[default]
    Proposed,
    /// The recipient proved agreement on the private terms.
    Accepted,
    /// Custody moved under these terms. Terminal state.
    Executed,
}

impl TermsStatus {
    /// The canonical string name of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Proposed => "PROPOSED",
            Self::Accepted => "ACCEPTED",
            Self::Executed => "EXECUTED",
        }
    }

    /// Whether this status is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Executed)
    }

    /// Valid target statuses from this status.
    pub fn valid_transitions(&self) -> &'static [TermsStatus] {
        match self {
            Self::Proposed => &[Self::Accepted],
            Self::Accepted => &[Self::Executed],
            Self::Executed => &[],
        }
    }

    /// Check `self → to` against the table and return the new status.
    pub fn transition(self, to: TermsStatus) -> Result<TermsStatus, StateTransitionError> {
        if self.is_terminal() {
            return Err(StateTransitionError::Terminal {
                state: self.as_str().to_string(),
                to: to.as_str().to_string(),
            });
        }
        if !self.valid_transitions().contains(&to) {
            return Err(StateTransitionError::InvalidTransition {
                from: self.as_str().to_string(),
                to: to.as_str().to_string(),
            });
        }
        Ok(to)
    }
}

impl std::fmt::Display for TermsStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
