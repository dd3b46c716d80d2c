//! # Package Status State Machine
//!
//! ```text
//! PENDING ──▶ PROPOSED ──▶ READY_FOR_PICKUP ──▶ PICKED_UP ──▶ IN_TRANSIT ──▶ DELIVERED ──▶ SUCCEEDED
//!                                  │                                             ▲
//!                                  └──────────── direct delivery ────────────────┘
//!
//! every non-terminal state ──▶ FAILED
//! ```
//!
//! `READY_FOR_PICKUP ──▶ DELIVERED` is the leg where the owner hands the
//! package straight to its named recipient. `READY_FOR_PICKUP ──▶ PICKED_UP`
//! is the leg where an intermediate transporter takes custody.
//!
//! `SUCCEEDED` and `FAILED` are terminal.

use serde::{Deserialize, Serialize};

use pm3_core::{StateTransitionError, ValidationError};

// ─── Package Status ──────────────────────────────────────────────────

/// Custody status of a package, as recorded on the public ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PackageStatus {
    /// Created, no transfer proposed yet.
    Pending,
    /// A transfer proposal awaits acceptance.
    Proposed,
    /// The proposal was accepted; custody may move.
    ReadyForPickup,
    /// An intermediate transporter holds the package.
    PickedUp,
    /// The transporter is moving the package.
    InTransit,
    /// The named recipient holds the package.
    Delivered,
    /// Settled with the platform operator. Terminal state.
    Succeeded,
    /// Operational abort. Terminal state.
    Failed,
}

impl PackageStatus {
    /// All statuses in lifecycle order.
    pub fn all() -> &'static [PackageStatus] {
        &[
            Self::Pending,
            Self::Proposed,
            Self::ReadyForPickup,
            Self::PickedUp,
            Self::InTransit,
            Self::Delivered,
            Self::Succeeded,
            Self::Failed,
        ]
    }

    /// The canonical string name of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Proposed => "PROPOSED",
            Self::ReadyForPickup => "READY_FOR_PICKUP",
            Self::PickedUp => "PICKED_UP",
            Self::InTransit => "IN_TRANSIT",
            Self::Delivered => "DELIVERED",
            Self::Succeeded => "SUCCEEDED",
            Self::Failed => "FAILED",
        }
    }

    /// Whether this status is terminal (no further transitions allowed).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }

    /// Whether the package may still be deleted. Deletion is only allowed
    /// before custody has moved for the first time.
    pub fn is_deletable(&self) -> bool {
        matches!(self, Self::Pending | Self::Proposed | Self::ReadyForPickup)
    }

    /// Valid target statuses from this status.
    pub fn valid_transitions(&self) -> &'static [PackageStatus] {
        match self {
            Self::Pending => &[Self::Proposed, Self::Failed],
            Self::Proposed => &[Self::ReadyForPickup, Self::Failed],
            Self::ReadyForPickup => &[Self::PickedUp, Self::Delivered, Self::Failed],
            Self::PickedUp => &[Self::InTransit, Self::Failed],
            Self::InTransit => &[Self::Delivered, Self::Failed],
            Self::Delivered => &[Self::Succeeded, Self::Failed],
            Self::Succeeded | Self::Failed => &[],
        }
    }

    /// Whether `self → to` is in the legal-transition table.
    pub fn can_transition_to(&self, to: PackageStatus) -> bool {
        self.valid_transitions().contains(&to)
    }

    /// Check `self → to` against the table and return the new status.
    pub fn transition(self, to: PackageStatus) -> Result<PackageStatus, StateTransitionError> {
        if self.is_terminal() {
            return Err(StateTransitionError::Terminal {
                state: self.as_str().to_string(),
                to: to.as_str().to_string(),
            });
        }
        if !self.can_transition_to(to) {
            return Err(StateTransitionError::InvalidTransition {
                from: self.as_str().to_string(),
                to: to.as_str().to_string(),
            });
        }
        Ok(to)
    }
}

impl std::fmt::Display for PackageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PackageStatus {
    type Err = ValidationError;

    /// Parse a status name. Case-insensitive, so `in_transit` and
    /// `IN_TRANSIT` are the same status.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Self::all()
            .iter()
            .copied()
            .find(|st| st.as_str() == upper)
            .ok_or_else(|| ValidationError::schema("PackageStatus", format!("unknown status {s:?}")))
    }
}
