//! # Permissions and Roles
//!
//! Permissions are a closed set of action strings. An organization's
//! [`PermissionSet`] is stored in world state as a JSON array of those
//! strings, always written in a fixed order so equal sets produce equal
//! bytes.
//!
//! Roles are convenience bundles: assigning a role replaces an
//! organization's set with the role's defaults.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use pm3_core::ValidationError;

use crate::validate::parse_json;

// ─── Permission ──────────────────────────────────────────────────────

/// A fine-grained action an organization may be allowed to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Permission {
    #[serde(rename = "package:create")]
    PackageCreate,
    #[serde(rename = "package:read")]
    PackageRead,
    #[serde(rename = "package:read:private")]
    PackageReadPrivate,
    #[serde(rename = "package:updateStatus")]
    PackageUpdateStatus,
    #[serde(rename = "package:delete")]
    PackageDelete,
    #[serde(rename = "transfer:propose")]
    TransferPropose,
    #[serde(rename = "transfer:accept")]
    TransferAccept,
    #[serde(rename = "transfer:execute")]
    TransferExecute,
}

impl Permission {
    /// Every permission, in wire order.
    pub fn all() -> &'static [Permission] {
        &[
            Self::PackageCreate,
            Self::PackageRead,
            Self::PackageReadPrivate,
            Self::PackageUpdateStatus,
            Self::PackageDelete,
            Self::TransferPropose,
            Self::TransferAccept,
            Self::TransferExecute,
        ]
    }

    /// The wire string of this permission.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PackageCreate => "package:create",
            Self::PackageRead => "package:read",
            Self::PackageReadPrivate => "package:read:private",
            Self::PackageUpdateStatus => "package:updateStatus",
            Self::PackageDelete => "package:delete",
            Self::TransferPropose => "transfer:propose",
            Self::TransferAccept => "transfer:accept",
            Self::TransferExecute => "transfer:execute",
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Permission {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| ValidationError::schema("Permission", format!("unknown permission {s:?}")))
    }
}

// ─── Permission Set ──────────────────────────────────────────────────

/// The permissions held by one organization. Order-irrelevant; serialized
/// in wire order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet(BTreeSet<Permission>);

impl PermissionSet {
    /// The empty set.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Every permission.
    pub fn full() -> Self {
        Self(Permission::all().iter().copied().collect())
    }

    /// Parse a JSON array of permission strings. Unknown strings fail.
    pub fn from_json(bytes: &[u8]) -> Result<Self, ValidationError> {
        parse_json("PermissionSet", bytes)
    }

    pub fn contains(&self, permission: Permission) -> bool {
        self.0.contains(&permission)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Union with `other`.
    pub fn grant(&self, other: &PermissionSet) -> Self {
        Self(self.0.union(&other.0).copied().collect())
    }

    /// Difference with `other`.
    pub fn revoke(&self, other: &PermissionSet) -> Self {
        Self(self.0.difference(&other.0).copied().collect())
    }

    pub fn iter(&self) -> impl Iterator<Item = Permission> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl std::fmt::Display for PermissionSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.0.iter().map(Permission::as_str).collect();
        write!(f, "[{}]", names.join(", "))
    }
}

// ─── Role ────────────────────────────────────────────────────────────

/// A named bundle of permissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The platform operator.
    Pm3,
    /// An ombudsman acting for the sender or recipient.
    Ombud,
    /// A carrier that takes custody for an intermediate leg.
    Transporter,
}

impl Role {
    pub fn all() -> &'static [Role] {
        &[Self::Pm3, Self::Ombud, Self::Transporter]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pm3 => "pm3",
            Self::Ombud => "ombud",
            Self::Transporter => "transporter",
        }
    }

    /// The default permission bundle of this role.
    pub fn default_permissions(&self) -> PermissionSet {
        use Permission::*;
        match self {
            Self::Pm3 => PermissionSet::full(),
            Self::Ombud => [PackageRead, PackageReadPrivate, PackageDelete]
                .into_iter()
                .collect(),
            Self::Transporter => [PackageRead, PackageReadPrivate, TransferPropose, TransferAccept]
                .into_iter()
                .collect(),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|r| r.as_str() == s.trim().to_ascii_lowercase())
            .ok_or_else(|| ValidationError::schema("Role", format!("unknown role {s:?}")))
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn any_set() -> impl Strategy<Value = PermissionSet> {
        prop::sample::subsequence(Permission::all().to_vec(), 0..=8)
            .prop_map(|v| v.into_iter().collect())
    }

    proptest! {
        #[test]
        fn grant_is_idempotent(base in any_set(), delta in any_set()) {
            let once = base.grant(&delta);
            let twice = once.grant(&delta);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn revoke_is_idempotent(base in any_set(), delta in any_set()) {
            let once = base.revoke(&delta);
            prop_assert_eq!(once.revoke(&delta), once);
        }

        #[test]
        fn stored_form_roundtrips(set in any_set()) {
            let bytes = serde_json::to_vec(&set).unwrap();
            prop_assert_eq!(PermissionSet::from_json(&bytes).unwrap(), set);
        }
    }
}
