//! # Package Records
//!
//! The private half of a package is a [`StoreObject`] held in exactly one
//! organization's private partition. The public half is a
//! [`BlockchainPackage`] in world state whose `packageDetailsAndPIIHash`
//! commits to that store object.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use pm3_core::{CanonicalizationError, ExternalPackageId, OrgId, ValidationError};
use pm3_crypto::{commit, Commitment, Salt};
use pm3_state::PackageStatus;

use crate::validate::{parse_json, positive, within};

// ─── Package Details ─────────────────────────────────────────────────

/// A named geographic point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Location {
    pub name: String,
    pub address: String,
    pub lat: f64,
    pub lng: f64,
}

/// Physical dimensions of a package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Size {
    pub width: f64,
    pub height: f64,
    pub depth: f64,
}

/// Delivery urgency tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    High,
    Medium,
    Low,
    None,
}

impl Urgency {
    /// The canonical string identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::None => "none",
        }
    }
}

impl std::fmt::Display for Urgency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Physical description of a package. Immutable once committed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PackageDetails {
    pub pickup_location: Location,
    pub drop_location: Location,
    pub size: Size,
    pub weight_kg: f64,
    pub urgency: Urgency,
}

impl PackageDetails {
    const SCHEMA: &'static str = "PackageDetails";

    /// Parse and validate transient or stored bytes.
    pub fn from_json(bytes: &[u8]) -> Result<Self, ValidationError> {
        let details: Self = parse_json(Self::SCHEMA, bytes)?;
        details.validate()?;
        Ok(details)
    }

    /// Check value ranges that the type system cannot express.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, loc) in [
            ("pickupLocation", &self.pickup_location),
            ("dropLocation", &self.drop_location),
        ] {
            if loc.name.trim().is_empty() {
                return Err(ValidationError::schema(
                    Self::SCHEMA,
                    format!("{field}.name must not be empty"),
                ));
            }
            within(Self::SCHEMA, &format!("{field}.lat"), loc.lat, -90.0, 90.0)?;
            within(Self::SCHEMA, &format!("{field}.lng"), loc.lng, -180.0, 180.0)?;
        }
        positive(Self::SCHEMA, "size.width", self.size.width)?;
        positive(Self::SCHEMA, "size.height", self.size.height)?;
        positive(Self::SCHEMA, "size.depth", self.size.depth)?;
        positive(Self::SCHEMA, "weightKg", self.weight_kg)?;
        Ok(())
    }
}

// ─── PII ─────────────────────────────────────────────────────────────

/// Sender-supplied personal data. Opaque to the contract beyond being a
/// JSON object.
#[derive(Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pii(Map<String, Value>);

impl Pii {
    /// Parse transient or stored bytes; anything but a JSON object fails.
    pub fn from_json(bytes: &[u8]) -> Result<Self, ValidationError> {
        let value: Value = parse_json("PII", bytes)?;
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(ValidationError::schema(
                "PII",
                format!("expected a JSON object, got {}", json_kind(&other)),
            )),
        }
    }

    /// Borrow the underlying object.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for Pii {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl std::fmt::Debug for Pii {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Pii(<{} fields redacted>)", self.0.len())
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ─── Store Object ────────────────────────────────────────────────────

/// The private payload actually written to a partition.
///
/// The salt is generated once at creation and carried unchanged through
/// every transfer, so the commitment is stable for the life of the package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StoreObject {
    pub salt: Salt,
    pub package_details: PackageDetails,
    pub pii: Pii,
}

impl StoreObject {
    /// Build a store object with a fresh salt.
    pub fn seal(package_details: PackageDetails, pii: Pii) -> Self {
        Self {
            salt: Salt::generate(),
            package_details,
            pii,
        }
    }

    /// Parse and validate transient or stored bytes.
    pub fn from_json(bytes: &[u8]) -> Result<Self, ValidationError> {
        let obj: Self = parse_json("StoreObject", bytes)?;
        obj.package_details.validate()?;
        Ok(obj)
    }

    /// The commitment anchored publicly as `packageDetailsAndPIIHash`.
    pub fn commitment(&self) -> Result<Commitment, CanonicalizationError> {
        commit(self)
    }
}

// ─── Blockchain Package ──────────────────────────────────────────────

/// Public ledger record of a package, keyed by `externalId`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockchainPackage {
    pub external_id: ExternalPackageId,
    pub owner_org_id: OrgId,
    pub sender_org_id: OrgId,
    pub recipient_org_id: OrgId,
    pub status: PackageStatus,
    #[serde(rename = "packageDetailsAndPIIHash")]
    pub package_details_and_pii_hash: Commitment,
}

impl BlockchainPackage {
    /// A freshly created package: owned by its sender, `PENDING`.
    pub fn pending(
        external_id: ExternalPackageId,
        sender: OrgId,
        recipient: OrgId,
        hash: Commitment,
    ) -> Self {
        Self {
            external_id,
            owner_org_id: sender.clone(),
            sender_org_id: sender,
            recipient_org_id: recipient,
            status: PackageStatus::Pending,
            package_details_and_pii_hash: hash,
        }
    }

    /// Parse stored world-state bytes.
    pub fn from_json(bytes: &[u8]) -> Result<Self, ValidationError> {
        parse_json("BlockchainPackage", bytes)
    }

    /// Whether `org` currently owns the package.
    pub fn is_owned_by(&self, org: &OrgId) -> bool {
        &self.owner_org_id == org
    }

    /// Whether `org` is the package's final recipient.
    pub fn is_recipient(&self, org: &OrgId) -> bool {
        &self.recipient_org_id == org
    }
}
