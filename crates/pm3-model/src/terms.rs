//! # Transfer Terms
//!
//! A transfer proposal has two halves. [`TransferTerms`] is public and
//! carries `privateTermsHash`, a commitment to the [`PrivateTransferTerms`]
//! that only the proposer and the recipient ever see.

use serde::{Deserialize, Serialize};

use pm3_core::{CanonicalizationError, ExternalPackageId, OrgId, TermsId, Timestamp, ValidationError};
use pm3_crypto::{commit, Commitment};
use pm3_state::TermsStatus;

use crate::validate::parse_json;

/// Public half of a transfer proposal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferTerms {
    pub terms_id: TermsId,
    pub external_package_id: ExternalPackageId,
    pub from_org_id: OrgId,
    pub to_org_id: OrgId,
    pub created_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<Timestamp>,
    pub private_terms_hash: Commitment,
    #[serde(default)]
    pub status: TermsStatus,
}

impl TransferTerms {
    /// Parse stored world-state bytes.
    pub fn from_json(bytes: &[u8]) -> Result<Self, ValidationError> {
        parse_json("TransferTerms", bytes)
    }

    /// Whether the terms are past their deadline at `now`. Terms without a
    /// deadline never expire.
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        self.expires_at.is_some_and(|deadline| now > deadline)
    }
}

/// Private half of a transfer proposal: the commercial terms.
///
/// `price` is in the smallest unit of `currency`. A proposer that wants the
/// public hash to resist brute force over plausible prices adds a `salt`
/// and shares it with the recipient off-ledger.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PrivateTransferTerms {
    pub price: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salt: Option<String>,
}

impl PrivateTransferTerms {
    /// Terms carrying only a price.
    pub fn with_price(price: u64) -> Self {
        Self {
            price,
            currency: None,
            conditions: None,
            salt: None,
        }
    }

    /// Parse transient or stored bytes.
    pub fn from_json(bytes: &[u8]) -> Result<Self, ValidationError> {
        let terms: Self = parse_json("PrivateTransferTerms", bytes)?;
        if let Some(currency) = &terms.currency {
            if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_uppercase()) {
                return Err(ValidationError::schema(
                    "PrivateTransferTerms",
                    "currency must be a three-letter ISO 4217 code",
                ));
            }
        }
        Ok(terms)
    }

    /// The commitment anchored publicly as `privateTermsHash`.
    pub fn commitment(&self) -> Result<Commitment, CanonicalizationError> {
        commit(self)
    }
}

impl std::fmt::Debug for PrivateTransferTerms {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PrivateTransferTerms(<redacted>)")
    }
}
