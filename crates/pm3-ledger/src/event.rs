//! # Events and the Broadcast Boundary
//!
//! Each committed transaction carries at most one [`ChaincodeEvent`].
//! Off-ledger listeners turn events into [`BroadcastMessage`]s and hand
//! them to a [`Broadcaster`]; the real messaging bridge lives outside this
//! workspace and only its interface is defined here.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// An event as committed with its transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChaincodeEvent {
    pub tx_id: String,
    pub chaincode: String,
    pub name: String,
    pub payload: Vec<u8>,
}

impl ChaincodeEvent {
    /// Decode the payload as JSON.
    pub fn json(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_slice(&self.payload)
    }
}

/// Identifies the shape of a broadcast payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Datatype {
    pub name: String,
    pub version: String,
}

/// A `(payload, datatype, topics)` tuple for the messaging bridge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BroadcastMessage {
    pub payload: Value,
    pub datatype: Datatype,
    pub topics: Vec<String>,
}

impl BroadcastMessage {
    /// Schema version stamped on every message built from an event.
    pub const DATATYPE_VERSION: &'static str = "1";

    /// Build a message from a committed event. Topics are the chaincode,
    /// the event name, and the package id when the payload names one.
    pub fn from_event(event: &ChaincodeEvent) -> Result<Self, BroadcastError> {
        let payload = event
            .json()
            .map_err(|e| BroadcastError::Payload(e.to_string()))?;
        let mut topics = vec![event.chaincode.clone(), event.name.clone()];
        if let Some(id) = payload.get("externalId").and_then(Value::as_str) {
            topics.push(id.to_string());
        }
        Ok(Self {
            payload,
            datatype: Datatype {
                name: format!("{}.{}", event.chaincode, event.name),
                version: Self::DATATYPE_VERSION.to_string(),
            },
            topics,
        })
    }
}

/// Errors at the broadcast boundary.
#[derive(Error, Debug)]
pub enum BroadcastError {
    /// The event payload is not JSON.
    #[error("event payload is not JSON: {0}")]
    Payload(String),

    /// The bridge refused or failed to deliver the message.
    #[error("broadcast failed: {0}")]
    Delivery(String),
}

/// Publishes messages off-ledger.
pub trait Broadcaster {
    fn broadcast(&self, message: &BroadcastMessage) -> Result<(), BroadcastError>;
}
