//! A [`Broadcaster`] that writes messages to the tracing pipeline.
//!
//! Stands in for the messaging bridge when replaying scenarios locally.

use pm3_ledger::{BroadcastError, BroadcastMessage, Broadcaster};

#[derive(Debug, Default, Clone, Copy)]
pub struct TracingBroadcaster;

impl Broadcaster for TracingBroadcaster {
    fn broadcast(&self, message: &BroadcastMessage) -> Result<(), BroadcastError> {
        tracing::info!(
            datatype = %message.datatype.name,
            version = %message.datatype.version,
            topics = ?message.topics,
            "broadcast"
        );
        Ok(())
    }
}
