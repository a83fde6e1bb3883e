//! Driven port for handing encoded messages to the downstream bus.
//!
//! The gateway owns encoding and timeouts; adapters only move bytes to a
//! topic and report whether the broker accepted them.

use async_trait::async_trait;
use uuid::Uuid;

use super::define_port_error;

/// Encoded message ready for transmission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedMessage {
    /// Envelope identifier; stable across retries so consumers can dedupe.
    pub message_id: Uuid,
    /// Destination topic derived from the message kind.
    pub topic: &'static str,
    /// Trace identifier of the originating change event.
    pub trace_id: Option<Uuid>,
    /// JSON-encoded envelope.
    pub payload: Vec<u8>,
}

define_port_error! {
    /// Errors surfaced by bus adapters.
    pub enum MessageBusError {
        /// Broker connection is down or closed.
        Unavailable { message: String } => "message bus unavailable: {message}",
        /// Broker applied backpressure.
        Busy { message: String } => "message bus busy: {message}",
        /// Broker refused the payload itself.
        Rejected { message: String } => "message bus rejected payload: {message}",
    }
    retryable: [Unavailable, Busy]
}

/// Port for publishing encoded messages.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageBus: Send + Sync {
    /// Hand one message to the broker and wait for its acknowledgement.
    async fn publish(&self, message: &EncodedMessage) -> Result<(), MessageBusError>;
}
