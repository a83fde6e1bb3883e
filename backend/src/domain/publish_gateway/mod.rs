//! Sole boundary between the pipeline and the message bus.
//!
//! The gateway encodes envelopes, bounds each bus call by a timeout, and
//! classifies every failure as transient (`TransientBus`) or permanent
//! (`Serialization`). It never retries on its own. When a retry buffer is
//! configured, transiently failed envelopes are retained for a later
//! [`PublishGateway::flush_buffered`] call; the failure is still returned to
//! the caller. Whichever path delivers an envelope first wins: a successful
//! publish removes any buffered copy, so a caller retrying its own
//! [`Publication`] never causes a second delivery on the next flush.

mod buffer;
mod state;

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use mockable::Clock;
use tracing::{debug, error, warn};
use uuid::Uuid;

use buffer::RetryBuffer;
pub use state::{FailureClass, PublishState, Publication};

use super::error::PipelineError;
use super::messages::{Envelope, MessageKind};
use super::ports::{EncodedMessage, MessageBus};

/// Bus acknowledgement for one envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ack {
    /// Id of the acknowledged envelope.
    pub message_id: Uuid,
    /// Kind of the acknowledged message.
    pub kind: MessageKind,
    /// Clock reading when the bus accepted the envelope.
    pub acknowledged_at: DateTime<Utc>,
}

/// Gateway tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishGatewayConfig {
    /// Upper bound on a single bus call.
    pub publish_timeout: Duration,
    /// Retry buffer size; `None` disables buffering.
    pub retry_buffer_capacity: Option<NonZeroUsize>,
}

impl Default for PublishGatewayConfig {
    fn default() -> Self {
        Self {
            publish_timeout: Duration::from_secs(5),
            retry_buffer_capacity: None,
        }
    }
}

/// Outcome of one [`PublishGateway::flush_buffered`] pass.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct FlushReport {
    /// Envelopes the bus accepted on this pass.
    pub delivered: Vec<Ack>,
    /// Envelopes that failed transiently again and were put back.
    pub rebuffered: usize,
    /// Envelopes that failed permanently and were discarded.
    pub dropped: Vec<(Uuid, PipelineError)>,
}

/// Publishes sealed envelopes through a shared bus handle.
pub struct PublishGateway {
    bus: Arc<dyn MessageBus>,
    clock: Arc<dyn Clock>,
    publish_timeout: Duration,
    buffer: Option<Mutex<RetryBuffer>>,
}

impl PublishGateway {
    /// Gateway over `bus`, stamping acks with `clock`.
    #[must_use]
    pub fn new(bus: Arc<dyn MessageBus>, clock: Arc<dyn Clock>, config: PublishGatewayConfig) -> Self {
        Self {
            bus,
            clock,
            publish_timeout: config.publish_timeout,
            buffer: config
                .retry_buffer_capacity
                .map(|capacity| Mutex::new(RetryBuffer::new(capacity))),
        }
    }

    /// Publish one envelope and wait for the bus to accept it.
    ///
    /// # Errors
    /// `TransientBus` when the bus is unavailable, busy, or exceeds the
    /// timeout. `Serialization` when the envelope cannot be encoded or the
    /// bus refuses the payload.
    pub async fn publish(&self, envelope: &Envelope) -> Result<Ack, PipelineError> {
        let outcome = self.send(envelope).await;
        if outcome.as_ref().is_err_and(PipelineError::is_retryable) {
            self.retain(envelope);
        }
        outcome
    }

    /// Number of envelopes waiting in the retry buffer.
    pub fn buffered_len(&self) -> usize {
        self.buffer
            .as_ref()
            .map_or(0, |buffer| lock(buffer).len())
    }

    /// Re-attempt every buffered envelope once.
    pub async fn flush_buffered(&self) -> FlushReport {
        let Some(buffer) = &self.buffer else {
            return FlushReport::default();
        };
        let pending = lock(buffer).drain();
        let mut report = FlushReport::default();

        for envelope in pending {
            match self.send(&envelope).await {
                Ok(ack) => report.delivered.push(ack),
                Err(err) if err.is_retryable() => {
                    self.retain(&envelope);
                    report.rebuffered += 1;
                }
                Err(err) => report.dropped.push((envelope.message_id(), err)),
            }
        }
        debug!(
            delivered = report.delivered.len(),
            rebuffered = report.rebuffered,
            dropped = report.dropped.len(),
            "flushed retry buffer"
        );
        report
    }

    async fn send(&self, envelope: &Envelope) -> Result<Ack, PipelineError> {
        let encoded = encode(envelope)?;
        let message_id = envelope.message_id();
        let kind = envelope.kind();

        let result = tokio::time::timeout(self.publish_timeout, self.bus.publish(&encoded)).await;
        match result {
            Ok(Ok(())) => {
                debug!(%message_id, ?kind, topic = encoded.topic, "message acknowledged");
                self.forget(message_id);
                Ok(Ack {
                    message_id,
                    kind,
                    acknowledged_at: self.clock.utc(),
                })
            }
            Ok(Err(bus_error)) => {
                let err = PipelineError::from(bus_error);
                if err.is_retryable() {
                    warn!(%message_id, ?kind, error = %err, "bus publish failed transiently");
                } else {
                    error!(%message_id, ?kind, error = %err, "bus refused message");
                }
                Err(err)
            }
            Err(_elapsed) => {
                warn!(
                    %message_id,
                    ?kind,
                    timeout_ms = self.publish_timeout.as_millis(),
                    "bus publish timed out"
                );
                Err(PipelineError::transient_bus(format!(
                    "publish timed out after {}ms",
                    self.publish_timeout.as_millis()
                )))
            }
        }
    }

    fn forget(&self, message_id: Uuid) {
        let Some(buffer) = &self.buffer else {
            return;
        };
        if lock(buffer).remove(message_id).is_some() {
            debug!(%message_id, "acknowledged envelope removed from retry buffer");
        }
    }

    fn retain(&self, envelope: &Envelope) {
        let Some(buffer) = &self.buffer else {
            return;
        };
        if let Some(evicted) = lock(buffer).push(envelope.clone()) {
            warn!(
                evicted_message_id = %evicted.message_id(),
                kind = ?evicted.kind(),
                "retry buffer full; dropped oldest envelope"
            );
        }
    }
}

fn encode(envelope: &Envelope) -> Result<EncodedMessage, PipelineError> {
    let payload = serde_json::to_vec(envelope).map_err(|source| {
        error!(
            message_id = %envelope.message_id(),
            kind = ?envelope.kind(),
            error = %source,
            "envelope encoding failed"
        );
        PipelineError::serialization(source.to_string())
    })?;
    Ok(EncodedMessage {
        message_id: envelope.message_id(),
        topic: envelope.topic(),
        trace_id: envelope.trace_id(),
        payload,
    })
}

fn lock(buffer: &Mutex<RetryBuffer>) -> MutexGuard<'_, RetryBuffer> {
    buffer.lock().unwrap_or_else(PoisonError::into_inner)
}
