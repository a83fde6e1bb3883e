//! Per-message publish lifecycle.
//!
//! `Built → Publishing → Acked | Failed(Transient) | Failed(Permanent)`.
//! A transient failure may be re-published with the same instance, reusing
//! its message id. Acked and permanently failed publications are terminal:
//! publishing them again returns the stored outcome without a bus call.

use tracing::debug;

use super::{Ack, PublishGateway};
use crate::domain::error::PipelineError;
use crate::domain::messages::Envelope;

/// Whether a failure may clear on retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureClass {
    /// Bus unavailable, busy or timed out; the same envelope may be retried.
    Transient,
    /// Encoding failed or the bus refused the payload.
    Permanent,
}

impl FailureClass {
    /// Classify `error` by its retryability.
    #[must_use]
    pub const fn of(error: &PipelineError) -> Self {
        if error.is_retryable() {
            Self::Transient
        } else {
            Self::Permanent
        }
    }
}

/// Current lifecycle state of a [`Publication`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishState {
    /// Sealed, never sent.
    Built,
    /// A bus call is outstanding.
    Publishing,
    /// The bus accepted the envelope.
    Acked(Ack),
    /// The last attempt failed.
    Failed {
        /// Whether another attempt may succeed.
        class: FailureClass,
        /// Failure reported by the gateway.
        error: PipelineError,
    },
}

impl PublishState {
    /// Whether no further publish attempt will reach the bus.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Acked(_)
                | Self::Failed {
                    class: FailureClass::Permanent,
                    ..
                }
        )
    }
}

/// One envelope together with its publish state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Publication {
    envelope: Envelope,
    state: PublishState,
}

impl Publication {
    /// Wrap a freshly sealed envelope in the `Built` state.
    #[must_use]
    pub const fn new(envelope: Envelope) -> Self {
        Self {
            envelope,
            state: PublishState::Built,
        }
    }

    /// Envelope this publication sends.
    #[must_use]
    pub const fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    #[must_use]
    pub const fn state(&self) -> &PublishState {
        &self.state
    }

    /// Publish through `gateway`, or replay the stored terminal outcome.
    ///
    /// # Errors
    /// The gateway's classification of the failure, or the stored permanent
    /// error.
    pub async fn publish_via(&mut self, gateway: &PublishGateway) -> Result<Ack, PipelineError> {
        match &self.state {
            PublishState::Acked(ack) => return Ok(ack.clone()),
            PublishState::Failed {
                class: FailureClass::Permanent,
                error,
            } => return Err(error.clone()),
            PublishState::Built | PublishState::Publishing | PublishState::Failed { .. } => {}
        }

        self.state = PublishState::Publishing;
        let outcome = gateway.publish(&self.envelope).await;
        self.state = match &outcome {
            Ok(ack) => PublishState::Acked(ack.clone()),
            Err(error) => PublishState::Failed {
                class: FailureClass::of(error),
                error: error.clone(),
            },
        };
        debug!(
            message_id = %self.envelope.message_id(),
            state = ?self.state,
            "publication state changed"
        );
        outcome
    }
}
