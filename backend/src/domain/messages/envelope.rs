//! Immutable wrapper that turns a built message into a publishable unit.

use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::Serialize;
use uuid::Uuid;

use super::{DomainMessage, MESSAGE_SCHEMA_VERSION, MessageKind};
use crate::domain::TraceId;

/// Sealed message plus delivery metadata.
///
/// The message id is assigned once at sealing. Retrying the same envelope
/// reuses it, so consumers can drop duplicate deliveries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    message_id: Uuid,
    schema_version: u16,
    kind: MessageKind,
    trace_id: Option<Uuid>,
    built_at: DateTime<Utc>,
    message: DomainMessage,
}

impl Envelope {
    /// Seal `message`, stamping the trace id in scope and the clock's time.
    #[must_use]
    pub fn seal(message: DomainMessage, clock: &dyn Clock) -> Self {
        Self {
            message_id: Uuid::new_v4(),
            schema_version: MESSAGE_SCHEMA_VERSION,
            kind: message.kind(),
            trace_id: TraceId::current().map(|id| id.as_uuid()),
            built_at: clock.utc(),
            message,
        }
    }

    /// Identifier shared by every delivery attempt of this envelope.
    #[must_use]
    pub const fn message_id(&self) -> Uuid {
        self.message_id
    }

    #[must_use]
    pub const fn kind(&self) -> MessageKind {
        self.kind
    }

    #[must_use]
    pub const fn topic(&self) -> &'static str {
        self.kind.topic()
    }

    #[must_use]
    pub const fn trace_id(&self) -> Option<Uuid> {
        self.trace_id
    }

    #[must_use]
    pub const fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    /// The wrapped message.
    #[must_use]
    pub const fn message(&self) -> &DomainMessage {
        &self.message
    }
}
