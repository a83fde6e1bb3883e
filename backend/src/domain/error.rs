//! Error taxonomy for the notification pipeline.
//!
//! Every failure leaving the core maps onto exactly one [`ErrorKind`]. The
//! inbound caller (the CRUD layer) translates kinds into its own transport
//! responses; the core never decides retry policy, it only reports whether a
//! retry is safe.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::ports::{MessageBusError, SnapshotLoaderError};

/// Entity relation that must be loaded before a message can be built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    /// The doctor referenced by an appointment or schedule.
    Doctor,
    /// The patient referenced by an appointment.
    Patient,
}

impl Relation {
    /// Lower-case relation name used in messages and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Doctor => "doctor",
            Self::Patient => "patient",
        }
    }
}

impl std::fmt::Display for Relation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable machine-readable failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// A snapshot was handed over without a required related entity.
    MissingRelation,
    /// The doctor named by a report request does not exist.
    DoctorNotFound,
    /// A report date range is absent, zero-valued, or inverted.
    InvalidRange,
    /// The bus was unreachable, busy, or timed out.
    TransientBus,
    /// The message could not be encoded or was refused as malformed.
    Serialization,
    /// The snapshot loader could not be reached.
    SnapshotUnavailable,
    /// The snapshot loader rejected or failed a query.
    SnapshotQuery,
}

impl ErrorKind {
    /// Snake-case code matching the serde representation.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::MissingRelation => "missing_relation",
            Self::DoctorNotFound => "doctor_not_found",
            Self::InvalidRange => "invalid_range",
            Self::TransientBus => "transient_bus",
            Self::Serialization => "serialization",
            Self::SnapshotUnavailable => "snapshot_unavailable",
            Self::SnapshotQuery => "snapshot_query",
        }
    }
}

/// Failure raised by any stage of the notification pipeline.
///
/// # Examples
/// ```
/// use clinic_notify::domain::{ErrorKind, PipelineError};
///
/// let err = PipelineError::transient_bus("broker connection reset");
/// assert_eq!(err.kind(), ErrorKind::TransientBus);
/// assert!(err.is_retryable());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// A required related entity was absent from the snapshot.
    #[error("{entity} {entity_id} was loaded without its {relation}")]
    MissingRelation {
        /// Entity type whose relation is missing.
        entity: &'static str,
        /// Identifier of the under-loaded entity.
        entity_id: String,
        /// The relation that should have been loaded.
        relation: Relation,
    },
    /// The requested doctor does not exist.
    #[error("doctor {doctor_id} not found")]
    DoctorNotFound {
        /// Identifier supplied by the caller.
        doctor_id: String,
    },
    /// Report date range precondition failed.
    #[error("invalid report range: {reason}")]
    InvalidRange {
        /// Which precondition failed.
        reason: String,
    },
    /// Bus publish failed for a reason that may clear on retry.
    #[error("message bus temporarily unavailable: {message}")]
    TransientBus {
        /// Adapter-supplied detail.
        message: String,
    },
    /// Message could not be encoded; retrying will never help.
    #[error("message serialization failed: {message}")]
    Serialization {
        /// Encoder or broker detail.
        message: String,
    },
    /// Snapshot loader connection failed.
    #[error("snapshot loader unavailable: {message}")]
    SnapshotUnavailable {
        /// Adapter-supplied detail.
        message: String,
    },
    /// Snapshot loader query failed.
    #[error("snapshot loader query failed: {message}")]
    SnapshotQuery {
        /// Adapter-supplied detail.
        message: String,
    },
}

impl PipelineError {
    /// Build a [`PipelineError::MissingRelation`].
    pub fn missing_relation(
        entity: &'static str,
        entity_id: impl ToString,
        relation: Relation,
    ) -> Self {
        Self::MissingRelation {
            entity,
            entity_id: entity_id.to_string(),
            relation,
        }
    }

    /// Build a [`PipelineError::DoctorNotFound`].
    pub fn doctor_not_found(doctor_id: impl ToString) -> Self {
        Self::DoctorNotFound {
            doctor_id: doctor_id.to_string(),
        }
    }

    /// Build a [`PipelineError::InvalidRange`].
    pub fn invalid_range(reason: impl Into<String>) -> Self {
        Self::InvalidRange {
            reason: reason.into(),
        }
    }

    /// Build a [`PipelineError::TransientBus`].
    pub fn transient_bus(message: impl Into<String>) -> Self {
        Self::TransientBus {
            message: message.into(),
        }
    }

    /// Build a [`PipelineError::Serialization`].
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Build a [`PipelineError::SnapshotUnavailable`].
    pub fn snapshot_unavailable(message: impl Into<String>) -> Self {
        Self::SnapshotUnavailable {
            message: message.into(),
        }
    }

    /// Build a [`PipelineError::SnapshotQuery`].
    pub fn snapshot_query(message: impl Into<String>) -> Self {
        Self::SnapshotQuery {
            message: message.into(),
        }
    }

    /// Taxonomy kind of this failure.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingRelation { .. } => ErrorKind::MissingRelation,
            Self::DoctorNotFound { .. } => ErrorKind::DoctorNotFound,
            Self::InvalidRange { .. } => ErrorKind::InvalidRange,
            Self::TransientBus { .. } => ErrorKind::TransientBus,
            Self::Serialization { .. } => ErrorKind::Serialization,
            Self::SnapshotUnavailable { .. } => ErrorKind::SnapshotUnavailable,
            Self::SnapshotQuery { .. } => ErrorKind::SnapshotQuery,
        }
    }

    /// Whether re-running the same operation may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::TransientBus { .. } | Self::SnapshotUnavailable { .. }
        )
    }
}

impl From<SnapshotLoaderError> for PipelineError {
    fn from(error: SnapshotLoaderError) -> Self {
        match error {
            SnapshotLoaderError::Connection { message } => Self::snapshot_unavailable(message),
            SnapshotLoaderError::Query { message } => Self::snapshot_query(message),
        }
    }
}

impl From<MessageBusError> for PipelineError {
    fn from(error: MessageBusError) -> Self {
        match error {
            MessageBusError::Unavailable { message } | MessageBusError::Busy { message } => {
                Self::transient_bus(message)
            }
            // A refused payload is a shape defect; resending it cannot help.
            MessageBusError::Rejected { message } => Self::serialization(message),
        }
    }
}
