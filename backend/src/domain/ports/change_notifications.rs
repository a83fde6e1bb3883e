//! Driving port invoked by the CRUD layer after a write has committed.

use async_trait::async_trait;

use crate::domain::{
    Ack, Appointment, DoctorSchedule, FanOutResult, Patient, PipelineError, ReportRequest,
};

/// Outcome of a schedule change: the primary message and every notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleUpdateOutcome {
    /// Ack for the `ScheduleUpdated` message, published before any notice.
    pub primary: Ack,
    /// Per-patient notice outcomes.
    pub notices: FanOutResult,
}

/// Inbound entry points of the notification pipeline.
///
/// Snapshots must arrive with the relations each message needs already
/// loaded; under-loaded snapshots fail with `MissingRelation` before anything
/// is published.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChangeNotificationCommand: Send + Sync {
    async fn on_patient_created(&self, patient: Patient) -> Result<Ack, PipelineError>;

    async fn on_appointment_created(&self, appointment: Appointment) -> Result<Ack, PipelineError>;

    async fn on_schedule_updated(
        &self,
        schedule: DoctorSchedule,
    ) -> Result<ScheduleUpdateOutcome, PipelineError>;

    async fn on_report_requested(&self, request: ReportRequest) -> Result<Ack, PipelineError>;
}
