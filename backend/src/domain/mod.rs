//! Domain primitives, messages and pipeline services.
//!
//! Purpose: turn committed clinic changes into bus messages. Entity snapshots
//! arrive read-only from the CRUD layer; the pipeline builds immutable
//! messages, seals them into envelopes and publishes them through a single
//! gateway.
//!
//! Public surface:
//! - Entities: `Doctor`, `Patient`, `Appointment`, `DoctorSchedule`.
//! - `messages`: payload types, pure builders and the `Envelope`.
//! - `AffectedPatientResolver`, `FanOutPublisher`, `ReportAssembler`,
//!   `PublishGateway`: pipeline stages.
//! - `NotificationService`: implements the `ChangeNotificationCommand` port.
//! - `PipelineError` / `ErrorKind`: failure taxonomy.

pub mod affected_patients;
pub mod appointment;
pub mod doctor;
pub mod error;
pub mod fan_out;
pub mod ids;
pub mod messages;
pub mod notification_service;
pub mod patient;
pub mod ports;
pub mod publish_gateway;
pub mod report;
pub mod schedule;
mod trace_id;

pub use self::affected_patients::{AffectedPatient, AffectedPatientResolver};
pub use self::appointment::{Appointment, AppointmentWindow};
pub use self::doctor::{Department, Doctor, Specialization};
pub use self::error::{ErrorKind, PipelineError, Relation};
pub use self::fan_out::{
    DeliveredNotice, FailedNotice, FanOutConfig, FanOutPublisher, FanOutResult,
};
pub use self::ids::{
    AppointmentId, DepartmentId, DoctorId, PatientId, ScheduleId, SpecializationId,
};
pub use self::messages::{DomainMessage, Envelope, MESSAGE_SCHEMA_VERSION, MessageKind};
pub use self::notification_service::{
    NotificationService, NotificationServiceConfig, NotificationServicePorts,
};
pub use self::patient::Patient;
pub use self::publish_gateway::{
    Ack, FailureClass, FlushReport, PublishGateway, PublishGatewayConfig, PublishState,
    Publication,
};
pub use self::report::{ReportAssembler, ReportPeriod, ReportRequest};
pub use self::schedule::{AvailabilityWindow, DoctorSchedule};
pub use self::trace_id::TraceId;
