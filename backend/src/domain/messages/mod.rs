//! Outbound domain messages.
//!
//! Every message kind has its own payload struct with a fixed field set. The
//! payloads are built only by [`builder`] and cannot be constructed outside
//! this crate, so a published message is always fully populated.

pub mod builder;
mod envelope;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

pub use envelope::Envelope;

use super::ids::{AppointmentId, DoctorId, PatientId, ScheduleId};
use super::schedule::AvailabilityWindow;

/// Version of the payload field sets below. Bump on any field change.
pub const MESSAGE_SCHEMA_VERSION: u16 = 1;

/// Discriminant of [`DomainMessage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// A patient was registered.
    NewPatient,
    /// An appointment was booked.
    NewAppointment,
    /// A doctor's schedule changed.
    ScheduleUpdated,
    /// One affected patient is told about a schedule change.
    PatientScheduleNotice,
    /// Attendance report for a doctor.
    DoctorReport,
}

impl MessageKind {
    /// Bus topic the kind is routed to.
    #[must_use]
    pub const fn topic(self) -> &'static str {
        match self {
            Self::NewPatient => "clinic.patient.created",
            Self::NewAppointment => "clinic.appointment.created",
            Self::ScheduleUpdated => "clinic.schedule.updated",
            Self::PatientScheduleNotice => "clinic.schedule.patient_notice",
            Self::DoctorReport => "clinic.report.doctor",
        }
    }
}

/// Tagged union of every message the pipeline publishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum DomainMessage {
    /// See [`NewPatientMessage`].
    NewPatient(NewPatientMessage),
    /// See [`NewAppointmentMessage`].
    NewAppointment(NewAppointmentMessage),
    /// See [`DoctorScheduleUpdatedMessage`].
    ScheduleUpdated(DoctorScheduleUpdatedMessage),
    /// See [`PatientScheduleNotice`].
    PatientScheduleNotice(PatientScheduleNotice),
    /// See [`DoctorReportData`].
    DoctorReport(DoctorReportData),
}

impl DomainMessage {
    /// Kind of this message.
    #[must_use]
    pub const fn kind(&self) -> MessageKind {
        match self {
            Self::NewPatient(_) => MessageKind::NewPatient,
            Self::NewAppointment(_) => MessageKind::NewAppointment,
            Self::ScheduleUpdated(_) => MessageKind::ScheduleUpdated,
            Self::PatientScheduleNotice(_) => MessageKind::PatientScheduleNotice,
            Self::DoctorReport(_) => MessageKind::DoctorReport,
        }
    }
}

/// Published when a patient is registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct NewPatientMessage {
    /// Registered patient.
    pub patient_id: PatientId,
    /// `"{first} {last}"`.
    pub full_name: String,
    /// Date of birth when recorded.
    pub date_of_birth: Option<NaiveDate>,
    /// Free-text gender.
    pub gender: String,
    /// Contact phone number.
    pub phone_number: String,
    /// Contact e-mail.
    pub email: String,
    /// Postal address.
    pub address: String,
}

/// Published when an appointment is booked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct NewAppointmentMessage {
    /// Booked appointment.
    pub appointment_id: AppointmentId,
    /// Patient the appointment is for.
    pub patient_id: PatientId,
    /// Attending doctor.
    pub doctor_id: DoctorId,
    /// Patient display name.
    pub patient_full_name: String,
    /// Doctor display name.
    pub doctor_full_name: String,
    /// Clinic-local appointment time.
    pub scheduled_at: NaiveDateTime,
    /// Booking status as recorded.
    pub status: String,
    /// Free-text notes.
    pub notes: String,
}

/// Published once per schedule change, before any patient notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct DoctorScheduleUpdatedMessage {
    /// Changed schedule.
    pub schedule_id: ScheduleId,
    /// Doctor the schedule belongs to.
    pub doctor_id: DoctorId,
    /// Doctor display name.
    pub doctor_full_name: String,
    /// New weekly availability.
    pub window: AvailabilityWindow,
}

/// Published once per affected patient after a schedule change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct PatientScheduleNotice {
    /// Recipient.
    pub patient_id: PatientId,
    /// Recipient display name.
    pub patient_full_name: String,
    /// Doctor whose schedule changed.
    pub doctor_id: DoctorId,
    /// Doctor display name.
    pub doctor_full_name: String,
    /// New weekly availability.
    pub window: AvailabilityWindow,
    /// Representative appointment that made the patient affected.
    pub appointment_id: AppointmentId,
    /// When the representative appointment is scheduled.
    pub appointment_at: NaiveDateTime,
}

/// One visit line in a doctor report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct PatientVisitSummary {
    /// Patient given name.
    pub first_name: String,
    /// Patient family name.
    pub last_name: String,
    /// Date of birth when recorded.
    pub date_of_birth: Option<NaiveDate>,
    /// Clinic-local visit time.
    pub appointment_date: NaiveDateTime,
    /// Appointment notes.
    pub symptoms: String,
}

/// Attendance report for one doctor over a date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct DoctorReportData {
    /// Reported doctor.
    pub doctor_id: DoctorId,
    /// Doctor display name.
    pub doctor_full_name: String,
    /// Specialization label when loaded and named.
    pub specialization: Option<String>,
    /// `dd.MM.yyyy - dd.MM.yyyy`.
    pub period: String,
    /// Number of appointments in range, not distinct patients.
    pub total_patients: usize,
    /// Visits ordered by appointment timestamp.
    pub patient_details: Vec<PatientVisitSummary>,
}
