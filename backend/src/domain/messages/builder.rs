//! Pure mapping from entity snapshots to [`DomainMessage`] values.
//!
//! Builders never perform I/O and never substitute defaults for missing
//! relations: a notice with a blank doctor name is worse than no notice.
//! Every relation is checked before any payload field is assembled.

use super::{
    DoctorReportData, DoctorScheduleUpdatedMessage, DomainMessage, NewAppointmentMessage,
    NewPatientMessage, PatientScheduleNotice, PatientVisitSummary,
};
use crate::domain::affected_patients::AffectedPatient;
use crate::domain::appointment::Appointment;
use crate::domain::doctor::Doctor;
use crate::domain::error::PipelineError;
use crate::domain::patient::Patient;
use crate::domain::report::ReportPeriod;
use crate::domain::schedule::DoctorSchedule;

/// Build the message announcing a newly registered patient.
#[must_use]
pub fn new_patient(patient: &Patient) -> DomainMessage {
    DomainMessage::NewPatient(NewPatientMessage {
        patient_id: patient.id,
        full_name: patient.full_name(),
        date_of_birth: patient.date_of_birth,
        gender: patient.gender.clone(),
        phone_number: patient.phone_number.clone(),
        email: patient.email.clone(),
        address: patient.address.clone(),
    })
}

/// Build the message announcing a booked appointment.
///
/// # Errors
/// `MissingRelation` when the appointment was loaded without its patient or
/// doctor.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use clinic_notify::domain::{Appointment, AppointmentId, DoctorId, ErrorKind, PatientId};
/// use clinic_notify::domain::messages::builder;
///
/// let appointment = Appointment {
///     id: AppointmentId::random(),
///     patient_id: PatientId::random(),
///     doctor_id: DoctorId::random(),
///     scheduled_at: NaiveDate::from_ymd_opt(2024, 1, 5)
///         .and_then(|day| day.and_hms_opt(9, 30, 0))
///         .expect("valid timestamp"),
///     status: "In processing".to_owned(),
///     notes: String::new(),
///     patient: None,
///     doctor: None,
/// };
/// let err = builder::new_appointment(&appointment).expect_err("patient is missing");
/// assert_eq!(err.kind(), ErrorKind::MissingRelation);
/// ```
pub fn new_appointment(appointment: &Appointment) -> Result<DomainMessage, PipelineError> {
    let patient = appointment.require_patient()?;
    let doctor = appointment.require_doctor()?;
    Ok(DomainMessage::NewAppointment(NewAppointmentMessage {
        appointment_id: appointment.id,
        patient_id: patient.id,
        doctor_id: doctor.id,
        patient_full_name: patient.full_name(),
        doctor_full_name: doctor.full_name(),
        scheduled_at: appointment.scheduled_at,
        status: appointment.status.clone(),
        notes: appointment.notes.clone(),
    }))
}

/// Build the primary message for a schedule change.
///
/// # Errors
/// `MissingRelation` when the schedule was loaded without its doctor.
pub fn schedule_updated(schedule: &DoctorSchedule) -> Result<DomainMessage, PipelineError> {
    let doctor = schedule.require_doctor()?;
    Ok(DomainMessage::ScheduleUpdated(DoctorScheduleUpdatedMessage {
        schedule_id: schedule.id,
        doctor_id: doctor.id,
        doctor_full_name: doctor.full_name(),
        window: schedule.window(),
    }))
}

/// Build the notice sent to one affected patient.
///
/// # Errors
/// `MissingRelation` when the schedule was loaded without its doctor.
pub fn patient_schedule_notice(
    schedule: &DoctorSchedule,
    affected: &AffectedPatient,
) -> Result<DomainMessage, PipelineError> {
    let doctor = schedule.require_doctor()?;
    let patient = affected.patient();
    let appointment = affected.appointment();
    Ok(DomainMessage::PatientScheduleNotice(PatientScheduleNotice {
        patient_id: patient.id,
        patient_full_name: patient.full_name(),
        doctor_id: doctor.id,
        doctor_full_name: doctor.full_name(),
        window: schedule.window(),
        appointment_id: appointment.id,
        appointment_at: appointment.scheduled_at,
    }))
}

/// Build the attendance report for `doctor` over `period`.
///
/// Appointments outside the period or booked with another doctor are
/// ignored. Visits are ordered by timestamp, then by appointment id, so equal
/// inputs always yield equal reports.
///
/// # Errors
/// `MissingRelation` when an in-range appointment lacks its patient.
pub fn doctor_report(
    doctor: &Doctor,
    period: &ReportPeriod,
    appointments: &[Appointment],
) -> Result<DomainMessage, PipelineError> {
    let window = period.window();
    let mut in_range: Vec<&Appointment> = appointments
        .iter()
        .filter(|appointment| appointment.doctor_id == doctor.id)
        .filter(|appointment| window.contains(appointment.scheduled_at))
        .collect();
    in_range.sort_by_key(|appointment| (appointment.scheduled_at, appointment.id));

    let patient_details = in_range
        .iter()
        .map(|appointment| {
            let patient = appointment.require_patient()?;
            Ok(PatientVisitSummary {
                first_name: patient.first_name.clone(),
                last_name: patient.last_name.clone(),
                date_of_birth: patient.date_of_birth,
                appointment_date: appointment.scheduled_at,
                symptoms: appointment.notes.clone(),
            })
        })
        .collect::<Result<Vec<_>, PipelineError>>()?;

    Ok(DomainMessage::DoctorReport(DoctorReportData {
        doctor_id: doctor.id,
        doctor_full_name: doctor.full_name(),
        specialization: doctor.specialization_label().map(str::to_owned),
        period: period.label(),
        total_patients: patient_details.len(),
        patient_details,
    }))
}

#[cfg(test)]
#[path = "builder_tests.rs"]
mod tests;
