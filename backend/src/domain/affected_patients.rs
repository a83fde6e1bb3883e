//! Resolve the distinct patients affected by a doctor's schedule change.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use super::appointment::Appointment;
use super::error::PipelineError;
use super::ids::{DoctorId, PatientId};
use super::patient::Patient;
use super::ports::SnapshotLoader;

/// A patient impacted by a schedule change and the appointment that links
/// them to the doctor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AffectedPatient {
    patient: Patient,
    appointment: Appointment,
}

impl AffectedPatient {
    /// Pair `patient` with the appointment that links them to the doctor.
    #[must_use]
    pub const fn new(patient: Patient, appointment: Appointment) -> Self {
        Self {
            patient,
            appointment,
        }
    }

    /// Affected patient snapshot.
    #[must_use]
    pub const fn patient(&self) -> &Patient {
        &self.patient
    }

    /// Representative appointment; the earliest one booked with the doctor.
    #[must_use]
    pub const fn appointment(&self) -> &Appointment {
        &self.appointment
    }

    #[must_use]
    pub const fn patient_id(&self) -> PatientId {
        self.patient.id
    }
}

/// Looks up every appointment booked with a doctor and projects it onto the
/// patients behind them.
#[derive(Clone)]
pub struct AffectedPatientResolver {
    loader: Arc<dyn SnapshotLoader>,
}

impl AffectedPatientResolver {
    /// Resolver reading appointments through `loader`.
    #[must_use]
    pub fn new(loader: Arc<dyn SnapshotLoader>) -> Self {
        Self { loader }
    }

    /// Distinct patients holding any appointment with `doctor_id`, regardless
    /// of status or date. A doctor with no appointments yields an empty list.
    ///
    /// # Errors
    /// `MissingRelation` when an appointment arrives without its patient, or a
    /// snapshot error from the loader.
    pub async fn resolve(&self, doctor_id: &DoctorId) -> Result<Vec<AffectedPatient>, PipelineError> {
        let appointments = self.loader.appointments_for_doctor(doctor_id).await?;
        let loaded = appointments.len();
        let affected = dedupe_by_patient(appointments)?;
        debug!(
            doctor_id = %doctor_id,
            appointments = loaded,
            patients = affected.len(),
            "resolved affected patients"
        );
        Ok(affected)
    }
}

/// Keep one entry per patient, choosing the earliest appointment.
///
/// Output order follows those representative appointments, so it is stable
/// for a given input set.
pub fn dedupe_by_patient(
    mut appointments: Vec<Appointment>,
) -> Result<Vec<AffectedPatient>, PipelineError> {
    appointments.sort_by_key(|appointment| (appointment.scheduled_at, appointment.id));
    let mut seen = HashSet::new();
    let mut affected = Vec::new();
    for appointment in appointments {
        let patient = appointment.require_patient()?.clone();
        if seen.insert(patient.id) {
            affected.push(AffectedPatient::new(patient, appointment));
        }
    }
    Ok(affected)
}
