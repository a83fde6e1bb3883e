//! In-memory snapshot loader fed from a [`ClinicFixture`].
//!
//! Records are indexed by id at construction. Each read joins the requested
//! relations, mirroring what the CRUD store's eager loading returns. A
//! relation whose target row is absent stays `None` so the pipeline can
//! report it as missing.

mod fixture;

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;

pub use fixture::{ClinicFixture, FixtureError};

use crate::domain::ports::{SnapshotLoader, SnapshotLoaderError};
use crate::domain::{
    Appointment, AppointmentId, AppointmentWindow, Department, DepartmentId, Doctor, DoctorId,
    DoctorSchedule, Patient, PatientId, ScheduleId, Specialization, SpecializationId,
};

/// Snapshot loader over an immutable in-memory dataset.
#[derive(Debug, Default)]
pub struct InMemorySnapshotLoader {
    specializations: HashMap<SpecializationId, Specialization>,
    departments: HashMap<DepartmentId, Department>,
    doctors: HashMap<DoctorId, Doctor>,
    patients: HashMap<PatientId, Patient>,
    appointments: Vec<Appointment>,
    schedules: HashMap<ScheduleId, DoctorSchedule>,
}

impl InMemorySnapshotLoader {
    /// Index `fixture`, rejecting duplicate ids.
    pub fn new(fixture: ClinicFixture) -> Result<Self, FixtureError> {
        let appointments = fixture.appointments;
        let mut appointment_ids = HashSet::new();
        for appointment in &appointments {
            if !appointment_ids.insert(appointment.id) {
                return Err(duplicate("appointment", appointment.id));
            }
        }
        Ok(Self {
            specializations: index("specialization", fixture.specializations, |row| row.id)?,
            departments: index("department", fixture.departments, |row| row.id)?,
            doctors: index("doctor", fixture.doctors, |row| row.id)?,
            patients: index("patient", fixture.patients, |row| row.id)?,
            schedules: index("schedule", fixture.schedules, |row| row.id)?,
            appointments,
        })
    }

    /// Doctor with specialization and department joined.
    pub fn doctor(&self, doctor_id: &DoctorId) -> Option<Doctor> {
        self.doctors.get(doctor_id).map(|doctor| self.join_doctor(doctor))
    }

    /// Patient record.
    pub fn patient(&self, patient_id: &PatientId) -> Option<Patient> {
        self.patients.get(patient_id).cloned()
    }

    /// Appointment with patient and doctor joined.
    pub fn appointment(&self, appointment_id: &AppointmentId) -> Option<Appointment> {
        self.appointments
            .iter()
            .find(|appointment| appointment.id == *appointment_id)
            .map(|appointment| self.join_appointment(appointment))
    }

    /// Schedule with doctor joined.
    pub fn schedule(&self, schedule_id: &ScheduleId) -> Option<DoctorSchedule> {
        self.schedules.get(schedule_id).map(|schedule| DoctorSchedule {
            doctor: self.doctor(&schedule.doctor_id),
            ..schedule.clone()
        })
    }

    fn join_doctor(&self, doctor: &Doctor) -> Doctor {
        Doctor {
            specialization: self.specializations.get(&doctor.specialization_id).cloned(),
            department: self.departments.get(&doctor.department_id).cloned(),
            ..doctor.clone()
        }
    }

    fn join_appointment(&self, appointment: &Appointment) -> Appointment {
        Appointment {
            patient: self.patient(&appointment.patient_id),
            doctor: self.doctor(&appointment.doctor_id),
            ..appointment.clone()
        }
    }

    fn appointments_matching(&self, keep: impl Fn(&Appointment) -> bool) -> Vec<Appointment> {
        self.appointments
            .iter()
            .filter(|appointment| keep(appointment))
            .map(|appointment| self.join_appointment(appointment))
            .collect()
    }
}

fn duplicate(entity: &'static str, id: impl ToString) -> FixtureError {
    FixtureError::DuplicateId {
        entity,
        id: id.to_string(),
    }
}

fn index<K, V>(
    entity: &'static str,
    rows: Vec<V>,
    key: impl Fn(&V) -> K,
) -> Result<HashMap<K, V>, FixtureError>
where
    K: std::hash::Hash + Eq + ToString,
{
    let mut indexed = HashMap::with_capacity(rows.len());
    for row in rows {
        let id = key(&row);
        if indexed.contains_key(&id) {
            return Err(duplicate(entity, id));
        }
        indexed.insert(id, row);
    }
    Ok(indexed)
}

#[async_trait]
impl SnapshotLoader for InMemorySnapshotLoader {
    async fn find_doctor(&self, doctor_id: &DoctorId) -> Result<Option<Doctor>, SnapshotLoaderError> {
        Ok(self.doctor(doctor_id))
    }

    async fn appointments_for_doctor(
        &self,
        doctor_id: &DoctorId,
    ) -> Result<Vec<Appointment>, SnapshotLoaderError> {
        Ok(self.appointments_matching(|appointment| appointment.doctor_id == *doctor_id))
    }

    async fn appointments_for_doctor_between(
        &self,
        doctor_id: &DoctorId,
        window: &AppointmentWindow,
    ) -> Result<Vec<Appointment>, SnapshotLoaderError> {
        Ok(self.appointments_matching(|appointment| {
            appointment.doctor_id == *doctor_id && window.contains(appointment.scheduled_at)
        }))
    }
}
