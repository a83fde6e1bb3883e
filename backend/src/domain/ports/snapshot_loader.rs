//! Driven port for reading clinic snapshots from the CRUD store.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::appointment::{Appointment, AppointmentWindow};
use crate::domain::doctor::Doctor;
use crate::domain::ids::DoctorId;

define_port_error! {
    /// Errors surfaced by snapshot loaders.
    pub enum SnapshotLoaderError {
        /// Store could not be reached.
        Connection { message: String } => "snapshot store connection failed: {message}",
        /// Store reached but the query failed.
        Query { message: String } => "snapshot query failed: {message}",
    }
    retryable: [Connection]
}

/// Port for loading read-only snapshots.
///
/// Appointments returned by this port carry their `patient` relation. Doctors
/// carry their `specialization` relation when the store holds one.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SnapshotLoader: Send + Sync {
    /// Fetch a doctor together with its specialization.
    async fn find_doctor(&self, doctor_id: &DoctorId) -> Result<Option<Doctor>, SnapshotLoaderError>;

    /// Fetch every appointment booked with the doctor, patients included.
    async fn appointments_for_doctor(
        &self,
        doctor_id: &DoctorId,
    ) -> Result<Vec<Appointment>, SnapshotLoaderError>;

    /// Fetch the doctor's appointments whose timestamp falls inside `window`.
    async fn appointments_for_doctor_between(
        &self,
        doctor_id: &DoctorId,
        window: &AppointmentWindow,
    ) -> Result<Vec<Appointment>, SnapshotLoaderError>;
}
