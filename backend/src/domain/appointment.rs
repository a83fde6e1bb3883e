//! Appointment snapshot and the time window used to select appointments.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::doctor::Doctor;
use super::error::{PipelineError, Relation};
use super::ids::{AppointmentId, DoctorId, PatientId};
use super::patient::Patient;

/// Read-only appointment snapshot.
///
/// The `patient` and `doctor` relations are optional because the loader only
/// fills them when asked to. Pipeline stages that need them go through
/// [`Appointment::require_patient`] and [`Appointment::require_doctor`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    /// Appointment identifier.
    pub id: AppointmentId,
    /// Reference to the booked patient.
    pub patient_id: PatientId,
    /// Reference to the attending doctor.
    pub doctor_id: DoctorId,
    /// Clinic-local scheduled timestamp.
    pub scheduled_at: NaiveDateTime,
    /// Free-text status, e.g. "In processing".
    #[serde(default)]
    pub status: String,
    /// Free-text notes; reported as symptoms.
    #[serde(default)]
    pub notes: String,
    /// Loaded patient, if requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient: Option<Patient>,
    /// Loaded doctor, if requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor: Option<Doctor>,
}

impl Appointment {
    /// Borrow the loaded patient or fail with `MissingRelation`.
    pub fn require_patient(&self) -> Result<&Patient, PipelineError> {
        self.patient
            .as_ref()
            .ok_or_else(|| PipelineError::missing_relation("appointment", self.id, Relation::Patient))
    }

    /// Borrow the loaded doctor or fail with `MissingRelation`.
    pub fn require_doctor(&self) -> Result<&Doctor, PipelineError> {
        self.doctor
            .as_ref()
            .ok_or_else(|| PipelineError::missing_relation("appointment", self.id, Relation::Doctor))
    }
}

/// Half-open timestamp window `[from, until)` for appointment selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AppointmentWindow {
    from: NaiveDateTime,
    until: NaiveDateTime,
}

impl AppointmentWindow {
    /// Build a window; returns `None` when `until` precedes `from`.
    #[must_use]
    pub fn new(from: NaiveDateTime, until: NaiveDateTime) -> Option<Self> {
        (from <= until).then_some(Self { from, until })
    }

    /// Inclusive lower bound.
    #[must_use]
    pub const fn from(&self) -> NaiveDateTime {
        self.from
    }

    /// Exclusive upper bound.
    #[must_use]
    pub const fn until(&self) -> NaiveDateTime {
        self.until
    }

    /// Whether `timestamp` falls inside the window.
    #[must_use]
    pub fn contains(&self, timestamp: NaiveDateTime) -> bool {
        self.from <= timestamp && timestamp < self.until
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rstest::rstest;

    use super::*;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .and_then(|date| date.and_hms_opt(hour, 0, 0))
            .expect("valid timestamp")
    }

    #[rstest]
    fn require_relations_report_missing_entities() {
        let appointment = Appointment {
            id: AppointmentId::random(),
            patient_id: PatientId::random(),
            doctor_id: DoctorId::random(),
            scheduled_at: at(2, 9),
            status: "In processing".to_owned(),
            notes: String::new(),
            patient: None,
            doctor: None,
        };

        let patient_err = appointment.require_patient().expect_err("patient missing");
        assert!(matches!(
            patient_err,
            PipelineError::MissingRelation {
                relation: Relation::Patient,
                ..
            }
        ));
        let doctor_err = appointment.require_doctor().expect_err("doctor missing");
        assert!(matches!(
            doctor_err,
            PipelineError::MissingRelation {
                relation: Relation::Doctor,
                ..
            }
        ));
    }

    #[rstest]
    #[case(at(1, 0), true)]
    #[case(at(15, 12), true)]
    #[case(at(31, 23), true)]
    #[case(at(31, 0), true)]
    fn window_contains_inside_points(#[case] timestamp: NaiveDateTime, #[case] expected: bool) {
        let window = AppointmentWindow::new(at(1, 0), at(31, 23) + chrono::TimeDelta::hours(1))
            .expect("ordered window");
        assert_eq!(window.contains(timestamp), expected);
    }

    #[rstest]
    fn window_excludes_upper_bound() {
        let window = AppointmentWindow::new(at(1, 0), at(2, 0)).expect("ordered window");
        assert!(!window.contains(at(2, 0)));
    }

    #[rstest]
    fn inverted_window_is_rejected() {
        assert!(AppointmentWindow::new(at(2, 0), at(1, 0)).is_none());
    }
}
