//! Weekly doctor schedule snapshot.

use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use super::doctor::Doctor;
use super::error::{PipelineError, Relation};
use super::ids::{DoctorId, ScheduleId};

/// Recurring weekly availability window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityWindow {
    /// Day of week the window recurs on.
    pub day_of_week: Weekday,
    /// Start of availability, clinic-local.
    pub available_from: NaiveTime,
    /// End of availability, clinic-local.
    pub available_to: NaiveTime,
}

/// Read-only doctor schedule snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorSchedule {
    /// Schedule identifier.
    pub id: ScheduleId,
    /// Reference to the doctor the schedule belongs to.
    pub doctor_id: DoctorId,
    /// Day of week the window recurs on.
    pub day_of_week: Weekday,
    /// Start of availability.
    pub available_from: NaiveTime,
    /// End of availability.
    pub available_to: NaiveTime,
    /// Loaded doctor, if requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor: Option<Doctor>,
}

impl DoctorSchedule {
    /// The availability window carried by this schedule.
    #[must_use]
    pub const fn window(&self) -> AvailabilityWindow {
        AvailabilityWindow {
            day_of_week: self.day_of_week,
            available_from: self.available_from,
            available_to: self.available_to,
        }
    }

    /// Borrow the loaded doctor or fail with `MissingRelation`.
    pub fn require_doctor(&self) -> Result<&Doctor, PipelineError> {
        self.doctor
            .as_ref()
            .ok_or_else(|| PipelineError::missing_relation("schedule", self.id, Relation::Doctor))
    }
}
